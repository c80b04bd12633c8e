//! `appln` loader

use chrono::Datelike;
use ffgeo_common::config::is_office_code;
use ffgeo_common::model::{parse_date, parse_flag, ApplnKind, Filing};
use ffgeo_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::warn;

pub async fn load_filings(pool: &SqlitePool) -> Result<Vec<Filing>> {
    let rows = sqlx::query(
        r#"
        SELECT appln_id, appln_kind, appln_auth, appln_filing_date, appln_filing_year,
               docdb_family_id, inpadoc_family_id, internat_appln_id, earliest_filing_id,
               reg_phase, nat_phase
        FROM appln
        ORDER BY appln_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(filing_from_row).collect()
}

fn filing_from_row(row: &SqliteRow) -> Result<Filing> {
    let appln_id: i64 = row.try_get("appln_id")?;
    let context = |e: Error| match e {
        Error::InvalidData(msg) => Error::InvalidData(format!("appln {}: {}", appln_id, msg)),
        other => other,
    };

    let kind_code: Option<String> = row.try_get("appln_kind")?;
    let kind = ApplnKind::from_code(kind_code.as_deref().unwrap_or("")).map_err(context)?;

    let auth: String = row.try_get::<Option<String>, _>("appln_auth")?.unwrap_or_default();
    if !is_office_code(auth.trim()) {
        return Err(Error::InvalidData(format!(
            "appln {}: '{}' is not a two-letter office code",
            appln_id, auth
        )));
    }

    let raw_date: Option<String> = row.try_get("appln_filing_date")?;
    let filing_date = parse_date(raw_date.as_deref().unwrap_or("")).map_err(context)?;

    let filing_year = match row.try_get::<Option<i64>, _>("appln_filing_year")? {
        Some(year) => {
            if year != i64::from(filing_date.year()) {
                warn!(
                    "appln {}: filing year {} disagrees with filing date {}",
                    appln_id, year, filing_date
                );
            }
            i32::try_from(year).map_err(|_| {
                Error::InvalidData(format!(
                    "appln {}: filing year {} out of range",
                    appln_id, year
                ))
            })?
        }
        None => filing_date.year(),
    };

    let internat_appln_id = row
        .try_get::<Option<i64>, _>("internat_appln_id")?
        .filter(|id| *id != 0);
    let earliest_filing_id: Option<i64> = row.try_get("earliest_filing_id")?;

    let reg_phase: Option<String> = row.try_get("reg_phase")?;
    let nat_phase: Option<String> = row.try_get("nat_phase")?;

    Ok(Filing {
        appln_id,
        kind,
        auth: auth.trim().to_string(),
        filing_date,
        filing_year,
        docdb_family_id: row.try_get("docdb_family_id")?,
        inpadoc_family_id: row.try_get("inpadoc_family_id")?,
        internat_appln_id,
        is_earliest_filing: earliest_filing_id == Some(appln_id),
        reg_phase: parse_flag(reg_phase.as_deref().unwrap_or("")).map_err(context)?,
        nat_phase: parse_flag(nat_phase.as_deref().unwrap_or("")).map_err(context)?,
    })
}
