//! Output table writers
//!
//! All writers take the open run transaction; the tables were recreated
//! empty earlier in the same transaction.

use crate::resolver::Classification;
use crate::summary::RunSummary;
use ffgeo_common::model::{BridgeRow, ImputedCountry, ImputedGeo};
use ffgeo_common::Result;
use sqlx::SqliteConnection;
use tracing::debug;

pub async fn write_first_filings(
    conn: &mut SqliteConnection,
    classification: &Classification,
) -> Result<()> {
    for (appln_id, ty) in classification.iter() {
        sqlx::query("INSERT INTO first_filing (appln_id, type) VALUES (?, ?)")
            .bind(appln_id)
            .bind(ty.as_str())
            .execute(&mut *conn)
            .await?;
    }
    debug!("Wrote {} first_filing rows", classification.len());
    Ok(())
}

pub async fn write_bridge(conn: &mut SqliteConnection, rows: &[BridgeRow]) -> Result<()> {
    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO ff_bridge
                (first_filing_id, appln_id, appln_auth, publn_auth, publn_nr, publn_kind,
                 publn_date, nb_priorities, type)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.first_filing_id)
        .bind(row.appln_id)
        .bind(&row.appln_auth)
        .bind(&row.publn_auth)
        .bind(&row.publn_nr)
        .bind(&row.publn_kind)
        .bind(row.publn_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(i64::from(row.nb_priorities))
        .bind(row.ty.as_str())
        .execute(&mut *conn)
        .await?;
    }
    debug!("Wrote {} ff_bridge rows", rows.len());
    Ok(())
}

pub async fn write_imputed_geo(conn: &mut SqliteConnection, records: &[ImputedGeo]) -> Result<()> {
    for record in records {
        sqlx::query(
            r#"
            INSERT INTO imputed_geo
                (criterion, appln_id, type, source, donor_appln_id, location_count)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.criterion.as_str())
        .bind(record.appln_id)
        .bind(record.ty.as_str())
        .bind(i64::from(record.source.as_u8()))
        .bind(record.donor_appln_id)
        .bind(record.locations.len() as i64)
        .execute(&mut *conn)
        .await?;

        for (seq, loc) in record.locations.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO imputed_geo_location
                    (criterion, appln_id, seq, person_id, lat, lng, lat_exact, lng_exact,
                     name_0, name_1, name_2, name_3, name_4, ctry_code, coord_source)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.criterion.as_str())
            .bind(record.appln_id)
            .bind(seq as i64)
            .bind(loc.person_id)
            .bind(loc.coords.map(|c| c.lat))
            .bind(loc.coords.map(|c| c.lng))
            .bind(loc.exact.map(|c| c.lat))
            .bind(loc.exact.map(|c| c.lng))
            .bind(&loc.admin[0])
            .bind(&loc.admin[1])
            .bind(&loc.admin[2])
            .bind(&loc.admin[3])
            .bind(&loc.admin[4])
            .bind(&loc.ctry_code)
            .bind(&loc.coord_source)
            .execute(&mut *conn)
            .await?;
        }
    }
    debug!("Wrote {} imputed_geo rows", records.len());
    Ok(())
}

pub async fn write_imputed_country(
    conn: &mut SqliteConnection,
    records: &[ImputedCountry],
) -> Result<()> {
    for record in records {
        sqlx::query(
            r#"
            INSERT INTO imputed_ctry
                (criterion, appln_id, person_id, ctry_code, type, source, donor_appln_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.criterion.as_str())
        .bind(record.appln_id)
        .bind(record.person_id)
        .bind(&record.ctry_code)
        .bind(record.ty.as_str())
        .bind(i64::from(record.source.as_u8()))
        .bind(record.donor_appln_id)
        .execute(&mut *conn)
        .await?;
    }
    debug!("Wrote {} imputed_ctry rows", records.len());
    Ok(())
}

/// Append the run log entry
pub async fn write_run_summary(conn: &mut SqliteConnection, summary: &RunSummary) -> Result<()> {
    let finished_at = summary.finished_at.unwrap_or(summary.started_at);
    sqlx::query(
        "INSERT INTO run_summary (run_id, started_at, finished_at, summary_json) VALUES (?, ?, ?, ?)",
    )
    .bind(summary.run_id.to_string())
    .bind(summary.started_at.to_rfc3339())
    .bind(finished_at.to_rfc3339())
    .bind(summary.to_json()?)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
