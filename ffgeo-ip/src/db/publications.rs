//! `publication` loader

use ffgeo_common::model::{parse_date, Publication};
use ffgeo_common::{Error, Result};
use sqlx::{Row, SqlitePool};

/// Placeholder the bibliographic store uses for an unknown publication date
const UNKNOWN_PUBLN_DATE: &str = "9999-12-31";

pub async fn load_publications(pool: &SqlitePool) -> Result<Vec<Publication>> {
    let rows = sqlx::query(
        r#"
        SELECT pat_publn_id, appln_id, publn_auth, publn_nr, publn_kind, publn_date
        FROM publication
        ORDER BY appln_id, pat_publn_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut publications = Vec::with_capacity(rows.len());
    for row in rows {
        let pat_publn_id: i64 = row.try_get("pat_publn_id")?;
        let raw_date: Option<String> = row.try_get("publn_date")?;
        let publn_date = match raw_date.as_deref().map(str::trim) {
            None | Some("") | Some(UNKNOWN_PUBLN_DATE) => None,
            Some(raw) => Some(parse_date(raw).map_err(|e| {
                Error::InvalidData(format!("publication {}: {}", pat_publn_id, e))
            })?),
        };

        publications.push(Publication {
            pat_publn_id,
            appln_id: row.try_get("appln_id")?,
            publn_auth: text(&row, "publn_auth")?,
            publn_nr: text(&row, "publn_nr")?,
            publn_kind: text(&row, "publn_kind")?,
            publn_date,
        });
    }
    Ok(publications)
}

fn text(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<String> {
    Ok(row
        .try_get::<Option<String>, _>(column)?
        .map(|s| s.trim().to_string())
        .unwrap_or_default())
}
