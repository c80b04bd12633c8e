//! Person loaders: role edges, bibliographic countries, geocoded locations

use ffgeo_common::model::{
    Coordinates, PersonLocation, PersonRole, Role, ADMIN_LEVELS,
};
use ffgeo_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

pub async fn load_person_roles(pool: &SqlitePool) -> Result<Vec<PersonRole>> {
    let rows = sqlx::query(
        r#"
        SELECT person_id, appln_id,
               COALESCE(applt_seq_nr, 0) AS applt_seq_nr,
               COALESCE(invt_seq_nr, 0) AS invt_seq_nr
        FROM person_appln
        ORDER BY appln_id, person_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(PersonRole {
                person_id: row.try_get("person_id")?,
                appln_id: row.try_get("appln_id")?,
                applt_seq_nr: row.try_get("applt_seq_nr")?,
                invt_seq_nr: row.try_get("invt_seq_nr")?,
            })
        })
        .collect()
}

/// Country-only locations: `person.person_ctry_code` per role a person holds
pub async fn load_country_locations(pool: &SqlitePool) -> Result<Vec<PersonLocation>> {
    let rows = sqlx::query(
        r#"
        SELECT pa.appln_id, pa.person_id,
               COALESCE(pa.applt_seq_nr, 0) AS applt_seq_nr,
               COALESCE(pa.invt_seq_nr, 0) AS invt_seq_nr,
               TRIM(p.person_ctry_code) AS ctry_code
        FROM person_appln pa
        JOIN person p ON p.person_id = pa.person_id
        WHERE p.person_ctry_code IS NOT NULL AND TRIM(p.person_ctry_code) <> ''
        ORDER BY pa.appln_id, pa.person_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut locations = Vec::new();
    for row in &rows {
        let role = PersonRole {
            person_id: row.try_get("person_id")?,
            appln_id: row.try_get("appln_id")?,
            applt_seq_nr: row.try_get("applt_seq_nr")?,
            invt_seq_nr: row.try_get("invt_seq_nr")?,
        };
        let ctry_code: String = row.try_get("ctry_code")?;
        for r in role.roles() {
            locations.push(PersonLocation::country_only(
                role.appln_id,
                role.person_id,
                r,
                ctry_code.clone(),
            ));
        }
    }
    Ok(locations)
}

pub async fn load_geocoded_locations(pool: &SqlitePool) -> Result<Vec<PersonLocation>> {
    let rows = sqlx::query(
        r#"
        SELECT appln_id, COALESCE(person_id, 0) AS person_id, role,
               lat, lng, lat_exact, lng_exact,
               name_0, name_1, name_2, name_3, name_4,
               ctry_code, coord_source
        FROM geocoded_location
        ORDER BY appln_id, person_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(geocoded_from_row).collect()
}

fn geocoded_from_row(row: &SqliteRow) -> Result<PersonLocation> {
    let appln_id: i64 = row.try_get("appln_id")?;
    let person_id: i64 = row.try_get("person_id")?;
    let role_code: Option<String> = row.try_get("role")?;
    let role = Role::from_code(role_code.as_deref().unwrap_or("")).map_err(|e| {
        Error::InvalidData(format!("geocoded_location appln {}: {}", appln_id, e))
    })?;

    let mut admin: [Option<String>; ADMIN_LEVELS] = Default::default();
    for (level, name) in admin.iter_mut().enumerate() {
        *name = non_empty(row.try_get(format!("name_{}", level).as_str())?);
    }

    Ok(PersonLocation {
        appln_id,
        person_id,
        role,
        origin: PersonLocation::origin_for(person_id),
        coords: Coordinates::from_parts(row.try_get("lat")?, row.try_get("lng")?),
        exact: Coordinates::from_parts(row.try_get("lat_exact")?, row.try_get("lng_exact")?),
        admin,
        ctry_code: non_empty(row.try_get("ctry_code")?),
        coord_source: non_empty(row.try_get("coord_source")?),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
