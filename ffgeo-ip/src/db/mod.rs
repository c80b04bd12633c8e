//! Backing-store access for the pipeline
//!
//! Loaders read the upstream input tables into an `InputSnapshot`; writers
//! fill the rebuilt output tables. Table shapes are declared in
//! `ffgeo_common::db::table_schemas`.

pub mod filings;
pub mod outputs;
pub mod persons;
pub mod publications;
pub mod relationships;

use ffgeo_common::model::InputSnapshot;
use ffgeo_common::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Read every input table
///
/// Malformed records (bad dates, bad office codes, unknown roles) abort the
/// load; nothing is written before the load succeeds.
pub async fn load_snapshot(pool: &SqlitePool) -> Result<InputSnapshot> {
    info!("=== Loading input snapshot ===");

    let filings = filings::load_filings(pool).await?;
    let relationships = relationships::load_relationships(pool).await?;
    let publications = publications::load_publications(pool).await?;
    let person_roles = persons::load_person_roles(pool).await?;
    let mut locations = persons::load_country_locations(pool).await?;
    locations.extend(persons::load_geocoded_locations(pool).await?);

    info!(
        "Loaded {} filings, {} relationships, {} publications, {} person roles, {} locations",
        filings.len(),
        relationships.len(),
        publications.len(),
        person_roles.len(),
        locations.len()
    );

    Ok(InputSnapshot {
        filings,
        relationships,
        publications,
        person_roles,
        locations,
    })
}
