//! Table Schema Definitions
//!
//! Single source of truth for every table the pipeline touches.
//!
//! - Input tables (upstream bibliographic store, read-only): checked before
//!   each run, drift aborts the run.
//! - Output tables: dropped and recreated from these declarations on each run.
//!
//! # Usage
//!
//! ```rust,ignore
//! check_input_schema(&pool).await?;
//! let mut tx = pool.begin().await?;
//! recreate_output_tables(&mut tx).await?;
//! ```

use crate::db::schema_check::{ColumnDefinition, SchemaCheck, SchemaDrift, TableSchema};
use crate::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

// =============================================================================
// Input tables
// =============================================================================

/// Filing records
pub struct ApplnTableSchema;

impl TableSchema for ApplnTableSchema {
    fn table_name() -> &'static str {
        "appln"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("appln_id", "INTEGER").primary_key(),
            ColumnDefinition::new("appln_kind", "TEXT"),
            ColumnDefinition::new("appln_auth", "TEXT"),
            ColumnDefinition::new("appln_filing_date", "TEXT"),
            ColumnDefinition::new("appln_filing_year", "INTEGER"),
            ColumnDefinition::new("docdb_family_id", "INTEGER"),
            ColumnDefinition::new("inpadoc_family_id", "INTEGER"),
            ColumnDefinition::new("internat_appln_id", "INTEGER"),
            ColumnDefinition::new("earliest_filing_id", "INTEGER"),
            ColumnDefinition::new("reg_phase", "TEXT"),
            ColumnDefinition::new("nat_phase", "TEXT"),
        ]
    }
}

/// Priority claims: `appln_id` claims `prior_appln_id`
pub struct PriorityClaimTableSchema;

impl TableSchema for PriorityClaimTableSchema {
    fn table_name() -> &'static str {
        "priority_claim"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("appln_id", "INTEGER"),
            ColumnDefinition::new("prior_appln_id", "INTEGER"),
            ColumnDefinition::new("prior_appln_seq_nr", "INTEGER"),
        ]
    }
}

/// Continuations: `appln_id` continues `parent_appln_id`
pub struct ContinuationTableSchema;

impl TableSchema for ContinuationTableSchema {
    fn table_name() -> &'static str {
        "continuation"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("appln_id", "INTEGER"),
            ColumnDefinition::new("parent_appln_id", "INTEGER"),
            ColumnDefinition::new("contn_type", "TEXT"),
        ]
    }
}

/// Technical relationships: `appln_id` is related to `tech_rel_appln_id`
pub struct TechRelTableSchema;

impl TableSchema for TechRelTableSchema {
    fn table_name() -> &'static str {
        "tech_rel"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("appln_id", "INTEGER"),
            ColumnDefinition::new("tech_rel_appln_id", "INTEGER"),
        ]
    }
}

pub struct PublicationTableSchema;

impl TableSchema for PublicationTableSchema {
    fn table_name() -> &'static str {
        "publication"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("pat_publn_id", "INTEGER").primary_key(),
            ColumnDefinition::new("appln_id", "INTEGER"),
            ColumnDefinition::new("publn_auth", "TEXT"),
            ColumnDefinition::new("publn_nr", "TEXT"),
            ColumnDefinition::new("publn_kind", "TEXT"),
            ColumnDefinition::new("publn_date", "TEXT"),
        ]
    }
}

/// Person-role-on-filing edges
pub struct PersonApplnTableSchema;

impl TableSchema for PersonApplnTableSchema {
    fn table_name() -> &'static str {
        "person_appln"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("person_id", "INTEGER"),
            ColumnDefinition::new("appln_id", "INTEGER"),
            ColumnDefinition::new("applt_seq_nr", "INTEGER"),
            ColumnDefinition::new("invt_seq_nr", "INTEGER"),
        ]
    }
}

pub struct PersonTableSchema;

impl TableSchema for PersonTableSchema {
    fn table_name() -> &'static str {
        "person"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("person_id", "INTEGER").primary_key(),
            ColumnDefinition::new("person_ctry_code", "TEXT"),
        ]
    }
}

/// Geocoded addresses; `person_id = 0` marks gazetteer rows
pub struct GeocodedLocationTableSchema;

impl TableSchema for GeocodedLocationTableSchema {
    fn table_name() -> &'static str {
        "geocoded_location"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        let mut columns = vec![
            ColumnDefinition::new("appln_id", "INTEGER"),
            ColumnDefinition::new("person_id", "INTEGER"),
            ColumnDefinition::new("role", "TEXT"),
        ];
        columns.extend(location_columns());
        columns
    }
}

/// Location payload shared by `geocoded_location` and `imputed_geo_location`
fn location_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("lat", "REAL"),
        ColumnDefinition::new("lng", "REAL"),
        ColumnDefinition::new("lat_exact", "REAL"),
        ColumnDefinition::new("lng_exact", "REAL"),
        ColumnDefinition::new("name_0", "TEXT"),
        ColumnDefinition::new("name_1", "TEXT"),
        ColumnDefinition::new("name_2", "TEXT"),
        ColumnDefinition::new("name_3", "TEXT"),
        ColumnDefinition::new("name_4", "TEXT"),
        ColumnDefinition::new("ctry_code", "TEXT"),
        ColumnDefinition::new("coord_source", "TEXT"),
    ]
}

// =============================================================================
// Output tables
// =============================================================================

pub struct FirstFilingTableSchema;

impl TableSchema for FirstFilingTableSchema {
    fn table_name() -> &'static str {
        "first_filing"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("appln_id", "INTEGER").primary_key(),
            ColumnDefinition::new("type", "TEXT").not_null(),
        ]
    }
}

/// First filing <-> filing bridge
pub struct BridgeTableSchema;

impl TableSchema for BridgeTableSchema {
    fn table_name() -> &'static str {
        "ff_bridge"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("first_filing_id", "INTEGER").primary_key(),
            ColumnDefinition::new("appln_id", "INTEGER").primary_key(),
            ColumnDefinition::new("appln_auth", "TEXT").not_null(),
            ColumnDefinition::new("publn_auth", "TEXT"),
            ColumnDefinition::new("publn_nr", "TEXT"),
            ColumnDefinition::new("publn_kind", "TEXT"),
            ColumnDefinition::new("publn_date", "TEXT"),
            ColumnDefinition::new("nb_priorities", "INTEGER").not_null(),
            ColumnDefinition::new("type", "TEXT").not_null(),
        ]
    }
}

pub struct ImputedGeoTableSchema;

impl TableSchema for ImputedGeoTableSchema {
    fn table_name() -> &'static str {
        "imputed_geo"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("criterion", "TEXT").primary_key(),
            ColumnDefinition::new("appln_id", "INTEGER").primary_key(),
            ColumnDefinition::new("type", "TEXT").not_null(),
            ColumnDefinition::new("source", "INTEGER").not_null(),
            ColumnDefinition::new("donor_appln_id", "INTEGER").not_null(),
            ColumnDefinition::new("location_count", "INTEGER").not_null(),
        ]
    }
}

pub struct ImputedGeoLocationTableSchema;

impl TableSchema for ImputedGeoLocationTableSchema {
    fn table_name() -> &'static str {
        "imputed_geo_location"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        let mut columns = vec![
            ColumnDefinition::new("criterion", "TEXT").primary_key(),
            ColumnDefinition::new("appln_id", "INTEGER").primary_key(),
            ColumnDefinition::new("seq", "INTEGER").primary_key(),
            ColumnDefinition::new("person_id", "INTEGER").not_null(),
        ];
        columns.extend(location_columns());
        columns
    }
}

pub struct ImputedCountryTableSchema;

impl TableSchema for ImputedCountryTableSchema {
    fn table_name() -> &'static str {
        "imputed_ctry"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("criterion", "TEXT").primary_key(),
            ColumnDefinition::new("appln_id", "INTEGER").primary_key(),
            ColumnDefinition::new("person_id", "INTEGER").primary_key(),
            ColumnDefinition::new("ctry_code", "TEXT").not_null(),
            ColumnDefinition::new("type", "TEXT").not_null(),
            ColumnDefinition::new("source", "INTEGER").not_null(),
            ColumnDefinition::new("donor_appln_id", "INTEGER").not_null(),
        ]
    }
}

/// Append-only run log
pub struct RunSummaryTableSchema;

impl TableSchema for RunSummaryTableSchema {
    fn table_name() -> &'static str {
        "run_summary"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("run_id", "TEXT").primary_key(),
            ColumnDefinition::new("started_at", "TEXT").not_null(),
            ColumnDefinition::new("finished_at", "TEXT").not_null(),
            ColumnDefinition::new("summary_json", "TEXT").not_null(),
        ]
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Verify every input table; all problems are reported together
pub async fn check_input_schema(pool: &SqlitePool) -> Result<()> {
    info!("=== Checking upstream input schema ===");

    let mut drift: Vec<SchemaDrift> = Vec::new();
    drift.extend(SchemaCheck::check_table::<ApplnTableSchema>(pool).await?);
    drift.extend(SchemaCheck::check_table::<PriorityClaimTableSchema>(pool).await?);
    drift.extend(SchemaCheck::check_table::<ContinuationTableSchema>(pool).await?);
    drift.extend(SchemaCheck::check_table::<TechRelTableSchema>(pool).await?);
    drift.extend(SchemaCheck::check_table::<PublicationTableSchema>(pool).await?);
    drift.extend(SchemaCheck::check_table::<PersonApplnTableSchema>(pool).await?);
    drift.extend(SchemaCheck::check_table::<PersonTableSchema>(pool).await?);
    drift.extend(SchemaCheck::check_table::<GeocodedLocationTableSchema>(pool).await?);

    if drift.is_empty() {
        info!("=== Input schema OK ===");
        return Ok(());
    }

    let problems: Vec<String> = drift.iter().map(|d| d.to_string()).collect();
    Err(Error::Schema(problems.join("; ")))
}

/// Drop and recreate every rebuilt output table
///
/// `run_summary` is only created when missing; it accumulates one row per run.
pub async fn recreate_output_tables(conn: &mut SqliteConnection) -> Result<()> {
    recreate::<FirstFilingTableSchema>(conn).await?;
    recreate::<BridgeTableSchema>(conn).await?;
    recreate::<ImputedGeoTableSchema>(conn).await?;
    recreate::<ImputedGeoLocationTableSchema>(conn).await?;
    recreate::<ImputedCountryTableSchema>(conn).await?;

    let create_summary = RunSummaryTableSchema::create_sql()
        .replacen("CREATE TABLE", "CREATE TABLE IF NOT EXISTS", 1);
    sqlx::query(&create_summary).execute(&mut *conn).await?;

    Ok(())
}

async fn recreate<T: TableSchema>(conn: &mut SqliteConnection) -> Result<()> {
    let drop_sql = format!("DROP TABLE IF EXISTS {}", T::table_name());
    sqlx::query(&drop_sql).execute(&mut *conn).await?;
    sqlx::query(&T::create_sql()).execute(&mut *conn).await?;
    info!("  Rebuilt output table '{}'", T::table_name());
    Ok(())
}
