//! Fixture store utilities
//!
//! Builds a temporary SQLite store with the upstream input tables, created
//! from the same declarations the schema check validates against.

#![allow(dead_code)]

use anyhow::Result;
use ffgeo_common::db::{
    ApplnTableSchema, ContinuationTableSchema, GeocodedLocationTableSchema,
    PersonApplnTableSchema, PersonTableSchema, PriorityClaimTableSchema, PublicationTableSchema,
    TableSchema, TechRelTableSchema,
};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;

/// Temporary store; `TempDir` must outlive the pool
pub struct FixtureStore {
    pub dir: TempDir,
    pub path: PathBuf,
    pub pool: SqlitePool,
}

/// Create an empty store carrying every input table
pub async fn create_fixture_store() -> Result<FixtureStore> {
    let dir = TempDir::new()?;
    let path = dir.path().join("patstat.db");
    let db_url = format!("sqlite:{}?mode=rwc", path.display());
    let pool = SqlitePool::connect(&db_url).await?;

    for sql in [
        ApplnTableSchema::create_sql(),
        PriorityClaimTableSchema::create_sql(),
        ContinuationTableSchema::create_sql(),
        TechRelTableSchema::create_sql(),
        PublicationTableSchema::create_sql(),
        PersonApplnTableSchema::create_sql(),
        PersonTableSchema::create_sql(),
        GeocodedLocationTableSchema::create_sql(),
    ] {
        sqlx::query(&sql).execute(&pool).await?;
    }

    Ok(FixtureStore { dir, path, pool })
}

/// Filing builder with the defaults of a plain national first filing
pub struct ApplnRow {
    pub appln_id: i64,
    pub kind: &'static str,
    pub auth: &'static str,
    pub date: &'static str,
    pub docdb_family_id: Option<i64>,
    pub filing_year: Option<i64>,
    pub internat_appln_id: i64,
    pub earliest_filing_id: i64,
    pub reg_phase: &'static str,
    pub nat_phase: &'static str,
}

impl ApplnRow {
    pub fn national(appln_id: i64, auth: &'static str, date: &'static str) -> Self {
        Self {
            appln_id,
            kind: "A",
            auth,
            date,
            docdb_family_id: Some(1),
            filing_year: date.get(0..4).and_then(|y| y.parse().ok()),
            internat_appln_id: 0,
            earliest_filing_id: appln_id,
            reg_phase: "N",
            nat_phase: "N",
        }
    }

    pub fn family(mut self, docdb_family_id: i64) -> Self {
        self.docdb_family_id = Some(docdb_family_id);
        self
    }

    pub fn no_family(mut self) -> Self {
        self.docdb_family_id = None;
        self
    }

    pub fn filing_year(mut self, year: i64) -> Self {
        self.filing_year = Some(year);
        self
    }

    pub fn international(mut self) -> Self {
        self.kind = "W";
        self
    }

    pub async fn insert(&self, pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO appln (appln_id, appln_kind, appln_auth, appln_filing_date,
                               appln_filing_year, docdb_family_id, inpadoc_family_id,
                               internat_appln_id, earliest_filing_id, reg_phase, nat_phase)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(self.appln_id)
        .bind(self.kind)
        .bind(self.auth)
        .bind(self.date)
        .bind(self.filing_year)
        .bind(self.docdb_family_id)
        .bind(self.docdb_family_id)
        .bind(self.internat_appln_id)
        .bind(self.earliest_filing_id)
        .bind(self.reg_phase)
        .bind(self.nat_phase)
        .execute(pool)
        .await?;
        Ok(())
    }
}

pub async fn insert_priority(pool: &SqlitePool, appln_id: i64, prior_appln_id: i64) -> Result<()> {
    sqlx::query(
        "INSERT INTO priority_claim (appln_id, prior_appln_id, prior_appln_seq_nr) VALUES (?, ?, 1)",
    )
    .bind(appln_id)
    .bind(prior_appln_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Person holding the inventor role, with a bibliographic country
pub async fn insert_inventor(
    pool: &SqlitePool,
    person_id: i64,
    appln_id: i64,
    ctry_code: &str,
) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO person (person_id, person_ctry_code) VALUES (?, ?)")
        .bind(person_id)
        .bind(ctry_code)
        .execute(pool)
        .await?;
    sqlx::query(
        "INSERT INTO person_appln (person_id, appln_id, applt_seq_nr, invt_seq_nr) VALUES (?, ?, 0, 1)",
    )
    .bind(person_id)
    .bind(appln_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_geocoded(
    pool: &SqlitePool,
    appln_id: i64,
    person_id: i64,
    role: &str,
    lat: f64,
    lng: f64,
    ctry_code: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO geocoded_location (appln_id, person_id, role, lat, lng, name_0, ctry_code, coord_source)
        VALUES (?, ?, ?, ?, ?, ?, ?, 'fixture')
        "#,
    )
    .bind(appln_id)
    .bind(person_id)
    .bind(role)
    .bind(lat)
    .bind(lng)
    .bind(ctry_code)
    .bind(ctry_code)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn count(pool: &SqlitePool, table: &str) -> Result<i64> {
    let n = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// A (DE, 1995) claimed as sole priority by B (US, 1996); both have one inventor
pub async fn seed_de_us(pool: &SqlitePool) -> Result<()> {
    ApplnRow::national(1, "DE", "1995-04-12").insert(pool).await?;
    ApplnRow::national(2, "US", "1996-04-10").insert(pool).await?;
    insert_priority(pool, 2, 1).await?;
    insert_inventor(pool, 11, 1, "DE").await?;
    insert_inventor(pool, 21, 2, "US").await?;
    Ok(())
}
