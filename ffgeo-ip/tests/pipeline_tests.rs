//! End-to-end runs against a fixture store

mod helpers;

use ffgeo_common::db::{open_store, StoreMode};
use ffgeo_common::model::{Criterion, FirstFilingType, SourceRank, Variant};
use ffgeo_common::Error;
use ffgeo_ip::{run_on_store, PipelineOptions};
use helpers::*;
use sqlx::Row;

#[tokio::test]
async fn first_filing_with_own_geodata_uses_itself() {
    let store = create_fixture_store().await.unwrap();
    seed_de_us(&store.pool).await.unwrap();
    insert_geocoded(&store.pool, 1, 11, "INV", 48.137, 11.575, "DE").await.unwrap();
    insert_geocoded(&store.pool, 2, 21, "INV", 40.713, -74.006, "US").await.unwrap();

    let output = run_on_store(&store.pool, &PipelineOptions::default()).await.unwrap();
    assert_eq!(output.summary.first_filings(), 1);

    let ty: String = sqlx::query_scalar("SELECT type FROM first_filing WHERE appln_id = 1")
        .fetch_one(&store.pool)
        .await
        .unwrap();
    assert_eq!(ty, "PRIORITY");

    let row = sqlx::query(
        "SELECT source, donor_appln_id, location_count FROM imputed_geo WHERE criterion = 'inventor' AND appln_id = 1",
    )
    .fetch_one(&store.pool)
    .await
    .unwrap();
    assert_eq!(row.get::<i64, _>("source"), 1);
    assert_eq!(row.get::<i64, _>("donor_appln_id"), 1);
    assert_eq!(row.get::<i64, _>("location_count"), 1);
}

#[tokio::test]
async fn missing_geodata_copied_from_sole_equivalent() {
    let store = create_fixture_store().await.unwrap();
    seed_de_us(&store.pool).await.unwrap();
    insert_geocoded(&store.pool, 2, 21, "INV", 40.713, -74.006, "US").await.unwrap();

    run_on_store(&store.pool, &PipelineOptions::default()).await.unwrap();

    let row = sqlx::query(
        "SELECT source, donor_appln_id FROM imputed_geo WHERE criterion = 'inventor' AND appln_id = 1",
    )
    .fetch_one(&store.pool)
    .await
    .unwrap();
    assert_eq!(row.get::<i64, _>("source"), 2);
    assert_eq!(row.get::<i64, _>("donor_appln_id"), 2);

    let lat: f64 = sqlx::query_scalar(
        "SELECT lat FROM imputed_geo_location WHERE criterion = 'inventor' AND appln_id = 1 AND seq = 0",
    )
    .fetch_one(&store.pool)
    .await
    .unwrap();
    assert_eq!(lat, 40.713);

    // Bibliographic country of A's own inventor wins at rank 1
    let ctry: String = sqlx::query_scalar(
        "SELECT ctry_code FROM imputed_ctry WHERE criterion = 'inventor' AND appln_id = 1 AND person_id = 11",
    )
    .fetch_one(&store.pool)
    .await
    .unwrap();
    assert_eq!(ctry, "DE");
}

#[tokio::test]
async fn bridge_contains_self_and_subsequent_rows() {
    let store = create_fixture_store().await.unwrap();
    seed_de_us(&store.pool).await.unwrap();

    run_on_store(&store.pool, &PipelineOptions::default()).await.unwrap();

    let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
        "SELECT first_filing_id, appln_id, nb_priorities FROM ff_bridge ORDER BY appln_id",
    )
    .fetch_all(&store.pool)
    .await
    .unwrap();
    assert_eq!(rows, vec![(1, 1, 0), (1, 2, 1)]);
}

#[tokio::test]
async fn supranational_first_filing_gets_no_country_fallback() {
    let store = create_fixture_store().await.unwrap();
    ApplnRow::national(50, "WO", "2004-06-01")
        .international()
        .family(500)
        .insert(&store.pool)
        .await
        .unwrap();
    ApplnRow::national(60, "IT", "2004-06-01")
        .family(600)
        .insert(&store.pool)
        .await
        .unwrap();

    let output = run_on_store(&store.pool, &PipelineOptions::default()).await.unwrap();

    let rows: Vec<(i64, i64, String, i64)> = sqlx::query_as(
        "SELECT appln_id, person_id, ctry_code, source FROM imputed_ctry WHERE criterion = 'inventor'",
    )
    .fetch_all(&store.pool)
    .await
    .unwrap();
    assert_eq!(rows, vec![(60, 0, "IT".to_string(), 7)]);

    let coverage = output
        .summary
        .coverage_for(Variant::Country, Criterion::Inventor)
        .unwrap();
    assert_eq!(coverage.unresolved, 1);
    assert_eq!(
        coverage.by_source.get(&SourceRank::JurisdictionFallback.as_u8()),
        Some(&1)
    );
}

#[tokio::test]
async fn rerun_rebuilds_outputs_and_appends_run_log() {
    let store = create_fixture_store().await.unwrap();
    seed_de_us(&store.pool).await.unwrap();
    insert_geocoded(&store.pool, 2, 21, "INV", 40.713, -74.006, "US").await.unwrap();

    let options = PipelineOptions::default();
    let first = run_on_store(&store.pool, &options).await.unwrap();
    let geo_rows = count(&store.pool, "imputed_geo").await.unwrap();
    let ctry_rows = count(&store.pool, "imputed_ctry").await.unwrap();

    let second = run_on_store(&store.pool, &options).await.unwrap();
    assert_ne!(first.summary.run_id, second.summary.run_id);
    assert_eq!(count(&store.pool, "imputed_geo").await.unwrap(), geo_rows);
    assert_eq!(count(&store.pool, "imputed_ctry").await.unwrap(), ctry_rows);
    assert_eq!(count(&store.pool, "first_filing").await.unwrap(), 1);
    assert_eq!(count(&store.pool, "run_summary").await.unwrap(), 2);
}

#[tokio::test]
async fn malformed_date_aborts_without_touching_outputs() {
    let store = create_fixture_store().await.unwrap();
    seed_de_us(&store.pool).await.unwrap();
    run_on_store(&store.pool, &PipelineOptions::default()).await.unwrap();

    ApplnRow::national(3, "FR", "1995-13-45")
        .insert(&store.pool)
        .await
        .unwrap();

    let err = run_on_store(&store.pool, &PipelineOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "got {:?}", err);

    assert_eq!(count(&store.pool, "first_filing").await.unwrap(), 1);
    assert_eq!(count(&store.pool, "run_summary").await.unwrap(), 1);
}

#[tokio::test]
async fn missing_input_table_is_a_schema_error() {
    let store = create_fixture_store().await.unwrap();
    sqlx::query("DROP TABLE tech_rel")
        .execute(&store.pool)
        .await
        .unwrap();

    let err = run_on_store(&store.pool, &PipelineOptions::default())
        .await
        .unwrap_err();
    match err {
        Error::Schema(msg) => assert!(msg.contains("tech_rel")),
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[tokio::test]
async fn read_write_store_runs_pipeline() {
    let store = create_fixture_store().await.unwrap();
    seed_de_us(&store.pool).await.unwrap();
    store.pool.close().await;

    let pool = open_store(&store.path, StoreMode::ReadWrite).await.unwrap();
    let output = run_on_store(&pool, &PipelineOptions::default()).await.unwrap();
    assert_eq!(output.summary.bridge_rows, 2);
}

#[tokio::test]
async fn familyless_filing_is_not_tagged_single() {
    let store = create_fixture_store().await.unwrap();
    ApplnRow::national(70, "IT", "2004-06-01")
        .no_family()
        .insert(&store.pool)
        .await
        .unwrap();
    ApplnRow::national(80, "ES", "2004-06-01")
        .family(800)
        .insert(&store.pool)
        .await
        .unwrap();

    let output = run_on_store(&store.pool, &PipelineOptions::default()).await.unwrap();
    assert_eq!(output.classification.get(70), None);
    assert_eq!(output.classification.get(80), Some(FirstFilingType::Single));
    assert_eq!(count(&store.pool, "first_filing").await.unwrap(), 1);
}

#[tokio::test]
async fn out_of_range_filing_year_is_invalid_data() {
    let store = create_fixture_store().await.unwrap();
    ApplnRow::national(90, "DE", "1999-05-05")
        .filing_year(i64::from(i32::MAX) + 1)
        .insert(&store.pool)
        .await
        .unwrap();

    let err = run_on_store(&store.pool, &PipelineOptions::default())
        .await
        .unwrap_err();
    match err {
        Error::InvalidData(msg) => assert!(msg.contains("appln 90"), "got {}", msg),
        other => panic!("expected invalid data, got {:?}", other),
    }
}
