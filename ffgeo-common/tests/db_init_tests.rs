//! Store opening modes

use ffgeo_common::db::{open_store, StoreMode};
use ffgeo_common::Error;
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn existing_store(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("store.db");
    let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await
        .unwrap();
    sqlx::query("CREATE TABLE appln (appln_id INTEGER PRIMARY KEY)")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;
    path
}

#[tokio::test]
async fn missing_store_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let err = open_store(&dir.path().join("absent.db"), StoreMode::ReadWrite)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!dir.path().join("absent.db").exists());
}

#[tokio::test]
async fn read_only_store_rejects_writes() {
    let dir = TempDir::new().unwrap();
    let path = existing_store(&dir).await;

    let pool = open_store(&path, StoreMode::ReadOnly).await.unwrap();
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appln")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(n, 0);

    let write = sqlx::query("INSERT INTO appln (appln_id) VALUES (1)")
        .execute(&pool)
        .await;
    assert!(write.is_err());
}

#[tokio::test]
async fn read_write_store_accepts_writes() {
    let dir = TempDir::new().unwrap();
    let path = existing_store(&dir).await;

    let pool = open_store(&path, StoreMode::ReadWrite).await.unwrap();
    sqlx::query("INSERT INTO appln (appln_id) VALUES (1)")
        .execute(&pool)
        .await
        .unwrap();
}
