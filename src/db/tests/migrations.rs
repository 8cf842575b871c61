use crate::db::*;
use tempfile::{NamedTempFile, TempDir};

#[tokio::test]
async fn test_database_creation() {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path();

    let db = Database::new(db_path).await.unwrap();

    // Verify tables exist
    let mut conn = db.pool.acquire().await.unwrap();

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(&mut *conn)
            .await
            .unwrap();

    assert!(tables.contains(&"articles".to_string()));
    assert!(tables.contains(&"schema_version".to_string()));

    db.close().await;
}

#[tokio::test]
async fn test_schema_version_recorded() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(db.pool())
        .await
        .unwrap();

    assert_eq!(version, Some(1));

    db.close().await;
}

#[tokio::test]
async fn test_url_uniqueness_enforced_by_schema() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    // A raw insert that bypasses ON CONFLICT must hit the UNIQUE constraint
    let insert = r#"
        INSERT INTO articles (title, source, author, published_date, description, url, fetched_at)
        VALUES ('A', 'S', 'X', '2024-01-01 00:00:00+00:00', '', 'https://x/same', '2024-01-01 00:00:00+00:00')
    "#;

    sqlx::query(insert).execute(db.pool()).await.unwrap();
    let second = sqlx::query(insert).execute(db.pool()).await;

    assert!(second.is_err(), "duplicate url must violate UNIQUE(url)");

    db.close().await;
}

#[tokio::test]
async fn test_reopen_is_idempotent() {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path();

    let db = Database::new(db_path).await.unwrap();
    db.close().await;

    // Opening an already-migrated database must not re-apply migrations
    let db = Database::new(db_path).await.unwrap();

    let versions: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_all(db.pool())
        .await
        .unwrap();

    assert_eq!(versions, vec![1], "migration v1 must be recorded exactly once");

    db.close().await;
}

#[tokio::test]
async fn test_creates_missing_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("data").join("news.db");

    let db = Database::new(&db_path).await.unwrap();
    assert!(db_path.exists(), "database file should be created");

    db.close().await;
}
