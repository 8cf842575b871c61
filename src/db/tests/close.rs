use crate::db::*;
use crate::types::Article;
use chrono::Utc;
use tempfile::NamedTempFile;

fn article(url: &str) -> Article {
    Article {
        title: "Headline".to_string(),
        source: "Reuters".to_string(),
        author: "Jane Doe".to_string(),
        description: String::new(),
        url: url.to_string(),
        published_date: Utc::now(),
        fetched_at: Utc::now(),
    }
}

/// Verify that querying the database after closing the pool returns an error
/// rather than hanging or panicking.
#[tokio::test]
async fn test_query_after_pool_close_returns_error() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.insert_article(&article("https://x/1")).await.unwrap();

    // Verify the article exists before closing
    let before = db.article_by_url("https://x/1").await.unwrap();
    assert!(before.is_some(), "article should exist before close");

    // Close the pool (but keep the Database struct alive)
    db.pool().close().await;

    // Querying after close should return an error, not hang or panic
    let result = db.article_by_url("https://x/1").await;
    assert!(
        result.is_err(),
        "article_by_url after pool close should return an error, got: {:?}",
        result
    );
}

/// Verify that inserting after closing the pool returns an error
#[tokio::test]
async fn test_insert_after_pool_close_returns_error() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.pool().close().await;

    let result = db.insert_article(&article("https://x/late")).await;
    assert!(
        result.is_err(),
        "insert_article after pool close should return an error, got: {:?}",
        result
    );
}

/// Verify that the retention sweep after closing the pool returns an error
#[tokio::test]
async fn test_sweep_after_pool_close_returns_error() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.pool().close().await;

    let result = db.delete_older_than(90).await;
    assert!(
        result.is_err(),
        "delete_older_than after pool close should return an error, got: {:?}",
        result
    );
}
