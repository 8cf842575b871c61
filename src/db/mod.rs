//! Database layer for news-collector
//!
//! Handles SQLite persistence for cleaned articles with URL-based
//! duplicate suppression and age-based retention.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`articles`] — Article persistence, queries, and the retention sweep

use chrono::{DateTime, Utc};
use sqlx::{FromRow, sqlite::SqlitePool};

use crate::types::Article;

mod articles;
mod migrations;

/// Article record from the database
///
/// Matches the `articles` table column for column. `id` is assigned by
/// SQLite on insert.
#[derive(Debug, Clone, FromRow)]
pub struct StoredArticle {
    /// Unique database ID
    pub id: i64,
    /// Cleaned headline
    pub title: String,
    /// Publisher name
    pub source: String,
    /// Author byline
    pub author: String,
    /// Publication timestamp (UTC)
    pub published_date: DateTime<Utc>,
    /// Cleaned summary
    pub description: String,
    /// Canonical URL, unique across the table
    pub url: String,
    /// Timestamp of the run that ingested this row (UTC)
    pub fetched_at: DateTime<Utc>,
}

impl From<StoredArticle> for Article {
    fn from(row: StoredArticle) -> Self {
        Article {
            title: row.title,
            source: row.source,
            author: row.author,
            description: row.description,
            url: row.url,
            published_date: row.published_date,
            fetched_at: row.fetched_at,
        }
    }
}

/// Result of inserting a single article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertStatus {
    /// A new row was written
    Inserted,
    /// An article with the same URL already exists; nothing was written
    Skipped,
}

/// Aggregated result of a batch insert
///
/// Duplicates are counted, never errored; `inserted + skipped` equals the
/// batch size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    /// New rows written
    pub inserted: usize,
    /// Articles skipped as duplicates
    pub skipped: usize,
}

/// Database handle for news-collector
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
