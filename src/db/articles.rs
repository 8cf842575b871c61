//! Article persistence, queries, and the retention sweep.

use crate::error::StoreError;
use crate::types::Article;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};

use super::{Database, InsertOutcome, InsertStatus, StoredArticle};

impl Database {
    /// Insert a single article, skipping silently when its URL is already stored
    ///
    /// `ON CONFLICT(url) DO NOTHING` makes the duplicate check and the
    /// insert one atomic statement; a duplicate reports zero affected rows.
    pub async fn insert_article(&self, article: &Article) -> Result<InsertStatus> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles (
                title, source, author, published_date, description, url, fetched_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(&article.title)
        .bind(&article.source)
        .bind(&article.author)
        .bind(article.published_date)
        .bind(&article.description)
        .bind(&article.url)
        .bind(article.fetched_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Store(StoreError::WriteFailure(format!(
                "Failed to insert article: {}",
                e
            )))
        })?;

        if result.rows_affected() == 0 {
            Ok(InsertStatus::Skipped)
        } else {
            Ok(InsertStatus::Inserted)
        }
    }

    /// Insert a batch of articles, counting inserts and duplicate skips
    ///
    /// Each article is its own statement, so rows committed before a
    /// failure stay committed; the failure itself propagates.
    pub async fn insert_articles(&self, articles: &[Article]) -> Result<InsertOutcome> {
        let mut outcome = InsertOutcome::default();

        for article in articles {
            match self.insert_article(article).await? {
                InsertStatus::Inserted => outcome.inserted += 1,
                InsertStatus::Skipped => {
                    tracing::debug!(url = %article.url, "Skipping duplicate article");
                    outcome.skipped += 1;
                }
            }
        }

        tracing::info!(
            inserted = outcome.inserted,
            skipped = outcome.skipped,
            "Stored article batch"
        );

        Ok(outcome)
    }

    /// Check whether an article with this URL is already stored
    pub async fn article_exists(&self, url: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Store(StoreError::QueryFailed(format!(
                    "Failed to check article existence: {}",
                    e
                )))
            })?;

        Ok(count > 0)
    }

    /// Get an article by its URL
    pub async fn article_by_url(&self, url: &str) -> Result<Option<StoredArticle>> {
        let row = sqlx::query_as::<_, StoredArticle>(
            r#"
            SELECT id, title, source, author, published_date, description, url, fetched_at
            FROM articles
            WHERE url = ?
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Store(StoreError::QueryFailed(format!(
                "Failed to get article: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// Get total stored article count
    pub async fn count_articles(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Store(StoreError::QueryFailed(format!(
                    "Failed to count articles: {}",
                    e
                )))
            })?;

        Ok(count)
    }

    /// Get all stored articles, newest publication first
    pub async fn all_articles(&self, limit: Option<i64>) -> Result<Vec<StoredArticle>> {
        let rows = match limit {
            Some(limit) => {
                sqlx::query_as::<_, StoredArticle>(
                    r#"
                    SELECT id, title, source, author, published_date, description, url, fetched_at
                    FROM articles
                    ORDER BY published_date DESC
                    LIMIT ?
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, StoredArticle>(
                    r#"
                    SELECT id, title, source, author, published_date, description, url, fetched_at
                    FROM articles
                    ORDER BY published_date DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| {
            Error::Store(StoreError::QueryFailed(format!(
                "Failed to get articles: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Get all articles from one publisher, newest publication first
    pub async fn articles_by_source(&self, source: &str) -> Result<Vec<StoredArticle>> {
        let rows = sqlx::query_as::<_, StoredArticle>(
            r#"
            SELECT id, title, source, author, published_date, description, url, fetched_at
            FROM articles
            WHERE source = ?
            ORDER BY published_date DESC
            "#,
        )
        .bind(source)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Store(StoreError::QueryFailed(format!(
                "Failed to get articles by source: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Get the articles ingested by one run, identified by its shared
    /// fetch timestamp
    pub async fn articles_fetched_at(
        &self,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<StoredArticle>> {
        let rows = sqlx::query_as::<_, StoredArticle>(
            r#"
            SELECT id, title, source, author, published_date, description, url, fetched_at
            FROM articles
            WHERE fetched_at = ?
            ORDER BY published_date DESC
            "#,
        )
        .bind(fetched_at)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Store(StoreError::QueryFailed(format!(
                "Failed to get articles for run: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Delete articles published more than `days` days ago
    ///
    /// The cutoff is computed here and bound as a parameter, so the
    /// comparison happens against one consistent "now".
    pub async fn delete_older_than(&self, days: i64) -> Result<u64> {
        let cutoff = Utc::now() - Duration::days(days);

        let result = sqlx::query("DELETE FROM articles WHERE published_date < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Store(StoreError::QueryFailed(format!(
                    "Failed to delete old articles: {}",
                    e
                )))
            })?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            tracing::info!(deleted = deleted, days = days, "Retention sweep removed articles");
        }

        Ok(deleted)
    }
}
