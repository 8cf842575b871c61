//! Pipeline orchestration
//!
//! Sequences one ingestion run: Fetching → Cleaning → Storing → Retaining →
//! Reporting → Completed, with a terminal Failed state reachable from any
//! stage. The run never panics and always yields a [`RunSummary`]; counters
//! reconcile as fetched = cleaned + rejected and cleaned = inserted + skipped.

use crate::clean::Cleaner;
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::fetch::NewsApiClient;
use crate::report::ReportWriter;
use crate::types::{RunStatus, RunSummary, Stage};
use chrono::Utc;

/// One-shot ingestion pipeline
///
/// Wired from a single immutable [`Config`]; holds no mutable state between
/// runs. The database is opened during the Storing stage so a dry run never
/// touches the filesystem.
pub struct Pipeline {
    config: Config,
    client: NewsApiClient,
    cleaner: Cleaner,
    report: ReportWriter,
}

/// Counters accumulated while the stages execute
#[derive(Default)]
struct RunCounters {
    fetched: usize,
    cleaned: usize,
    rejected: usize,
    inserted: usize,
    skipped: usize,
    deleted: u64,
}

impl Pipeline {
    /// Wire the pipeline components from one configuration snapshot
    ///
    /// # Errors
    /// Fails when the API endpoint is invalid or a cleaning pattern does
    /// not compile.
    pub fn new(config: Config) -> Result<Self> {
        let client = NewsApiClient::new(config.api.clone(), config.retry.clone())?;
        let cleaner = Cleaner::new(config.cleaning.clone())?;
        let report = ReportWriter::new(config.report.clone());

        Ok(Self {
            config,
            client,
            cleaner,
            report,
        })
    }

    /// Execute one run to its terminal state
    ///
    /// Infallible by contract: every error is captured into the summary
    /// together with the stage it occurred in.
    pub async fn run(&self) -> RunSummary {
        let started_at = Utc::now();
        let mut counters = RunCounters::default();

        tracing::info!(dry_run = self.config.dry_run, "Starting pipeline run");

        // Fetching
        let raw = match self.client.fetch().await {
            Ok(raw) => raw,
            Err(e) => return self.failed(started_at, counters, Stage::Fetching, &e),
        };
        counters.fetched = raw.len();

        if raw.is_empty() {
            tracing::warn!("News API returned no articles; nothing to clean or store");
            return self.completed(started_at, counters, None);
        }

        // Cleaning is per-article and infallible at the batch level
        let outcome = self.cleaner.clean_batch(raw, started_at);
        counters.cleaned = outcome.articles.len();
        counters.rejected = outcome.rejected();

        if self.config.dry_run {
            tracing::info!(
                fetched = counters.fetched,
                cleaned = counters.cleaned,
                rejected = counters.rejected,
                "Dry run complete; skipping storage, retention, and report"
            );
            return self.completed(started_at, counters, None);
        }

        // Storing
        let db = match Database::new(&self.config.storage.database_path).await {
            Ok(db) => db,
            Err(e) => return self.failed(started_at, counters, Stage::Storing, &e),
        };

        // The pool is closed on every exit from the persistence stages,
        // failure included
        let result = self
            .persistence_stages(&db, outcome.articles, started_at, &mut counters)
            .await;
        db.close().await;

        match result {
            Ok(report_path) => self.completed(started_at, counters, report_path),
            Err((stage, e)) => self.failed(started_at, counters, stage, &e),
        }
    }

    /// Storing, Retaining, and Reporting against an open database
    ///
    /// Returns the report path on success, or the failing stage with its
    /// error; counters accumulate up to the point of failure either way.
    async fn persistence_stages(
        &self,
        db: &Database,
        articles: Vec<crate::types::Article>,
        started_at: chrono::DateTime<Utc>,
        counters: &mut RunCounters,
    ) -> std::result::Result<Option<std::path::PathBuf>, (Stage, crate::error::Error)> {
        // Storing
        let insert = db
            .insert_articles(&articles)
            .await
            .map_err(|e| (Stage::Storing, e))?;
        counters.inserted = insert.inserted;
        counters.skipped = insert.skipped;

        // Retaining
        counters.deleted = db
            .delete_older_than(self.config.storage.retention_days)
            .await
            .map_err(|e| (Stage::Retaining, e))?;

        // Reporting covers exactly the rows this run ingested
        let rows = db
            .articles_fetched_at(started_at)
            .await
            .map_err(|e| (Stage::Reporting, e))?;
        let path = self
            .report
            .generate(&rows, started_at.date_naive())
            .map_err(|e| (Stage::Reporting, e))?;

        Ok(Some(path))
    }

    fn completed(
        &self,
        started_at: chrono::DateTime<Utc>,
        counters: RunCounters,
        report_path: Option<std::path::PathBuf>,
    ) -> RunSummary {
        let summary = self.summary(
            RunStatus::Completed,
            started_at,
            counters,
            report_path,
            None,
            None,
        );
        tracing::info!(
            fetched = summary.fetched,
            cleaned = summary.cleaned,
            rejected = summary.rejected,
            inserted = summary.inserted,
            skipped = summary.skipped,
            deleted = summary.deleted,
            elapsed_ms = summary.elapsed().num_milliseconds(),
            "Pipeline run completed"
        );
        summary
    }

    fn failed(
        &self,
        started_at: chrono::DateTime<Utc>,
        counters: RunCounters,
        stage: Stage,
        error: &crate::error::Error,
    ) -> RunSummary {
        tracing::error!(stage = %stage, error = %error, "Pipeline run failed");
        self.summary(
            RunStatus::Failed,
            started_at,
            counters,
            None,
            Some(stage),
            Some(error.to_string()),
        )
    }

    fn summary(
        &self,
        status: RunStatus,
        started_at: chrono::DateTime<Utc>,
        counters: RunCounters,
        report_path: Option<std::path::PathBuf>,
        failed_stage: Option<Stage>,
        error: Option<String>,
    ) -> RunSummary {
        RunSummary {
            status,
            started_at,
            finished_at: Utc::now(),
            fetched: counters.fetched,
            cleaned: counters.cleaned,
            rejected: counters.rejected,
            inserted: counters.inserted,
            skipped: counters.skipped,
            deleted: counters.deleted,
            report_path,
            failed_stage,
            error,
            dry_run: self.config.dry_run,
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_endpoint() {
        let mut config = Config::default();
        config.api.endpoint = "not a url".to_string();

        let result = Pipeline::new(config);
        assert!(matches!(
            result,
            Err(crate::error::Error::Config { .. })
        ));
    }

    #[test]
    fn new_wires_components_from_defaults() {
        assert!(Pipeline::new(Config::default()).is_ok());
    }
}
