//! Core types for news-collector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An article exactly as the News API returned it
///
/// Every field is optional because the upstream feed omits, nulls, or
/// blanks them freely. Decoding happens once at the API boundary; the
/// cleaning stage turns this into an [`Article`] or rejects it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    /// Publisher info, itself with an optional name
    #[serde(default)]
    pub source: Option<RawSource>,

    /// Author byline
    #[serde(default)]
    pub author: Option<String>,

    /// Headline
    #[serde(default)]
    pub title: Option<String>,

    /// Summary or excerpt
    #[serde(default)]
    pub description: Option<String>,

    /// Canonical article URL
    #[serde(default)]
    pub url: Option<String>,

    /// Publication timestamp (`publishedAt` on the wire)
    ///
    /// Kept as the raw string: the feed occasionally ships malformed
    /// values and one bad timestamp must not fail the whole response
    /// decode. The cleaning stage parses it.
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Publisher block nested inside a raw article
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawSource {
    /// Upstream source identifier, often null
    #[serde(default)]
    pub id: Option<String>,

    /// Human-readable publisher name
    #[serde(default)]
    pub name: Option<String>,
}

/// A cleaned, validated article ready for persistence
///
/// All text fields are sanitized and within their length limits; `title`
/// and `url` are guaranteed non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Article {
    /// Cleaned headline, never empty
    pub title: String,

    /// Publisher name, or the configured default when missing
    pub source: String,

    /// Author byline, or the configured default when missing
    pub author: String,

    /// Cleaned summary, possibly empty
    pub description: String,

    /// Canonical URL, never empty; the deduplication key
    pub url: String,

    /// Publication timestamp; falls back to fetch time when the feed
    /// omitted it
    pub published_date: DateTime<Utc>,

    /// When this pipeline run retrieved the article
    pub fetched_at: DateTime<Utc>,
}

/// Pipeline stages, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Calling the News API
    Fetching,
    /// Cleaning and validating raw articles
    Cleaning,
    /// Inserting into the database
    Storing,
    /// Deleting articles past the retention window
    Retaining,
    /// Writing the CSV report
    Reporting,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Fetching => "fetching",
            Self::Cleaning => "cleaning",
            Self::Storing => "storing",
            Self::Retaining => "retaining",
            Self::Reporting => "reporting",
        };
        write!(f, "{name}")
    }
}

/// Terminal status of a pipeline run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// All stages finished; an empty fetch still completes
    Completed,
    /// A stage failed and the run stopped there
    Failed,
}

/// Outcome of one pipeline run
///
/// Counters cover every stage that executed; stages after a failure
/// report zero. The summary is what the binary prints and what callers
/// embedding the pipeline get back.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    /// Whether the run completed or failed
    pub status: RunStatus,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished or failed
    pub finished_at: DateTime<Utc>,

    /// Articles the API returned
    pub fetched: usize,

    /// Articles that survived cleaning
    pub cleaned: usize,

    /// Articles rejected during cleaning (missing title or URL)
    pub rejected: usize,

    /// New rows written to the database
    pub inserted: usize,

    /// Articles skipped as duplicates of stored rows
    pub skipped: usize,

    /// Rows removed by the retention sweep
    pub deleted: u64,

    /// Path of the CSV report, when one was written
    pub report_path: Option<PathBuf>,

    /// The stage that failed, for failed runs
    pub failed_stage: Option<Stage>,

    /// Error description, for failed runs
    pub error: Option<String>,

    /// Whether this was a dry run (no storage, retention, or report)
    pub dry_run: bool,
}

impl RunSummary {
    /// Duration of the run
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_article_decodes_camel_case_published_at() {
        let json = r#"{
            "source": {"id": null, "name": "Reuters"},
            "author": "Jane Doe",
            "title": "Markets rally",
            "description": "Stocks rose.",
            "url": "https://example.com/a",
            "publishedAt": "2024-12-15T10:30:00Z"
        }"#;

        let raw: RawArticle = serde_json::from_str(json).expect("decode failed");
        assert_eq!(raw.title.as_deref(), Some("Markets rally"));
        assert_eq!(
            raw.source.and_then(|s| s.name).as_deref(),
            Some("Reuters")
        );
        assert_eq!(raw.published_at.as_deref(), Some("2024-12-15T10:30:00Z"));
    }

    #[test]
    fn raw_article_tolerates_nulls_and_missing_fields() {
        let json = r#"{"title": null, "url": "https://example.com/b"}"#;

        let raw: RawArticle = serde_json::from_str(json).expect("decode failed");
        assert!(raw.title.is_none());
        assert!(raw.author.is_none());
        assert!(raw.source.is_none());
        assert!(raw.published_at.is_none());
        assert_eq!(raw.url.as_deref(), Some("https://example.com/b"));
    }

    #[test]
    fn raw_article_survives_malformed_timestamp() {
        // Timestamps stay raw strings at the decode boundary so garbage
        // degrades a single article later instead of failing the batch
        let json = r#"{"publishedAt": "yesterday-ish"}"#;
        let raw: RawArticle = serde_json::from_str(json).expect("decode failed");
        assert_eq!(raw.published_at.as_deref(), Some("yesterday-ish"));
    }

    #[test]
    fn stage_displays_lowercase_names() {
        assert_eq!(Stage::Fetching.to_string(), "fetching");
        assert_eq!(Stage::Reporting.to_string(), "reporting");
    }

    #[test]
    fn run_summary_elapsed_spans_start_to_finish() {
        let started_at = Utc::now();
        let summary = RunSummary {
            status: RunStatus::Completed,
            started_at,
            finished_at: started_at + chrono::Duration::seconds(42),
            fetched: 10,
            cleaned: 9,
            rejected: 1,
            inserted: 8,
            skipped: 1,
            deleted: 0,
            report_path: None,
            failed_stage: None,
            error: None,
            dry_run: false,
        };

        assert_eq!(summary.elapsed(), chrono::Duration::seconds(42));
    }
}
