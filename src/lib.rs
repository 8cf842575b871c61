//! # news-collector
//!
//! Scheduled news-ingestion pipeline: fetch articles from the News API,
//! clean and validate the untrusted payload, persist deduplicated records
//! to SQLite, and emit a daily CSV report.
//!
//! ## Design Philosophy
//!
//! news-collector is designed to be:
//! - **Batch-sequential** - One run per invocation, stages in a fixed order
//! - **Resilient at the edges** - Retryable fetch, per-article cleaning,
//!   duplicate-tolerant storage; one bad article never aborts a batch
//! - **Explicitly configured** - One immutable [`Config`] snapshot per run,
//!   no process-wide mutable state
//! - **Library-first** - The binary is a thin CLI over the [`Pipeline`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use news_collector::{Config, Pipeline, RunStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::from_env();
//!     config.api.query = "semiconductors".to_string();
//!
//!     let pipeline = Pipeline::new(config)?;
//!     let summary = pipeline.run().await;
//!
//!     assert!(matches!(summary.status, RunStatus::Completed | RunStatus::Failed));
//!     println!("fetched {} articles", summary.fetched);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Article cleaning and validation
pub mod clean;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// News API fetch client
pub mod fetch;
/// Pipeline orchestration
pub mod pipeline;
/// CSV report generation
pub mod report;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types
pub mod types;

// Re-export commonly used types
pub use clean::{CleanOutcome, Cleaner};
pub use config::{
    CleaningConfig, Config, NewsApiConfig, ReportConfig, RetryConfig, StorageConfig,
};
pub use db::{Database, InsertOutcome, InsertStatus, StoredArticle};
pub use error::{CleanRejection, Error, FetchError, Result, StoreError};
pub use fetch::NewsApiClient;
pub use pipeline::Pipeline;
pub use report::{ReportSummary, ReportWriter};
pub use types::{Article, RawArticle, RawSource, RunStatus, RunSummary, Stage};
