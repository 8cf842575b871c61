//! Configuration types for news-collector

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Top-level configuration
///
/// Assembled once at startup and passed by reference into each component's
/// constructor. There is no process-wide mutable state; a run sees one
/// immutable snapshot of its settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// News API access and search parameters
    #[serde(default)]
    pub api: NewsApiConfig,

    /// Retry policy for transient fetch failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Field-level cleaning limits and defaults
    #[serde(default)]
    pub cleaning: CleaningConfig,

    /// Database location and retention policy
    #[serde(default)]
    pub storage: StorageConfig,

    /// CSV report output
    #[serde(default)]
    pub report: ReportConfig,

    /// Fetch and clean only; skip storing, retention, and reporting
    #[serde(default)]
    pub dry_run: bool,
}

impl Config {
    /// Build a config from defaults overlaid with environment variables
    ///
    /// Recognized variables: `NEWS_API_KEY`, `SEARCH_QUERY`, `DRY_RUN`
    /// ("true", case-insensitive, enables dry-run). Everything else keeps
    /// its default and can be overridden by the caller afterwards.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("NEWS_API_KEY")
            && !key.trim().is_empty()
        {
            config.api.api_key = key;
        }

        if let Ok(query) = std::env::var("SEARCH_QUERY")
            && !query.trim().is_empty()
        {
            config.api.query = query;
        }

        if let Ok(dry_run) = std::env::var("DRY_RUN") {
            config.dry_run = dry_run.eq_ignore_ascii_case("true");
        }

        config
    }
}

/// News API access and search configuration
///
/// Defaults target NewsAPI.org's `/v2/everything` endpoint with a broad
/// market/finance query. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewsApiConfig {
    /// Search endpoint URL (default: NewsAPI /v2/everything)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key sent as the `apiKey` query parameter
    ///
    /// The "demo" key works for smoke tests but is limited to 100
    /// requests per day.
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Search query string (default: "market OR finance OR business")
    #[serde(default = "default_query")]
    pub query: String,

    /// Sort order understood by the API (default: "publishedAt")
    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    /// ISO 639-1 language filter (default: "en")
    #[serde(default = "default_language")]
    pub language: String,

    /// Articles per request; the API caps this at 100 (default: 100)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// How many days back the from/to search window reaches (default: 7)
    #[serde(default = "default_days_back")]
    pub days_back: i64,

    /// Per-request timeout (default: 15 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: default_api_key(),
            query: default_query(),
            sort_by: default_sort_by(),
            language: default_language(),
            page_size: default_page_size(),
            days_back: default_days_back(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Retry configuration for transient fetch failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial call (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before the first retry (default: 2 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Field-level cleaning limits and defaults
///
/// Length caps count characters, not bytes, so multi-byte text truncates
/// on a character boundary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Maximum title length in characters (default: 500)
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,

    /// Maximum author length in characters (default: 200)
    #[serde(default = "default_max_author_length")]
    pub max_author_length: usize,

    /// Maximum description length in characters (default: 5000)
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,

    /// Sentinel substituted for missing/empty authors and sources
    /// (default: "Unknown")
    #[serde(default = "default_author")]
    pub default_author: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            max_title_length: default_max_title_length(),
            max_author_length: default_max_author_length(),
            max_description_length: default_max_description_length(),
            default_author: default_author(),
        }
    }
}

/// Database location and retention policy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path (default: "data/news.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Articles with a published date older than this many days are
    /// removed by the retention sweep (default: 90)
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            retention_days: default_retention_days(),
        }
    }
}

/// CSV report output configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory the CSV artifacts are written to (default: "data/reports")
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Report filename prefix; files are named `{prefix}_{YYYY_MM_DD}.csv`
    /// (default: "news")
    #[serde(default = "default_report_prefix")]
    pub file_prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            reports_dir: default_reports_dir(),
            file_prefix: default_report_prefix(),
        }
    }
}

// Default value functions
fn default_endpoint() -> String {
    "https://newsapi.org/v2/everything".to_string()
}

fn default_api_key() -> String {
    "demo".to_string()
}

fn default_query() -> String {
    "market OR finance OR business".to_string()
}

fn default_sort_by() -> String {
    "publishedAt".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_days_back() -> i64 {
    7
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_title_length() -> usize {
    500
}

fn default_max_author_length() -> usize {
    200
}

fn default_max_description_length() -> usize {
    5000
}

fn default_author() -> String {
    "Unknown".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/news.db")
}

fn default_retention_days() -> i64 {
    90
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("data/reports")
}

fn default_report_prefix() -> String {
    "news".to_string()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
