//! News API fetch client.
//!
//! Issues search requests against the news API, classifies failures into
//! [`FetchError`] variants, and retries transient ones with exponential
//! backoff. Auth failures abort immediately; an exhausted retry budget
//! surfaces as [`FetchError::Exhausted`] carrying the last cause.

use crate::config::{NewsApiConfig, RetryConfig};
use crate::error::{Error, FetchError, Result};
use crate::retry::{IsRetryable, fetch_with_retry};
use crate::types::RawArticle;
use chrono::Utc;
use serde::Deserialize;
use url::Url;

/// Response envelope from the news API
///
/// `status` is "ok" on success; on application-level errors the API
/// still responds with `status` "error" plus `code` and `message`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// HTTP client for the news search endpoint
///
/// Holds the parsed endpoint, search parameters, and the retry policy.
/// Construct once per run and call [`fetch`](NewsApiClient::fetch).
#[derive(Debug)]
pub struct NewsApiClient {
    /// HTTP client with the per-request timeout applied
    http_client: reqwest::Client,

    /// Validated search endpoint
    endpoint: Url,

    /// Search parameters and credentials
    config: NewsApiConfig,

    /// Retry policy for transient failures
    retry: RetryConfig,
}

impl NewsApiClient {
    /// Create a new fetch client
    ///
    /// # Errors
    /// Returns a configuration error if the endpoint URL is invalid or the
    /// HTTP client cannot be created.
    pub fn new(config: NewsApiConfig, retry: RetryConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| Error::Config {
            message: format!("Invalid news API endpoint: {}", e),
            key: Some("api.endpoint".to_string()),
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent("news-collector")
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to create HTTP client: {}", e),
                key: None,
            })?;

        if config.api_key.is_empty() || config.api_key == "demo" {
            tracing::warn!("Using demo API key - limited to 100 requests/day");
        }

        Ok(Self {
            http_client,
            endpoint,
            config,
            retry,
        })
    }

    /// Fetch one page of articles matching the configured search
    ///
    /// Transient failures (timeouts, connection errors, 429, 5xx) are
    /// retried per the retry policy; if the budget runs out the last
    /// cause is wrapped in [`FetchError::Exhausted`]. Auth failures and
    /// other permanent errors fail on the first attempt.
    pub async fn fetch(&self) -> Result<Vec<RawArticle>> {
        tracing::info!(query = %self.config.query, "Fetching articles from the news API");

        match fetch_with_retry(&self.retry, || self.attempt()).await {
            Ok(articles) => Ok(articles),
            // A retryable error surviving the retry loop means the budget ran out
            Err(e) if e.is_retryable() => Err(Error::Fetch(FetchError::Exhausted {
                attempts: self.retry.max_attempts + 1,
                source: Box::new(e),
            })),
            Err(e) => Err(Error::Fetch(e)),
        }
    }

    /// One request attempt: build the search URL, classify the response
    /// status, and decode the body
    async fn attempt(&self) -> std::result::Result<Vec<RawArticle>, FetchError> {
        let to_date = Utc::now().date_naive();
        let from_date = to_date - chrono::Duration::days(self.config.days_back);

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &self.config.query)
            .append_pair("sortBy", &self.config.sort_by)
            .append_pair("language", &self.config.language)
            .append_pair("pageSize", &self.config.page_size.to_string())
            .append_pair("from", &from_date.to_string())
            .append_pair("to", &to_date.to_string())
            .append_pair("apiKey", &self.config.api_key);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(classify_request_error)?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                // A bad key will not become valid between attempts
                401 | 403 => FetchError::AuthFailure {
                    status: status.as_u16(),
                },
                // Expected throttling signal, not an error condition
                429 => {
                    tracing::warn!("News API rate limit hit, backing off");
                    FetchError::RateLimited
                }
                s if s >= 500 => FetchError::ServerError { status: s },
                s => FetchError::UnexpectedStatus { status: s },
            });
        }

        let body: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        if body.status != "ok" {
            return Err(FetchError::Api {
                code: body.code.unwrap_or_else(|| "unknown".to_string()),
                message: body
                    .message
                    .unwrap_or_else(|| "no message provided".to_string()),
            });
        }

        tracing::info!(
            count = body.articles.len(),
            total_results = body.total_results,
            "Fetched articles"
        );

        Ok(body.articles)
    }
}

/// Map transport-level reqwest failures onto the fetch error taxonomy
fn classify_request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
