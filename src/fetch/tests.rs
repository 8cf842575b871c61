use super::*;
use crate::config::{NewsApiConfig, RetryConfig};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_config(server: &MockServer) -> NewsApiConfig {
    NewsApiConfig {
        endpoint: format!("{}/v2/everything", server.uri()),
        api_key: "test-key".to_string(),
        ..NewsApiConfig::default()
    }
}

fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_delay: Duration::from_millis(50),
        max_delay: Duration::from_secs(1),
        backoff_multiplier: 2.0,
        jitter: false,
    }
}

fn ok_body(articles: serde_json::Value) -> serde_json::Value {
    json!({
        "status": "ok",
        "totalResults": articles.as_array().map(|a| a.len()).unwrap_or(0),
        "articles": articles,
    })
}

#[tokio::test]
async fn fetch_sends_search_parameters_and_decodes_articles() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "market OR finance OR business"))
        .and(query_param("language", "en"))
        .and(query_param("sortBy", "publishedAt"))
        .and(query_param("pageSize", "100"))
        .and(query_param("apiKey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!([
            {
                "source": {"id": null, "name": "Reuters"},
                "author": "Jane Doe",
                "title": "Markets rally",
                "description": "Stocks rose.",
                "url": "https://x/1",
                "publishedAt": "2024-12-15T10:30:00Z"
            },
            {
                "title": null,
                "url": "https://x/2"
            }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::new(api_config(&server), fast_retry(3)).unwrap();
    let articles = client.fetch().await.unwrap();

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].title.as_deref(), Some("Markets rally"));
    assert_eq!(
        articles[0].source.as_ref().and_then(|s| s.name.as_deref()),
        Some("Reuters")
    );
    // Malformed sibling fields decode as absent rather than failing the batch
    assert!(articles[1].title.is_none());
}

#[tokio::test]
async fn fetch_retries_through_consecutive_503s_with_backoff() {
    let server = MockServer::start().await;

    // Two 503s, then success; mounted mocks match in order and the first
    // stops matching once spent
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!([
            {"title": "Back up", "url": "https://x/1"}
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::new(api_config(&server), fast_retry(3)).unwrap();

    let start = std::time::Instant::now();
    let articles = client.fetch().await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title.as_deref(), Some("Back up"));
    // Backoff floor: initial_delay + initial_delay * 2
    assert!(
        elapsed >= Duration::from_millis(150),
        "expected at least 150ms of backoff, got {elapsed:?}"
    );
}

#[tokio::test]
async fn fetch_fails_immediately_on_401_with_zero_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::new(api_config(&server), fast_retry(3)).unwrap();
    let err = client.fetch().await.unwrap_err();

    assert!(
        matches!(
            err,
            Error::Fetch(FetchError::AuthFailure { status: 401 })
        ),
        "got {err:?}"
    );
    // expect(1) on the mock verifies no retry was attempted
}

#[tokio::test]
async fn fetch_treats_403_as_auth_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::new(api_config(&server), fast_retry(3)).unwrap();
    let err = client.fetch().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Fetch(FetchError::AuthFailure { status: 403 })
    ));
}

#[tokio::test]
async fn fetch_retries_rate_limiting_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::new(api_config(&server), fast_retry(3)).unwrap();
    let articles = client.fetch().await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn fetch_wraps_exhausted_budget_with_last_cause() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = NewsApiClient::new(api_config(&server), fast_retry(2)).unwrap();
    let err = client.fetch().await.unwrap_err();

    match err {
        Error::Fetch(FetchError::Exhausted { attempts, source }) => {
            assert_eq!(attempts, 3, "initial call plus two retries");
            assert!(
                matches!(*source, FetchError::ServerError { status: 503 }),
                "got {source:?}"
            );
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_surfaces_api_level_error_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "code": "parameterInvalid",
            "message": "The from date is too far in the past"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::new(api_config(&server), fast_retry(3)).unwrap();
    let err = client.fetch().await.unwrap_err();

    match err {
        Error::Fetch(FetchError::Api { code, message }) => {
            assert_eq!(code, "parameterInvalid");
            assert!(message.contains("too far in the past"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_times_out_slow_responses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_body(json!([])))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = NewsApiConfig {
        request_timeout: Duration::from_millis(100),
        ..api_config(&server)
    };
    let client = NewsApiClient::new(config, fast_retry(0)).unwrap();
    let err = client.fetch().await.unwrap_err();

    // max_attempts = 0, so the timeout surfaces as Exhausted after one call
    assert!(
        matches!(
            &err,
            Error::Fetch(FetchError::Exhausted { attempts: 1, source })
                if matches!(**source, FetchError::Timeout)
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn fetch_rejects_undecodable_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::new(api_config(&server), fast_retry(3)).unwrap();
    let err = client.fetch().await.unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::Decode(_))));
}

#[test]
fn new_rejects_invalid_endpoint_url() {
    let config = NewsApiConfig {
        endpoint: "://missing-scheme".to_string(),
        ..NewsApiConfig::default()
    };

    let err = NewsApiClient::new(config, RetryConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}
