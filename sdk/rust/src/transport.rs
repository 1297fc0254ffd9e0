//! HTTP transport for the GitHub client.
//!
//! Handles HTTP communication with per-request timeouts, an explicit retry
//! policy and error response parsing.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use rand::thread_rng;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, GitHubError};

/// User agent sent with every request. GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("commit-tally/", env!("CARGO_PKG_VERSION"));

/// Media type for REST API calls.
pub const GITHUB_JSON: &str = "application/vnd.github+json";

/// Media type for OAuth endpoint calls.
pub const PLAIN_JSON: &str = "application/json";

/// Configuration for automatic retry behavior.
///
/// The default performs no retries: a failed call is reported to the caller
/// immediately.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base backoff factor for exponential backoff
    pub backoff_factor: f64,
    /// Status codes that trigger retry
    pub retry_on: Vec<u16>,
    /// Whether to respect Retry-After header
    pub respect_retry_after: bool,
    /// Maximum backoff time in seconds
    pub max_backoff: f64,
    /// Jitter factor (0.1 = ±10%)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff_factor: 2.0,
            retry_on: vec![429, 500, 502, 503],
            respect_retry_after: true,
            max_backoff: 60.0,
            jitter: 0.1,
        }
    }
}

impl RetryConfig {
    /// Retry policy with `max_retries` attempts and the given backoff base.
    #[must_use]
    pub fn with_attempts(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor,
            ..Self::default()
        }
    }
}

/// HTTP transport bound to one base URL.
///
/// Handles:
/// - Bearer authentication
/// - Exponential backoff with jitter for retries
/// - Retry-After and rate limit headers
/// - Error response parsing into typed errors
pub struct HttpTransport {
    base_url: String,
    client: Client,
    retry_config: RetryConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for requests (e.g., "<https://api.github.com>")
    /// * `accept` - Value of the `Accept` header sent with every request
    /// * `timeout` - Per-request timeout, covering connect and body
    /// * `retry_config` - Configuration for retry behavior
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        base_url: &str,
        accept: &str,
        timeout: Duration,
        retry_config: Option<RetryConfig>,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(accept)
                .map_err(|e| Error::Configuration(format!("Invalid Accept header: {e}")))?,
        );

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry_config: retry_config.unwrap_or_default(),
        })
    }

    /// GET a JSON resource.
    ///
    /// # Arguments
    ///
    /// * `path` - API path (e.g., "/user/repos")
    /// * `params` - Query parameters
    /// * `token` - Bearer token, if the endpoint needs one
    ///
    /// # Errors
    ///
    /// Returns a `GitHubError` on API errors, `Timeout` on expiry and
    /// `Serialization` if the body does not decode into `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&[(&str, &str)]>,
        token: Option<&str>,
    ) -> Result<T, Error> {
        self.execute_with_retry(|| async {
            let url = format!("{}{}", self.base_url, path);
            let mut request = self.client.get(&url);

            if let Some(p) = params {
                request = request.query(p);
            }

            send(authorize(request, token)).await
        })
        .await
    }

    /// POST a JSON body and decode the JSON answer.
    ///
    /// # Errors
    ///
    /// Returns a `GitHubError` on API errors.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        token: Option<&str>,
    ) -> Result<T, Error> {
        self.execute_with_retry(|| async {
            let url = format!("{}{}", self.base_url, path);
            let request = self
                .client
                .post(&url)
                .header("Content-Type", "application/json")
                .json(body);

            send(authorize(request, token)).await
        })
        .await
    }

    /// Execute a request with automatic retry on retryable errors.
    async fn execute_with_retry<F, Fut, T>(&self, request_fn: F) -> Result<T, Error>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<Response, Error>>,
        T: DeserializeOwned,
    {
        let mut last_error: Option<Error> = None;

        for attempt in 0..=self.retry_config.max_retries {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
                        return Ok(serde_json::from_slice(&bytes)?);
                    }

                    let error = parse_error_response(response).await;

                    // 403 rate limits are only known after parsing the headers
                    let effective_status = match &error {
                        GitHubError::RateLimited { .. } => 429,
                        _ => status.as_u16(),
                    };

                    if !self.should_retry(effective_status, attempt) {
                        return Err(Error::GitHub(error));
                    }

                    let wait_time = self.get_backoff_time(attempt, error.retry_after());
                    debug!(
                        "Retrying after HTTP {} (attempt {}), waiting {:.1}s",
                        status.as_u16(),
                        attempt + 1,
                        wait_time
                    );
                    last_error = Some(Error::GitHub(error));
                    tokio::time::sleep(Duration::from_secs_f64(wait_time)).await;
                }
                Err(e) => {
                    // Network errors are retryable
                    if attempt >= self.retry_config.max_retries {
                        return Err(e);
                    }

                    debug!("Retrying after transport error (attempt {}): {}", attempt + 1, e);
                    last_error = Some(e);
                    let wait_time = self.get_backoff_time(attempt, None);
                    tokio::time::sleep(Duration::from_secs_f64(wait_time)).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::Http("Request failed after maximum retries".to_string())
        }))
    }

    /// Determine if a request should be retried.
    fn should_retry(&self, status_code: u16, attempt: u32) -> bool {
        if attempt >= self.retry_config.max_retries {
            return false;
        }

        self.retry_config.retry_on.contains(&status_code)
    }

    /// Calculate backoff time for retry.
    ///
    /// Uses exponential backoff with jitter, respecting Retry-After header
    /// if present.
    fn get_backoff_time(&self, attempt: u32, retry_after: Option<u32>) -> f64 {
        if let Some(ra) = retry_after {
            if self.retry_config.respect_retry_after {
                return f64::from(ra).min(self.retry_config.max_backoff);
            }
        }

        // Exponential backoff: backoff_factor ^ attempt, capped before jitter
        let max_backoff = self.retry_config.max_backoff.max(0.0);
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base_wait = self.retry_config.backoff_factor.powi(exponent);
        let base_wait = if base_wait.is_finite() {
            base_wait.clamp(0.0, max_backoff)
        } else {
            max_backoff
        };

        let jitter_range = base_wait * self.retry_config.jitter;
        let wait_time = if jitter_range.is_finite() && jitter_range > 0.0 {
            let mut rng = thread_rng();
            let jitter = rng.gen_range(-jitter_range..jitter_range);
            base_wait + jitter
        } else {
            base_wait
        };

        wait_time.clamp(0.0, max_backoff)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the retry policy.
    #[must_use]
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(t) => request.bearer_auth(t),
        None => request,
    }
}

async fn send(request: RequestBuilder) -> Result<Response, Error> {
    request.send().await.map_err(map_reqwest_error)
}

fn map_reqwest_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Seconds until the rate limit window resets, from `x-ratelimit-reset`.
fn seconds_until_reset(reset_epoch: i64) -> u32 {
    let remaining = reset_epoch - Utc::now().timestamp();
    u32::try_from(remaining.max(0)).unwrap_or(u32::MAX)
}

/// Parse an error response into a typed error.
async fn parse_error_response(response: Response) -> GitHubError {
    let status = response.status();
    let headers = response.headers();

    let retry_after = headers
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok());
    let quota_exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|s| s.trim() == "0");
    let reset_in = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .map(seconds_until_reset);

    let data: Value = response.json().await.unwrap_or_else(|_| serde_json::json!({}));

    classify(status, &data, retry_after, quota_exhausted, reset_in)
}

fn classify(
    status: StatusCode,
    data: &Value,
    retry_after: Option<u32>,
    quota_exhausted: bool,
    reset_in: Option<u32>,
) -> GitHubError {
    let message = data
        .get("message")
        .and_then(|v| v.as_str())
        .map(String::from)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    let documentation_url = data
        .get("documentation_url")
        .and_then(|v| v.as_str())
        .map(String::from);

    let secondary_limit = status == StatusCode::FORBIDDEN
        && (retry_after.is_some() || message.to_lowercase().contains("rate limit"));

    match status {
        StatusCode::TOO_MANY_REQUESTS => GitHubError::RateLimited {
            status: status.as_u16(),
            message,
            retry_after: retry_after.or(reset_in).unwrap_or(60),
            documentation_url,
        },
        StatusCode::FORBIDDEN if quota_exhausted || secondary_limit => GitHubError::RateLimited {
            status: status.as_u16(),
            message,
            retry_after: retry_after.or(reset_in).unwrap_or(60),
            documentation_url,
        },
        StatusCode::UNAUTHORIZED => GitHubError::Authentication {
            message,
            documentation_url,
        },
        StatusCode::FORBIDDEN => GitHubError::Authorization {
            message,
            documentation_url,
        },
        StatusCode::NOT_FOUND => GitHubError::NotFound {
            message,
            documentation_url,
        },
        StatusCode::CONFLICT => GitHubError::Conflict {
            message,
            documentation_url,
        },
        s if s.is_server_error() => GitHubError::Server {
            status: s.as_u16(),
            message,
            documentation_url,
        },
        s => GitHubError::Validation {
            status: s.as_u16(),
            message,
            documentation_url,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retry_config_default_never_retries() {
        let config = RetryConfig::default();

        assert_eq!(config.max_retries, 0);
        assert!((config.backoff_factor - 2.0).abs() < f64::EPSILON);
        assert!(config.retry_on.contains(&429));
        assert!(config.retry_on.contains(&500));
        assert!(config.retry_on.contains(&502));
        assert!(config.retry_on.contains(&503));

        let transport = create_test_transport(config);
        assert!(!transport.should_retry(429, 0));
        assert!(!transport.should_retry(500, 0));
    }

    #[test]
    fn test_should_retry() {
        let transport = create_test_transport(RetryConfig::with_attempts(3, 2.0));

        assert!(transport.should_retry(429, 0));
        assert!(transport.should_retry(429, 2));
        assert!(!transport.should_retry(429, 3)); // Max retries reached

        assert!(transport.should_retry(500, 0));
        assert!(transport.should_retry(502, 0));
        assert!(transport.should_retry(503, 0));

        assert!(!transport.should_retry(400, 0));
        assert!(!transport.should_retry(401, 0));
        assert!(!transport.should_retry(404, 0));
        assert!(!transport.should_retry(409, 0));
    }

    #[test]
    fn test_backoff_time_exponential() {
        let config = RetryConfig {
            backoff_factor: 2.0,
            jitter: 0.0,
            max_backoff: 60.0,
            ..RetryConfig::with_attempts(4, 2.0)
        };
        let transport = create_test_transport(config);

        assert!((transport.get_backoff_time(0, None) - 1.0).abs() < 0.01);
        assert!((transport.get_backoff_time(1, None) - 2.0).abs() < 0.01);
        assert!((transport.get_backoff_time(2, None) - 4.0).abs() < 0.01);
        assert!((transport.get_backoff_time(3, None) - 8.0).abs() < 0.01);
    }

    #[test]
    fn test_backoff_time_respects_retry_after() {
        let transport = create_test_transport(RetryConfig::default());

        assert!((transport.get_backoff_time(0, Some(30)) - 30.0).abs() < 0.01);
        // Capped by max_backoff
        assert!((transport.get_backoff_time(0, Some(3600)) - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_backoff_time_capped_at_max() {
        let config = RetryConfig {
            backoff_factor: 10.0,
            jitter: 0.0,
            max_backoff: 30.0,
            ..Default::default()
        };
        let transport = create_test_transport(config);

        assert!((transport.get_backoff_time(3, None) - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_backoff_time_zero_factor() {
        let transport = create_test_transport(RetryConfig::with_attempts(3, 0.0));

        assert!((transport.get_backoff_time(0, None) - 1.0).abs() <= 0.1 + 0.01);
        assert!(transport.get_backoff_time(1, None).abs() < 0.01);
        assert!(transport.get_backoff_time(2, None).abs() < 0.01);
    }

    #[test]
    fn test_backoff_time_huge_factor_stays_capped() {
        let transport = create_test_transport(RetryConfig::with_attempts(3, 1e200));

        for attempt in 0..4 {
            let wait = transport.get_backoff_time(attempt, None);
            assert!(wait.is_finite());
            assert!((0.0..=60.0).contains(&wait), "attempt {attempt} waited {wait}");
        }
        // Jitter applies around the cap, not around the overflowed value
        assert!(transport.get_backoff_time(2, None) >= 60.0 * 0.9 - 0.01);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = create_test_transport(RetryConfig::default());
        assert_eq!(transport.base_url(), "https://api.github.com");
    }

    #[test]
    fn test_classify_empty_repository() {
        let body = json!({
            "message": "Git Repository is empty.",
            "documentation_url": "https://docs.github.com/rest/commits/commits#list-commits"
        });

        let error = classify(StatusCode::CONFLICT, &body, None, false, None);
        assert!(error.is_empty_repository());
        assert_eq!(
            error.documentation_url(),
            Some("https://docs.github.com/rest/commits/commits#list-commits")
        );
    }

    #[test]
    fn test_classify_primary_rate_limit() {
        let body = json!({ "message": "API rate limit exceeded for user ID 1." });

        let error = classify(StatusCode::FORBIDDEN, &body, None, true, Some(120));
        assert!(error.is_rate_limited());
        assert_eq!(error.retry_after(), Some(120));
        assert_eq!(error.status(), 403);
    }

    #[test]
    fn test_classify_plain_forbidden() {
        let body = json!({ "message": "Resource not accessible by integration" });

        let error = classify(StatusCode::FORBIDDEN, &body, None, false, None);
        assert!(matches!(error, GitHubError::Authorization { .. }));
    }

    #[test]
    fn test_classify_server_error_without_body() {
        let error = classify(StatusCode::BAD_GATEWAY, &json!({}), None, false, None);

        assert!(matches!(error, GitHubError::Server { status: 502, .. }));
        assert_eq!(error.message(), "HTTP 502");
    }

    #[test]
    fn test_classify_too_many_requests_defaults_retry_after() {
        let error = classify(StatusCode::TOO_MANY_REQUESTS, &json!({}), None, false, None);
        assert_eq!(error.retry_after(), Some(60));
    }

    fn create_test_transport(config: RetryConfig) -> HttpTransport {
        HttpTransport::new(
            "https://api.github.com/",
            GITHUB_JSON,
            Duration::from_secs(30),
            Some(config),
        )
        .expect("transport creation should succeed")
    }
}
