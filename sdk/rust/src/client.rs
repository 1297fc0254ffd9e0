//! GitHub client.
//!
//! Bundles the resource clients over two transports: one for the REST API
//! and one for the OAuth web flow, which lives on a different host.

use std::sync::Arc;
use std::time::Duration;

use crate::clients::{CommitsClient, OAuthClient, ReposClient, UsersClient};
use crate::error::Error;
use crate::transport::{GITHUB_JSON, HttpTransport, PLAIN_JSON, RetryConfig};

/// Default base URL for the REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default base URL for the OAuth web flow.
pub const DEFAULT_OAUTH_URL: &str = "https://github.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Main client for the GitHub endpoints commit-tally uses.
///
/// # Example
///
/// ```rust,ignore
/// use tally_github::GitHubClient;
///
/// let client = GitHubClient::new(None, None, None, None)?;
/// let token = client.oauth().exchange_code(&id, &secret, &code).await?;
/// let me = client.users().authenticated(&token.access_token).await?;
/// ```
pub struct GitHubClient {
    api_transport: Arc<HttpTransport>,
    oauth: OAuthClient,
    users: UsersClient,
    repos: ReposClient,
    commits: CommitsClient,
}

impl GitHubClient {
    /// Create a new GitHub client.
    ///
    /// # Arguments
    ///
    /// * `api_url` - REST base URL (default: <https://api.github.com>)
    /// * `oauth_url` - OAuth base URL (default: <https://github.com>)
    /// * `timeout` - Request timeout (default: 30 seconds)
    /// * `retry_config` - Retry policy for REST calls (default: no retries)
    ///
    /// The token exchange is never retried: authorization codes are single use.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP transport cannot be created.
    pub fn new(
        api_url: Option<&str>,
        oauth_url: Option<&str>,
        timeout: Option<Duration>,
        retry_config: Option<RetryConfig>,
    ) -> Result<Self, Error> {
        let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let api_transport = Arc::new(HttpTransport::new(
            api_url.unwrap_or(DEFAULT_API_URL),
            GITHUB_JSON,
            timeout,
            retry_config,
        )?);
        let oauth_transport = Arc::new(HttpTransport::new(
            oauth_url.unwrap_or(DEFAULT_OAUTH_URL),
            PLAIN_JSON,
            timeout,
            None,
        )?);

        Ok(Self {
            oauth: OAuthClient::new(oauth_transport),
            users: UsersClient::new(Arc::clone(&api_transport)),
            repos: ReposClient::new(Arc::clone(&api_transport)),
            commits: CommitsClient::new(Arc::clone(&api_transport)),
            api_transport,
        })
    }

    /// Get the REST transport (for advanced use cases).
    #[must_use]
    pub fn transport(&self) -> &Arc<HttpTransport> {
        &self.api_transport
    }

    /// Get the OAuth client.
    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    /// Get the users client.
    #[must_use]
    pub fn users(&self) -> &UsersClient {
        &self.users
    }

    /// Get the repos client.
    #[must_use]
    pub fn repos(&self) -> &ReposClient {
        &self.repos
    }

    /// Get the commits client.
    #[must_use]
    pub fn commits(&self) -> &CommitsClient {
        &self.commits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_defaults() {
        let client = GitHubClient::new(None, None, None, None).expect("Client creation should succeed");

        assert_eq!(client.transport().base_url(), DEFAULT_API_URL);
        assert_eq!(client.transport().retry_config().max_retries, 0);
        let authorize = client.oauth().authorize_url("id", "repo").unwrap();
        assert!(authorize.starts_with(DEFAULT_OAUTH_URL));
    }

    #[test]
    fn test_client_with_custom_urls() {
        let client = GitHubClient::new(
            Some("https://ghe.example.com/api/v3/"),
            Some("https://ghe.example.com"),
            Some(Duration::from_secs(5)),
            Some(RetryConfig::with_attempts(2, 1.5)),
        )
        .expect("Client creation should succeed");

        assert_eq!(client.transport().base_url(), "https://ghe.example.com/api/v3");
        assert_eq!(client.transport().retry_config().max_retries, 2);
    }
}
