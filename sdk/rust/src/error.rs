//! Error types for the GitHub client.

use thiserror::Error;

/// Message GitHub returns with HTTP 409 when listing commits of a repository
/// that has no commits yet.
pub const EMPTY_REPOSITORY_MESSAGE: &str = "Git Repository is empty";

/// Main error type for the GitHub client.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// JSON serialization or decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The OAuth token endpoint rejected the exchange
    #[error("OAuth error: {error}{}", describe(.description))]
    OAuth {
        error: String,
        description: Option<String>,
    },

    /// GitHub API error response
    #[error(transparent)]
    GitHub(#[from] GitHubError),
}

fn describe(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

impl Error {
    /// Whether this is GitHub's "repository is empty" answer.
    #[must_use]
    pub fn is_empty_repository(&self) -> bool {
        matches!(self, Self::GitHub(e) if e.is_empty_repository())
    }

    /// Whether this is a primary or secondary rate limit.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::GitHub(e) if e.is_rate_limited())
    }
}

/// Typed GitHub API errors, one variant per status class.
#[derive(Error, Debug, Clone)]
pub enum GitHubError {
    /// Bad or expired credentials (401).
    #[error("[401] {message}")]
    Authentication {
        message: String,
        documentation_url: Option<String>,
    },

    /// Access denied (403) without rate limit exhaustion.
    #[error("[403] {message}")]
    Authorization {
        message: String,
        documentation_url: Option<String>,
    },

    /// Resource not found or not visible to the token (404).
    #[error("[404] {message}")]
    NotFound {
        message: String,
        documentation_url: Option<String>,
    },

    /// Conflict (409), e.g. an empty repository.
    #[error("[409] {message}")]
    Conflict {
        message: String,
        documentation_url: Option<String>,
    },

    /// Rate limit exhausted (429, or 403 with no remaining quota).
    #[error("[{status}] {message} (retry after {retry_after}s)")]
    RateLimited {
        status: u16,
        message: String,
        retry_after: u32,
        documentation_url: Option<String>,
    },

    /// Any other client error (400, 422, ...).
    #[error("[{status}] {message}")]
    Validation {
        status: u16,
        message: String,
        documentation_url: Option<String>,
    },

    /// Server error (5xx).
    #[error("[{status}] {message}")]
    Server {
        status: u16,
        message: String,
        documentation_url: Option<String>,
    },
}

impl GitHubError {
    /// HTTP status code of the response.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Authentication { .. } => 401,
            Self::Authorization { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::RateLimited { status, .. }
            | Self::Validation { status, .. }
            | Self::Server { status, .. } => *status,
        }
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Authentication { message, .. }
            | Self::Authorization { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::RateLimited { message, .. }
            | Self::Validation { message, .. }
            | Self::Server { message, .. } => message,
        }
    }

    /// Get the documentation link if GitHub sent one.
    #[must_use]
    pub fn documentation_url(&self) -> Option<&str> {
        match self {
            Self::Authentication {
                documentation_url, ..
            }
            | Self::Authorization {
                documentation_url, ..
            }
            | Self::NotFound {
                documentation_url, ..
            }
            | Self::Conflict {
                documentation_url, ..
            }
            | Self::RateLimited {
                documentation_url, ..
            }
            | Self::Validation {
                documentation_url, ..
            }
            | Self::Server {
                documentation_url, ..
            } => documentation_url.as_deref(),
        }
    }

    /// Get the retry-after value for rate limited errors.
    #[must_use]
    pub fn retry_after(&self) -> Option<u32> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Server { .. })
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Whether this is the 409 GitHub returns for a repository without commits.
    #[must_use]
    pub fn is_empty_repository(&self) -> bool {
        match self {
            Self::Conflict { message, .. } => message.contains(EMPTY_REPOSITORY_MESSAGE),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_repository_detection() {
        let error = GitHubError::Conflict {
            message: "Git Repository is empty.".to_string(),
            documentation_url: None,
        };

        assert!(error.is_empty_repository());
        assert!(!error.is_retryable());
        assert_eq!(error.status(), 409);
        assert!(Error::GitHub(error).is_empty_repository());
    }

    #[test]
    fn test_other_conflict_is_not_empty_repository() {
        let error = GitHubError::Conflict {
            message: "Merge conflict".to_string(),
            documentation_url: None,
        };

        assert!(!error.is_empty_repository());
    }

    #[test]
    fn test_rate_limited_error() {
        let error = GitHubError::RateLimited {
            status: 403,
            message: "API rate limit exceeded".to_string(),
            retry_after: 30,
            documentation_url: None,
        };

        assert_eq!(error.retry_after(), Some(30));
        assert_eq!(error.status(), 403);
        assert!(error.is_retryable());
        assert!(Error::GitHub(error).is_rate_limited());
    }

    #[test]
    fn test_non_retryable_errors() {
        let auth_error = GitHubError::Authentication {
            message: "Bad credentials".to_string(),
            documentation_url: Some("https://docs.github.com/rest".to_string()),
        };
        assert!(!auth_error.is_retryable());
        assert_eq!(auth_error.documentation_url(), Some("https://docs.github.com/rest"));

        let not_found = GitHubError::NotFound {
            message: "Not Found".to_string(),
            documentation_url: None,
        };
        assert!(!not_found.is_retryable());
    }

    #[test]
    fn test_oauth_error_display() {
        let error = Error::OAuth {
            error: "bad_verification_code".to_string(),
            description: Some("The code passed is incorrect or expired.".to_string()),
        };

        assert_eq!(
            error.to_string(),
            "OAuth error: bad_verification_code (The code passed is incorrect or expired.)"
        );
    }
}
