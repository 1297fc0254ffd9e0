use std::env;
use std::time::Duration;

use tally_github::RetryConfig;

use crate::models::Granularity;
use crate::services::AggregationOptions;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth app client id
    pub github_client_id: String,
    /// OAuth app client secret
    pub github_client_secret: String,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// GitHub REST base URL
    pub github_api_url: String,
    /// GitHub OAuth base URL
    pub github_oauth_url: String,
    /// Per-request timeout in seconds (default: 30)
    pub request_timeout_secs: u64,
    /// Bucket commits by year or by date (default: year)
    pub granularity: Granularity,
    /// Repositories fetched at once (default: 1, sequential)
    pub max_concurrent_repos: usize,
    /// Transport retries per GitHub call (default: 0)
    pub retry_max_attempts: u32,
    /// Exponential backoff base in seconds (default: 2.0)
    pub retry_backoff_factor: f64,
    /// Pause between commit pages in milliseconds (default: 0)
    pub page_delay_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingEnvVar(key))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let github_client_id = required("GITHUB_CLIENT_ID")?;
        let github_client_secret = required("GITHUB_CLIENT_SECRET")?;

        let host = or_default("HOST", "127.0.0.1");

        let port = or_default("PORT", "8080")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let github_api_url = or_default("GITHUB_API_URL", tally_github::DEFAULT_API_URL);
        let github_oauth_url = or_default("GITHUB_OAUTH_URL", tally_github::DEFAULT_OAUTH_URL);

        let request_timeout_secs = or_default("REQUEST_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS"))?;

        let granularity = or_default("COMMIT_GRANULARITY", "year")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("COMMIT_GRANULARITY"))?;

        let max_concurrent_repos = or_default("MAX_CONCURRENT_REPOS", "1")
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or(ConfigError::InvalidValue("MAX_CONCURRENT_REPOS"))?;

        let retry_max_attempts = or_default("RETRY_MAX_ATTEMPTS", "0")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("RETRY_MAX_ATTEMPTS"))?;

        let retry_backoff_factor = or_default("RETRY_BACKOFF_FACTOR", "2.0")
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .ok_or(ConfigError::InvalidValue("RETRY_BACKOFF_FACTOR"))?;

        let page_delay_ms = or_default("PAGE_DELAY_MS", "0")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PAGE_DELAY_MS"))?;

        Ok(Self {
            github_client_id,
            github_client_secret,
            host,
            port,
            github_api_url,
            github_oauth_url,
            request_timeout_secs,
            granularity,
            max_concurrent_repos,
            retry_max_attempts,
            retry_backoff_factor,
            page_delay_ms,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Retry policy handed to the GitHub transport
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::with_attempts(self.retry_max_attempts, self.retry_backoff_factor)
    }

    pub fn aggregation_options(&self) -> AggregationOptions {
        AggregationOptions {
            granularity: self.granularity,
            max_concurrent_repositories: self.max_concurrent_repos,
            page_delay: Duration::from_millis(self.page_delay_ms),
            ..AggregationOptions::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SECRETS: [(&str, &str); 2] = [
        ("GITHUB_CLIENT_ID", "Iv1.test"),
        ("GITHUB_CLIENT_SECRET", "shh"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&SECRETS)).expect("Should load");

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.github_oauth_url, "https://github.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.granularity, Granularity::Year);
        assert_eq!(config.max_concurrent_repos, 1);
        assert_eq!(config.retry_config().max_retries, 0);
        assert_eq!(config.aggregation_options().page_delay, Duration::ZERO);
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[("GITHUB_CLIENT_ID", "Iv1.test")]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvVar("GITHUB_CLIENT_SECRET"))
        ));

        let blank = Config::from_lookup(lookup_from(&[
            ("GITHUB_CLIENT_ID", "  "),
            ("GITHUB_CLIENT_SECRET", "shh"),
        ]));
        assert!(matches!(blank, Err(ConfigError::MissingEnvVar("GITHUB_CLIENT_ID"))));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = SECRETS.to_vec();
        pairs.extend([
            ("COMMIT_GRANULARITY", "date"),
            ("MAX_CONCURRENT_REPOS", "4"),
            ("RETRY_MAX_ATTEMPTS", "2"),
            ("PAGE_DELAY_MS", "1000"),
            ("PORT", "3000"),
        ]);

        let config = Config::from_lookup(lookup_from(&pairs)).expect("Should load");
        let options = config.aggregation_options();

        assert_eq!(config.port, 3000);
        assert_eq!(options.granularity, Granularity::Date);
        assert_eq!(options.max_concurrent_repositories, 4);
        assert_eq!(options.page_delay, Duration::from_secs(1));
        assert_eq!(config.retry_config().max_retries, 2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            ("COMMIT_GRANULARITY", "month"),
            ("MAX_CONCURRENT_REPOS", "0"),
            ("REQUEST_TIMEOUT_SECS", "0"),
            ("PORT", "http"),
        ] {
            let mut pairs = SECRETS.to_vec();
            pairs.push((key, value));

            let result = Config::from_lookup(lookup_from(&pairs));
            assert!(
                matches!(result, Err(ConfigError::InvalidValue(k)) if k == key),
                "{key}={value} should be rejected"
            );
        }
    }
}
