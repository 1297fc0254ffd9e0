//! Commit Tally Service
//!
//! The full callback flow: token exchange, identity, aggregation.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::config::Config;
use crate::services::{AggregationEngine, AggregationError, AggregationReport, GitHubApi};

#[derive(Clone)]
pub struct CommitTallyService {
    github: Arc<dyn GitHubApi>,
    client_id: String,
    client_secret: String,
    engine: AggregationEngine,
}

impl CommitTallyService {
    pub fn new(github: Arc<dyn GitHubApi>, config: &Config) -> Self {
        Self {
            engine: AggregationEngine::new(Arc::clone(&github), config.aggregation_options()),
            github,
            client_id: config.github_client_id.clone(),
            client_secret: config.github_client_secret.clone(),
        }
    }

    /// Tally the commits of the user who authorized `code`.
    pub async fn tally(&self, code: &str) -> Result<AggregationReport, AggregationError> {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.tally_with_cancellation(code, cancel_rx).await
    }

    pub async fn tally_with_cancellation(
        &self,
        code: &str,
        cancel: watch::Receiver<bool>,
    ) -> Result<AggregationReport, AggregationError> {
        let token = self
            .github
            .exchange_code(&self.client_id, &self.client_secret, code)
            .await
            .map_err(AggregationError::TokenExchange)?;

        let identity = self
            .github
            .resolve_identity(&token)
            .await
            .map_err(AggregationError::Identity)?;
        info!("Authorized as {}", identity);

        self.engine
            .run_with_cancellation(&identity, &token, cancel)
            .await
    }
}
