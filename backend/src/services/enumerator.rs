//! Repository Enumerator
//!
//! Lists the repositories whose commits get counted.

use std::sync::Arc;

use tracing::{debug, info};

use crate::models::Repository;
use crate::services::{GitHubApi, REPOSITORIES_PER_PAGE};

/// Lists the user's repositories and drops forks.
#[derive(Clone)]
pub struct RepositoryEnumerator {
    github: Arc<dyn GitHubApi>,
}

impl RepositoryEnumerator {
    pub fn new(github: Arc<dyn GitHubApi>) -> Self {
        Self { github }
    }

    /// Non-fork repositories in the order GitHub listed them.
    ///
    /// Walks the listing from page 1 until an empty page. Any page failure is
    /// returned as is; it is fatal for the run.
    pub async fn enumerate(&self, token: &str) -> Result<Vec<Repository>, tally_github::Error> {
        let mut listed = Vec::new();
        let mut page = 1;

        loop {
            debug!("Fetching repository listing page {}", page);
            let batch = self
                .github
                .list_repositories(token, page, REPOSITORIES_PER_PAGE)
                .await?;
            if batch.is_empty() {
                break;
            }
            listed.extend(batch);
            page += 1;
        }

        let total = listed.len();
        let repositories: Vec<Repository> = listed
            .into_iter()
            .filter(|repo| {
                if repo.is_fork {
                    debug!("Skipping fork {}", repo.full_name());
                }
                !repo.is_fork
            })
            .collect();

        info!(
            "Enumerated {} repositories over {} listing pages ({} forks excluded)",
            repositories.len(),
            page - 1,
            total - repositories.len()
        );

        Ok(repositories)
    }
}
