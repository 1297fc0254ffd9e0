//! Commits resource client.

use std::sync::Arc;

use crate::error::Error;
use crate::transport::HttpTransport;
use crate::types::Commit;

/// Largest page size GitHub accepts for commit listings.
pub const MAX_PER_PAGE: u32 = 100;

/// Client for commit listings.
pub struct CommitsClient {
    transport: Arc<HttpTransport>,
}

impl CommitsClient {
    /// Create a new commits client.
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// List one page of a repository's commits on its default branch.
    ///
    /// # Arguments
    ///
    /// * `owner` - Owner login
    /// * `repo` - Repository name
    /// * `page` - 1-based page number
    /// * `per_page` - Page size, at most 100
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. An empty repository yields a
    /// 409 `GitHubError::Conflict` (see `Error::is_empty_repository`).
    pub async fn list(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
        token: &str,
    ) -> Result<Vec<Commit>, Error> {
        let page = page.to_string();
        let per_page = per_page.min(MAX_PER_PAGE).to_string();
        let params = [("page", page.as_str()), ("per_page", per_page.as_str())];

        self.transport
            .get(
                &format!("/repos/{owner}/{repo}/commits"),
                Some(&params[..]),
                Some(token),
            )
            .await
    }
}
