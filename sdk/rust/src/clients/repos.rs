//! Repositories resource client.

use std::sync::Arc;

use crate::clients::commits::MAX_PER_PAGE;
use crate::error::Error;
use crate::transport::HttpTransport;
use crate::types::Repository;

/// Client for repository-related operations.
pub struct ReposClient {
    transport: Arc<HttpTransport>,
}

impl ReposClient {
    /// Create a new repos client.
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// List one page of repositories the token's user owns or collaborates on.
    ///
    /// Covers public and private repositories (`visibility=all`,
    /// `affiliation=owner,collaborator`). Callers walk `page` from 1 until an
    /// empty page comes back.
    ///
    /// # Arguments
    ///
    /// * `token` - OAuth access token
    /// * `page` - 1-based page number
    /// * `per_page` - Page size, at most 100
    ///
    /// # Returns
    ///
    /// Repositories in the order GitHub returns them
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_for_authenticated_user(
        &self,
        token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, Error> {
        let page = page.to_string();
        let per_page = per_page.min(MAX_PER_PAGE).to_string();
        let params = [
            ("visibility", "all"),
            ("affiliation", "owner,collaborator"),
            ("page", page.as_str()),
            ("per_page", per_page.as_str()),
        ];

        self.transport
            .get("/user/repos", Some(&params[..]), Some(token))
            .await
    }
}
