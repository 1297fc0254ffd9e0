//! Mock GitHub client for testing.
//!
//! Provides a `MockGitHubClient` that mimics the real client interface
//! without making actual API calls. Commit listings are scripted page by
//! page so callers can reproduce drained, empty, rate limited and failing
//! repositories.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::error::{EMPTY_REPOSITORY_MESSAGE, Error, GitHubError};
use crate::types::{
    AccessTokenResponse, Commit, CommitDetail, GitSignature, Owner, Repository, User,
};

/// Record of a method call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Method name (e.g., "repos.list", "commits.list")
    pub method: String,
    /// Arguments passed to the method (tokens are not recorded)
    pub args: Vec<String>,
    /// Timestamp of the call
    pub timestamp: DateTime<Utc>,
}

impl MockCall {
    /// Create a new mock call record.
    pub fn new(method: &str, args: Vec<String>) -> Self {
        Self {
            method: method.to_string(),
            args,
            timestamp: Utc::now(),
        }
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub struct MockResponse<T: Clone> {
    /// The data to return
    pub data: Option<T>,
    /// Error to return instead of data
    pub error: Option<GitHubError>,
    /// Number of times this response has been used
    pub call_count: u32,
}

impl<T: Clone> Default for MockResponse<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            call_count: 0,
        }
    }
}

impl<T: Clone> MockResponse<T> {
    /// Create a new mock response with data.
    pub fn with_data(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Create a new mock response with an error.
    pub fn with_error(error: GitHubError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// The 409 GitHub answers for a repository without commits.
    pub fn empty_repository() -> Self {
        Self::with_error(GitHubError::Conflict {
            message: format!("{EMPTY_REPOSITORY_MESSAGE}."),
            documentation_url: None,
        })
    }

    /// A primary rate limit answer.
    pub fn rate_limited() -> Self {
        Self::with_error(GitHubError::RateLimited {
            status: 403,
            message: "API rate limit exceeded".to_string(),
            retry_after: 60,
            documentation_url: None,
        })
    }

    /// A 5xx answer.
    pub fn server_error() -> Self {
        Self::with_error(GitHubError::Server {
            status: 502,
            message: "Server Error".to_string(),
            documentation_url: None,
        })
    }

    /// Get the result, returning either the configured data or error.
    fn get_result(&mut self, default: T) -> Result<T, Error> {
        self.call_count += 1;
        if let Some(error) = &self.error {
            return Err(Error::GitHub(error.clone()));
        }
        Ok(self.data.clone().unwrap_or(default))
    }
}

/// Internal state for the mock client.
#[derive(Default)]
struct MockClientState {
    calls: Vec<MockCall>,
}

impl MockClientState {
    fn record_call(&mut self, method: &str, args: Vec<String>) {
        self.calls.push(MockCall::new(method, args));
    }
}

/// Mock OAuth client for testing.
pub struct MockOAuthClient {
    mock: Arc<Mutex<MockClientState>>,
    exchange_response: Arc<Mutex<MockResponse<AccessTokenResponse>>>,
    rejected_codes: Arc<Mutex<Vec<String>>>,
}

impl MockOAuthClient {
    fn new(mock: Arc<Mutex<MockClientState>>) -> Self {
        Self {
            mock,
            exchange_response: Arc::new(Mutex::new(MockResponse::default())),
            rejected_codes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure the response for exchange_code() calls.
    pub fn configure_exchange(&self, response: MockResponse<AccessTokenResponse>) {
        *self.exchange_response.lock().unwrap_or_else(|e| e.into_inner()) = response;
    }

    /// Make exchange_code() reject `code` the way GitHub rejects a bad code.
    pub fn reject_code(&self, code: &str) {
        self.rejected_codes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(code.to_string());
    }

    /// Mock exchange_code method.
    pub fn exchange_code(
        &self,
        client_id: &str,
        _client_secret: &str,
        code: &str,
    ) -> Result<AccessTokenResponse, Error> {
        self.mock
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record_call("oauth.exchange_code", vec![client_id.to_string(), code.to_string()]);

        let rejected = self
            .rejected_codes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|c| c == code);
        if rejected {
            return Err(Error::OAuth {
                error: "bad_verification_code".to_string(),
                description: Some("The code passed is incorrect or expired.".to_string()),
            });
        }

        let default = AccessTokenResponse {
            access_token: format!("mock-token-{code}"),
            token_type: Some("bearer".to_string()),
            scope: Some("repo".to_string()),
        };

        self.exchange_response
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_result(default)
    }
}

/// Mock users client for testing.
pub struct MockUsersClient {
    mock: Arc<Mutex<MockClientState>>,
    authenticated_response: Arc<Mutex<MockResponse<User>>>,
}

impl MockUsersClient {
    fn new(mock: Arc<Mutex<MockClientState>>) -> Self {
        Self {
            mock,
            authenticated_response: Arc::new(Mutex::new(MockResponse::default())),
        }
    }

    /// Configure the response for authenticated() calls.
    pub fn configure_authenticated(&self, response: MockResponse<User>) {
        *self.authenticated_response.lock().unwrap_or_else(|e| e.into_inner()) = response;
    }

    /// Mock authenticated method.
    pub fn authenticated(&self, _token: &str) -> Result<User, Error> {
        self.mock
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record_call("users.authenticated", vec![]);

        let default = User {
            login: "mock-user".to_string(),
            id: 1,
            name: None,
        };

        self.authenticated_response
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_result(default)
    }
}

/// Mock repos client for testing.
pub struct MockReposClient {
    mock: Arc<Mutex<MockClientState>>,
    list_response: Arc<Mutex<MockResponse<Vec<Repository>>>>,
}

impl MockReposClient {
    fn new(mock: Arc<Mutex<MockClientState>>) -> Self {
        Self {
            mock,
            list_response: Arc::new(Mutex::new(MockResponse::default())),
        }
    }

    /// Configure the full repository listing; it is served in pages.
    pub fn configure_list(&self, response: MockResponse<Vec<Repository>>) {
        *self.list_response.lock().unwrap_or_else(|e| e.into_inner()) = response;
    }

    /// Mock list_for_authenticated_user method. Defaults to no repositories.
    ///
    /// Returns the `page`th slice of `per_page` entries of the configured
    /// listing, empty past its end. A configured error answers every page.
    pub fn list_for_authenticated_user(
        &self,
        _token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, Error> {
        self.mock
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record_call("repos.list", vec![page.to_string(), per_page.to_string()]);

        let all = self
            .list_response
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_result(Vec::new())?;

        let per_page = usize::try_from(per_page.max(1)).unwrap_or(usize::MAX);
        let start = usize::try_from(page.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .saturating_mul(per_page);

        Ok(all.into_iter().skip(start).take(per_page).collect())
    }
}

/// Mock commits client for testing.
///
/// Each repository has a script of page responses; page N answers with the
/// Nth entry and any page past the script is empty.
pub struct MockCommitsClient {
    mock: Arc<Mutex<MockClientState>>,
    pages: Arc<Mutex<HashMap<String, Vec<MockResponse<Vec<Commit>>>>>>,
}

impl MockCommitsClient {
    fn new(mock: Arc<Mutex<MockClientState>>) -> Self {
        Self {
            mock,
            pages: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn key(owner: &str, repo: &str) -> String {
        format!("{owner}/{repo}")
    }

    /// Script the page responses for one repository.
    pub fn configure_pages(&self, owner: &str, repo: &str, pages: Vec<MockResponse<Vec<Commit>>>) {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(Self::key(owner, repo), pages);
    }

    /// Mock list method.
    pub fn list(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
        _token: &str,
    ) -> Result<Vec<Commit>, Error> {
        self.mock
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record_call("commits.list", vec![
                Self::key(owner, repo),
                page.to_string(),
                per_page.to_string(),
            ]);

        let mut pages = self.pages.lock().unwrap_or_else(|e| e.into_inner());
        let index = usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX);

        match pages
            .get_mut(&Self::key(owner, repo))
            .and_then(|script| script.get_mut(index))
        {
            Some(response) => response.get_result(Vec::new()),
            None => Ok(Vec::new()),
        }
    }
}

/// Mock GitHub client for testing.
///
/// # Example
///
/// ```rust
/// use tally_github::testing::{mock_commit, mock_repository, MockGitHubClient, MockResponse};
///
/// let mock = MockGitHubClient::new();
/// mock.repos().configure_list(MockResponse::with_data(vec![
///     mock_repository("alice", "tools", false),
/// ]));
/// mock.commits().configure_pages("alice", "tools", vec![
///     MockResponse::with_data(vec![mock_commit("a1", "2023-05-01T10:00:00Z", "alice", "alice")]),
/// ]);
///
/// let page = mock.commits().list("alice", "tools", 1, 100, "token").unwrap();
/// assert_eq!(page.len(), 1);
/// assert!(mock.was_called("commits.list"));
/// ```
pub struct MockGitHubClient {
    state: Arc<Mutex<MockClientState>>,
    oauth: MockOAuthClient,
    users: MockUsersClient,
    repos: MockReposClient,
    commits: MockCommitsClient,
}

impl Default for MockGitHubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitHubClient {
    /// Create a new mock client.
    pub fn new() -> Self {
        let state = Arc::new(Mutex::new(MockClientState::default()));

        Self {
            oauth: MockOAuthClient::new(Arc::clone(&state)),
            users: MockUsersClient::new(Arc::clone(&state)),
            repos: MockReposClient::new(Arc::clone(&state)),
            commits: MockCommitsClient::new(Arc::clone(&state)),
            state,
        }
    }

    /// Get the OAuth client.
    #[must_use]
    pub fn oauth(&self) -> &MockOAuthClient {
        &self.oauth
    }

    /// Get the users client.
    #[must_use]
    pub fn users(&self) -> &MockUsersClient {
        &self.users
    }

    /// Get the repos client.
    #[must_use]
    pub fn repos(&self) -> &MockReposClient {
        &self.repos
    }

    /// Get the commits client.
    #[must_use]
    pub fn commits(&self) -> &MockCommitsClient {
        &self.commits
    }

    /// Check if a method was called.
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .iter()
            .any(|call| call.method == method)
    }

    /// Get the number of times a method was called.
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    /// Get recorded calls, optionally filtered by method.
    #[must_use]
    pub fn get_calls(&self, method: Option<&str>) -> Vec<MockCall> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match method {
            Some(m) => state.calls.iter().filter(|call| call.method == m).cloned().collect(),
            None => state.calls.clone(),
        }
    }

    /// Page numbers requested for one repository, in request order.
    #[must_use]
    pub fn requested_pages(&self, owner: &str, repo: &str) -> Vec<u32> {
        let key = MockCommitsClient::key(owner, repo);
        self.get_calls(Some("commits.list"))
            .into_iter()
            .filter(|call| call.args.first() == Some(&key))
            .filter_map(|call| call.args.get(1).and_then(|p| p.parse().ok()))
            .collect()
    }

    /// Reset all recorded calls.
    pub fn reset(&self) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).calls.clear();
    }
}

/// Build a commit as GitHub would list it.
#[must_use]
pub fn mock_commit(sha: &str, date: &str, committer: &str, author: &str) -> Commit {
    Commit {
        sha: sha.to_string(),
        commit: CommitDetail {
            message: format!("commit {sha}"),
            author: Some(GitSignature {
                name: author.to_string(),
                email: None,
                date: Some(date.to_string()),
            }),
            committer: Some(GitSignature {
                name: committer.to_string(),
                email: None,
                date: Some(date.to_string()),
            }),
        },
    }
}

/// Build `count` commits with ids `{prefix}-0 ..` all by `name` on `date`.
#[must_use]
pub fn mock_commit_page(prefix: &str, count: usize, date: &str, name: &str) -> Vec<Commit> {
    (0..count)
        .map(|i| mock_commit(&format!("{prefix}-{i}"), date, name, name))
        .collect()
}

/// Build a repository listing entry.
#[must_use]
pub fn mock_repository(owner: &str, name: &str, fork: bool) -> Repository {
    Repository {
        name: name.to_string(),
        full_name: Some(format!("{owner}/{name}")),
        owner: Owner {
            login: owner.to_string(),
        },
        fork,
        private: false,
    }
}
