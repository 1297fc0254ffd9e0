//! Typed GitHub client for commit-tally.
//!
//! Covers the OAuth web flow token exchange and the REST endpoints needed to
//! tally a user's commits: the authenticated user, their repositories and
//! paginated commit listings.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tally_github::GitHubClient;
//!
//! let client = GitHubClient::new(None, None, None, None)?;
//! let repos = client.repos().list_for_authenticated_user(&token, 1, 100).await?;
//! for repo in repos.iter().filter(|r| !r.fork) {
//!     let page = client.commits().list(&repo.owner.login, &repo.name, 1, 100, &token).await?;
//!     println!("{}: {} commits on page 1", repo.name, page.len());
//! }
//! ```

pub mod client;
pub mod clients;
pub mod error;
pub mod testing;
pub mod transport;
pub mod types;

// Re-exports
pub use client::{DEFAULT_API_URL, DEFAULT_OAUTH_URL, DEFAULT_TIMEOUT_SECS, GitHubClient};
pub use clients::{CommitsClient, OAuthClient, ReposClient, UsersClient};
pub use error::{Error, GitHubError};
pub use transport::{HttpTransport, RetryConfig};
pub use types::{
    AccessTokenResponse, Commit, CommitDetail, GitSignature, OAuthErrorResponse, Owner,
    Repository, User,
};
