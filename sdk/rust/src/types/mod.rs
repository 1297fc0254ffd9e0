//! Wire types for the GitHub REST and OAuth endpoints used by commit-tally.

pub mod commits;
pub mod oauth;
pub mod repos;
pub mod users;

// Re-exports
pub use commits::{Commit, CommitDetail, GitSignature};
pub use oauth::{AccessTokenRequest, AccessTokenResponse, OAuthErrorResponse};
pub use repos::{Owner, Repository};
pub use users::User;
