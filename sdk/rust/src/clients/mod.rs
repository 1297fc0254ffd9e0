//! Resource clients for the GitHub endpoints commit-tally needs.

pub mod commits;
pub mod oauth;
pub mod repos;
pub mod users;

// Re-exports
pub use commits::CommitsClient;
pub use oauth::OAuthClient;
pub use repos::ReposClient;
pub use users::UsersClient;
