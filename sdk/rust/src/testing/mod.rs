//! Testing utilities for the GitHub client.
//!
//! Provides a scripted mock client and fixture builders for testing code
//! that talks to GitHub through this crate.

mod mock;

pub use mock::{
    MockCall, MockCommitsClient, MockGitHubClient, MockOAuthClient, MockReposClient,
    MockResponse, MockUsersClient, mock_commit, mock_commit_page, mock_repository,
};
