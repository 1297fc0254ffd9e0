//! commit-tally - GitHub commit counts per year or per day
//!
//! This library provides the services, models and handlers behind the
//! commit-tally server: an OAuth callback that tallies the authorizing
//! user's commits across their repositories.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::{Config, ConfigError};
pub use error::AppError;

pub use models::{BucketKey, CommitRecord, Diagnostic, DiagnosticKind, Granularity, Repository};

pub use services::{
    AggregationEngine, AggregationError, AggregationOptions, AggregationReport, CommitPaginator,
    CommitTallyService, GitHubApi, RepositoryEnumerator, format_summary,
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub github: Arc<dyn GitHubApi>,
}
