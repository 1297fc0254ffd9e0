//! Aggregation Engine
//!
//! Consumes commit records across all of a user's repositories, deduplicates
//! them by SHA, keeps those attributable to the user and counts them per
//! calendar bucket.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::models::{BucketKey, CommitRecord, Diagnostic, Granularity, Repository};
use crate::services::paginator::{end_diagnostic, COMMITS_PER_PAGE};
use crate::services::summary::format_summary;
use crate::services::{
    CommitPaginator, GitHubApi, PaginationEnd, RepositoryCommits, RepositoryEnumerator,
};

/// Fatal errors; any of these fails the whole run.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Token exchange failed: {0}")]
    TokenExchange(#[source] tally_github::Error),

    #[error("Could not resolve identity: {0}")]
    Identity(#[source] tally_github::Error),

    #[error("Could not list repositories: {0}")]
    RepositoryListing(#[source] tally_github::Error),

    #[error("Aggregation was cancelled")]
    Cancelled,

    #[error("Repository worker failed: {0}")]
    Worker(String),
}

impl AggregationError {
    /// The upstream error behind a fatal failure, if any.
    pub fn upstream(&self) -> Option<&tally_github::Error> {
        match self {
            Self::TokenExchange(e) | Self::Identity(e) | Self::RepositoryListing(e) => Some(e),
            Self::Cancelled | Self::Worker(_) => None,
        }
    }
}

/// What happened to one record fed to `AggregationState::ingest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Counted(BucketKey),
    Duplicate,
    NotAttributed,
    MalformedTimestamp(String),
}

/// Per-run dedup set and bucket counts.
#[derive(Debug, Default)]
pub struct AggregationState {
    seen_ids: HashSet<String>,
    counts_by_bucket: BTreeMap<BucketKey, u64>,
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one record.
    ///
    /// The id is marked seen before attribution is checked, so a later copy
    /// of a non-attributed commit is still a duplicate.
    pub fn ingest(
        &mut self,
        record: &CommitRecord,
        identity: &str,
        granularity: Granularity,
    ) -> RecordOutcome {
        if !self.seen_ids.insert(record.id.clone()) {
            return RecordOutcome::Duplicate;
        }

        if !record.is_attributed_to(identity) {
            return RecordOutcome::NotAttributed;
        }

        match record.parse_timestamp() {
            Ok(timestamp) => {
                let key = granularity.bucket(&timestamp);
                *self.counts_by_bucket.entry(key).or_insert(0) += 1;
                RecordOutcome::Counted(key)
            }
            Err(e) => RecordOutcome::MalformedTimestamp(format!(
                "Unparseable timestamp {:?}: {}",
                record.timestamp, e
            )),
        }
    }

    pub fn seen(&self) -> usize {
        self.seen_ids.len()
    }

    pub fn counts(&self) -> &BTreeMap<BucketKey, u64> {
        &self.counts_by_bucket
    }

    pub fn into_counts(self) -> BTreeMap<BucketKey, u64> {
        self.counts_by_bucket
    }
}

/// Engine tuning
#[derive(Debug, Clone)]
pub struct AggregationOptions {
    pub granularity: Granularity,
    /// Repositories fetched at once; 1 means strictly sequential
    pub max_concurrent_repositories: usize,
    /// Pause between pages of one repository
    pub page_delay: Duration,
    pub per_page: u32,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::Year,
            max_concurrent_repositories: 1,
            page_delay: Duration::ZERO,
            per_page: COMMITS_PER_PAGE,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationReport {
    pub identity: String,
    pub granularity: Granularity,
    #[serde(skip)]
    pub counts_by_bucket: BTreeMap<BucketKey, u64>,
    pub repositories_scanned: usize,
    pub commits_seen: usize,
    pub commits_counted: u64,
    pub diagnostics: Vec<Diagnostic>,
}

impl AggregationReport {
    /// Summary text, one line per non-empty bucket.
    pub fn summary(&self) -> String {
        format_summary(&self.counts_by_bucket)
    }

    /// Whether some commits may be missing from the counts.
    pub fn is_partial(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_data_loss)
    }
}

/// Single merge point for records and diagnostics.
struct RunAccumulator<'a> {
    identity: &'a str,
    granularity: Granularity,
    state: AggregationState,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> RunAccumulator<'a> {
    fn new(identity: &'a str, granularity: Granularity) -> Self {
        Self {
            identity,
            granularity,
            state: AggregationState::new(),
            diagnostics: Vec::new(),
        }
    }

    fn ingest_all(&mut self, repository: &Repository, records: &[CommitRecord]) {
        for record in records {
            if let RecordOutcome::MalformedTimestamp(message) =
                self.state.ingest(record, self.identity, self.granularity)
            {
                warn!(
                    "Skipping commit {} in {}: {}",
                    record.id,
                    repository.full_name(),
                    message
                );
                self.diagnostics.push(Diagnostic::malformed_timestamp(
                    &repository.full_name(),
                    &record.id,
                    &message,
                ));
            }
        }
    }

    fn finish_repository(&mut self, diagnostic: Option<Diagnostic>) {
        self.diagnostics.extend(diagnostic);
    }

    fn into_report(self, repositories_scanned: usize) -> AggregationReport {
        let commits_seen = self.state.seen();
        let counts_by_bucket = self.state.into_counts();
        let commits_counted = counts_by_bucket.values().sum();

        AggregationReport {
            identity: self.identity.to_string(),
            granularity: self.granularity,
            counts_by_bucket,
            repositories_scanned,
            commits_seen,
            commits_counted,
            diagnostics: self.diagnostics,
        }
    }
}

/// Runs one aggregation for an identity and token.
#[derive(Clone)]
pub struct AggregationEngine {
    github: Arc<dyn GitHubApi>,
    options: AggregationOptions,
}

impl AggregationEngine {
    pub fn new(github: Arc<dyn GitHubApi>, options: AggregationOptions) -> Self {
        Self { github, options }
    }

    pub fn options(&self) -> &AggregationOptions {
        &self.options
    }

    /// Aggregate every non-fork repository of `identity`.
    pub async fn run(
        &self,
        identity: &str,
        token: &str,
    ) -> Result<AggregationReport, AggregationError> {
        // Held so the signal never reads as closed
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.run_with_cancellation(identity, token, cancel_rx).await
    }

    /// Like `run`, abandoning the run once `cancel` reads `true`.
    ///
    /// A cancelled run returns `AggregationError::Cancelled`; partial counts
    /// are discarded.
    pub async fn run_with_cancellation(
        &self,
        identity: &str,
        token: &str,
        cancel: watch::Receiver<bool>,
    ) -> Result<AggregationReport, AggregationError> {
        let repositories = RepositoryEnumerator::new(Arc::clone(&self.github))
            .enumerate(token)
            .await
            .map_err(AggregationError::RepositoryListing)?;

        info!(
            "Aggregating commits of {} over {} repositories by {}",
            identity,
            repositories.len(),
            self.options.granularity
        );

        let scanned = repositories.len();
        let mut acc = RunAccumulator::new(identity, self.options.granularity);

        if self.options.max_concurrent_repositories <= 1 {
            self.run_sequential(repositories, token, &cancel, &mut acc)
                .await?;
        } else {
            self.run_concurrent(repositories, token, &cancel, &mut acc)
                .await?;
        }

        let report = acc.into_report(scanned);
        info!(
            "Aggregation for {} done: {} commits counted of {} seen, {} diagnostics",
            identity,
            report.commits_counted,
            report.commits_seen,
            report.diagnostics.len()
        );
        Ok(report)
    }

    fn paginator(
        &self,
        repository: Repository,
        token: &str,
        cancel: &watch::Receiver<bool>,
    ) -> CommitPaginator {
        CommitPaginator::new(Arc::clone(&self.github), repository, token)
            .with_per_page(self.options.per_page)
            .with_page_delay(self.options.page_delay)
            .with_cancellation(cancel.clone())
    }

    /// Ingests each page as soon as it arrives.
    async fn run_sequential(
        &self,
        repositories: Vec<Repository>,
        token: &str,
        cancel: &watch::Receiver<bool>,
        acc: &mut RunAccumulator<'_>,
    ) -> Result<(), AggregationError> {
        for repository in repositories {
            let mut cursor = self.paginator(repository, token, cancel);

            while let Some(page) = cursor.next_page().await {
                acc.ingest_all(cursor.repository(), &page);
            }

            match cursor.outcome() {
                Some(PaginationEnd::Cancelled) => return Err(AggregationError::Cancelled),
                Some(end) => acc.finish_repository(end_diagnostic(cursor.repository(), end)),
                None => {}
            }
        }
        Ok(())
    }

    /// Bounded worker pool; results are merged in enumeration order once
    /// every repository has been collected.
    async fn run_concurrent(
        &self,
        repositories: Vec<Repository>,
        token: &str,
        cancel: &watch::Receiver<bool>,
        acc: &mut RunAccumulator<'_>,
    ) -> Result<(), AggregationError> {
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent_repositories));
        let mut workers = JoinSet::new();

        for (index, repository) in repositories.into_iter().enumerate() {
            let cursor = self.paginator(repository, token, cancel);
            let semaphore = Arc::clone(&semaphore);

            workers.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, cursor.collect().await)
            });
        }

        let mut collected: Vec<(usize, RepositoryCommits)> = Vec::with_capacity(workers.len());
        while let Some(joined) = workers.join_next().await {
            let (index, result) = joined.map_err(|e| AggregationError::Worker(e.to_string()))?;
            if matches!(result.end, PaginationEnd::Cancelled) {
                return Err(AggregationError::Cancelled);
            }
            collected.push((index, result));
        }

        collected.sort_by_key(|(index, _)| *index);
        for (_, result) in collected {
            acc.ingest_all(&result.repository, &result.records);
            acc.finish_repository(result.diagnostic());
        }
        Ok(())
    }
}
