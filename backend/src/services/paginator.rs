//! Commit Paginator
//!
//! Walks one repository's commit listing page by page until GitHub returns
//! an empty page, reports the repository as empty, or a page fails.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::{CommitRecord, Diagnostic, Repository};
use crate::services::GitHubApi;

/// Commits requested per page (GitHub's maximum)
pub const COMMITS_PER_PAGE: u32 = 100;

/// Why a repository's pagination stopped
#[derive(Debug)]
pub enum PaginationEnd {
    /// An empty page was returned
    Drained,
    /// GitHub reported the repository has no commits on this page
    EmptyRepository { page: u32 },
    /// A page failed after the transport gave up; earlier pages stay valid
    Failed {
        page: u32,
        error: tally_github::Error,
    },
    /// The run was cancelled before the listing finished
    Cancelled,
}

/// Everything one repository contributed, in page order.
#[derive(Debug)]
pub struct RepositoryCommits {
    pub repository: Repository,
    pub records: Vec<CommitRecord>,
    pub end: PaginationEnd,
    pub pages_requested: u32,
}

impl RepositoryCommits {
    /// Diagnostic for how this repository ended, if it needs one.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        end_diagnostic(&self.repository, &self.end)
    }
}

pub(crate) fn end_diagnostic(repository: &Repository, end: &PaginationEnd) -> Option<Diagnostic> {
    match end {
        PaginationEnd::EmptyRepository { page } => Some(Diagnostic::empty_repository(
            &repository.full_name(),
            *page,
        )),
        PaginationEnd::Failed { page, error } => Some(Diagnostic::page_failed(
            &repository.full_name(),
            *page,
            &error.to_string(),
        )),
        PaginationEnd::Drained | PaginationEnd::Cancelled => None,
    }
}

/// Lazy, restartable page cursor over one repository's commits.
pub struct CommitPaginator {
    github: Arc<dyn GitHubApi>,
    repository: Repository,
    token: String,
    per_page: u32,
    page_delay: Duration,
    cancel: Option<watch::Receiver<bool>>,
    next_page: u32,
    pages_requested: u32,
    end: Option<PaginationEnd>,
}

impl CommitPaginator {
    pub fn new(github: Arc<dyn GitHubApi>, repository: Repository, token: &str) -> Self {
        Self {
            github,
            repository,
            token: token.to_string(),
            per_page: COMMITS_PER_PAGE,
            page_delay: Duration::ZERO,
            cancel: None,
            next_page: 1,
            pages_requested: 0,
            end: None,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, COMMITS_PER_PAGE);
        self
    }

    /// Pause between consecutive page requests.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Stop issuing requests once `cancel` reads `true`.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// How pagination ended, `None` while pages remain.
    pub fn outcome(&self) -> Option<&PaginationEnd> {
        self.end.as_ref()
    }

    pub fn pages_requested(&self) -> u32 {
        self.pages_requested
    }

    /// Rewind to page 1, forgetting how the previous pass ended.
    pub fn restart(&mut self) {
        self.next_page = 1;
        self.pages_requested = 0;
        self.end = None;
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Fetch the next non-empty page, or `None` once pagination has ended.
    pub async fn next_page(&mut self) -> Option<Vec<CommitRecord>> {
        if self.end.is_some() {
            return None;
        }

        if self.is_cancelled() {
            return self.finish(PaginationEnd::Cancelled);
        }

        let page = self.next_page;

        if page > 1 && !self.page_delay.is_zero() {
            let delay = tokio::time::sleep(self.page_delay);
            let interrupted = match self.cancel.as_mut() {
                Some(rx) => tokio::select! {
                    _ = delay => false,
                    _ = cancelled(rx) => true,
                },
                None => {
                    delay.await;
                    false
                }
            };
            if interrupted {
                return self.finish(PaginationEnd::Cancelled);
            }
        }

        debug!("Fetching {} commits page {}", self.repository.full_name(), page);
        self.pages_requested += 1;

        let fetch = self
            .github
            .list_commits(&self.repository, page, self.per_page, &self.token);
        let result = match self.cancel.as_mut() {
            Some(rx) => tokio::select! {
                result = fetch => Some(result),
                _ = cancelled(rx) => None,
            },
            None => Some(fetch.await),
        };

        match result {
            None => self.finish(PaginationEnd::Cancelled),
            Some(Ok(records)) if records.is_empty() => {
                debug!(
                    "{} drained after {} pages",
                    self.repository.full_name(),
                    page - 1
                );
                self.finish(PaginationEnd::Drained)
            }
            Some(Ok(records)) => {
                self.next_page += 1;
                Some(records)
            }
            Some(Err(e)) if e.is_empty_repository() => {
                info!("Repository {} is empty", self.repository.full_name());
                self.finish(PaginationEnd::EmptyRepository { page })
            }
            Some(Err(e)) => {
                warn!(
                    "Commit page {} of {} failed, keeping earlier pages: {}",
                    page,
                    self.repository.full_name(),
                    e
                );
                self.finish(PaginationEnd::Failed { page, error: e })
            }
        }
    }

    fn finish(&mut self, end: PaginationEnd) -> Option<Vec<CommitRecord>> {
        self.end = Some(end);
        None
    }

    /// Drain the remaining pages into one result.
    pub async fn collect(mut self) -> RepositoryCommits {
        let mut records = Vec::new();
        while let Some(page) = self.next_page().await {
            records.extend(page);
        }

        RepositoryCommits {
            repository: self.repository,
            records,
            end: self.end.unwrap_or(PaginationEnd::Drained),
            pages_requested: self.pages_requested,
        }
    }
}

/// Resolves once the signal reads `true`; never if the sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    let closed = rx.wait_for(|cancel| *cancel).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiagnosticKind;
    use tally_github::testing::{mock_commit_page, MockGitHubClient, MockResponse};

    const DATE: &str = "2023-05-01T10:00:00Z";

    fn setup(pages: Vec<MockResponse<Vec<tally_github::Commit>>>) -> Arc<MockGitHubClient> {
        let mock = Arc::new(MockGitHubClient::new());
        mock.commits().configure_pages("alice", "tools", pages);
        mock
    }

    fn paginator(mock: &Arc<MockGitHubClient>) -> CommitPaginator {
        CommitPaginator::new(mock.clone(), Repository::new("alice", "tools", false), "t")
    }

    #[tokio::test]
    async fn test_short_page_does_not_end_pagination() {
        let mock = setup(vec![
            MockResponse::with_data(mock_commit_page("p1", 100, DATE, "alice")),
            MockResponse::with_data(mock_commit_page("p2", 100, DATE, "alice")),
            MockResponse::with_data(mock_commit_page("p3", 37, DATE, "alice")),
        ]);

        let result = paginator(&mock).collect().await;

        assert_eq!(result.records.len(), 237);
        assert_eq!(result.pages_requested, 4);
        assert!(matches!(result.end, PaginationEnd::Drained));
        assert!(result.diagnostic().is_none());
        assert_eq!(mock.requested_pages("alice", "tools"), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_empty_repository_ends_normally() {
        let mock = setup(vec![MockResponse::empty_repository()]);

        let result = paginator(&mock).collect().await;

        assert!(result.records.is_empty());
        assert!(matches!(result.end, PaginationEnd::EmptyRepository { page: 1 }));

        let diagnostic = result.diagnostic().unwrap();
        assert_eq!(diagnostic.kind, DiagnosticKind::EmptyRepository);
        assert_eq!(diagnostic.page, Some(1));
        assert!(!diagnostic.is_data_loss());
    }

    #[tokio::test]
    async fn test_empty_repository_reported_on_later_page() {
        let mock = setup(vec![
            MockResponse::with_data(mock_commit_page("p1", 100, DATE, "alice")),
            MockResponse::empty_repository(),
        ]);

        let result = paginator(&mock).collect().await;

        assert_eq!(result.records.len(), 100);
        assert!(matches!(result.end, PaginationEnd::EmptyRepository { page: 2 }));
        assert_eq!(mock.requested_pages("alice", "tools"), vec![1, 2]);

        let diagnostic = result.diagnostic().unwrap();
        assert_eq!(diagnostic.kind, DiagnosticKind::EmptyRepository);
        assert_eq!(diagnostic.page, Some(2));
        assert!(diagnostic.to_string().contains("page 2"));
    }

    #[tokio::test]
    async fn test_failed_page_keeps_earlier_records() {
        let mock = setup(vec![
            MockResponse::with_data(mock_commit_page("p1", 100, DATE, "alice")),
            MockResponse::rate_limited(),
            MockResponse::with_data(mock_commit_page("p3", 10, DATE, "alice")),
        ]);

        let result = paginator(&mock).collect().await;

        assert_eq!(result.records.len(), 100);
        assert!(matches!(result.end, PaginationEnd::Failed { page: 2, .. }));
        // Failed page is not retried and nothing after it is requested
        assert_eq!(mock.requested_pages("alice", "tools"), vec![1, 2]);

        let diagnostic = result.diagnostic().unwrap();
        assert_eq!(diagnostic.kind, DiagnosticKind::PageFailed);
        assert_eq!(diagnostic.page, Some(2));
        assert_eq!(diagnostic.repository, "alice/tools");
    }

    #[tokio::test]
    async fn test_next_page_is_lazy_and_restartable() {
        let mock = setup(vec![
            MockResponse::with_data(mock_commit_page("p1", 2, DATE, "alice")),
            MockResponse::with_data(mock_commit_page("p2", 1, DATE, "alice")),
        ]);
        let mut cursor = paginator(&mock);

        assert_eq!(cursor.next_page().await.map(|p| p.len()), Some(2));
        assert_eq!(mock.call_count("commits.list"), 1);
        assert!(cursor.outcome().is_none());

        assert_eq!(cursor.next_page().await.map(|p| p.len()), Some(1));
        assert!(cursor.next_page().await.is_none());
        assert!(matches!(cursor.outcome(), Some(PaginationEnd::Drained)));

        // Finished cursors stay finished until restarted
        assert!(cursor.next_page().await.is_none());
        assert_eq!(cursor.pages_requested(), 3);

        cursor.restart();
        assert_eq!(cursor.next_page().await.map(|p| p.len()), Some(2));
        assert_eq!(mock.requested_pages("alice", "tools"), vec![1, 2, 3, 1]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_requests_nothing() {
        let mock = setup(vec![MockResponse::with_data(mock_commit_page(
            "p1", 5, DATE, "alice",
        ))]);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        cancel_tx.send(true).unwrap();

        let result = paginator(&mock).with_cancellation(cancel_rx).collect().await;

        assert!(matches!(result.end, PaginationEnd::Cancelled));
        assert!(!mock.was_called("commits.list"));
    }

    #[tokio::test]
    async fn test_cancel_during_page_delay() {
        let mock = setup(vec![
            MockResponse::with_data(mock_commit_page("p1", 5, DATE, "alice")),
            MockResponse::with_data(mock_commit_page("p2", 5, DATE, "alice")),
        ]);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let mut cursor = paginator(&mock)
            .with_page_delay(Duration::from_secs(3600))
            .with_cancellation(cancel_rx);

        assert!(cursor.next_page().await.is_some());

        let pending = tokio::spawn(async move {
            let page = cursor.next_page().await;
            (page, cursor)
        });
        cancel_tx.send(true).unwrap();

        let (page, cursor) = pending.await.unwrap();
        assert!(page.is_none());
        assert!(matches!(cursor.outcome(), Some(PaginationEnd::Cancelled)));
        assert_eq!(mock.requested_pages("alice", "tools"), vec![1]);
    }

    #[tokio::test]
    async fn test_per_page_is_capped() {
        let mock = setup(vec![]);

        paginator(&mock).with_per_page(500).collect().await;

        let calls = mock.get_calls(Some("commits.list"));
        assert_eq!(calls[0].args[2], "100");
    }
}
