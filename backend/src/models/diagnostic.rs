//! Non-fatal problems reported during an aggregation run

use serde::Serialize;
use std::fmt;

/// What went wrong, from least to most severe for the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Repository has no commits; informational
    EmptyRepository,
    /// A page fetch failed and the repository's pagination stopped early
    PageFailed,
    /// A counted commit had an unparseable timestamp and was skipped
    MalformedTimestamp,
}

/// A problem that did not fail the run.
///
/// Diagnostics never appear in the summary text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// `owner/name` of the repository involved
    pub repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn empty_repository(repository: &str, page: u32) -> Self {
        Self {
            kind: DiagnosticKind::EmptyRepository,
            repository: repository.to_string(),
            page: Some(page),
            commit_id: None,
            message: "Repository is empty".to_string(),
        }
    }

    pub fn page_failed(repository: &str, page: u32, message: &str) -> Self {
        Self {
            kind: DiagnosticKind::PageFailed,
            repository: repository.to_string(),
            page: Some(page),
            commit_id: None,
            message: message.to_string(),
        }
    }

    pub fn malformed_timestamp(repository: &str, commit_id: &str, message: &str) -> Self {
        Self {
            kind: DiagnosticKind::MalformedTimestamp,
            repository: repository.to_string(),
            page: None,
            commit_id: Some(commit_id.to_string()),
            message: message.to_string(),
        }
    }

    /// Whether this diagnostic means data may be missing from the summary.
    pub fn is_data_loss(&self) -> bool {
        !matches!(self.kind, DiagnosticKind::EmptyRepository)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repository)?;
        if let Some(page) = self.page {
            write!(f, " page {page}")?;
        }
        if let Some(id) = &self.commit_id {
            write!(f, " commit {id}")?;
        }
        write!(f, ": {}", self.message)
    }
}
