//! Commit data models.

use serde::{Deserialize, Serialize};

/// Git author or committer signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitSignature {
    /// Name recorded in the commit object
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// ISO 8601 timestamp, normally `2023-05-01T10:00:00Z`
    #[serde(default)]
    pub date: Option<String>,
}

/// Git-level details of a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<GitSignature>,
    #[serde(default)]
    pub committer: Option<GitSignature>,
}

/// One entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Commit SHA
    pub sha: String,
    pub commit: CommitDetail,
}

impl Commit {
    /// Committer date, falling back to the author date.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.commit
            .committer
            .as_ref()
            .and_then(|c| c.date.as_deref())
            .or_else(|| self.commit.author.as_ref().and_then(|a| a.date.as_deref()))
    }

    /// Committer name, empty when absent.
    #[must_use]
    pub fn committer_name(&self) -> &str {
        self.commit.committer.as_ref().map_or("", |c| c.name.as_str())
    }

    /// Author name, empty when absent.
    #[must_use]
    pub fn author_name(&self) -> &str {
        self.commit.author.as_ref().map_or("", |a| a.name.as_str())
    }
}
