//! Repository data models.

use serde::{Deserialize, Serialize};

/// Repository owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// Repository as listed by `GET /user/repos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name without the owner prefix
    pub name: String,
    /// `owner/name`
    #[serde(default)]
    pub full_name: Option<String>,
    /// Owning account
    pub owner: Owner,
    /// Whether this repository is a fork
    #[serde(default)]
    pub fork: bool,
    /// Whether this repository is private
    #[serde(default)]
    pub private: bool,
}
