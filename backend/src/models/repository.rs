//! Repository model

use serde::Serialize;

/// A repository the authenticated user owns or collaborates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub name: String,
    pub owner_login: String,
    pub is_fork: bool,
}

impl Repository {
    pub fn new(owner_login: &str, name: &str, is_fork: bool) -> Self {
        Self {
            name: name.to_string(),
            owner_login: owner_login.to_string(),
            is_fork,
        }
    }

    /// `owner/name`, used in logs and diagnostics
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner_login, self.name)
    }
}
