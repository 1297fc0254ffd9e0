//! User data models.

use serde::{Deserialize, Serialize};

/// The authenticated user as returned by `GET /user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Login name, unique on GitHub
    pub login: String,
    /// Numeric account id
    #[serde(default)]
    pub id: u64,
    /// Display name, if set
    #[serde(default)]
    pub name: Option<String>,
}
