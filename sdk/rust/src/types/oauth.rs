//! OAuth token exchange payloads.

use serde::{Deserialize, Serialize};

/// Body of the authorization-code exchange request.
#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub code: &'a str,
}

/// Successful token exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    /// Bearer token for subsequent API calls
    pub access_token: String,
    /// Token type, normally "bearer"
    #[serde(default)]
    pub token_type: Option<String>,
    /// Comma separated list of granted scopes
    #[serde(default)]
    pub scope: Option<String>,
}

/// Failed token exchange.
///
/// GitHub answers a rejected code with HTTP 200 and this body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_uri: Option<String>,
}

/// Either outcome of the token endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TokenEndpointResponse {
    Failure(OAuthErrorResponse),
    Success(AccessTokenResponse),
}
