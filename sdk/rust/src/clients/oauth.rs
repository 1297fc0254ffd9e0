//! OAuth authorization-code exchange.

use std::sync::Arc;

use crate::error::Error;
use crate::transport::HttpTransport;
use crate::types::oauth::TokenEndpointResponse;
use crate::types::{AccessTokenRequest, AccessTokenResponse};

/// Path of the token endpoint, relative to the OAuth base URL.
pub const ACCESS_TOKEN_PATH: &str = "/login/oauth/access_token";

/// Path of the authorize page, relative to the OAuth base URL.
pub const AUTHORIZE_PATH: &str = "/login/oauth/authorize";

/// Client for the OAuth web flow endpoints.
pub struct OAuthClient {
    transport: Arc<HttpTransport>,
}

impl OAuthClient {
    /// Create a new OAuth client.
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `Error::OAuth` when GitHub rejects the code (it does so with
    /// HTTP 200 and an `error` field), or a transport/API error.
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<AccessTokenResponse, Error> {
        let request = AccessTokenRequest {
            client_id,
            client_secret,
            code,
        };

        let response: TokenEndpointResponse = self
            .transport
            .post_json(ACCESS_TOKEN_PATH, &request, None)
            .await?;

        match response {
            TokenEndpointResponse::Success(token) if !token.access_token.is_empty() => Ok(token),
            TokenEndpointResponse::Success(_) => Err(Error::OAuth {
                error: "empty_access_token".to_string(),
                description: Some("Token endpoint returned an empty access token".to_string()),
            }),
            TokenEndpointResponse::Failure(failure) => Err(Error::OAuth {
                error: failure.error,
                description: failure.error_description,
            }),
        }
    }

    /// URL of the authorize page that starts the web flow.
    ///
    /// Query values are percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the OAuth base URL is not a valid URL.
    pub fn authorize_url(&self, client_id: &str, scope: &str) -> Result<String, Error> {
        let base = format!("{}{}", self.transport.base_url(), AUTHORIZE_PATH);
        let params = [("client_id", client_id), ("scope", scope)];
        let url = reqwest::Url::parse_with_params(&base, &params)
            .map_err(|e| Error::Configuration(format!("Invalid OAuth URL {base}: {e}")))?;
        Ok(url.to_string())
    }
}
