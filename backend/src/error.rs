use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

/// Application-level error type
#[derive(Debug)]
pub enum AppError {
    /// Validation error (e.g., missing `code`)
    Validation(String),
    /// GitHub failed a call the request cannot do without
    Upstream(String),
    /// GitHub rate limited a call the request cannot do without
    RateLimited { retry_after: u64, message: String },
    /// Internal server error
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
    meta: ErrorMeta,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ErrorMeta {
    request_id: String,
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::RateLimited { .. } => "UPSTREAM_RATE_LIMITED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::RateLimited { retry_after, .. } => {
                Some(serde_json::json!({ "retryAfter": retry_after }))
            }
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Upstream(msg) => write!(f, "GitHub error: {msg}"),
            Self::RateLimited { message, .. } => write!(f, "GitHub rate limit: {message}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse {
            error: ErrorBody {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details: self.details(),
            },
            meta: ErrorMeta {
                request_id: uuid::Uuid::new_v4().to_string(),
            },
        };

        match self {
            Self::Internal(_) => HttpResponse::InternalServerError().json(error_response),
            Self::Validation(_) => HttpResponse::BadRequest().json(error_response),
            Self::Upstream(_) => HttpResponse::BadGateway().json(error_response),
            Self::RateLimited { retry_after, .. } => HttpResponse::ServiceUnavailable()
                .insert_header(("Retry-After", retry_after.to_string()))
                .json(error_response),
        }
    }
}

impl From<&tally_github::Error> for AppError {
    fn from(err: &tally_github::Error) -> Self {
        match err {
            tally_github::Error::GitHub(e) if e.is_rate_limited() => Self::RateLimited {
                retry_after: e.retry_after().map_or(60, u64::from),
                message: e.message().to_string(),
            },
            other => Self::Upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use tally_github::GitHubError;

    #[actix_web::test]
    async fn test_error_body_shape() {
        let response = AppError::Validation("Missing code".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "Validation error: Missing code");
        assert!(json["meta"]["request_id"].is_string());
        assert!(json["error"].get("details").is_none());
    }

    #[test]
    fn test_rate_limit_maps_to_503_with_retry_after() {
        let upstream = tally_github::Error::GitHub(GitHubError::RateLimited {
            status: 403,
            message: "API rate limit exceeded".to_string(),
            retry_after: 42,
            documentation_url: None,
        });

        let response = AppError::from(&upstream).error_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "42");
    }

    #[test]
    fn test_other_upstream_errors_map_to_502() {
        let upstream = tally_github::Error::Timeout("after 30s".to_string());

        let error = AppError::from(&upstream);

        assert!(matches!(error, AppError::Upstream(_)));
        assert_eq!(error.error_response().status(), StatusCode::BAD_GATEWAY);
    }
}
