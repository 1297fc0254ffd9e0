//! OAuth handlers
//!
//! `/login` starts the GitHub web flow; `/callback` receives the code,
//! runs the aggregation and answers with the plain-text summary.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::{info, warn};

use crate::AppState;
use crate::error::AppError;
use crate::services::{AggregationError, CommitTallyService};

/// Scope requested on the authorize page; private repositories need `repo`
pub const OAUTH_SCOPE: &str = "repo";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// GET /login
///
/// Redirects to GitHub's authorize page.
pub async fn login(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let location = state
        .github
        .authorize_url(&state.config.github_client_id, OAUTH_SCOPE)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish())
}

/// GET /callback?code=...
///
/// Exchanges the code, tallies the user's commits and returns one
/// `"<bucket>: <count> commits"` line per bucket. Page-level problems only
/// show up in the logs; the response is all-or-nothing.
pub async fn callback(
    state: web::Data<AppState>,
    query: web::Query<CallbackQuery>,
) -> Result<HttpResponse, AppError> {
    let code = query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("Missing code query parameter".to_string()))?;

    let service = CommitTallyService::new(state.github.clone(), &state.config);
    let report = service.tally(code).await.map_err(map_aggregation_error)?;

    for diagnostic in &report.diagnostics {
        if diagnostic.is_data_loss() {
            warn!("Partial data for {}: {}", report.identity, diagnostic);
        }
    }
    info!(
        "Returning tally for {} ({} buckets)",
        report.identity,
        report.counts_by_bucket.len()
    );

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(report.summary()))
}

/// Map aggregation errors to application errors
fn map_aggregation_error(e: AggregationError) -> AppError {
    warn!("Aggregation failed: {}", e);
    match &e {
        AggregationError::TokenExchange(source)
        | AggregationError::Identity(source)
        | AggregationError::RepositoryListing(source) => match AppError::from(source) {
            AppError::Upstream(_) => AppError::Upstream(e.to_string()),
            other => other,
        },
        AggregationError::Cancelled | AggregationError::Worker(_) => {
            AppError::Internal(e.to_string())
        }
    }
}

/// Configure OAuth routes
pub fn configure_oauth_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::get().to(login))
        .route("/callback", web::get().to(callback));
}
