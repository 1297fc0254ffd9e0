use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};
use tally_github::GitHubClient;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commit_tally::{AppState, Config, GitHubApi, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "commit_tally=debug,tally_github=info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    info!(
        "Starting commit-tally server on {}:{}",
        config.host, config.port
    );

    let github: Arc<dyn GitHubApi> = Arc::new(
        GitHubClient::new(
            Some(config.github_api_url.as_str()),
            Some(config.github_oauth_url.as_str()),
            Some(config.request_timeout()),
            Some(config.retry_config()),
        )
        .expect("Failed to create GitHub client"),
    );

    info!(
        "GitHub client ready (api {}, granularity {}, {} concurrent repositories, {} retries)",
        config.github_api_url,
        config.granularity,
        config.max_concurrent_repos,
        config.retry_max_attempts
    );

    let server_addr = format!("{}:{}", config.host, config.port);

    let app_state = web::Data::new(AppState { config, github });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure_health_routes)
            .configure(handlers::configure_oauth_routes)
    })
    .bind(&server_addr)?
    .run()
    .await
}
