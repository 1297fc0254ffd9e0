pub mod callback;
pub mod health;


pub use callback::configure_oauth_routes;
pub use health::configure_health_routes;
