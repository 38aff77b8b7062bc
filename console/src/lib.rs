pub mod analytics;
pub mod auth;
pub mod config;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod livekit;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use errors::app_error::{AppError, AppResult};
pub use errors::auth_error::{AuthError, AuthResult};
pub use state::AppState;
