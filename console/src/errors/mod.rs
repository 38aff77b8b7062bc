//! Error types shared by handlers, middleware and stores.

pub mod app_error;
pub mod auth_error;

pub use app_error::{AppError, AppResult};
pub use auth_error::{AuthError, AuthResult};
