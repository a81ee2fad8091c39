pub mod auth;
pub mod health;
pub mod organization;

// Re-export common types
pub use auth::{auth_error, ErrorResponse};
