pub mod error;
pub mod jwt;
pub mod organization_service;
pub mod password;

pub use error::{AuthError, Result};
pub use jwt::{Claims, JwtService, DEFAULT_TOKEN_EXPIRATION_MINUTES};
pub use organization_service::{OrganizationService, UpdateOutcome};
pub use password::PasswordHasher;
