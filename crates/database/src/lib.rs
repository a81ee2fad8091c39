pub mod connection;
pub mod error;
pub mod memory;
pub mod repositories;
pub mod store;

pub use connection::{Database, DatabaseConfig};
pub use error::{DatabaseError, Result};
pub use memory::InMemoryTenantStore;
pub use repositories::organizations::PgTenantStore;
pub use store::TenantStore;
