use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Database error: {0}")]
    Other(String),
}

impl DatabaseError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound(format!("{} with id {} not found", entity, id))
    }

    pub fn duplicate(entity: &str, field: &str) -> Self {
        Self::DuplicateEntry(format!("{} with {} already exists", entity, field))
    }

    /// Map a unique-constraint violation onto `DuplicateEntry`, naming the
    /// offending field when the constraint is one we created.
    pub fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let field = match db_err.constraint() {
                    Some("organizations_admin_email_key") => "admin_email",
                    _ => "organization_name",
                };
                return Self::duplicate("Organization", field);
            }
        }
        Self::ConnectionError(err)
    }

    pub fn is_duplicate_email(&self) -> bool {
        matches!(self, Self::DuplicateEntry(msg) if msg.contains("admin_email"))
    }
}
