//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),
    /// Write would duplicate an existing record
    #[error("{0}")]
    Conflict(String),
    /// Bad credentials or token
    #[error("{0}")]
    Unauthorized(String),
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
    /// File storage error (uploads)
    #[error("Storage error: {0}")]
    Storage(String),
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_resource() {
        assert_eq!(DomainError::not_found("Book").to_string(), "Book not found");
    }

    #[test]
    fn db_errors_become_database_variant() {
        let err: DomainError = sea_orm::DbErr::Custom("boom".into()).into();
        assert!(matches!(err, DomainError::Database(msg) if msg.contains("boom")));
    }
}
