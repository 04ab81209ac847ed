//! Error types for Storefront Core

use thiserror::Error;

/// Stable code carried by every "already exists" error.
pub const ALREADY_EXISTS_CODE: u32 = 4001;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A uniqueness constraint rejected a create. Recoverable; surface as a conflict.
    #[error("{message}")]
    AlreadyExists { code: u32, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Raw uniqueness violation reported by a record store.
    ///
    /// Translated into `AlreadyExists` by [`crate::create_record`].
    #[error("Unique constraint failed: {0}")]
    UniqueViolation(String),

    // Multi-tenancy errors
    #[error("Invalid store: {0}")]
    InvalidStore(String),

    #[error("Invalid host: {0}")]
    InvalidHost(String),

    /// A caller-supplied value was rejected before reaching the store.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an `AlreadyExists` error with the stable code.
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            code: ALREADY_EXISTS_CODE,
            message: message.into(),
        }
    }

    /// Stable application code, if this error carries one
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::AlreadyExists { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_carries_code() {
        let err = Error::already_exists("page name was already existing.");
        assert_eq!(err.code(), Some(4001));
        assert_eq!(err.to_string(), "page name was already existing.");
    }

    #[test]
    fn test_other_errors_have_no_code() {
        assert_eq!(Error::Database("locked".to_string()).code(), None);
        assert_eq!(Error::UniqueViolation("pages.name".to_string()).code(), None);
        assert!(Error::NotFound("page".to_string()).is_not_found());
        assert_eq!(Error::InvalidInput("name".to_string()).code(), None);
    }
}
