pub mod manager;
pub mod models;
pub mod stores;

use thiserror::Error;

/// Errors from the store layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    /// Rewrap a unique-index violation as a conflict carrying `message`;
    /// pass every other error through untouched.
    pub fn conflict_on_unique(self, message: &str) -> StoreError {
        match self {
            StoreError::Sqlx(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("23505") =>
            {
                StoreError::UniqueViolation(message.to_string())
            }
            other => other,
        }
    }

    pub fn not_found(message: impl Into<String>) -> StoreError {
        StoreError::NotFound(message.into())
    }
}
