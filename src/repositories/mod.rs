// src/repositories/mod.rs

use std::fmt;

pub mod catalog;
pub mod results;

pub use catalog::{InMemoryQuestionCatalog, PgQuestionCatalog, QuestionCatalog};
pub use results::{InMemoryResultRepository, PgResultRepository, ResultRepository};

/// Failure of an external store (catalog database, results table).
#[derive(Debug)]
pub enum StorageError {
    Database(sqlx::Error),
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Database(err) => write!(f, "database error: {}", err),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Database(err) => Some(err),
            StorageError::Unavailable(_) => None,
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Database(err)
    }
}
