//! Error types for database operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("migration error: {0}")]
    Migration(String),
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing not found")]
    NotFound,
    #[error("invalid listing identifier")]
    InvalidId,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
