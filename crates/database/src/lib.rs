//! Nestboard database crate
//!
//! Connection management, migrations, and the listing repository backing
//! the marketplace.

use nestboard_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

pub use repos::ListingRepository;

pub use entities::listing::{
    Listing, ListingFilter, ListingUpdate, NewListing, SortField, SortOrder,
};

pub use types::{
    errors::{DatabaseError, ListingError},
    ListingResult,
};

/// Connect to the configured database and bring the schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    Ok(pool)
}
