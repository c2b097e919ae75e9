//! Database operations for the console.
//!
//! ## Tables
//!
//! - `store` - Tenants, owned by an identity-provider subject
//! - `billboard`, `category`, `size`, `color` - Store catalog metadata
//! - `product`, `product_size`, `product_color`, `image` - Products and their attributes
//! - `review` - Shopper reviews
//! - `client`, `address` - Shoppers who completed a checkout
//! - `orders`, `order_item` - Orders and line items with price snapshots
//!
//! Every store-owned table cascades on store delete, and
//! `StoreRepository::delete` clears orders and products first. References
//! between catalog rows do not cascade, so deleting something still in use
//! is a conflict.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p storeroom-cli -- migrate
//! ```

pub mod analytics;
pub mod attributes;
pub mod billboards;
pub mod categories;
pub mod clients;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod stores;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use analytics::AnalyticsRepository;
pub use attributes::{ColorRepository, SizeRepository};
pub use billboards::BillboardRepository;
pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use stores::StoreRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., deleting a billboard a category uses).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map foreign-key and unique violations to [`RepositoryError::Conflict`].
///
/// `message` is what the caller sees; it should name what blocked the write.
pub(crate) fn conflict_on_constraint(err: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && (db_err.is_foreign_key_violation() || db_err.is_unique_violation())
    {
        tracing::debug!(constraint = ?db_err.constraint(), "write blocked by constraint");
        return RepositoryError::Conflict(message.to_string());
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
