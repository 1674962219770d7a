//! Database access for the cart/checkout service.
//!
//! # Tables
//!
//! - `products` - Catalog entries with per-size stock
//! - `carts` / `cart_items` - One cart per user; one row per (product, size)
//! - `addresses` - One shipping address per user
//! - `orders` / `order_items` - Immutable purchase snapshots
//! - `processed_webhook_events` - Webhook idempotency guard
//!
//! Queries use `sqlx::query`/`query_as` with `FromRow` row structs; rows
//! are converted into domain models with `TryFrom`, surfacing invalid
//! stored enums as `RepositoryError::DataCorruption`.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod addresses;
pub mod carts;
pub mod orders;
pub mod products;
pub mod webhook_events;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be interpreted (bad enum text, bad JSON).
    #[error("data corruption: {0}")]
    DataCorruption(String),
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
