//! Shipping address repository. One address per user.

use sqlx::PgPool;

use threadcart_core::UserId;

use super::RepositoryError;
use crate::models::Address;

/// Field set for creating or replacing a user's address.
#[derive(Debug, Clone)]
pub struct AddressData {
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    name: String,
    street_address: String,
    city: String,
    region: String,
    postal_code: String,
    country: String,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            name: row.name,
            street_address: row.street_address,
            city: row.city,
            region: row.region,
            postal_code: row.postal_code,
            country: row.country,
        }
    }
}

/// Fetch a user's address.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn find_by_user(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Option<Address>, RepositoryError> {
    let row = sqlx::query_as::<_, AddressRow>("SELECT * FROM addresses WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Address::from))
}

/// Insert a user's address. Fails with a unique violation if one exists;
/// callers check for an existing address first and report it as a
/// business-rule failure.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn create(
    pool: &PgPool,
    user_id: UserId,
    data: &AddressData,
) -> Result<Address, RepositoryError> {
    let row = sqlx::query_as::<_, AddressRow>(
        "INSERT INTO addresses
            (user_id, name, street_address, city, region, postal_code, country)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(user_id)
    .bind(&data.name)
    .bind(&data.street_address)
    .bind(&data.city)
    .bind(&data.region)
    .bind(&data.postal_code)
    .bind(&data.country)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// Replace a user's address fields. Returns `None` when the user has no
/// address on file.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn update(
    pool: &PgPool,
    user_id: UserId,
    data: &AddressData,
) -> Result<Option<Address>, RepositoryError> {
    let row = sqlx::query_as::<_, AddressRow>(
        "UPDATE addresses SET
            name = $2, street_address = $3, city = $4, region = $5,
            postal_code = $6, country = $7
         WHERE user_id = $1
         RETURNING *",
    )
    .bind(user_id)
    .bind(&data.name)
    .bind(&data.street_address)
    .bind(&data.city)
    .bind(&data.region)
    .bind(&data.postal_code)
    .bind(&data.country)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Address::from))
}

/// Delete a user's address. Returns whether a row was removed.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn delete(pool: &PgPool, user_id: UserId) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM addresses WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
