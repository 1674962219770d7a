//! Cart repository. One cart per user; line items keyed by (product, size).

use sqlx::{PgConnection, PgPool};

use threadcart_core::{CartId, ProductId, Size, UserId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::{CartDetail, CartLine, Product};

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    size: String,
    quantity: i32,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl TryFrom<CartItemRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let size: Size = row
            .size
            .parse()
            .map_err(|e: String| RepositoryError::DataCorruption(format!("cart item: {e}")))?;
        Ok(Self {
            product: Product::try_from(row.product)?,
            size,
            quantity: row.quantity,
        })
    }
}

/// Look up the id of a user's cart, if one exists.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn find_cart_id(pool: &PgPool, user_id: UserId) -> Result<Option<CartId>, RepositoryError> {
    let id: Option<(CartId,)> = sqlx::query_as("SELECT id FROM carts WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(id.map(|(id,)| id))
}

/// Find the user's cart, creating an empty one if absent.
///
/// The upsert makes concurrent first-adds converge on one cart row.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn ensure(pool: &PgPool, user_id: UserId) -> Result<CartId, RepositoryError> {
    let (id,): (CartId,) = sqlx::query_as(
        "INSERT INTO carts (user_id) VALUES ($1)
         ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
         RETURNING id",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Fetch a user's cart with fully populated line items, or `None` when the
/// user has no cart yet.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure or unreadable rows.
pub async fn find_detail(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Option<CartDetail>, RepositoryError> {
    let Some(cart_id) = find_cart_id(pool, user_id).await? else {
        return Ok(None);
    };

    let rows = sqlx::query_as::<_, CartItemRow>(
        "SELECT ci.size, ci.quantity, p.*
         FROM cart_items ci
         JOIN products p ON p.id = ci.product_id
         WHERE ci.cart_id = $1
         ORDER BY ci.id",
    )
    .bind(cart_id)
    .fetch_all(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(CartLine::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(CartDetail {
        id: cart_id,
        user_id,
        items,
    }))
}

/// Add one unit of (product, size) to a cart. Inserts a new line at
/// quantity 1, or bumps the existing line atomically.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn add_item(
    pool: &PgPool,
    cart_id: CartId,
    product_id: ProductId,
    size: Size,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO cart_items (cart_id, product_id, size, quantity)
         VALUES ($1, $2, $3, 1)
         ON CONFLICT (cart_id, product_id, size)
         DO UPDATE SET quantity = cart_items.quantity + 1",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(size.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

/// Distinct sizes of a product currently in the cart. Lets callers
/// disambiguate quantity changes that arrive without a size.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn sizes_for_product(
    pool: &PgPool,
    cart_id: CartId,
    product_id: ProductId,
) -> Result<Vec<Size>, RepositoryError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT size FROM cart_items WHERE cart_id = $1 AND product_id = $2 ORDER BY size",
    )
    .bind(cart_id)
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(s,)| {
            s.parse()
                .map_err(|e: String| RepositoryError::DataCorruption(format!("cart item: {e}")))
        })
        .collect()
}

/// Bump one line's quantity by one. Returns whether the line existed.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn increase(
    pool: &PgPool,
    cart_id: CartId,
    product_id: ProductId,
    size: Size,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        "UPDATE cart_items SET quantity = quantity + 1
         WHERE cart_id = $1 AND product_id = $2 AND size = $3",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(size.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Drop one line's quantity by one, removing the line when it reaches
/// zero. Returns whether the line existed.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn decrease(
    pool: &PgPool,
    cart_id: CartId,
    product_id: ProductId,
    size: Size,
) -> Result<bool, RepositoryError> {
    let mut tx = pool.begin().await?;

    // The schema forbids zero quantities, so a line at 1 is deleted
    // rather than decremented.
    let updated = sqlx::query(
        "UPDATE cart_items SET quantity = quantity - 1
         WHERE cart_id = $1 AND product_id = $2 AND size = $3 AND quantity > 1",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(size.as_str())
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() > 0 {
        tx.commit().await?;
        return Ok(true);
    }

    let deleted = sqlx::query(
        "DELETE FROM cart_items
         WHERE cart_id = $1 AND product_id = $2 AND size = $3",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(size.as_str())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(deleted.rows_affected() > 0)
}

/// Remove one (product, size) line entirely, whatever its quantity.
/// Returns whether a line was removed.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn remove_item(
    pool: &PgPool,
    cart_id: CartId,
    product_id: ProductId,
    size: Size,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        "DELETE FROM cart_items
         WHERE cart_id = $1 AND product_id = $2 AND size = $3",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(size.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete every line in a cart. Takes a connection so order placement can
/// run it inside the same transaction as the order insert.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn clear(conn: &mut PgConnection, cart_id: CartId) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
        .bind(cart_id)
        .execute(conn)
        .await?;
    Ok(())
}
