//! Order repository. Orders are immutable snapshots written by the
//! checkout webhook; reads populate line items and shipping details.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use threadcart_core::{Money, OrderId, OrderStatus, ProductId, Size, UserId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::{Order, OrderLine, Product, ShippingAddress};

/// One frozen line of a new order.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub size: Size,
    pub quantity: i32,
}

/// Everything needed to materialize an order from a completed checkout.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    /// Charged total as reported by the payment provider.
    pub total: Money,
    pub payment_id: Option<String>,
    pub payer_id: Option<String>,
    pub address: ShippingAddress,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    status: String,
    total_cents: i64,
    payment_id: Option<String>,
    payer_id: Option<String>,
    ship_name: String,
    ship_street_address: String,
    ship_city: String,
    ship_region: String,
    ship_postal_code: String,
    ship_country: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: i32,
    size: String,
    quantity: i32,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderLine>) -> Result<Order, RepositoryError> {
        let status: OrderStatus = self.status.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("order {}: {e}", self.id))
        })?;
        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            status,
            total_amount: Money::from_cents(self.total_cents),
            payment_id: self.payment_id,
            payer_id: self.payer_id,
            items,
            address: ShippingAddress {
                name: self.ship_name,
                street_address: self.ship_street_address,
                city: self.ship_city,
                region: self.ship_region,
                postal_code: self.ship_postal_code,
                country: self.ship_country,
            },
            created_at: self.created_at,
        })
    }
}

impl TryFrom<OrderItemRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let size: Size = row
            .size
            .parse()
            .map_err(|e: String| RepositoryError::DataCorruption(format!("order item: {e}")))?;
        Ok(Self {
            product: Product::try_from(row.product)?,
            size,
            quantity: row.quantity,
        })
    }
}

/// Insert an order with its frozen line items. Takes a connection so the
/// webhook can bundle it with the idempotency record and the cart clear
/// in one transaction.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn create(conn: &mut PgConnection, order: &NewOrder) -> Result<OrderId, RepositoryError> {
    let (order_id,): (OrderId,) = sqlx::query_as(
        "INSERT INTO orders
            (user_id, total_cents, payment_id, payer_id,
             ship_name, ship_street_address, ship_city, ship_region,
             ship_postal_code, ship_country)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING id",
    )
    .bind(order.user_id)
    .bind(order.total.cents())
    .bind(order.payment_id.as_deref())
    .bind(order.payer_id.as_deref())
    .bind(&order.address.name)
    .bind(&order.address.street_address)
    .bind(&order.address.city)
    .bind(&order.address.region)
    .bind(&order.address.postal_code)
    .bind(&order.address.country)
    .fetch_one(&mut *conn)
    .await?;

    for item in &order.items {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, size, quantity)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.size.as_str())
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(order_id)
}

/// Fetch a user's orders, newest first, with populated line items.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure or unreadable rows.
pub async fn list_for_user(pool: &PgPool, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
    let order_rows = sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let item_rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT oi.order_id, oi.size, oi.quantity, p.*
         FROM order_items oi
         JOIN orders o ON o.id = oi.order_id
         JOIN products p ON p.id = oi.product_id
         WHERE o.user_id = $1
         ORDER BY oi.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut items_by_order: HashMap<i32, Vec<OrderLine>> = HashMap::new();
    for row in item_rows {
        let order_id = row.order_id;
        items_by_order
            .entry(order_id)
            .or_default()
            .push(OrderLine::try_from(row)?);
    }

    order_rows
        .into_iter()
        .map(|row| {
            let items = items_by_order.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect()
}
