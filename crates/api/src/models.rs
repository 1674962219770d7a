//! Domain models exchanged between repositories, handlers, and responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use threadcart_core::{
    AddressId, CartId, Category, ClothingType, Money, OrderId, OrderStatus, ProductId, Size,
    SizeStock, UserId,
};

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: Category,
    pub clothing_type: ClothingType,
    pub size_stock: SizeStock,
    pub image_url: String,
    pub image_public_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One cart line: a (product, size) pair with its quantity.
///
/// The product is populated, not a bare reference, so handlers can compute
/// cost aggregates and clients can render names and images directly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: Product,
    pub size: Size,
    pub quantity: i32,
}

/// A user's cart with populated line items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDetail {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartLine>,
}

impl CartDetail {
    /// Sum of quantities across all line items.
    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.items.iter().map(|line| i64::from(line.quantity)).sum()
    }

    /// Sum of `price x quantity` across all line items, in exact cents.
    #[must_use]
    pub fn total_cost(&self) -> Money {
        self.items
            .iter()
            .map(|line| line.product.price.times(i64::from(line.quantity)))
            .fold(Money::ZERO, |acc, line_total| acc.plus(line_total))
    }

    /// Whether the cart holds no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A user's shipping address. One per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

/// Shipping details frozen onto an order at purchase time. Later edits to
/// the user's address leave placed orders untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

impl From<&Address> for ShippingAddress {
    fn from(address: &Address) -> Self {
        Self {
            name: address.name.clone(),
            street_address: address.street_address.clone(),
            city: address.city.clone(),
            region: address.region.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
        }
    }
}

/// One order line frozen at purchase time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product: Product,
    pub size: Size,
    pub quantity: i32,
}

/// A placed order with its snapshot items and shipping address populated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    /// The provider's authoritative charged total, not a recomputation.
    pub total_amount: Money,
    pub payment_id: Option<String>,
    pub payer_id: Option<String>,
    pub items: Vec<OrderLine>,
    pub address: ShippingAddress,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            description: "test".to_string(),
            price: Money::parse(price).unwrap(),
            category: Category::Men,
            clothing_type: ClothingType::Shirt,
            size_stock: SizeStock::empty(),
            image_url: "https://img.example/p.jpg".to_string(),
            image_public_id: "p".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn aggregates_follow_price_times_quantity() {
        // {productA, size M, qty 2} at 25.00 -> totalItems=2, totalCost="50.00"
        let cart = CartDetail {
            id: CartId::new(1),
            user_id: UserId::new(1),
            items: vec![CartLine {
                product: product(1, "25.00"),
                size: Size::M,
                quantity: 2,
            }],
        };
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_cost().to_string(), "50.00");
    }

    #[test]
    fn aggregates_sum_across_lines() {
        let cart = CartDetail {
            id: CartId::new(1),
            user_id: UserId::new(1),
            items: vec![
                CartLine {
                    product: product(1, "19.99"),
                    size: Size::S,
                    quantity: 3,
                },
                CartLine {
                    product: product(2, "5.50"),
                    size: Size::Xl,
                    quantity: 1,
                },
            ],
        };
        assert_eq!(cart.total_items(), 4);
        // 59.97 + 5.50
        assert_eq!(cart.total_cost().to_string(), "65.47");
    }

    #[test]
    fn empty_cart_has_zero_aggregates() {
        let cart = CartDetail {
            id: CartId::new(1),
            user_id: UserId::new(1),
            items: vec![],
        };
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_cost().to_string(), "0.00");
    }
}
