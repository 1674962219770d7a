//! Checkout session handler.
//!
//! Builds a Stripe hosted-checkout session from the user's cart. Prices
//! travel as exact cent amounts; the user id and shipping fields ride in
//! session metadata so the completion webhook can materialize the order.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use threadcart_core::UserId;

use crate::db::{addresses, carts};
use crate::error::Result;
use crate::models::{Address, CartDetail};
use crate::response::ApiResponse;
use crate::services::stripe::CheckoutLineItem;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// `POST /api/checkout/session`
#[instrument(skip(state, request))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<ApiResponse<SessionData>>> {
    let Some(user_id) = request.user_id else {
        return Ok(Json(ApiResponse::failure("Please log in to check out.")));
    };

    let Some(address) = addresses::find_by_user(state.pool(), user_id).await? else {
        return Ok(Json(ApiResponse::failure(
            "Please add a shipping address before checking out.",
        )));
    };

    let cart = carts::find_detail(state.pool(), user_id).await?;
    let Some(cart) = cart.filter(|c| !c.is_empty()) else {
        return Ok(Json(ApiResponse::failure("Your cart is empty.")));
    };

    let config = state.config();
    let line_items = line_items_for(&cart);
    let metadata = session_metadata(user_id, &address);
    let success_url = format!("{}/user/cart?success=true", config.client_origin);
    let cancel_url = format!("{}/user/cart?cancelled=true", config.client_origin);

    let session = state
        .stripe()
        .create_checkout_session(
            &config.currency,
            &line_items,
            &success_url,
            &cancel_url,
            &metadata,
        )
        .await?;

    tracing::info!(%user_id, session_id = %session.id, "checkout session created");

    Ok(Json(ApiResponse::ok(SessionData {
        session_id: session.id,
        url: session.url,
    })))
}

fn line_items_for(cart: &CartDetail) -> Vec<CheckoutLineItem> {
    cart.items
        .iter()
        .map(|line| CheckoutLineItem {
            name: line.product.name.clone(),
            description: format!("Size: {}", line.size),
            unit_amount_cents: line.product.price.cents(),
            quantity: i64::from(line.quantity),
        })
        .collect()
}

fn session_metadata(user_id: UserId, address: &Address) -> Vec<(String, String)> {
    vec![
        ("userId".to_string(), user_id.to_string()),
        ("name".to_string(), address.name.clone()),
        ("streetAddress".to_string(), address.street_address.clone()),
        ("city".to_string(), address.city.clone()),
        ("region".to_string(), address.region.clone()),
        ("postalCode".to_string(), address.postal_code.clone()),
        ("country".to_string(), address.country.clone()),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use threadcart_core::{
        AddressId, CartId, Category, ClothingType, Money, ProductId, Size, SizeStock,
    };

    use crate::models::{CartLine, Product};

    fn cart() -> CartDetail {
        let product = Product {
            id: ProductId::new(3),
            name: "Fleece Hoodie".to_string(),
            description: "Brushed interior".to_string(),
            price: Money::parse("64.99").unwrap(),
            category: Category::Unisex,
            clothing_type: ClothingType::Hoodies,
            size_stock: SizeStock::empty(),
            image_url: "https://img.example/hoodie.jpg".to_string(),
            image_public_id: "hoodie".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        CartDetail {
            id: CartId::new(1),
            user_id: UserId::new(8),
            items: vec![CartLine {
                product,
                size: Size::L,
                quantity: 2,
            }],
        }
    }

    #[test]
    fn line_items_carry_exact_cents_and_size() {
        let items = line_items_for(&cart());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_amount_cents, 6499);
        assert_eq!(items[0].description, "Size: l");
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn metadata_carries_user_and_shipping_fields() {
        let address = Address {
            id: AddressId::new(1),
            user_id: UserId::new(8),
            name: "Robin Tremblay".to_string(),
            street_address: "12 Rue Principale".to_string(),
            city: "Montreal".to_string(),
            region: "QC".to_string(),
            postal_code: "H2X 1Y4".to_string(),
            country: "Canada".to_string(),
        };
        let metadata = session_metadata(UserId::new(8), &address);
        assert!(metadata.contains(&("userId".to_string(), "8".to_string())));
        assert!(metadata.contains(&("postalCode".to_string(), "H2X 1Y4".to_string())));
    }
}
