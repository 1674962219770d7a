//! Cart handlers.
//!
//! Every mutation answers with the refreshed cart plus the
//! `totalItems`/`totalCost` aggregates so clients re-render from one
//! response. Validation outcomes ride inside the envelope as
//! `success: false`; only infrastructure faults become error statuses.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use threadcart_core::{CartId, ProductId, Size, UserId};

use crate::db::carts;
use crate::db::products;
use crate::error::{AppError, Result};
use crate::response::CartResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuery {
    user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    user_id: Option<UserId>,
    product_id: Option<ProductId>,
    size: Option<Size>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustQuantityRequest {
    user_id: Option<UserId>,
    product_id: Option<ProductId>,
    /// Optional for older clients; required once the product sits in the
    /// cart in more than one size.
    size: Option<Size>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    user_id: Option<UserId>,
    size: Option<Size>,
}

/// `GET /api/cart?userId=`
#[instrument(skip(state))]
pub async fn fetch_cart(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartResponse>> {
    let Some(user_id) = query.user_id else {
        return Ok(Json(CartResponse::empty(
            "Please log in to view your cart.",
        )));
    };

    match carts::find_detail(state.pool(), user_id).await? {
        Some(cart) => Ok(Json(CartResponse::from_cart(cart))),
        None => Ok(Json(CartResponse::empty("No cart found for this user."))),
    }
}

/// `POST /api/cart/add`
#[instrument(skip(state, request))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartResponse>> {
    let Some(user_id) = request.user_id else {
        return Ok(Json(CartResponse::empty(
            "Please log in to add items to your cart.",
        )));
    };
    let Some(product_id) = request.product_id else {
        return Ok(Json(CartResponse::empty("Product not found.")));
    };
    let Some(size) = request.size else {
        return Ok(Json(CartResponse::empty("Please select a size.")));
    };

    if products::find(state.pool(), product_id).await?.is_none() {
        return Ok(Json(CartResponse::empty("Product not found.")));
    }

    let cart_id = carts::ensure(state.pool(), user_id).await?;
    carts::add_item(state.pool(), cart_id, product_id, size).await?;

    let cart = loaded_cart(&state, user_id).await?;
    Ok(Json(CartResponse::from_cart_with_message(
        "Item added to cart.",
        cart,
    )))
}

/// `POST /api/cart/increase`
#[instrument(skip(state, request))]
pub async fn increase_quantity(
    State(state): State<AppState>,
    Json(request): Json<AdjustQuantityRequest>,
) -> Result<Json<CartResponse>> {
    adjust_quantity(state, request, QuantityChange::Increase).await
}

/// `POST /api/cart/decrease`
///
/// A line that reaches zero quantity is removed from the cart.
#[instrument(skip(state, request))]
pub async fn decrease_quantity(
    State(state): State<AppState>,
    Json(request): Json<AdjustQuantityRequest>,
) -> Result<Json<CartResponse>> {
    adjust_quantity(state, request, QuantityChange::Decrease).await
}

/// `DELETE /api/cart/remove/{productId}`
#[instrument(skip(state, request))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(request): Json<RemoveItemRequest>,
) -> Result<Json<CartResponse>> {
    let Some(user_id) = request.user_id else {
        return Ok(Json(CartResponse::empty(
            "Please log in to manage your cart.",
        )));
    };
    let Some(size) = request.size else {
        return Ok(Json(CartResponse::empty("Please select a size.")));
    };

    let Some(cart_id) = carts::find_cart_id(state.pool(), user_id).await? else {
        return Err(AppError::NotFound("Cart not found.".to_string()));
    };

    // Idempotent: removing an absent line still returns the current cart.
    carts::remove_item(state.pool(), cart_id, product_id, size).await?;

    let cart = loaded_cart(&state, user_id).await?;
    Ok(Json(CartResponse::from_cart_with_message(
        "Item removed from cart.",
        cart,
    )))
}

#[derive(Debug, Clone, Copy)]
enum QuantityChange {
    Increase,
    Decrease,
}

async fn adjust_quantity(
    state: AppState,
    request: AdjustQuantityRequest,
    change: QuantityChange,
) -> Result<Json<CartResponse>> {
    let Some(user_id) = request.user_id else {
        return Ok(Json(CartResponse::empty(
            "Please log in to manage your cart.",
        )));
    };
    let Some(product_id) = request.product_id else {
        return Ok(Json(CartResponse::empty("Product not found.")));
    };

    let Some(cart_id) = carts::find_cart_id(state.pool(), user_id).await? else {
        return Ok(Json(CartResponse::empty("No cart found for this user.")));
    };

    let size = match resolve_size(&state, cart_id, product_id, request.size).await? {
        SizeResolution::One(size) => size,
        SizeResolution::Missing => {
            return Ok(Json(CartResponse::empty("Item not found in cart.")));
        }
        SizeResolution::Ambiguous => {
            return Ok(Json(CartResponse::empty(
                "This item is in your cart in several sizes. Please specify one.",
            )));
        }
    };

    let found = match change {
        QuantityChange::Increase => {
            carts::increase(state.pool(), cart_id, product_id, size).await?
        }
        QuantityChange::Decrease => {
            carts::decrease(state.pool(), cart_id, product_id, size).await?
        }
    };
    if !found {
        return Ok(Json(CartResponse::empty("Item not found in cart.")));
    }

    let cart = loaded_cart(&state, user_id).await?;
    Ok(Json(CartResponse::from_cart_with_message(
        "Quantity updated.",
        cart,
    )))
}

enum SizeResolution {
    One(Size),
    Missing,
    Ambiguous,
}

/// Pick the cart line's size when the request leaves it out. Unambiguous
/// only when the product sits in the cart in exactly one size.
async fn resolve_size(
    state: &AppState,
    cart_id: CartId,
    product_id: ProductId,
    requested: Option<Size>,
) -> Result<SizeResolution> {
    if let Some(size) = requested {
        return Ok(SizeResolution::One(size));
    }

    let sizes = carts::sizes_for_product(state.pool(), cart_id, product_id).await?;
    match sizes.as_slice() {
        [] => Ok(SizeResolution::Missing),
        [only] => Ok(SizeResolution::One(*only)),
        _ => Ok(SizeResolution::Ambiguous),
    }
}

async fn loaded_cart(
    state: &AppState,
    user_id: UserId,
) -> Result<crate::models::CartDetail> {
    carts::find_detail(state.pool(), user_id)
        .await?
        .ok_or_else(|| AppError::Internal("cart vanished mid-request".to_string()))
}
