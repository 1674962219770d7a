//! Order history handler.

use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use threadcart_core::UserId;

use crate::db::orders;
use crate::error::{AppError, Result};
use crate::models::Order;
use crate::response::ApiResponse;
use crate::state::AppState;

/// `GET /api/orders/{userId}`
#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<ApiResponse<Vec<Order>>>> {
    let orders = orders::list_for_user(state.pool(), user_id).await?;
    if orders.is_empty() {
        return Err(AppError::NotFound(
            "No orders found for this user.".to_string(),
        ));
    }
    Ok(Json(ApiResponse::ok(orders)))
}
