//! HTTP routes.

use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::state::AppState;

pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod webhook;

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route(
            "/api/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route("/api/products/browse", get(catalog::browse))
        .route(
            "/api/products/{id}",
            get(catalog::fetch_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route("/api/cart", get(cart::fetch_cart))
        .route("/api/cart/add", post(cart::add_to_cart))
        .route("/api/cart/increase", post(cart::increase_quantity))
        .route("/api/cart/decrease", post(cart::decrease_quantity))
        .route("/api/cart/remove/{product_id}", delete(cart::remove_from_cart))
        .route("/api/address/add", post(address::add_address))
        .route("/api/address/update", put(address::update_address))
        .route("/api/address/{user_id}", get(address::fetch_address))
        .route("/api/address", delete(address::delete_address))
        .route("/api/checkout/session", post(checkout::create_session))
        .route("/api/orders/{user_id}", get(orders::list_orders))
        .route("/api/webhook/checkout", post(webhook::checkout_completed))
        .route("/api/webhook/test", get(webhook::reachability))
        .with_state(state)
}
