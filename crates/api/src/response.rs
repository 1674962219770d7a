//! Response envelopes.
//!
//! Every endpoint answers with a `{success, message?, data?}` envelope;
//! cart endpoints additionally carry the `totalItems`/`totalCost`
//! aggregates. Business-rule failures are expressed as `success: false`
//! inside a 200 response; callers check the flag, not the HTTP status.

use serde::Serialize;

use threadcart_core::Money;

use crate::models::CartDetail;

/// Generic `{success, message, data}` envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A successful response carrying data.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// A successful response carrying data and a user-facing message.
    #[must_use]
    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// A successful response carrying only a message (deletes and other
    /// operations with nothing to return).
    #[must_use]
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    /// A business-rule rejection; travels as HTTP 200 with `success: false`.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Cart envelope with the aggregate fields every cart operation returns.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CartDetail>,
    pub total_items: i64,
    /// Fixed two-decimal string, e.g. "50.00".
    pub total_cost: Money,
}

impl CartResponse {
    /// Successful cart response; aggregates are derived from the cart.
    #[must_use]
    pub fn from_cart(cart: CartDetail) -> Self {
        let total_items = cart.total_items();
        let total_cost = cart.total_cost();
        Self {
            success: true,
            message: None,
            data: Some(cart),
            total_items,
            total_cost,
        }
    }

    /// Successful cart response with a user-facing message.
    #[must_use]
    pub fn from_cart_with_message(message: impl Into<String>, cart: CartDetail) -> Self {
        let mut response = Self::from_cart(cart);
        response.message = Some(message.into());
        response
    }

    /// No cart exists yet: empty data and zero aggregates, not an error.
    #[must_use]
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            total_items: 0,
            total_cost: Money::ZERO,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use threadcart_core::{CartId, UserId};

    #[test]
    fn failure_omits_data() {
        let envelope: ApiResponse<()> = ApiResponse::failure("Please select a size");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Please select a size");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn ok_omits_message() {
        let envelope = ApiResponse::ok(vec![1, 2, 3]);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("message").is_none());
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn empty_cart_response_has_zero_aggregates() {
        let response = CartResponse::empty("No cart found for this user.");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["totalItems"], 0);
        assert_eq!(json["totalCost"], "0.00");
    }

    #[test]
    fn cart_response_uses_camel_case_aggregates() {
        let cart = CartDetail {
            id: CartId::new(1),
            user_id: UserId::new(9),
            items: vec![],
        };
        let json = serde_json::to_value(CartResponse::from_cart(cart)).unwrap();
        assert!(json.get("totalItems").is_some());
        assert!(json.get("totalCost").is_some());
        assert_eq!(json["data"]["userId"], 9);
    }
}
