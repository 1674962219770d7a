//! Shipping address handlers. One address per user; checkout requires one.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::instrument;

use threadcart_core::UserId;

use crate::db::addresses::{self, AddressData};
use crate::error::{AppError, Result};
use crate::models::Address;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    user_id: Option<UserId>,
    name: Option<String>,
    street_address: Option<String>,
    city: Option<String>,
    region: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAddressRequest {
    user_id: Option<UserId>,
}

/// `POST /api/address/add`
#[instrument(skip(state, payload))]
pub async fn add_address(
    State(state): State<AppState>,
    Json(payload): Json<AddressPayload>,
) -> Result<Json<ApiResponse<Address>>> {
    let Some(user_id) = payload.user_id else {
        return Ok(Json(ApiResponse::failure(
            "Please log in to save an address.",
        )));
    };
    let Some(data) = complete_fields(&payload) else {
        return Ok(Json(ApiResponse::failure(
            "All address fields are required.",
        )));
    };

    if addresses::find_by_user(state.pool(), user_id).await?.is_some() {
        return Ok(Json(ApiResponse::failure(
            "You already have an address saved. Edit it instead.",
        )));
    }

    let created = addresses::create(state.pool(), user_id, &data).await?;
    Ok(Json(ApiResponse::ok_with_message("Address saved.", created)))
}

/// `GET /api/address/{userId}`
#[instrument(skip(state))]
pub async fn fetch_address(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<ApiResponse<Address>>> {
    let address = addresses::find_by_user(state.pool(), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No address found for this user.".to_string()))?;
    Ok(Json(ApiResponse::ok(address)))
}

/// `PUT /api/address/update`
#[instrument(skip(state, payload))]
pub async fn update_address(
    State(state): State<AppState>,
    Json(payload): Json<AddressPayload>,
) -> Result<Json<ApiResponse<Address>>> {
    let Some(user_id) = payload.user_id else {
        return Ok(Json(ApiResponse::failure(
            "Please log in to update your address.",
        )));
    };
    let Some(data) = complete_fields(&payload) else {
        return Ok(Json(ApiResponse::failure(
            "All address fields are required.",
        )));
    };

    let existing = addresses::find_by_user(state.pool(), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No address found for this user.".to_string()))?;

    if is_noop_update(&existing, &data) {
        return Ok(Json(ApiResponse::failure(
            "No changes detected. Nothing to update.",
        )));
    }

    let updated = addresses::update(state.pool(), user_id, &data)
        .await?
        .ok_or_else(|| AppError::NotFound("No address found for this user.".to_string()))?;
    Ok(Json(ApiResponse::ok_with_message(
        "Address updated.",
        updated,
    )))
}

/// `DELETE /api/address`
#[instrument(skip(state, request))]
pub async fn delete_address(
    State(state): State<AppState>,
    Json(request): Json<DeleteAddressRequest>,
) -> Result<Json<ApiResponse<()>>> {
    let Some(user_id) = request.user_id else {
        return Ok(Json(ApiResponse::failure(
            "Please log in to delete your address.",
        )));
    };

    if !addresses::delete(state.pool(), user_id).await? {
        return Err(AppError::NotFound(
            "No address found for this user.".to_string(),
        ));
    }
    Ok(Json(ApiResponse::ok_message("Address deleted.")))
}

/// Collect the payload into a full field set; `None` when any field is
/// missing or blank.
fn complete_fields(payload: &AddressPayload) -> Option<AddressData> {
    fn required(field: Option<&String>) -> Option<String> {
        field
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    Some(AddressData {
        name: required(payload.name.as_ref())?,
        street_address: required(payload.street_address.as_ref())?,
        city: required(payload.city.as_ref())?,
        region: required(payload.region.as_ref())?,
        postal_code: required(payload.postal_code.as_ref())?,
        country: required(payload.country.as_ref())?,
    })
}

fn is_noop_update(existing: &Address, data: &AddressData) -> bool {
    existing.name == data.name
        && existing.street_address == data.street_address
        && existing.city == data.city
        && existing.region == data.region
        && existing.postal_code == data.postal_code
        && existing.country == data.country
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload() -> AddressPayload {
        AddressPayload {
            user_id: Some(UserId::new(1)),
            name: Some("Robin Tremblay".to_string()),
            street_address: Some("12 Rue Principale".to_string()),
            city: Some("Montreal".to_string()),
            region: Some("QC".to_string()),
            postal_code: Some("H2X 1Y4".to_string()),
            country: Some("Canada".to_string()),
        }
    }

    #[test]
    fn complete_payload_collects() {
        let data = complete_fields(&payload()).unwrap();
        assert_eq!(data.city, "Montreal");
    }

    #[test]
    fn blank_field_is_incomplete() {
        let mut p = payload();
        p.city = Some("   ".to_string());
        assert!(complete_fields(&p).is_none());
    }

    #[test]
    fn missing_field_is_incomplete() {
        let mut p = payload();
        p.country = None;
        assert!(complete_fields(&p).is_none());
    }
}
