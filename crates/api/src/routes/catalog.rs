//! Catalog handlers: public reads plus admin CRUD.
//!
//! Filtered browsing goes through the moka cache; any successful write
//! invalidates every cached bucket. The cache is purely an optimization,
//! so a miss always falls through to the database.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use threadcart_core::{Category, ClothingType, Money, ProductId, SizeStock};

use crate::cache::{CatalogKey, PriceSort};
use crate::db::products::{self, ProductData};
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    category: Option<String>,
    #[serde(rename = "type")]
    clothing_type: Option<String>,
    sort: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    name: String,
    description: String,
    price: Money,
    category: Category,
    clothing_type: ClothingType,
    size_stock: SizeStock,
    image_url: String,
    image_public_id: String,
}

impl From<ProductPayload> for ProductData {
    fn from(payload: ProductPayload) -> Self {
        Self {
            name: payload.name,
            description: payload.description,
            price: payload.price,
            category: payload.category,
            clothing_type: payload.clothing_type,
            size_stock: payload.size_stock,
            image_url: payload.image_url,
            image_public_id: payload.image_public_id,
        }
    }
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let all = products::list_all(state.pool()).await?;
    Ok(Json(ApiResponse::ok(all)))
}

/// `GET /api/products/{id}`
#[instrument(skip(state))]
pub async fn fetch_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = products::find(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;
    Ok(Json(ApiResponse::ok(product)))
}

/// `GET /api/products/browse?category=&type=&sort=`
#[instrument(skip(state))]
pub async fn browse(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let key = browse_key(&query)?;

    if let Some(cached) = state.catalog_cache().get(&key).await {
        return Ok(Json(ApiResponse::ok((*cached).clone())));
    }

    let found = products::browse(
        state.pool(),
        key.category,
        key.clothing_type,
        key.sort,
    )
    .await?;

    // Catalog writes invalidate every bucket, so even an empty result is
    // safe to cache for the TTL.
    state
        .catalog_cache()
        .insert(key, Arc::new(found.clone()))
        .await;

    Ok(Json(ApiResponse::ok(found)))
}

/// `POST /api/products`
#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ApiResponse<Product>>> {
    let created = products::create(state.pool(), &payload.into()).await?;
    state.catalog_cache().invalidate_all();
    Ok(Json(ApiResponse::ok_with_message(
        "Product created.",
        created,
    )))
}

/// `PUT /api/products/{id}`
#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ApiResponse<Product>>> {
    let existing = products::find(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;

    let data = ProductData::from(payload);
    if is_noop_update(&existing, &data) {
        return Ok(Json(ApiResponse::failure(
            "No changes detected. Nothing to update.",
        )));
    }

    let updated = products::update(state.pool(), id, &data)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;
    state.catalog_cache().invalidate_all();
    Ok(Json(ApiResponse::ok_with_message(
        "Product updated.",
        updated,
    )))
}

/// `DELETE /api/products/{id}`
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ApiResponse<()>>> {
    if !products::delete(state.pool(), id).await? {
        return Err(AppError::NotFound("Product not found.".to_string()));
    }
    state.catalog_cache().invalidate_all();
    Ok(Json(ApiResponse::ok_message("Product deleted.")))
}

fn browse_key(query: &BrowseQuery) -> Result<CatalogKey> {
    let category = query
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .map_err(AppError::BadRequest)?;
    let clothing_type = query
        .clothing_type
        .as_deref()
        .map(str::parse::<ClothingType>)
        .transpose()
        .map_err(AppError::BadRequest)?;
    let sort = PriceSort::from_query(query.sort.as_deref());

    Ok(CatalogKey {
        category,
        clothing_type,
        sort,
    })
}

fn is_noop_update(existing: &Product, data: &ProductData) -> bool {
    existing.name == data.name
        && existing.description == data.description
        && existing.price == data.price
        && existing.category == data.category
        && existing.clothing_type == data.clothing_type
        && existing.size_stock == data.size_stock
        && existing.image_url == data.image_url
        && existing.image_public_id == data.image_public_id
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn existing() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Box Logo Tee".to_string(),
            description: "Heavyweight cotton".to_string(),
            price: Money::parse("25.00").unwrap(),
            category: Category::Men,
            clothing_type: ClothingType::Shirt,
            size_stock: SizeStock::empty(),
            image_url: "https://img.example/tee.jpg".to_string(),
            image_public_id: "tee".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn same_data() -> ProductData {
        ProductData {
            name: "Box Logo Tee".to_string(),
            description: "Heavyweight cotton".to_string(),
            price: Money::parse("25.00").unwrap(),
            category: Category::Men,
            clothing_type: ClothingType::Shirt,
            size_stock: SizeStock::empty(),
            image_url: "https://img.example/tee.jpg".to_string(),
            image_public_id: "tee".to_string(),
        }
    }

    #[test]
    fn identical_payload_is_a_noop() {
        assert!(is_noop_update(&existing(), &same_data()));
    }

    #[test]
    fn price_change_is_not_a_noop() {
        let mut data = same_data();
        data.price = Money::parse("29.00").unwrap();
        assert!(!is_noop_update(&existing(), &data));
    }

    #[test]
    fn browse_key_parses_filters() {
        let key = browse_key(&BrowseQuery {
            category: Some("women".to_string()),
            clothing_type: Some("hoodies".to_string()),
            sort: Some("desc".to_string()),
        })
        .unwrap();
        assert_eq!(key.category, Some(Category::Women));
        assert_eq!(key.clothing_type, Some(ClothingType::Hoodies));
        assert_eq!(key.sort, PriceSort::Descending);
    }

    #[test]
    fn browse_key_rejects_unknown_category() {
        let result = browse_key(&BrowseQuery {
            category: Some("menswear".to_string()),
            clothing_type: None,
            sort: None,
        });
        assert!(result.is_err());
    }
}
