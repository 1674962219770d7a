//! Catalog product repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use threadcart_core::{Category, ClothingType, Money, ProductId, SizeStock};

use super::RepositoryError;
use crate::cache::PriceSort;
use crate::models::Product;

/// Raw product row as stored.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category: String,
    pub clothing_type: String,
    pub size_stock: serde_json::Value,
    pub image_url: String,
    pub image_public_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category: Category = row.category.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
        })?;
        let clothing_type: ClothingType = row.clothing_type.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
        })?;
        let size_stock: SizeStock = serde_json::from_value(row.size_stock).map_err(|e| {
            RepositoryError::DataCorruption(format!("product {}: invalid size stock: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Money::from_cents(row.price_cents),
            category,
            clothing_type,
            size_stock,
            image_url: row.image_url,
            image_public_id: row.image_public_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Field set for creating or replacing a product.
#[derive(Debug, Clone)]
pub struct ProductData {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: Category,
    pub clothing_type: ClothingType,
    pub size_stock: SizeStock,
    pub image_url: String,
    pub image_public_id: String,
}

fn size_stock_json(stock: &SizeStock) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(stock)
        .map_err(|e| RepositoryError::DataCorruption(format!("unserializable size stock: {e}")))
}

/// Fetch every product.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure or unreadable rows.
pub async fn list_all(pool: &PgPool) -> Result<Vec<Product>, RepositoryError> {
    let rows = sqlx::query_as::<_, ProductRow>("SELECT * FROM products ORDER BY id")
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(Product::try_from).collect()
}

/// Fetch one product by id.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure or an unreadable row.
pub async fn find(pool: &PgPool, id: ProductId) -> Result<Option<Product>, RepositoryError> {
    let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(Product::try_from).transpose()
}

/// Fetch products filtered by category and clothing type, optionally
/// sorted by price. `None` filters mean "all".
///
/// # Errors
///
/// Returns `RepositoryError` on query failure or unreadable rows.
pub async fn browse(
    pool: &PgPool,
    category: Option<Category>,
    clothing_type: Option<ClothingType>,
    sort: PriceSort,
) -> Result<Vec<Product>, RepositoryError> {
    let query = match sort {
        PriceSort::Unsorted => {
            "SELECT * FROM products
             WHERE ($1::text IS NULL OR category = $1)
               AND ($2::text IS NULL OR clothing_type = $2)
             ORDER BY id"
        }
        PriceSort::Ascending => {
            "SELECT * FROM products
             WHERE ($1::text IS NULL OR category = $1)
               AND ($2::text IS NULL OR clothing_type = $2)
             ORDER BY price_cents ASC, id"
        }
        PriceSort::Descending => {
            "SELECT * FROM products
             WHERE ($1::text IS NULL OR category = $1)
               AND ($2::text IS NULL OR clothing_type = $2)
             ORDER BY price_cents DESC, id"
        }
    };

    let rows = sqlx::query_as::<_, ProductRow>(query)
        .bind(category.map(|c| c.as_str()))
        .bind(clothing_type.map(|t| t.as_str()))
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(Product::try_from).collect()
}

/// Insert a new product.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn create(pool: &PgPool, data: &ProductData) -> Result<Product, RepositoryError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products
            (name, description, price_cents, category, clothing_type,
             size_stock, image_url, image_public_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price.cents())
    .bind(data.category.as_str())
    .bind(data.clothing_type.as_str())
    .bind(size_stock_json(&data.size_stock)?)
    .bind(&data.image_url)
    .bind(&data.image_public_id)
    .fetch_one(pool)
    .await?;

    Product::try_from(row)
}

/// Replace an existing product's fields. Returns `None` when the product
/// does not exist.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn update(
    pool: &PgPool,
    id: ProductId,
    data: &ProductData,
) -> Result<Option<Product>, RepositoryError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "UPDATE products SET
            name = $2, description = $3, price_cents = $4, category = $5,
            clothing_type = $6, size_stock = $7, image_url = $8,
            image_public_id = $9, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price.cents())
    .bind(data.category.as_str())
    .bind(data.clothing_type.as_str())
    .bind(size_stock_json(&data.size_stock)?)
    .bind(&data.image_url)
    .bind(&data.image_public_id)
    .fetch_optional(pool)
    .await?;

    row.map(Product::try_from).transpose()
}

/// Delete a product. Returns whether a row was removed.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn delete(pool: &PgPool, id: ProductId) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(category: &str, clothing_type: &str, size_stock: serde_json::Value) -> ProductRow {
        ProductRow {
            id: 1,
            name: "Box Logo Tee".to_string(),
            description: "Heavyweight cotton".to_string(),
            price_cents: 2500,
            category: category.to_string(),
            clothing_type: clothing_type.to_string(),
            size_stock,
            image_url: "https://img.example/tee.jpg".to_string(),
            image_public_id: "tee".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_domain_product() {
        let stock = serde_json::json!({"xs":0,"s":1,"m":2,"l":3,"xl":0,"2xl":0});
        let product = Product::try_from(row("men", "shirt", stock)).unwrap();
        assert_eq!(product.category, Category::Men);
        assert_eq!(product.price.to_string(), "25.00");
        assert_eq!(product.size_stock.total(), 6);
    }

    #[test]
    fn invalid_stored_category_is_data_corruption() {
        let stock = serde_json::json!({"xs":0,"s":0,"m":0,"l":0,"xl":0,"2xl":0});
        let err = Product::try_from(row("menswear", "shirt", stock)).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn incomplete_stored_size_stock_is_data_corruption() {
        let stock = serde_json::json!({"xs":0,"s":0});
        let err = Product::try_from(row("men", "shirt", stock)).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
