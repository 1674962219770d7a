//! Read-through cache for filtered catalog queries.
//!
//! Keys are the `(category, type, sort)` triple of the browse endpoint.
//! Invalidation is coarse: any successful catalog write clears every key.
//! The cache is an optimization only; the read path falls through to the
//! database on a miss and never depends on a previous insert.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use threadcart_core::{Category, ClothingType};

use crate::models::Product;

/// Price sort order for catalog browsing. Unknown values fall back to
/// `Unsorted` rather than erroring, matching the query-string contract.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum PriceSort {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

impl PriceSort {
    /// Parse the `sort` query parameter.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("asc") => Self::Ascending,
            Some("desc") => Self::Descending,
            _ => Self::Unsorted,
        }
    }
}

/// Cache key for one filtered catalog query.
///
/// `None` filter fields mean "all", so the default bucket is
/// (all, all, unsorted).
#[derive(Debug, Clone, Hash, PartialEq, Eq, Default)]
pub struct CatalogKey {
    pub category: Option<Category>,
    pub clothing_type: Option<ClothingType>,
    pub sort: PriceSort,
}

/// The filtered-catalog cache. Values are shared result vectors.
pub type CatalogCache = Cache<CatalogKey, Arc<Vec<Product>>>;

/// Build the catalog cache with the configured TTL.
#[must_use]
pub fn build_catalog_cache(ttl: Duration) -> CatalogCache {
    Cache::builder()
        .max_capacity(256)
        .time_to_live(ttl)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sort_parses_known_values_and_defaults_the_rest() {
        assert_eq!(PriceSort::from_query(Some("asc")), PriceSort::Ascending);
        assert_eq!(PriceSort::from_query(Some("desc")), PriceSort::Descending);
        assert_eq!(PriceSort::from_query(Some("price")), PriceSort::Unsorted);
        assert_eq!(PriceSort::from_query(None), PriceSort::Unsorted);
    }

    #[test]
    fn default_key_is_the_all_bucket() {
        let key = CatalogKey::default();
        assert!(key.category.is_none());
        assert!(key.clothing_type.is_none());
        assert_eq!(key.sort, PriceSort::Unsorted);
    }

    #[tokio::test]
    async fn empty_results_are_cached_like_any_other() {
        let cache = build_catalog_cache(Duration::from_secs(60));
        let key = CatalogKey {
            category: Some(Category::Men),
            ..CatalogKey::default()
        };

        cache.insert(key.clone(), Arc::new(vec![])).await;

        let hit = cache.get(&key).await.expect("empty bucket should hit");
        assert!(hit.is_empty());
    }

    #[tokio::test]
    async fn invalidate_all_clears_every_key() {
        let cache = build_catalog_cache(Duration::from_secs(60));

        let men = CatalogKey {
            category: Some(Category::Men),
            ..CatalogKey::default()
        };
        cache.insert(CatalogKey::default(), Arc::new(vec![])).await;
        cache.insert(men.clone(), Arc::new(vec![])).await;
        assert!(cache.get(&men).await.is_some());

        // Coarse invalidation after a catalog write
        cache.invalidate_all();
        cache.run_pending_tasks().await;

        assert!(cache.get(&men).await.is_none());
        assert!(cache.get(&CatalogKey::default()).await.is_none());
    }
}
