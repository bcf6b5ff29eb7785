//! DataLoaders for batching per-product lookups
//!
//! `Product.image` and `Product.gallery` call `load_one(product_id)`; the
//! DataLoader collects the ids requested in the same tick and runs a single
//! `WHERE product_image_product_id IN (...)` query for all of them.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dataloader::Loader;

use crate::db::{Database, ProductImageRecord};
use crate::error::CatalogError;

/// Loads product images keyed by product id, main image first
pub struct ProductImageLoader {
    db: Database,
}

impl ProductImageLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i64> for ProductImageLoader {
    type Value = Vec<ProductImageRecord>;
    type Error = Arc<CatalogError>;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        tracing::debug!(product_count = keys.len(), "Batch loading product images");

        let records = self.db.media().list_for_products(keys).await.map_err(Arc::new)?;

        let mut result: HashMap<i64, Vec<ProductImageRecord>> =
            keys.iter().map(|id| (*id, Vec::new())).collect();
        for record in records {
            if let Some(images) = result.get_mut(&record.product_image_product_id) {
                images.push(record);
            }
        }

        Ok(result)
    }
}
