//! Product media (image gallery) repository
//!
//! Every product has at most one main image; the remaining images form the
//! gallery in `sort_order`. The first image added to a product becomes its main
//! image, and removing the main image promotes the next one.

use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{CatalogError, Result};

/// A stored product image
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductImageRecord {
    pub product_image_id: i64,
    pub uuid: String,
    pub product_image_product_id: i64,
    pub image: String,
    pub is_main: bool,
    pub sort_order: i64,
}

pub struct MediaRepository {
    pool: SqlitePool,
}

impl MediaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All images of a product, main image first
    pub async fn list_for_product(&self, product_id: i64) -> Result<Vec<ProductImageRecord>> {
        let records = sqlx::query_as::<_, ProductImageRecord>(
            r#"
            SELECT product_image_id, uuid, product_image_product_id, image, is_main, sort_order
            FROM product_image
            WHERE product_image_product_id = ?
            ORDER BY is_main DESC, sort_order, product_image_id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Images of several products in one query, grouped by product and main image first
    pub async fn list_for_products(&self, product_ids: &[i64]) -> Result<Vec<ProductImageRecord>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; product_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT product_image_id, uuid, product_image_product_id, image, is_main, sort_order
            FROM product_image
            WHERE product_image_product_id IN ({})
            ORDER BY product_image_product_id, is_main DESC, sort_order, product_image_id
            "#,
            placeholders
        );

        let mut query = sqlx::query_as::<_, ProductImageRecord>(&sql);
        for id in product_ids {
            query = query.bind(*id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Append images to a product's gallery. Blank paths are skipped.
    pub async fn add_images(&self, product_id: i64, paths: &[String]) -> Result<Vec<ProductImageRecord>> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT product_id FROM product WHERE product_id = ?")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(CatalogError::ProductNotFound(product_id));
        }

        let (image_count, max_sort): (i64, Option<i64>) = sqlx::query_as(
            "SELECT COUNT(*), MAX(sort_order) FROM product_image WHERE product_image_product_id = ?",
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut next_sort = max_sort.map_or(0, |s| s + 1);
        let mut needs_main = image_count == 0;
        let mut added = 0usize;

        for path in paths.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            sqlx::query(
                r#"
                INSERT INTO product_image (uuid, product_image_product_id, image, is_main, sort_order)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(product_id)
            .bind(path)
            .bind(needs_main)
            .bind(next_sort)
            .execute(&mut *tx)
            .await?;

            needs_main = false;
            next_sort += 1;
            added += 1;
        }

        tx.commit().await?;
        info!(product_id, added, "Added product images");

        self.list_for_product(product_id).await
    }

    /// Remove an image by its unique id. Returns whether an image was deleted.
    pub async fn remove_image(&self, uuid: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, ProductImageRecord>(
            r#"
            SELECT product_image_id, uuid, product_image_product_id, image, is_main, sort_order
            FROM product_image
            WHERE uuid = ?
            "#,
        )
        .bind(uuid)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = record else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM product_image WHERE product_image_id = ?")
            .bind(record.product_image_id)
            .execute(&mut *tx)
            .await?;

        if record.is_main {
            sqlx::query(
                r#"
                UPDATE product_image SET is_main = 1
                WHERE product_image_id = (
                    SELECT product_image_id FROM product_image
                    WHERE product_image_product_id = ?
                    ORDER BY sort_order, product_image_id
                    LIMIT 1
                )
                "#,
            )
            .bind(record.product_image_product_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            product_id = record.product_image_product_id,
            image = %record.image,
            "Removed product image"
        );

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::seeded_database;

    fn paths(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_added_image_becomes_main() {
        let db = seeded_database().await;

        let images = db
            .media()
            .add_images(2, &paths(&["/catalog/blue-front.png", "  ", "/catalog/blue-back.png"]))
            .await
            .unwrap();

        assert_eq!(images.len(), 2);
        assert!(images[0].is_main);
        assert_eq!(images[0].image, "/catalog/blue-front.png");
        assert!(!images[1].is_main);
        assert_eq!(images[1].sort_order, 1);
    }

    #[tokio::test]
    async fn test_adding_to_missing_product_fails() {
        let db = seeded_database().await;

        let err = db
            .media()
            .add_images(404, &paths(&["/catalog/x.png"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::ProductNotFound(404)));
    }

    #[tokio::test]
    async fn test_removing_main_image_promotes_next() {
        let db = seeded_database().await;
        let media = db.media();

        let images = media
            .add_images(2, &paths(&["/catalog/a.png", "/catalog/b.png", "/catalog/c.png"]))
            .await
            .unwrap();
        let main_uuid = images[0].uuid.clone();

        assert!(media.remove_image(&main_uuid).await.unwrap());
        assert!(!media.remove_image(&main_uuid).await.unwrap());

        let remaining = media.list_for_product(2).await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining[0].is_main);
        assert_eq!(remaining[0].image, "/catalog/b.png");
    }
}
