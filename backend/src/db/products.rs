//! Product database repository

use sqlx::SqlitePool;

use super::query::{Op, SelectQuery, col};
use crate::error::Result;

/// Primary key column, qualified for use in joined queries
pub const PRODUCT_PRIMARY_KEY: &str = "product.product_id";

/// Product record joined with its description
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRecord {
    pub product_id: i64,
    pub uuid: String,
    pub sku: String,
    pub price: f64,
    pub qty: i64,
    pub weight: Option<f64>,
    pub status: i64,
    pub visibility: i64,
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub url_key: Option<String>,
}

pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Base listing query: `product` joined with its description as `des`
    pub fn list_query() -> SelectQuery {
        let mut query = SelectQuery::new("product");
        query
            .select("product.product_id")
            .select("product.uuid")
            .select("product.sku")
            .select("product.price")
            .select("product.qty")
            .select("product.weight")
            .select("product.status")
            .select("product.visibility")
            .select("des.name")
            .select("des.short_description")
            .select("des.description")
            .select("des.url_key");
        query.left_join("product_description", "des").on(
            "des.product_description_product_id",
            Op::Eq,
            col(PRODUCT_PRIMARY_KEY),
        );
        query
    }

    /// Enabled, visible products assigned to a category
    pub fn category_query(category_id: i64) -> SelectQuery {
        let mut query = Self::list_query();
        query
            .inner_join("product_category", "pc")
            .on("pc.product_id", Op::Eq, col(PRODUCT_PRIMARY_KEY))
            .and("pc.category_id", Op::Eq, category_id);
        query
            .and_where("product.status", Op::Eq, 1i64)
            .and_where("product.visibility", Op::Eq, 1i64);
        query
    }

    /// Get a product by ID
    pub async fn get(&self, id: i64) -> Result<Option<ProductRecord>> {
        let mut query = Self::list_query();
        query.and_where(PRODUCT_PRIMARY_KEY, Op::Eq, id);

        Ok(query.load(&self.pool).await?)
    }
}
