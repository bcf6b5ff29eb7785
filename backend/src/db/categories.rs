//! Category database repository

use sqlx::SqlitePool;

use super::query::{Op, SelectQuery, col};
use crate::error::Result;

/// Primary key column, qualified for use in joined queries
pub const CATEGORY_PRIMARY_KEY: &str = "category.category_id";

/// Category record joined with its description
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRecord {
    pub category_id: i64,
    pub uuid: String,
    pub status: i64,
    pub parent_id: Option<i64>,
    pub include_in_nav: bool,
    pub position: Option<i64>,
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url_key: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Base listing query: `category` joined with its description as `des`
    pub fn list_query() -> SelectQuery {
        let mut query = SelectQuery::new("category");
        query
            .select("category.category_id")
            .select("category.uuid")
            .select("category.status")
            .select("category.parent_id")
            .select("category.include_in_nav")
            .select("category.position")
            .select("des.name")
            .select("des.short_description")
            .select("des.description")
            .select("des.image")
            .select("des.url_key")
            .select("des.meta_title")
            .select("des.meta_description");
        query.left_join("category_description", "des").on(
            "des.category_description_category_id",
            Op::Eq,
            col(CATEGORY_PRIMARY_KEY),
        );
        query
    }

    /// Get an enabled category by ID
    pub async fn get_enabled(&self, id: i64) -> Result<Option<CategoryRecord>> {
        let mut query = Self::list_query();
        query
            .and_where(CATEGORY_PRIMARY_KEY, Op::Eq, id)
            .and_where("category.status", Op::Eq, 1i64);

        Ok(query.load(&self.pool).await?)
    }
}
