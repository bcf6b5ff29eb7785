//! Attribute database repository
//!
//! Loads the filterable attributes and the catalog price range that the
//! GraphQL layer attaches to every request.

use sqlx::SqlitePool;

use crate::error::Result;

/// Attribute record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttributeRecord {
    pub attribute_id: i64,
    pub attribute_code: String,
    pub attribute_name: String,
}

/// Selectable option of an attribute
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttributeOptionRecord {
    pub attribute_option_id: i64,
    pub attribute_id: i64,
    pub option_text: String,
}

/// Lowest and highest price of enabled products
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct PriceRangeRecord {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

pub struct AttributeRepository {
    pool: SqlitePool,
}

impl AttributeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Attributes flagged as filterable, each with its options
    pub async fn filterable(&self) -> Result<Vec<(AttributeRecord, Vec<AttributeOptionRecord>)>> {
        let attributes = sqlx::query_as::<_, AttributeRecord>(
            r#"
            SELECT attribute_id, attribute_code, attribute_name
            FROM attribute
            WHERE is_filterable = 1
            ORDER BY sort_order, attribute_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let options = sqlx::query_as::<_, AttributeOptionRecord>(
            r#"
            SELECT o.attribute_option_id, o.attribute_id, o.option_text
            FROM attribute_option o
            INNER JOIN attribute a ON a.attribute_id = o.attribute_id
            WHERE a.is_filterable = 1
            ORDER BY o.attribute_option_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(attributes
            .into_iter()
            .map(|attribute| {
                let attribute_options = options
                    .iter()
                    .filter(|o| o.attribute_id == attribute.attribute_id)
                    .cloned()
                    .collect();
                (attribute, attribute_options)
            })
            .collect())
    }

    /// Price range of enabled products (both bounds are `None` for an empty catalog)
    pub async fn price_range(&self) -> Result<PriceRangeRecord> {
        let range = sqlx::query_as::<_, PriceRangeRecord>(
            "SELECT MIN(price) AS min_price, MAX(price) AS max_price FROM product WHERE status = 1",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(range)
    }
}
