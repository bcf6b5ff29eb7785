//! Per-request data attached by the HTTP handler

use super::types::{FilterableAttribute, FilterableAttributes, PriceRange};
use crate::db::Database;
use crate::error::Result;

/// Load the filterable attributes and the price range for one request
pub async fn load_request_context(db: &Database) -> Result<(FilterableAttributes, PriceRange)> {
    let attributes = db
        .attributes()
        .filterable()
        .await?
        .into_iter()
        .map(|(attribute, options)| FilterableAttribute::from_records(attribute, options))
        .collect();
    let price_range = db.attributes().price_range().await?;

    Ok((FilterableAttributes(attributes), price_range.into()))
}
