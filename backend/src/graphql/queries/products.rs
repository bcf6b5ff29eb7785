use super::prelude::*;

#[derive(Default)]
pub struct ProductQueries;

#[Object]
impl ProductQueries {
    /// List products
    async fn products(
        &self,
        ctx: &Context<'_>,
        filters: Option<Vec<FilterInput>>,
    ) -> Result<ProductCollection> {
        let settings = ctx.data_unchecked::<CatalogSettings>();

        let mut query = ProductRepository::list_query();
        let applied = FilterNormalizer::new(FilterTarget::Products, settings.default_page_limit)
            .apply(&mut query, &filters.unwrap_or_default());

        Ok(ProductCollection::new(query, applied))
    }

    /// Get a product by ID
    async fn product(&self, ctx: &Context<'_>, id: i64) -> Result<Option<Product>> {
        let db = ctx.data_unchecked::<Database>();
        let record = db.products().get(id).await?;
        Ok(record.map(Product::from))
    }
}
