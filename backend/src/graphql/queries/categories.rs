use super::prelude::*;

#[derive(Default)]
pub struct CategoryQueries;

#[Object]
impl CategoryQueries {
    /// Get an enabled category by ID
    async fn category(&self, ctx: &Context<'_>, id: i64) -> Result<Option<Category>> {
        let db = ctx.data_unchecked::<Database>();
        let record = db.categories().get_enabled(id).await?;
        Ok(record.map(Category::from))
    }

    /// List categories
    async fn categories(
        &self,
        ctx: &Context<'_>,
        filters: Option<Vec<FilterInput>>,
    ) -> Result<CategoryCollection> {
        let db = ctx.data_unchecked::<Database>();
        let settings = ctx.data_unchecked::<CatalogSettings>();

        let mut query = CategoryRepository::list_query();
        let applied = FilterNormalizer::new(FilterTarget::Categories, settings.default_page_limit)
            .apply(&mut query, &filters.unwrap_or_default());

        let records: Vec<CategoryRecord> = query.execute(db.pool()).await?;
        let total = applied.total_query.fetch_total(db.pool()).await?;

        Ok(CategoryCollection {
            items: records.into_iter().map(Category::from).collect(),
            total,
            current_filters: applied.current_filters(),
        })
    }
}
