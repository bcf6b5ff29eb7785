use super::prelude::*;

#[derive(Default)]
pub struct MediaMutations;

#[Object]
impl MediaMutations {
    /// Add images to a product gallery and return the whole gallery
    async fn add_product_images(
        &self,
        ctx: &Context<'_>,
        product_id: i64,
        paths: Vec<String>,
    ) -> Result<Vec<ProductImage>> {
        let db = ctx.data_unchecked::<Database>();
        let settings = ctx.data_unchecked::<CatalogSettings>();

        let images = db.media().add_images(product_id, &paths).await?;
        Ok(images
            .into_iter()
            .map(|i| ProductImage::from_record(i, settings))
            .collect())
    }

    /// Remove a product image by its unique id
    async fn remove_product_image(&self, ctx: &Context<'_>, unique_id: String) -> Result<bool> {
        let db = ctx.data_unchecked::<Database>();
        Ok(db.media().remove_image(&unique_id).await?)
    }
}
