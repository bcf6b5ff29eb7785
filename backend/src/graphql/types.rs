//! GraphQL object types for the catalog

use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, InputObject, Object, Result, SimpleObject};

use super::filters::{AppliedFilters, CurrentFilter, FilterInput, FilterNormalizer, FilterTarget};
use super::loaders::ProductImageLoader;
use crate::config::CatalogSettings;
use crate::db::query::SelectQuery;
use crate::db::{
    AttributeOptionRecord, AttributeRecord, CategoryRecord, Database, PriceRangeRecord,
    ProductImageRecord, ProductRecord, ProductRepository,
};
use crate::routes::build_url;

// ============================================================================
// Categories
// ============================================================================

/// A catalog category
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Category {
    pub category_id: i64,
    pub uuid: String,
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub url_key: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub status: i64,
    pub include_in_nav: bool,
    pub position: Option<i64>,
    pub parent_id: Option<i64>,
    #[graphql(skip)]
    pub image_path: Option<String>,
}

impl From<CategoryRecord> for Category {
    fn from(r: CategoryRecord) -> Self {
        Self {
            category_id: r.category_id,
            uuid: r.uuid,
            name: r.name,
            short_description: r.short_description,
            description: r.description,
            url_key: r.url_key,
            meta_title: r.meta_title,
            meta_description: r.meta_description,
            status: r.status,
            include_in_nav: r.include_in_nav,
            position: r.position,
            parent_id: r.parent_id,
            image_path: r.image,
        }
    }
}

#[ComplexObject]
impl Category {
    /// Enabled, visible products assigned to this category
    async fn products(
        &self,
        ctx: &Context<'_>,
        filters: Option<Vec<FilterInput>>,
    ) -> Result<ProductCollection> {
        let settings = ctx.data_unchecked::<CatalogSettings>();
        let attributes = ctx
            .data_opt::<FilterableAttributes>()
            .map(|a| a.0.as_slice())
            .unwrap_or_default();

        let mut query = ProductRepository::category_query(self.category_id);
        let applied = FilterNormalizer::new(FilterTarget::CategoryProducts, settings.default_page_limit)
            .with_attributes(attributes)
            .apply(&mut query, &filters.unwrap_or_default());

        Ok(ProductCollection::new(query, applied))
    }

    /// Attributes that can be used as filter keys on `products`
    async fn available_filters(&self, ctx: &Context<'_>) -> Vec<FilterableAttribute> {
        ctx.data_opt::<FilterableAttributes>()
            .map(|a| a.0.clone())
            .unwrap_or_default()
    }

    /// Price range of enabled products, for building price filters
    async fn price_range(&self, ctx: &Context<'_>) -> PriceRange {
        ctx.data_opt::<PriceRange>().copied().unwrap_or_default()
    }

    /// Storefront URL (null without a URL key)
    async fn url(&self) -> Result<Option<String>> {
        match &self.url_key {
            Some(url_key) => Ok(Some(build_url("categoryView", &[("url_key", url_key.as_str())])?)),
            None => Ok(None),
        }
    }

    /// Admin edit URL
    async fn edit_url(&self) -> Result<String> {
        Ok(build_url("categoryEdit", &[("id", self.category_id.to_string().as_str())])?)
    }

    async fn image(&self, ctx: &Context<'_>) -> Option<CategoryImage> {
        let settings = ctx.data_unchecked::<CatalogSettings>();
        self.image_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| CategoryImage {
                path: path.to_string(),
                url: settings.asset_url(path),
            })
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CategoryImage {
    pub path: String,
    pub url: String,
}

/// A page of categories
#[derive(Debug, Clone, SimpleObject)]
pub struct CategoryCollection {
    pub items: Vec<Category>,
    pub total: i64,
    pub current_filters: Vec<CurrentFilter>,
}

// ============================================================================
// Products
// ============================================================================

/// A catalog product
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Product {
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

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Self {
            product_id: r.product_id,
            uuid: r.uuid,
            sku: r.sku,
            price: r.price,
            qty: r.qty,
            weight: r.weight,
            status: r.status,
            visibility: r.visibility,
            name: r.name,
            short_description: r.short_description,
            description: r.description,
            url_key: r.url_key,
        }
    }
}

#[ComplexObject]
impl Product {
    /// Storefront URL (null without a URL key)
    async fn url(&self) -> Result<Option<String>> {
        match &self.url_key {
            Some(url_key) => Ok(Some(build_url("productView", &[("url_key", url_key.as_str())])?)),
            None => Ok(None),
        }
    }

    /// Admin edit URL
    async fn edit_url(&self) -> Result<String> {
        Ok(build_url("productEdit", &[("id", self.product_id.to_string().as_str())])?)
    }

    /// Main image
    async fn image(&self, ctx: &Context<'_>) -> Result<Option<ProductImage>> {
        let settings = ctx.data_unchecked::<CatalogSettings>();

        let images = load_images(ctx, self.product_id).await?;
        Ok(images
            .into_iter()
            .find(|i| i.is_main)
            .map(|i| ProductImage::from_record(i, settings)))
    }

    /// Every image, main image first
    async fn gallery(&self, ctx: &Context<'_>) -> Result<Vec<ProductImage>> {
        let settings = ctx.data_unchecked::<CatalogSettings>();

        let images = load_images(ctx, self.product_id).await?;
        Ok(images
            .into_iter()
            .map(|i| ProductImage::from_record(i, settings))
            .collect())
    }
}

/// Images of one product, batched with the other products in the response
async fn load_images(ctx: &Context<'_>, product_id: i64) -> Result<Vec<ProductImageRecord>> {
    let loader = ctx.data_unchecked::<DataLoader<ProductImageLoader>>();
    Ok(loader.load_one(product_id).await?.unwrap_or_default())
}

#[derive(Debug, Clone, SimpleObject)]
pub struct ProductImage {
    pub unique_id: String,
    /// Stored path
    pub path: String,
    /// Public URL
    pub origin: String,
}

impl ProductImage {
    pub fn from_record(r: ProductImageRecord, settings: &CatalogSettings) -> Self {
        Self {
            origin: settings.asset_url(&r.image),
            unique_id: r.uuid,
            path: r.image,
        }
    }
}

/// A page of products.
///
/// Holds the paged item query and the count query; each runs only when its
/// field is selected.
pub struct ProductCollection {
    item_query: SelectQuery,
    total_query: SelectQuery,
    current_filters: Vec<CurrentFilter>,
}

impl ProductCollection {
    pub fn new(item_query: SelectQuery, applied: AppliedFilters) -> Self {
        Self {
            current_filters: applied.current_filters(),
            total_query: applied.total_query,
            item_query,
        }
    }
}

#[Object]
impl ProductCollection {
    async fn items(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        let db = ctx.data_unchecked::<Database>();
        let records: Vec<ProductRecord> = self.item_query.execute(db.pool()).await?;
        Ok(records.into_iter().map(Product::from).collect())
    }

    /// Number of products matching the filters, ignoring paging
    async fn total(&self, ctx: &Context<'_>) -> Result<i64> {
        let db = ctx.data_unchecked::<Database>();
        Ok(self.total_query.fetch_total(db.pool()).await?)
    }

    async fn current_filters(&self) -> Vec<CurrentFilter> {
        self.current_filters.clone()
    }
}

// ============================================================================
// Request context
// ============================================================================

/// An attribute whose options can filter category products
#[derive(Debug, Clone, SimpleObject)]
pub struct FilterableAttribute {
    pub attribute_id: i64,
    pub attribute_code: String,
    pub attribute_name: String,
    pub options: Vec<AttributeOption>,
}

impl FilterableAttribute {
    pub fn from_records(attribute: AttributeRecord, options: Vec<AttributeOptionRecord>) -> Self {
        Self {
            attribute_id: attribute.attribute_id,
            attribute_code: attribute.attribute_code,
            attribute_name: attribute.attribute_name,
            options: options
                .into_iter()
                .map(|o| AttributeOption {
                    option_id: o.attribute_option_id,
                    option_text: o.option_text,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct AttributeOption {
    pub option_id: i64,
    pub option_text: String,
}

/// Filterable attributes loaded for the current request
#[derive(Debug, Clone, Default)]
pub struct FilterableAttributes(pub Vec<FilterableAttribute>);

/// Lowest and highest price of enabled products
#[derive(Debug, Clone, Copy, Default, SimpleObject)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl From<PriceRangeRecord> for PriceRange {
    fn from(r: PriceRangeRecord) -> Self {
        Self {
            min: r.min_price,
            max: r.max_price,
        }
    }
}

// ============================================================================
// Routing
// ============================================================================

/// A `:name` substitution for `url(routeId, params)`
#[derive(Debug, Clone, InputObject)]
pub struct ParamInput {
    pub key: String,
    pub value: String,
}
