//! GraphQL schema definition

use async_graphql::dataloader::DataLoader;
use async_graphql::extensions::Tracing;
use async_graphql::{EmptySubscription, MergedObject, Schema};

use super::loaders::ProductImageLoader;
use super::mutations::MediaMutations;
use super::queries::{CategoryQueries, ProductQueries, RouteQueries};
use crate::config::CatalogSettings;
use crate::db::Database;

/// The GraphQL schema type
pub type StorefrontSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(CategoryQueries, ProductQueries, RouteQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(MediaMutations);

/// Build the GraphQL schema with all resolvers
pub fn build_schema(db: Database, settings: CatalogSettings) -> StorefrontSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .extension(Tracing)
        .data(DataLoader::new(ProductImageLoader::new(db.clone()), tokio::spawn))
        .data(db)
        .data(settings)
        .finish()
}
