//! GraphQL API for the catalog
//!
//! Queries and mutations live in domain modules under `queries/` and
//! `mutations/`, each a `#[derive(Default)]` struct with an `#[Object]` impl,
//! merged into `QueryRoot` / `MutationRoot` in `schema.rs`.
//!
//! Collection fields take a `filters` list which `filters::FilterNormalizer`
//! turns into predicates, ordering and paging on a `SelectQuery`.

mod context;
pub mod filters;
mod loaders;
pub mod mutations;
pub mod queries;
mod schema;
pub mod types;

pub use context::load_request_context;
pub use schema::{StorefrontSchema, build_schema};
