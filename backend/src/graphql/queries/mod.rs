pub mod categories;
pub mod products;
pub mod routes;

pub use categories::CategoryQueries;
pub use products::ProductQueries;
pub use routes::RouteQueries;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::config::CatalogSettings;
    pub(crate) use crate::db::*;
    pub(crate) use crate::graphql::filters::{FilterInput, FilterNormalizer, FilterTarget};
    pub(crate) use crate::graphql::types::*;
}
