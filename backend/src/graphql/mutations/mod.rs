pub mod media;

pub use media::MediaMutations;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::config::CatalogSettings;
    pub(crate) use crate::db::*;
    pub(crate) use crate::graphql::types::*;
}
