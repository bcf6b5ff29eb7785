//! Error types for catalog storage and routing

use thiserror::Error;

/// Errors raised by repositories, migrations and URL building.
///
/// Resolvers convert these into GraphQL field errors with `?`.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration {version} failed: {source}")]
    Migration {
        version: &'static str,
        source: sqlx::Error,
    },

    #[error("product {0} does not exist")]
    ProductNotFound(i64),

    #[error("unknown route '{0}'")]
    UnknownRoute(String),

    #[error("route '{route}' requires parameter '{param}'")]
    MissingRouteParam { route: String, param: String },
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
