//! Database connection and repositories

pub mod attributes;
pub mod categories;
pub mod media;
pub mod migrations;
pub mod products;
pub mod query;

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use attributes::{AttributeOptionRecord, AttributeRecord, AttributeRepository, PriceRangeRecord};
pub use categories::{CategoryRecord, CategoryRepository};
pub use media::{MediaRepository, ProductImageRecord};
pub use migrations::MigrationReport;
pub use products::{ProductRecord, ProductRepository};

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection pool.
    ///
    /// In-memory databases (`sqlite::memory:`) exist per connection, so callers
    /// using one should pass `max_connections = 1`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new database connection pool with retry logic.
    /// Retries every `retry_interval` until successful
    pub async fn connect_with_retry(
        url: &str,
        max_connections: u32,
        retry_interval: Duration,
    ) -> Self {
        loop {
            match Self::connect(url, max_connections).await {
                Ok(db) => return db,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        retry_in_secs = retry_interval.as_secs(),
                        "Database connection failed, retrying"
                    );
                    tokio::time::sleep(retry_interval).await;
                }
            }
        }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a category repository
    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    /// Get a product repository
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Get an attribute repository
    pub fn attributes(&self) -> AttributeRepository {
        AttributeRepository::new(self.pool.clone())
    }

    /// Get a product media repository
    pub fn media(&self) -> MediaRepository {
        MediaRepository::new(self.pool.clone())
    }

    /// Run pending schema migrations
    pub async fn migrate(&self) -> crate::error::Result<MigrationReport> {
        migrations::run_migrations(&self.pool).await
    }
}
