//! Application configuration management

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// SQLite connection URL (e.g. `sqlite:./data/storefront.db`)
    pub database_url: String,

    /// Maximum pool size
    pub database_max_connections: u32,

    /// Page size used when a collection query has no `limit` filter
    pub default_page_limit: u32,

    /// Prefix prepended to stored image paths when building public URLs
    pub asset_base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // DATABASE_PATH wins over DATABASE_URL, matching local dev setups
        let database_url = var("DATABASE_PATH")
            .map(|path| {
                if path.starts_with("sqlite:") {
                    path
                } else {
                    format!("sqlite:{}", path)
                }
            })
            .or_else(|| var("DATABASE_URL"))
            .unwrap_or_else(|| "sqlite:./data/storefront.db".to_string());

        let default_page_limit: u32 = var("CATALOG_DEFAULT_PAGE_LIMIT")
            .unwrap_or_else(|| "20".to_string())
            .parse()
            .context("Invalid CATALOG_DEFAULT_PAGE_LIMIT")?;
        if default_page_limit == 0 {
            anyhow::bail!("CATALOG_DEFAULT_PAGE_LIMIT must be greater than zero");
        }

        Ok(Self {
            port: var("PORT")
                .unwrap_or_else(|| "3001".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            default_page_limit,

            asset_base_url: var("ASSET_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "/assets".to_string()),
        })
    }

    /// Directory holding the SQLite database file (`None` for in-memory databases)
    pub fn database_dir(&self) -> Option<PathBuf> {
        let path = self.database_url.strip_prefix("sqlite:")?;
        let path = path.trim_start_matches("//");
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path.starts_with(":memory:") {
            return None;
        }
        Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    /// Settings the GraphQL resolvers need at request time
    pub fn catalog_settings(&self) -> CatalogSettings {
        CatalogSettings {
            default_page_limit: self.default_page_limit,
            asset_base_url: self.asset_base_url.clone(),
        }
    }
}

/// Catalog settings shared with every resolver through schema data
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub default_page_limit: u32,
    pub asset_base_url: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            default_page_limit: 20,
            asset_base_url: "/assets".to_string(),
        }
    }
}

impl CatalogSettings {
    /// Public URL for a stored asset path (`/catalog/a.png` -> `/assets/catalog/a.png`)
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.asset_base_url, path)
        } else {
            format!("{}/{}", self.asset_base_url, path)
        }
    }
}
