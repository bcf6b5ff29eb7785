//! Versioned schema migrations
//!
//! Each migration is a named version with an ordered list of statements.
//! Applied versions are recorded in the `migration` table; a version is run
//! at most once, inside its own transaction, so a failed migration leaves no
//! partial schema behind.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};

/// A schema version and the statements that bring the database to it
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: &'static str,
    pub description: &'static str,
    pub statements: &'static [&'static str],
}

/// Outcome of a migration run
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub applied: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

const CREATE_MIGRATION_TABLE: &str = "CREATE TABLE IF NOT EXISTS migration (
  version TEXT PRIMARY KEY NOT NULL,
  description TEXT NOT NULL,
  applied_at TEXT NOT NULL DEFAULT (datetime('now'))
)";

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "1.0.0",
        description: "catalog, attribute and setting tables",
        statements: &[
            "CREATE TABLE IF NOT EXISTS category (
  category_id INTEGER PRIMARY KEY AUTOINCREMENT,
  uuid TEXT NOT NULL UNIQUE,
  status INTEGER NOT NULL DEFAULT 1,
  parent_id INTEGER REFERENCES category(category_id) ON DELETE SET NULL,
  include_in_nav INTEGER NOT NULL DEFAULT 1,
  position INTEGER,
  created_at TEXT NOT NULL DEFAULT (datetime('now')),
  updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)",
            "CREATE TABLE IF NOT EXISTS category_description (
  category_description_id INTEGER PRIMARY KEY AUTOINCREMENT,
  category_description_category_id INTEGER NOT NULL UNIQUE REFERENCES category(category_id) ON DELETE CASCADE,
  name TEXT NOT NULL,
  short_description TEXT,
  description TEXT,
  image TEXT,
  meta_title TEXT,
  meta_keywords TEXT,
  meta_description TEXT,
  url_key TEXT NOT NULL UNIQUE
)",
            "CREATE TABLE IF NOT EXISTS product (
  product_id INTEGER PRIMARY KEY AUTOINCREMENT,
  uuid TEXT NOT NULL UNIQUE,
  sku TEXT NOT NULL UNIQUE,
  price REAL NOT NULL DEFAULT 0,
  qty INTEGER NOT NULL DEFAULT 0,
  weight REAL,
  status INTEGER NOT NULL DEFAULT 1,
  visibility INTEGER NOT NULL DEFAULT 1,
  created_at TEXT NOT NULL DEFAULT (datetime('now')),
  updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)",
            "CREATE TABLE IF NOT EXISTS product_description (
  product_description_id INTEGER PRIMARY KEY AUTOINCREMENT,
  product_description_product_id INTEGER NOT NULL UNIQUE REFERENCES product(product_id) ON DELETE CASCADE,
  name TEXT NOT NULL,
  short_description TEXT,
  description TEXT,
  url_key TEXT NOT NULL UNIQUE,
  meta_title TEXT,
  meta_keywords TEXT,
  meta_description TEXT
)",
            "CREATE TABLE IF NOT EXISTS product_category (
  product_category_id INTEGER PRIMARY KEY AUTOINCREMENT,
  category_id INTEGER NOT NULL REFERENCES category(category_id) ON DELETE CASCADE,
  product_id INTEGER NOT NULL REFERENCES product(product_id) ON DELETE CASCADE,
  UNIQUE (category_id, product_id)
)",
            "CREATE TABLE IF NOT EXISTS attribute (
  attribute_id INTEGER PRIMARY KEY AUTOINCREMENT,
  attribute_code TEXT NOT NULL UNIQUE,
  attribute_name TEXT NOT NULL,
  type TEXT NOT NULL DEFAULT 'select',
  is_required INTEGER NOT NULL DEFAULT 0,
  display_on_frontend INTEGER NOT NULL DEFAULT 0,
  is_filterable INTEGER NOT NULL DEFAULT 0,
  sort_order INTEGER NOT NULL DEFAULT 0
)",
            "CREATE TABLE IF NOT EXISTS attribute_option (
  attribute_option_id INTEGER PRIMARY KEY AUTOINCREMENT,
  attribute_id INTEGER NOT NULL REFERENCES attribute(attribute_id) ON DELETE CASCADE,
  attribute_code TEXT NOT NULL,
  option_text TEXT NOT NULL
)",
            "CREATE TABLE IF NOT EXISTS product_attribute_value_index (
  product_attribute_value_index_id INTEGER PRIMARY KEY AUTOINCREMENT,
  product_id INTEGER NOT NULL REFERENCES product(product_id) ON DELETE CASCADE,
  attribute_id INTEGER NOT NULL REFERENCES attribute(attribute_id) ON DELETE CASCADE,
  option_id INTEGER,
  option_text TEXT,
  UNIQUE (product_id, attribute_id, option_id)
)",
            "CREATE INDEX IF NOT EXISTS idx_attribute_value_index_option
  ON product_attribute_value_index (attribute_id, option_id)",
            "CREATE TABLE IF NOT EXISTS setting (
  setting_id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL UNIQUE,
  value TEXT,
  is_json INTEGER NOT NULL DEFAULT 0
)",
        ],
    },
    Migration {
        version: "1.0.1",
        description: "product media gallery",
        statements: &[
            "CREATE TABLE IF NOT EXISTS product_image (
  product_image_id INTEGER PRIMARY KEY AUTOINCREMENT,
  uuid TEXT NOT NULL UNIQUE,
  product_image_product_id INTEGER NOT NULL REFERENCES product(product_id) ON DELETE CASCADE,
  image TEXT NOT NULL,
  is_main INTEGER NOT NULL DEFAULT 0,
  sort_order INTEGER NOT NULL DEFAULT 0
)",
            "CREATE INDEX IF NOT EXISTS idx_product_image_product
  ON product_image (product_image_product_id, sort_order)",
        ],
    },
];

/// Versions already recorded in the `migration` table
async fn applied_versions(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT version FROM migration")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(v,)| v).collect())
}

/// Most recently applied version, if any migration has run
pub async fn schema_version(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT version FROM migration ORDER BY rowid DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(v,)| v))
}

/// Apply a single migration inside a transaction
async fn apply(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let wrap = |source: sqlx::Error| CatalogError::Migration {
        version: migration.version,
        source,
    };

    let mut tx = pool.begin().await.map_err(wrap)?;
    for statement in migration.statements {
        debug!(version = migration.version, sql = %statement, "Running migration statement");
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(wrap)?;
    }
    sqlx::query("INSERT INTO migration (version, description) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.description)
        .execute(&mut *tx)
        .await
        .map_err(wrap)?;
    tx.commit().await.map_err(wrap)?;
    Ok(())
}

/// Run every migration in [`MIGRATIONS`] that has not been applied yet
pub async fn run_migrations(pool: &SqlitePool) -> Result<MigrationReport> {
    run(pool, MIGRATIONS).await
}

async fn run(pool: &SqlitePool, migrations: &[Migration]) -> Result<MigrationReport> {
    sqlx::query(CREATE_MIGRATION_TABLE).execute(pool).await?;

    let applied = applied_versions(pool).await?;
    let mut report = MigrationReport::default();

    for migration in migrations {
        if applied.iter().any(|v| v == migration.version) {
            report.skipped.push(migration.version);
            continue;
        }

        apply(pool, migration).await?;
        info!(
            version = migration.version,
            description = migration.description,
            "Applied migration"
        );
        report.applied.push(migration.version);
    }

    Ok(report)
}
