//! Test fixtures: in-memory database, seed catalog and schema execution

use async_graphql::Request;

use crate::config::CatalogSettings;
use crate::db::Database;
use crate::graphql::{build_schema, load_request_context};

/// Seed catalog
///
/// Categories: 1 Men (enabled, image), 2 Women (enabled), 3 Kids Archive (disabled).
/// Products (price, qty): 1 Red T-Shirt (15, 100), 2 Blue T-Shirt (25, 5),
/// 3 Slim Jeans (50, 20), 4 Leather Jacket (120, 0), 5 Old Socks (5, 3, disabled).
/// Men holds 1-5, Women holds 2-3.
/// Attributes: color (Red 1, Blue 2, Black 3) and size (S 4, M 5, L 6) are
/// filterable; material (Cotton 7) is not.
const SEED: &[&str] = &[
    "INSERT INTO category (category_id, uuid, status, include_in_nav, position) VALUES
        (1, 'c-men', 1, 1, 1),
        (2, 'c-women', 1, 1, 2),
        (3, 'c-kids', 0, 0, 3)",
    "INSERT INTO category_description
        (category_description_category_id, name, description, image, url_key) VALUES
        (1, 'Men', 'Clothing for men', '/catalog/men.png', 'men'),
        (2, 'Women', 'Clothing for women', NULL, 'women'),
        (3, 'Kids Archive', NULL, NULL, 'kids-archive')",
    "INSERT INTO product (product_id, uuid, sku, price, qty, status, visibility) VALUES
        (1, 'p-red', 'TSHIRT-RED', 15, 100, 1, 1),
        (2, 'p-blue', 'TSHIRT-BLUE', 25, 5, 1, 1),
        (3, 'p-jeans', 'JEANS-SLIM', 50, 20, 1, 1),
        (4, 'p-jacket', 'JACKET-LEATHER', 120, 0, 1, 1),
        (5, 'p-socks', 'SOCKS-OLD', 5, 3, 0, 1)",
    "INSERT INTO product_description (product_description_product_id, name, url_key) VALUES
        (1, 'Red T-Shirt', 'red-t-shirt'),
        (2, 'Blue T-Shirt', 'blue-t-shirt'),
        (3, 'Slim Jeans', 'slim-jeans'),
        (4, 'Leather Jacket', 'leather-jacket'),
        (5, 'Old Socks', 'old-socks')",
    "INSERT INTO product_category (category_id, product_id) VALUES
        (1, 1), (1, 2), (1, 3), (1, 4), (1, 5), (2, 2), (2, 3)",
    "INSERT INTO attribute (attribute_id, attribute_code, attribute_name, is_filterable, sort_order) VALUES
        (1, 'color', 'Color', 1, 1),
        (2, 'size', 'Size', 1, 2),
        (3, 'material', 'Material', 0, 3)",
    "INSERT INTO attribute_option (attribute_option_id, attribute_id, attribute_code, option_text) VALUES
        (1, 1, 'color', 'Red'),
        (2, 1, 'color', 'Blue'),
        (3, 1, 'color', 'Black'),
        (4, 2, 'size', 'S'),
        (5, 2, 'size', 'M'),
        (6, 2, 'size', 'L'),
        (7, 3, 'material', 'Cotton')",
    "INSERT INTO product_attribute_value_index (product_id, attribute_id, option_id, option_text) VALUES
        (1, 1, 1, 'Red'), (1, 2, 4, 'S'), (1, 2, 5, 'M'),
        (2, 1, 2, 'Blue'), (2, 2, 5, 'M'),
        (3, 1, 2, 'Blue'), (3, 2, 5, 'M'), (3, 2, 6, 'L'),
        (4, 1, 3, 'Black'), (4, 2, 6, 'L'),
        (5, 1, 1, 'Red'), (5, 2, 4, 'S'),
        (1, 3, 7, 'Cotton')",
    "INSERT INTO product_image (uuid, product_image_product_id, image, is_main, sort_order) VALUES
        ('img-red-main', 1, '/catalog/red-front.png', 1, 0),
        ('img-red-back', 1, '/catalog/red-back.png', 0, 1)",
];

/// Empty, fully migrated in-memory database
pub async fn memory_database() -> Database {
    let db = Database::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory database");
    db.migrate().await.expect("migrations");
    db
}

/// In-memory database holding the seed catalog
pub async fn seeded_database() -> Database {
    let db = memory_database().await;
    for statement in SEED {
        sqlx::query(statement)
            .execute(db.pool())
            .await
            .expect("seed statement");
    }
    db
}

/// Execute a GraphQL document the way the HTTP handler does and return the raw response
pub async fn execute(db: &Database, document: &str) -> async_graphql::Response {
    let schema = build_schema(db.clone(), CatalogSettings::default());
    let (attributes, price_range) = load_request_context(db).await.expect("request context");
    schema
        .execute(Request::new(document).data(attributes).data(price_range))
        .await
}

/// Execute a GraphQL document that must succeed and return its data as JSON
pub async fn query_json(db: &Database, document: &str) -> serde_json::Value {
    let response = execute(db, document).await;
    assert!(response.errors.is_empty(), "GraphQL errors: {:?}", response.errors);
    response.data.into_json().expect("json data")
}
