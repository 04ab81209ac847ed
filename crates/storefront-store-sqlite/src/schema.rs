//! Table definitions
//!
//! Column names match the serde field names of the record types in
//! `storefront_core::records`. Timestamps are RFC 3339 text.

use sqlx::SqlitePool;
use storefront_core::{Error, Result};

/// Tables the store accepts in `insert` and `find`
pub const TABLES: &[&str] = &[
    "hosts",
    "stores",
    "pages",
    "themes",
    "images",
    "custom_fields",
    "collections",
    "products",
    "variations",
    "option_sets",
    "option_set_options",
    "options",
    "option_values",
    "collection_products",
];

const SCHEMA_VERSION: i64 = 1;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS hosts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        store_id INTEGER NOT NULL,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_hosts_store ON hosts(store_id)",
    r#"
    CREATE TABLE IF NOT EXISTS stores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        app_dir TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        store_id INTEGER NOT NULL,
        template_name TEXT NOT NULL,
        name TEXT NOT NULL,
        title TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (store_id, name)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_pages_updated ON pages(updated_at)",
    r#"
    CREATE TABLE IF NOT EXISTS themes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        store_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        is_default BOOLEAN NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (store_id, name)
    )
    "#,
    // One default theme per store
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_themes_default ON themes(store_id) WHERE is_default = 1",
    r#"
    CREATE TABLE IF NOT EXISTS images (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        store_id INTEGER NOT NULL,
        url TEXT NOT NULL,
        position INTEGER NOT NULL DEFAULT 0,
        file_name TEXT NOT NULL DEFAULT '',
        attachment TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_images_store ON images(store_id)",
    r#"
    CREATE TABLE IF NOT EXISTS custom_fields (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        store_id INTEGER NOT NULL,
        type_id INTEGER NOT NULL,
        parent_id INTEGER NOT NULL,
        "key" TEXT NOT NULL,
        value TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (store_id, type_id, parent_id, "key")
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS collections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        store_id INTEGER NOT NULL,
        resource_id TEXT NOT NULL,
        display_name TEXT NOT NULL,
        is_visible BOOLEAN NOT NULL DEFAULT 0,
        description TEXT NOT NULL DEFAULT '',
        tags TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (store_id, resource_id),
        UNIQUE (store_id, display_name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        store_id INTEGER NOT NULL,
        sku TEXT NOT NULL,
        sku_ex TEXT NOT NULL DEFAULT '',
        resource_id TEXT NOT NULL,
        name TEXT NOT NULL,
        is_purchasable BOOLEAN NOT NULL DEFAULT 0,
        is_visible BOOLEAN NOT NULL DEFAULT 0,
        is_back_order_enabled BOOLEAN NOT NULL DEFAULT 0,
        is_pre_order_enabled BOOLEAN NOT NULL DEFAULT 0,
        is_shipping_address_required BOOLEAN NOT NULL DEFAULT 0,
        tags TEXT NOT NULL DEFAULT '',
        list_price INTEGER NOT NULL DEFAULT 0,
        price INTEGER NOT NULL DEFAULT 0,
        content TEXT NOT NULL DEFAULT '',
        vendor TEXT NOT NULL DEFAULT '',
        inventory_quantity INTEGER NOT NULL DEFAULT 0,
        weight INTEGER NOT NULL DEFAULT 0,
        manage_inventory_method TEXT NOT NULL DEFAULT 'no_track',
        option_set_id INTEGER NOT NULL DEFAULT 0,
        page_title TEXT NOT NULL DEFAULT '',
        meta_description TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (store_id, resource_id),
        UNIQUE (store_id, name),
        UNIQUE (store_id, sku, sku_ex)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_products_price ON products(store_id, price)",
    r#"
    CREATE TABLE IF NOT EXISTS variations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        store_id INTEGER NOT NULL,
        sku TEXT NOT NULL DEFAULT '',
        display_name TEXT NOT NULL DEFAULT '',
        is_purchasable BOOLEAN NOT NULL DEFAULT 0,
        is_visible BOOLEAN NOT NULL DEFAULT 0,
        is_back_order_enabled BOOLEAN NOT NULL DEFAULT 0,
        is_pre_order_enabled BOOLEAN NOT NULL DEFAULT 0,
        is_shipping_address_required BOOLEAN NOT NULL DEFAULT 0,
        tags TEXT NOT NULL DEFAULT '',
        list_price INTEGER NOT NULL DEFAULT 0,
        price INTEGER NOT NULL DEFAULT 0,
        description TEXT NOT NULL DEFAULT '',
        vendor TEXT NOT NULL DEFAULT '',
        inventory_quantity INTEGER NOT NULL DEFAULT 0,
        manage_inventory_method TEXT NOT NULL DEFAULT 'no_track',
        weight INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_variations_store ON variations(store_id)",
    r#"
    CREATE TABLE IF NOT EXISTS option_sets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS option_set_options (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        option_set_id INTEGER NOT NULL,
        option_id INTEGER NOT NULL,
        position INTEGER NOT NULL DEFAULT 0,
        is_required BOOLEAN NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS options (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        display_name TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS option_values (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        option_id INTEGER NOT NULL,
        position INTEGER NOT NULL DEFAULT 0,
        label TEXT NOT NULL DEFAULT '',
        value TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS collection_products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        collection_id INTEGER NOT NULL,
        product_id INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (collection_id, product_id)
    )
    "#,
];

/// Create all tables and indexes, then verify the schema version
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)")
        .execute(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
    }

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    if version != SCHEMA_VERSION {
        return Err(Error::Database(format!(
            "Unsupported schema version: {}",
            version
        )));
    }

    Ok(())
}

/// Check a column name before splicing it into SQL
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
