//! SQLite record storage for Storefront
//!
//! This crate implements the `RecordStore` trait on top of SQLite using
//! `sqlx`. Every record type gets its own table, and the uniqueness rules
//! of the catalog (page and theme names per store, product SKUs, ...) are
//! real unique constraints, reported back as `Error::UniqueViolation`.
//!
//! # Example
//! ```no_run
//! # use storefront_store_sqlite::SqliteRecordStore;
//! # use storefront_core::catalog;
//! # async fn example() -> storefront_core::Result<()> {
//! let store = SqliteRecordStore::new("~/.storefront/storefront.db", 5).await?;
//! let hosts = catalog::get_host_mappings(&store).await?;
//! # Ok(())
//! # }
//! ```

mod schema;
mod sqlite_record_store;

pub use schema::TABLES;
pub use sqlite_record_store::SqliteRecordStore;
