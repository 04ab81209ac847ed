//! Storefront Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout Storefront:
//! - Tenant identifiers and hostname normalization
//! - Persisted record types (hosts, stores, pages, themes, catalog)
//! - The `RecordStore` abstraction and the generic create helper
//! - The `${variable}` template engine used for page rendering
//! - Core error types

pub mod catalog;
pub mod error;
pub mod record_store;
pub mod records;
pub mod template;
pub mod tenant;

pub use error::{ALREADY_EXISTS_CODE, Error, Result};
pub use record_store::{
    Filter, Record, RecordStore, Row, create_record, find_records, finish_create,
};
pub use tenant::{HostName, StoreId};
