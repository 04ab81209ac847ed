//! Storefront host dispatch
//!
//! Maps request hostnames to per-store applications:
//! - `HostRegistry`: process-wide hostname → `StoreApplication` table,
//!   built lazily from persisted host mappings and swapped whole on rebuild
//! - `StoreApplication`: one tenant's pages, themes and template root
//! - Page resolution and rendering through the `Renderer` trait

pub mod application;
pub mod pages;
pub mod registry;
pub mod render;

pub use application::{ApplicationOptions, StoreApplication};
pub use pages::{display_page, page_source};
pub use registry::{HostRegistry, HostTable};
pub use render::{FileRenderer, Rendered, Renderer};
