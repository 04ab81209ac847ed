//! Record-level operations shared by the dispatch layer, the HTTP API and
//! the admin CLI

use chrono::Utc;
use std::path::{Component, Path};

use crate::{
    Error, Result,
    record_store::{Filter, Record, RecordStore, create_record, find_records, finish_create},
    records::{Host, Page, Store, Theme},
    tenant::StoreId,
};

/// Load every host mapping
pub async fn get_host_mappings(store: &dyn RecordStore) -> Result<Vec<Host>> {
    find_records(store, &Filter::all()).await
}

/// Load every store
pub async fn get_stores(store: &dyn RecordStore) -> Result<Vec<Store>> {
    find_records(store, &Filter::all()).await
}

/// Load the pages of one store
pub async fn get_pages(store: &dyn RecordStore, store_id: StoreId) -> Result<Vec<Page>> {
    find_records(store, &Filter::store(store_id)).await
}

/// Load the themes of one store
pub async fn get_themes(store: &dyn RecordStore, store_id: StoreId) -> Result<Vec<Theme>> {
    find_records(store, &Filter::store(store_id)).await
}

/// Look up a theme by name within one store
pub async fn get_theme_by_name(
    store: &dyn RecordStore,
    store_id: StoreId,
    name: &str,
) -> Result<Option<Theme>> {
    let filter = Filter::store(store_id).eq("name", name);
    Ok(find_records(store, &filter).await?.into_iter().next())
}

/// Whether `name` can name a directory under a store's `themes/`: a single
/// plain path component, no separators, no `.` or `..`, not absolute.
pub fn is_valid_theme_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}

/// Create a theme, keeping at most one default per store.
///
/// A theme requested as default is inserted through
/// `RecordStore::insert_default_theme`, which demotes the previous default
/// in the same transaction.
///
/// # Errors
/// - `Error::InvalidInput` if the name is not a single plain path component
/// - `Error::AlreadyExists` if the store already has a theme with that name
pub async fn create_theme(store: &dyn RecordStore, theme: &mut Theme) -> Result<()> {
    theme.store_id.validate()?;
    if !is_valid_theme_name(&theme.name) {
        return Err(Error::InvalidInput(format!(
            "theme name {:?} must be a single directory name",
            theme.name
        )));
    }

    if !theme.is_default {
        return create_record(store, theme).await;
    }

    theme.stamp(Utc::now());
    let row = theme.to_row()?;
    let inserted = store.insert_default_theme(row).await;
    finish_create(theme, inserted)
}

/// Make `name` the default theme of `store_id`, demoting all others
pub async fn set_default_theme(store: &dyn RecordStore, store_id: StoreId, name: &str) -> Result<()> {
    store_id.validate()?;
    store.promote_default_theme(store_id, name).await
}

/// The current default theme of a store, if one is set
pub fn default_theme(themes: &[Theme]) -> Option<&Theme> {
    themes.iter().find(|t| t.is_default)
}

/// Create a page after checking its store identity
pub async fn create_page(store: &dyn RecordStore, page: &mut Page) -> Result<()> {
    page.store_id.validate()?;
    if page.name.is_empty() || page.template_name.is_empty() {
        return Err(Error::InvalidInput(
            "page name and template name are required".to_string(),
        ));
    }
    create_record(store, page).await
}
