//! Page resolution

use http::StatusCode;
use serde_json::{Value, json};
use tracing::debug;

use storefront_core::{Result, records::Page};

use crate::{application::StoreApplication, render::Rendered};

/// Template context of a page: its fields plus `store.id` and `store.name`
fn page_context(app: &StoreApplication, page: &Page) -> Result<Value> {
    let mut context = serde_json::to_value(page)?;
    if let Value::Object(map) = &mut context {
        map.insert(
            "store".to_string(),
            json!({ "id": app.store_id(), "name": app.store().name }),
        );
    }
    Ok(context)
}

/// Render the page called `name`.
///
/// Returns `Ok(None)` when the store has no such page.
pub async fn display_page(app: &StoreApplication, name: &str) -> Result<Option<Rendered>> {
    let Some(page) = app.find_page(name) else {
        debug!("Store {} has no page {:?}", app.store_id(), name);
        return Ok(None);
    };

    let context = page_context(app, page)?;
    let rendered = app
        .renderer()
        .render(StatusCode::OK, &page.template_name, &context)
        .await?;
    Ok(Some(rendered))
}

/// Read the raw page file `<app_dir>/pages/<name>.html`.
///
/// Names that could leave the pages directory resolve to `Ok(None)`, as do
/// missing files.
pub async fn page_source(app: &StoreApplication, name: &str) -> Result<Option<String>> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Ok(None);
    }

    let path = app.app_dir().join("pages").join(format!("{}.html", name));
    match tokio::fs::read_to_string(&path).await {
        Ok(source) => Ok(Some(source)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
