//! Per-store application

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use storefront_core::{
    RecordStore, Result, StoreId, catalog,
    records::{Page, Store, Theme},
};

use crate::render::{FileRenderer, Renderer};

/// Settings shared by every store application
#[derive(Debug, Clone)]
pub struct ApplicationOptions {
    /// Parent of the per-store application directories
    pub apps_root: PathBuf,
}

impl Default for ApplicationOptions {
    fn default() -> Self {
        Self {
            apps_root: PathBuf::from("apps"),
        }
    }
}

impl ApplicationOptions {
    pub fn new(apps_root: impl Into<PathBuf>) -> Self {
        Self {
            apps_root: apps_root.into(),
        }
    }
}

/// Runtime state of one tenant.
///
/// Built once per registry generation and shared by every hostname that
/// maps to the store.
pub struct StoreApplication {
    store: Store,
    pages: Vec<Page>,
    themes: Vec<Theme>,
    app_dir: PathBuf,
    template_root: PathBuf,
    renderer: Arc<dyn Renderer>,
    generation: u64,
}

impl std::fmt::Debug for StoreApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreApplication")
            .field("store_id", &self.store.id)
            .field("name", &self.store.name)
            .field("pages", &self.pages.len())
            .field("themes", &self.themes.len())
            .field("app_dir", &self.app_dir)
            .field("template_root", &self.template_root)
            .field("generation", &self.generation)
            .finish()
    }
}

impl StoreApplication {
    /// Build the application of `store` from its persisted pages and themes.
    ///
    /// # Errors
    /// - `Error::InvalidStore` if the store id is not positive
    /// - any error of the record store while loading pages or themes
    pub async fn build(
        store: Store,
        records: &dyn RecordStore,
        options: &ApplicationOptions,
        generation: u64,
    ) -> Result<Self> {
        let store_id = store.id.validate()?;

        let pages = catalog::get_pages(records, store_id).await?;
        let themes = catalog::get_themes(records, store_id).await?;

        let app_dir = match &store.app_dir {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => options.apps_root.join(store_id.to_string()),
        };

        let template_root = match catalog::default_theme(&themes) {
            Some(theme) if catalog::is_valid_theme_name(&theme.name) => {
                app_dir.join("themes").join(&theme.name)
            }
            Some(theme) => {
                warn!(
                    "Ignoring default theme {:?} of store {}: not a plain directory name",
                    theme.name, store_id
                );
                app_dir.join("templates")
            }
            None => app_dir.join("templates"),
        };

        debug!(
            "Built application for store {} ({} pages, {} themes, templates in {:?})",
            store_id,
            pages.len(),
            themes.len(),
            template_root
        );

        Ok(Self {
            renderer: Arc::new(FileRenderer::new(&template_root)),
            store,
            pages,
            themes,
            app_dir,
            template_root,
            generation,
        })
    }

    /// Replace the renderer
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn store_id(&self) -> StoreId {
        self.store.id
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn default_theme(&self) -> Option<&Theme> {
        catalog::default_theme(&self.themes)
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    /// Registry generation that built this application
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Exact-name lookup within this store's pages
    pub fn find_page(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.name == name)
    }
}
