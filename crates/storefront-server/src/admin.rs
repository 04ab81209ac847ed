//! Administrative subcommands
//!
//! Hosts and stores are only created here; the running server picks them
//! up on its next registry rebuild (`POST /admin/rebuild`).

use anyhow::{Context, Result};
use clap::Subcommand;

use storefront_core::{
    RecordStore, StoreId, catalog, create_record,
    records::{Host, Page, Store, Theme},
};

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create a store
    AddStore {
        name: String,

        /// Application directory (default: <apps_root>/<store id>)
        #[arg(long)]
        app_dir: Option<String>,
    },
    /// Map a hostname to a store
    AddHost { hostname: String, store_id: StoreId },
    /// Create a page in a store
    AddPage {
        store_id: StoreId,
        name: String,

        /// Template file, relative to the store's template root
        #[arg(long, default_value = "page.html")]
        template: String,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        content: String,
    },
    /// Create a theme in a store
    AddTheme {
        store_id: StoreId,
        name: String,

        /// Make it the store's default theme
        #[arg(long)]
        default: bool,
    },
    /// Make a theme the store's only default
    SetDefaultTheme { store_id: StoreId, name: String },
    /// Print all host mappings
    ListHosts,
}

pub async fn run(command: AdminCommand, records: &dyn RecordStore) -> Result<()> {
    match command {
        AdminCommand::AddStore { name, app_dir } => {
            let mut store = Store::new(name);
            store.app_dir = app_dir;
            create_record(records, &mut store)
                .await
                .context("Failed to create store")?;
            println!("Created store {} ({})", store.id, store.name);
        }
        AdminCommand::AddHost { hostname, store_id } => {
            let store_id = store_id.validate()?;
            let mut host = Host::new(hostname, store_id);
            create_record(records, &mut host)
                .await
                .with_context(|| format!("Failed to map host {}", host.name))?;
            println!("Mapped {} to store {}", host.name, store_id);
        }
        AdminCommand::AddPage {
            store_id,
            name,
            template,
            title,
            description,
            content,
        } => {
            let mut page = Page::new(store_id, name, template)
                .with_title(title)
                .with_description(description)
                .with_content(content);
            catalog::create_page(records, &mut page)
                .await
                .context("Failed to create page")?;
            println!("Created page {} in store {}", page.name, page.store_id);
        }
        AdminCommand::AddTheme {
            store_id,
            name,
            default,
        } => {
            store_id.validate()?;
            let mut theme = Theme::new(store_id, name);
            theme.is_default = default;
            catalog::create_theme(records, &mut theme)
                .await
                .context("Failed to create theme")?;
            println!(
                "Created theme {} in store {}{}",
                theme.name,
                theme.store_id,
                if theme.is_default { " (default)" } else { "" }
            );
        }
        AdminCommand::SetDefaultTheme { store_id, name } => {
            catalog::set_default_theme(records, store_id, &name)
                .await
                .with_context(|| format!("Failed to set default theme {}", name))?;
            println!("Theme {} is now the default of store {}", name, store_id);
        }
        AdminCommand::ListHosts => {
            for host in catalog::get_host_mappings(records).await? {
                println!("{}\t{}", host.name, host.store_id);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_store_sqlite::SqliteRecordStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_admin_commands_populate_records() {
        let temp_dir = TempDir::new().unwrap();
        let records = SqliteRecordStore::new(temp_dir.path().join("admin.db"), 1)
            .await
            .unwrap();

        run(
            AdminCommand::AddStore {
                name: "acme".to_string(),
                app_dir: None,
            },
            &records,
        )
        .await
        .unwrap();
        run(
            AdminCommand::AddHost {
                hostname: "shop.example.com".to_string(),
                store_id: StoreId::new(1),
            },
            &records,
        )
        .await
        .unwrap();
        run(
            AdminCommand::AddTheme {
                store_id: StoreId::new(1),
                name: "light".to_string(),
                default: true,
            },
            &records,
        )
        .await
        .unwrap();

        let hosts = catalog::get_host_mappings(&records).await.unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].store_id, StoreId::new(1));

        let themes = catalog::get_themes(&records, StoreId::new(1)).await.unwrap();
        assert!(themes[0].is_default);
    }

    #[tokio::test]
    async fn test_duplicate_host_reports_context() {
        let temp_dir = TempDir::new().unwrap();
        let records = SqliteRecordStore::new(temp_dir.path().join("admin.db"), 1)
            .await
            .unwrap();

        let add = || AdminCommand::AddHost {
            hostname: "shop.example.com".to_string(),
            store_id: StoreId::new(1),
        };
        run(add(), &records).await.unwrap();

        let err = run(add(), &records).await.unwrap_err();
        assert!(err.to_string().contains("shop.example.com"));
        assert_eq!(
            err.root_cause().to_string(),
            "host name was already existing."
        );
    }

    #[tokio::test]
    async fn test_invalid_store_id_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let records = SqliteRecordStore::new(temp_dir.path().join("admin.db"), 1)
            .await
            .unwrap();

        let result = run(
            AdminCommand::AddHost {
                hostname: "shop.example.com".to_string(),
                store_id: StoreId::new(0),
            },
            &records,
        )
        .await;
        assert!(result.is_err());
    }
}
