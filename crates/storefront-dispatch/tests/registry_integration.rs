//! Integration tests for host dispatch over a SQLite record store

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;

use storefront_core::{
    Error, Filter, RecordStore, Result, Row, StoreId, catalog, create_record,
    records::{Host, Page, Store, Theme},
};
use storefront_dispatch::{ApplicationOptions, HostRegistry, display_page};
use storefront_store_sqlite::SqliteRecordStore;

/// Delegating store that counts host scans and can be told to fail them
struct FlakyStore {
    inner: SqliteRecordStore,
    fail_scans: AtomicBool,
    host_scans: AtomicUsize,
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn insert(&self, table: &str, row: Row) -> Result<i64> {
        self.inner.insert(table, row).await
    }

    async fn find(&self, table: &str, filter: &Filter) -> Result<Vec<Row>> {
        if table == "hosts" {
            self.host_scans.fetch_add(1, Ordering::SeqCst);
            if self.fail_scans.load(Ordering::SeqCst) {
                return Err(Error::Database("database is locked".to_string()));
            }
        }
        self.inner.find(table, filter).await
    }

    async fn promote_default_theme(&self, store_id: StoreId, name: &str) -> Result<()> {
        self.inner.promote_default_theme(store_id, name).await
    }

    async fn insert_default_theme(&self, row: Row) -> Result<i64> {
        self.inner.insert_default_theme(row).await
    }
}

struct Fixture {
    temp_dir: TempDir,
    records: Arc<FlakyStore>,
    registry: Arc<HostRegistry>,
}

impl Fixture {
    fn apps_root(&self) -> &Path {
        self.temp_dir.path()
    }
}

async fn fixture() -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let inner = SqliteRecordStore::new(temp_dir.path().join("storefront.db"), 4)
        .await
        .unwrap();
    let records = Arc::new(FlakyStore {
        inner,
        fail_scans: AtomicBool::new(false),
        host_scans: AtomicUsize::new(0),
    });
    let registry = Arc::new(HostRegistry::new(
        records.clone(),
        ApplicationOptions::new(temp_dir.path()),
    ));
    Fixture {
        temp_dir,
        records,
        registry,
    }
}

async fn add_store(records: &dyn RecordStore, name: &str) -> StoreId {
    let mut store = Store::new(name);
    create_record(records, &mut store).await.unwrap();
    store.id
}

async fn add_host(records: &dyn RecordStore, name: &str, store_id: StoreId) {
    create_record(records, &mut Host::new(name, store_id))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_end_to_end_home_page() {
    let fx = fixture().await;
    let records = fx.records.as_ref();

    let store_id = add_store(records, "acme").await;
    assert_eq!(store_id, StoreId::new(1));
    add_host(records, "shop.example.com", store_id).await;
    catalog::create_page(
        records,
        &mut Page::new(store_id, "home", "home.html")
            .with_title("Welcome")
            .with_content("Fresh <stock>"),
    )
    .await
    .unwrap();

    let templates = fx.apps_root().join("1/templates");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(
        templates.join("home.html"),
        "<h1>${title}</h1><p>${content}</p><footer>${store.name}</footer>",
    )
    .unwrap();

    let app = fx
        .registry
        .resolve("shop.example.com")
        .await
        .unwrap()
        .expect("host should be mapped");
    assert_eq!(app.store_id(), store_id);

    let rendered = display_page(&app, "home").await.unwrap().unwrap();
    assert_eq!(rendered.status, http::StatusCode::OK);
    assert_eq!(
        rendered.body,
        "<h1>Welcome</h1><p>Fresh &lt;stock&gt;</p><footer>acme</footer>"
    );
}

#[tokio::test]
async fn test_default_theme_templates_used() {
    let fx = fixture().await;
    let records = fx.records.as_ref();

    let store_id = add_store(records, "acme").await;
    add_host(records, "shop.example.com", store_id).await;
    catalog::create_page(records, &mut Page::new(store_id, "home", "home.html"))
        .await
        .unwrap();
    catalog::create_theme(records, &mut Theme::new(store_id, "winter").as_default())
        .await
        .unwrap();

    let theme_dir = fx.apps_root().join("1/themes/winter");
    std::fs::create_dir_all(&theme_dir).unwrap();
    std::fs::write(theme_dir.join("home.html"), "winter ${name}").unwrap();

    let app = fx.registry.resolve("shop.example.com").await.unwrap().unwrap();
    let rendered = display_page(&app, "home").await.unwrap().unwrap();
    assert_eq!(rendered.body, "winter home");
}

#[tokio::test]
async fn test_unmapped_hostname_is_none() {
    let fx = fixture().await;
    let records = fx.records.as_ref();
    let store_id = add_store(records, "acme").await;
    add_host(records, "shop.example.com", store_id).await;

    assert!(fx.registry.resolve("unknown.example.org").await.unwrap().is_none());
    assert!(fx.registry.resolve("").await.unwrap().is_none());
    assert!(fx.registry.is_built());
}

#[tokio::test]
async fn test_hostname_normalized_on_lookup() {
    let fx = fixture().await;
    let records = fx.records.as_ref();
    let store_id = add_store(records, "acme").await;
    add_host(records, "Shop.Example.com", store_id).await;

    for host in ["shop.example.com", "SHOP.example.COM:8080", "shop.example.com."] {
        let app = fx.registry.resolve(host).await.unwrap();
        assert_eq!(app.map(|a| a.store_id()), Some(store_id), "{host}");
    }
}

#[tokio::test]
async fn test_missing_page_not_found() {
    let fx = fixture().await;
    let records = fx.records.as_ref();
    let store_id = add_store(records, "acme").await;
    add_host(records, "shop.example.com", store_id).await;
    for name in ["home", "about"] {
        catalog::create_page(records, &mut Page::new(store_id, name, "page.html"))
            .await
            .unwrap();
    }

    let app = fx.registry.resolve("shop.example.com").await.unwrap().unwrap();
    assert!(display_page(&app, "contact").await.unwrap().is_none());
}

#[tokio::test]
async fn test_hosts_of_one_store_share_application() {
    let fx = fixture().await;
    let records = fx.records.as_ref();
    let acme = add_store(records, "acme").await;
    let beta = add_store(records, "beta").await;
    add_host(records, "shop.example.com", acme).await;
    add_host(records, "www.example.com", acme).await;
    add_host(records, "beta.example.com", beta).await;

    let a = fx.registry.resolve("shop.example.com").await.unwrap().unwrap();
    let b = fx.registry.resolve("www.example.com").await.unwrap().unwrap();
    let c = fx.registry.resolve("beta.example.com").await.unwrap().unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(c.store_id(), beta);
}

#[tokio::test]
async fn test_host_with_missing_store_skipped() {
    let fx = fixture().await;
    let records = fx.records.as_ref();
    let acme = add_store(records, "acme").await;
    add_host(records, "shop.example.com", acme).await;
    add_host(records, "ghost.example.com", StoreId::new(99)).await;

    let table = fx.registry.rebuild().await.unwrap();
    assert_eq!(table.len(), 1);
    assert!(fx.registry.resolve("ghost.example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_rebuild_is_stable() {
    let fx = fixture().await;
    let records = fx.records.as_ref();
    let acme = add_store(records, "acme").await;
    let beta = add_store(records, "beta").await;
    add_host(records, "shop.example.com", acme).await;
    add_host(records, "beta.example.com", beta).await;

    let first = fx.registry.rebuild().await.unwrap();
    let second = fx.registry.rebuild().await.unwrap();

    let mapping = |table: &storefront_dispatch::HostTable| {
        table
            .iter()
            .map(|(host, app)| (host.to_string(), app.store_id()))
            .collect::<HashMap<_, _>>()
    };
    assert_eq!(mapping(&first), mapping(&second));
    assert_eq!(first.generation(), 1);
    assert_eq!(second.generation(), 2);
    assert_eq!(fx.registry.generation(), 2);
    assert_eq!(fx.registry.host_count(), 2);
}

#[tokio::test]
async fn test_rebuild_picks_up_new_hosts() {
    let fx = fixture().await;
    let records = fx.records.as_ref();
    let acme = add_store(records, "acme").await;
    add_host(records, "shop.example.com", acme).await;

    assert_eq!(fx.registry.snapshot().await.unwrap().len(), 1);

    add_host(records, "www.example.com", acme).await;
    // Lookups keep using the published table until a rebuild
    assert!(fx.registry.resolve("www.example.com").await.unwrap().is_none());

    fx.registry.rebuild().await.unwrap();
    assert!(fx.registry.resolve("www.example.com").await.unwrap().is_some());
}

#[tokio::test]
async fn test_failed_rebuild_keeps_previous_table() {
    let fx = fixture().await;
    let records = fx.records.as_ref();
    let acme = add_store(records, "acme").await;
    add_host(records, "shop.example.com", acme).await;

    fx.registry.rebuild().await.unwrap();

    fx.records.fail_scans.store(true, Ordering::SeqCst);
    let err = fx.registry.rebuild().await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    assert_eq!(fx.registry.generation(), 1);
    assert!(fx.registry.resolve("shop.example.com").await.unwrap().is_some());
}

#[tokio::test]
async fn test_first_build_failure_leaves_registry_unbuilt() {
    let fx = fixture().await;
    fx.records.fail_scans.store(true, Ordering::SeqCst);

    assert!(fx.registry.resolve("shop.example.com").await.is_err());
    assert!(!fx.registry.is_built());
    assert_eq!(fx.registry.generation(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_resolves_build_once() {
    let fx = fixture().await;
    let records = fx.records.as_ref();
    let acme = add_store(records, "acme").await;
    add_host(records, "shop.example.com", acme).await;

    let lookups = (0..16).map(|_| {
        let registry = fx.registry.clone();
        tokio::spawn(async move { registry.resolve("shop.example.com").await })
    });
    for result in futures::future::join_all(lookups).await {
        assert!(result.unwrap().unwrap().is_some());
    }

    assert_eq!(fx.records.host_scans.load(Ordering::SeqCst), 1);
    assert_eq!(fx.registry.generation(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_snapshots_are_atomic_under_racing_rebuilds() {
    let fx = fixture().await;
    let records = fx.records.as_ref();
    let acme = add_store(records, "acme").await;
    let beta = add_store(records, "beta").await;
    add_host(records, "shop.example.com", acme).await;
    add_host(records, "beta.example.com", beta).await;
    fx.registry.rebuild().await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let registry = fx.registry.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..5 {
                registry.rebuild().await.unwrap();
            }
        }));
    }
    let writer_records = fx.records.clone();
    tasks.push(tokio::spawn(async move {
        for i in 0..10 {
            add_host(
                writer_records.as_ref(),
                &format!("host{}.example.com", i),
                acme,
            )
            .await;
            tokio::task::yield_now().await;
        }
    }));
    for _ in 0..4 {
        let registry = fx.registry.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..50 {
                let table = registry.snapshot().await.unwrap();
                let mut by_store: HashMap<StoreId, _> = HashMap::new();
                for (_, app) in table.iter() {
                    assert_eq!(app.generation(), table.generation());
                    let first = by_store.entry(app.store_id()).or_insert_with(|| app.clone());
                    assert!(Arc::ptr_eq(first, app));
                }
                tokio::task::yield_now().await;
            }
        }));
    }

    for task in futures::future::join_all(tasks).await {
        task.unwrap();
    }

    assert_eq!(fx.registry.generation(), 21);
    fx.registry.rebuild().await.unwrap();
    assert_eq!(fx.registry.host_count(), 12);
}
