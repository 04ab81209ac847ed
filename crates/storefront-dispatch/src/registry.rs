//! Host registry
//!
//! The registry maps normalized hostnames to store applications. The whole
//! table is rebuilt from the record store and published with a single swap:
//! readers see either the previous complete table or the new one, never a
//! mix. Rebuilds are serialized by a gate so concurrent first requests
//! build the table once.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use storefront_core::{HostName, RecordStore, Result, StoreId, catalog, records::Store};

use crate::application::{ApplicationOptions, StoreApplication};

/// One generation of hostname → application mappings
#[derive(Debug)]
pub struct HostTable {
    generation: u64,
    built_at: DateTime<Utc>,
    hosts: HashMap<HostName, Arc<StoreApplication>>,
}

impl HostTable {
    pub fn get(&self, host: &HostName) -> Option<&Arc<StoreApplication>> {
        self.hosts.get(host)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Number of hostnames
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HostName, &Arc<StoreApplication>)> {
        self.hosts.iter()
    }
}

/// Process-wide hostname → store application registry
pub struct HostRegistry {
    records: Arc<dyn RecordStore>,
    options: ApplicationOptions,
    current: RwLock<Option<Arc<HostTable>>>,
    /// Serializes rebuilds
    gate: Mutex<()>,
}

impl HostRegistry {
    /// Create an unbuilt registry; the first `resolve` builds it
    pub fn new(records: Arc<dyn RecordStore>, options: ApplicationOptions) -> Self {
        Self {
            records,
            options,
            current: RwLock::new(None),
            gate: Mutex::new(()),
        }
    }

    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    pub fn options(&self) -> &ApplicationOptions {
        &self.options
    }

    fn current(&self) -> Option<Arc<HostTable>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_built(&self) -> bool {
        self.current().is_some()
    }

    /// Generation of the published table, `0` before the first build
    pub fn generation(&self) -> u64 {
        self.current().map(|t| t.generation).unwrap_or(0)
    }

    pub fn host_count(&self) -> usize {
        self.current().map(|t| t.len()).unwrap_or(0)
    }

    /// Look up the application serving `hostname`.
    ///
    /// Builds the table on first use. Unknown and malformed hostnames
    /// resolve to `Ok(None)`.
    pub async fn resolve(&self, hostname: &str) -> Result<Option<Arc<StoreApplication>>> {
        let host = match HostName::parse(hostname) {
            Ok(host) => host,
            Err(e) => {
                debug!("Unroutable host {:?}: {}", hostname, e);
                return Ok(None);
            }
        };

        let table = self.snapshot().await?;
        Ok(table.get(&host).cloned())
    }

    /// The current table, building it first if needed
    pub async fn snapshot(&self) -> Result<Arc<HostTable>> {
        if let Some(table) = self.current() {
            return Ok(table);
        }

        let _guard = self.gate.lock().await;
        // Another task may have finished the build while we waited
        if let Some(table) = self.current() {
            return Ok(table);
        }
        self.build_locked().await
    }

    /// Rebuild the table from the record store and publish it.
    ///
    /// On failure the previous table stays in place.
    pub async fn rebuild(&self) -> Result<Arc<HostTable>> {
        let _guard = self.gate.lock().await;
        self.build_locked().await
    }

    /// Build and publish a new table. Caller must hold `gate`.
    async fn build_locked(&self) -> Result<Arc<HostTable>> {
        let generation = self.generation() + 1;
        let records = self.records.as_ref();

        let hosts = catalog::get_host_mappings(records).await?;
        let stores = catalog::get_stores(records).await?;

        let mut stores_by_id: HashMap<StoreId, Store> =
            stores.into_iter().map(|s| (s.id, s)).collect();
        let mut applications: HashMap<StoreId, Arc<StoreApplication>> = HashMap::new();
        let mut table = HashMap::with_capacity(hosts.len());

        for host in hosts {
            let name = match HostName::parse(&host.name) {
                Ok(name) => name,
                Err(e) => {
                    warn!("Skipping host mapping {}: {}", host.id, e);
                    continue;
                }
            };

            if table.contains_key(&name) {
                warn!("Duplicate host mapping for {}, keeping the first", name);
                continue;
            }

            let application = match applications.get(&host.store_id) {
                Some(app) => app.clone(),
                None => {
                    let Some(store) = stores_by_id.remove(&host.store_id) else {
                        warn!(
                            "Host {} maps to unknown store {}, skipping",
                            name, host.store_id
                        );
                        continue;
                    };
                    let app = Arc::new(
                        StoreApplication::build(store, records, &self.options, generation)
                            .await?,
                    );
                    applications.insert(host.store_id, app.clone());
                    app
                }
            };

            table.insert(name, application);
        }

        let table = Arc::new(HostTable {
            generation,
            built_at: Utc::now(),
            hosts: table,
        });

        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(table.clone());

        info!(
            "Host registry generation {} built: {} hosts, {} stores",
            generation,
            table.len(),
            applications.len()
        );

        Ok(table)
    }
}

impl std::fmt::Debug for HostRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostRegistry")
            .field("options", &self.options)
            .field("generation", &self.generation())
            .field("hosts", &self.host_count())
            .finish()
    }
}
