//! Storefront multi-tenant server
//!
//! This server provides:
//! - Host-based dispatch of storefront pages to per-store applications
//! - Tenant JSON API for pages and themes
//! - Multipart file upload
//! - Administrative subcommands to manage stores, hosts, pages and themes
//!
//! Usage:
//! ```bash
//! # With config file
//! storefront-server --config storefront.yaml
//!
//! # Register a store and a hostname, then serve
//! storefront-server admin add-store acme
//! storefront-server admin add-host shop.example.com 1
//! storefront-server serve
//! ```
//!
//! Test with:
//! ```bash
//! curl -H "Host: shop.example.com" http://localhost:8080/
//! curl -F "file=@photo.png" http://localhost:8080/upload
//! ```

mod admin;
mod config;

use admin::AdminCommand;
use clap::{Parser, Subcommand};
use config::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use storefront_core::RecordStore;
use storefront_dispatch::{ApplicationOptions, HostRegistry};
use storefront_ingress::AppState;
use storefront_store_sqlite::SqliteRecordStore;

/// Storefront Server - multi-tenant storefront backend
#[derive(Parser)]
#[command(name = "storefront-server")]
#[command(about = "Multi-tenant storefront server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "STOREFRONT_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Path to the SQLite database (overrides config)
    #[arg(long, value_name = "PATH", global = true)]
    database: Option<String>,

    /// Address to bind (overrides config)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the storefront server (default if no command specified)
    Serve,
    /// Manage stores, hosts, pages and themes
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let (mut config, source) = match &cli.config {
        Some(config_path) => (ServerConfig::from_file(config_path)?, config_path.as_str()),
        None => (ServerConfig::default(), "defaults"),
    };

    // Merge environment variables (they override config file)
    config.merge_env();

    // CLI flags have the highest precedence
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    init_tracing(&config)?;
    info!("📁 Configuration loaded from {}", source);

    let db_path = config.db_path();
    let records: Arc<dyn RecordStore> = Arc::new(
        SqliteRecordStore::new(&db_path, config.database.max_connections).await?,
    );

    match cli.command {
        Some(Commands::Admin(command)) => {
            admin::run(command, records.as_ref()).await?;
            Ok(())
        }
        Some(Commands::Serve) | None => serve(config, records).await,
    }
}

/// Initialize tracing with configured level and sqlx query control
fn init_tracing(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::new(format!("{}", log_level));

    // Keep sqlx quiet unless SQL logging is requested
    if !config.logging.log_sql_queries {
        match "sqlx=warn".parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => tracing::warn!("Failed to set sqlx log filter: {}", e),
        }
    }

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn serve(
    config: ServerConfig,
    records: Arc<dyn RecordStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let apps_root = config.apps_root();
    let upload_dir = config.upload_dir();
    tokio::fs::create_dir_all(&upload_dir).await?;

    let registry = Arc::new(HostRegistry::new(
        records,
        ApplicationOptions::new(&apps_root),
    ));

    // A registry that can't be built at startup is fatal
    let table = match registry.rebuild().await {
        Ok(table) => table,
        Err(e) => {
            error!("Failed to build host registry: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "🏬 Serving {} hosts (apps in {:?}, uploads to {:?})",
        table.len(),
        apps_root,
        upload_dir
    );

    let state =
        AppState::new(registry, upload_dir).with_max_upload_size(config.upload.max_file_size);
    let app = if config.logging.log_requests {
        storefront_ingress::traced_router(state)
    } else {
        storefront_ingress::router(state)
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("✅ Storefront listening on http://{}", addr);
    info!("   - Health check: http://{}/healthz", addr);
    info!("   - Rebuild:      POST http://{}/admin/rebuild", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
