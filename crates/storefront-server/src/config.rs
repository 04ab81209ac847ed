use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Parent of per-store application directories (`<apps_root>/<store id>`)
    #[serde(default = "default_apps_root")]
    pub apps_root: String,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory receiving `/upload` files
    #[serde(default = "default_upload_dir")]
    pub dir: String,

    /// Largest accepted `/upload` request body, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_false")]
    pub log_sql_queries: bool,

    #[serde(default = "default_false")]
    pub log_requests: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: DatabaseConfig::default(),
            apps_root: default_apps_root(),
            upload: UploadConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_sql_queries: false,
            log_requests: false,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // Server settings
        if let Ok(val) = std::env::var("STOREFRONT_HOST") {
            self.host = val;
        }

        if let Ok(val) = std::env::var("STOREFRONT_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => eprintln!("Warning: Invalid STOREFRONT_PORT '{}', ignoring", val),
            }
        }

        // Database settings
        if let Ok(val) = std::env::var("STOREFRONT_DB_PATH") {
            self.database.path = val;
        }

        if let Ok(val) = std::env::var("STOREFRONT_DB_MAX_CONNECTIONS")
            && let Ok(max) = val.parse::<u32>()
        {
            self.database.max_connections = max;
        }

        // Directories
        if let Ok(val) = std::env::var("STOREFRONT_APPS_ROOT") {
            self.apps_root = val;
        }

        // Upload settings
        if let Ok(val) = std::env::var("STOREFRONT_UPLOAD_DIR") {
            self.upload.dir = val;
        }

        if let Ok(val) = std::env::var("STOREFRONT_UPLOAD_MAX_FILE_SIZE") {
            match val.parse::<usize>() {
                Ok(size) => self.upload.max_file_size = size,
                Err(_) => eprintln!(
                    "Warning: Invalid STOREFRONT_UPLOAD_MAX_FILE_SIZE '{}', ignoring",
                    val
                ),
            }
        }

        // Logging settings
        if let Ok(val) = std::env::var("STOREFRONT_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("STOREFRONT_LOG_SQL_QUERIES")
            && let Ok(enabled) = val.parse::<bool>()
        {
            self.logging.log_sql_queries = enabled;
        }

        if let Ok(val) = std::env::var("STOREFRONT_LOG_REQUESTS")
            && let Ok(enabled) = val.parse::<bool>()
        {
            self.logging.log_requests = enabled;
        }
    }

    pub fn db_path(&self) -> PathBuf {
        expand(&self.database.path)
    }

    pub fn apps_root(&self) -> PathBuf {
        expand(&self.apps_root)
    }

    pub fn upload_dir(&self) -> PathBuf {
        expand(&self.upload.dir)
    }
}

/// Expand `~` in a configured path
fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "~/.storefront/storefront.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_apps_root() -> String {
    "./apps".to_string()
}

fn default_upload_dir() -> String {
    "./upload".to_string()
}

fn default_max_file_size() -> usize {
    32 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}
