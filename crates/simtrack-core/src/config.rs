//! Configuration resolution for Simtrack.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`~/.config/simtrack/settings.json`)
//! 3. Explicit config file (`--config` / caller-supplied path)
//! 4. Environment variables (highest priority)
//!
//! The store section carries one connection entry per logical collection.
//! Each entry has its own URI so every collection can authenticate as a
//! distinct, least-privilege database principal (see `simtrack-cli init-db`
//! for how those principals are provisioned).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete Simtrack configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Document-store configuration: one connection entry per collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Logical database name holding all collections.
    pub db_name: String,
    pub clients: CollectionEndpoint,
    pub devices: CollectionEndpoint,
    pub subscriptions: CollectionEndpoint,
    pub stripe_customers: CollectionEndpoint,
    pub wc_customers: CollectionEndpoint,
    pub wialon_users: CollectionEndpoint,
    pub users: CollectionEndpoint,
}

/// Connection settings for a single collection.
///
/// The URI carries the credential principal; the collection name is the
/// physical collection inside [`StoreConfig::db_name`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionEndpoint {
    pub uri: String,
    pub collection: String,
}

impl CollectionEndpoint {
    fn localhost(collection: &str) -> Self {
        Self {
            uri: "mongodb://localhost:27017/simtrack".to_string(),
            collection: collection.to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_name: "simtrack".to_string(),
            clients: CollectionEndpoint::localhost("clients"),
            devices: CollectionEndpoint::localhost("devices"),
            subscriptions: CollectionEndpoint::localhost("subscriptions"),
            stripe_customers: CollectionEndpoint::localhost("stripe_customers"),
            wc_customers: CollectionEndpoint::localhost("woocommerce_customers"),
            wialon_users: CollectionEndpoint::localhost("wialon_users"),
            users: CollectionEndpoint::localhost("users"),
        }
    }
}

/// Server-side tunables consumed by the store layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Failed logins tolerated before an account is temporarily locked.
    pub max_login_attempts: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { max_login_attempts: 5 }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    if let Some(path) = explicit_path {
        let explicit = load_config_file(path)?;
        merge_config(&mut config, explicit);
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path (`<config dir>/simtrack/settings.json`).
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("simtrack").join("settings.json"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    base.store = overlay.store;
    base.server = overlay.server;
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("SIMTRACK_DB_NAME") {
        config.store.db_name = val;
    }
    if let Ok(val) = std::env::var("SIMTRACK_MAX_LOGIN_ATTEMPTS") {
        if let Ok(n) = val.parse() {
            config.server.max_login_attempts = n;
        }
    }

    let uri_overrides = [
        ("SIMTRACK_CLIENTS_URI", &mut config.store.clients),
        ("SIMTRACK_DEVICES_URI", &mut config.store.devices),
        ("SIMTRACK_SUBSCRIPTIONS_URI", &mut config.store.subscriptions),
        ("SIMTRACK_STRIPE_CUSTOMERS_URI", &mut config.store.stripe_customers),
        ("SIMTRACK_WC_CUSTOMERS_URI", &mut config.store.wc_customers),
        ("SIMTRACK_WIALON_USERS_URI", &mut config.store.wialon_users),
        ("SIMTRACK_USERS_URI", &mut config.store.users),
    ];
    for (var, endpoint) in uri_overrides {
        if let Ok(val) = std::env::var(var) {
            endpoint.uri = val;
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_allows_five_attempts() {
        let config = Config::default();
        assert_eq!(config.server.max_login_attempts, 5);
    }

    #[test]
    fn default_endpoints_cover_every_collection() {
        let store = StoreConfig::default();
        let names: Vec<&str> = vec![
            &store.clients.collection,
            &store.devices.collection,
            &store.subscriptions.collection,
            &store.stripe_customers.collection,
            &store.wc_customers.collection,
            &store.wialon_users.collection,
            &store.users.collection,
        ];
        assert_eq!(names.len(), 7);
        assert!(names.iter().all(|n| !n.is_empty()));
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::json!({
            "store": { "db_name": "staging" },
            "server": { "max_login_attempts": 3 }
        });
        // Partial store sections fall back to defaults through serde(default)
        // at the Config level only, so write a full store section here.
        let mut full = serde_json::to_value(Config::default()).unwrap();
        full["store"]["db_name"] = json["store"]["db_name"].clone();
        full["server"]["max_login_attempts"] = json["server"]["max_login_attempts"].clone();
        write!(file, "{full}").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.store.db_name, "staging");
        assert_eq!(config.server.max_login_attempts, 3);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/settings.json")));
        assert!(err.is_err());
    }
}
