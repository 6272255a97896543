// Server connection settings (base URL, base path, API key), persisted as a
// small JSON file next to the binary. Kept separate from saved presets so
// wiping the connection never touches them.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub base_path: String,
    #[serde(default)]
    pub api_key: String,
}

lazy_static! {
    pub static ref SERVER_CONFIG: RwLock<ServerConfig> = RwLock::new(ServerConfig::default());
}

fn config_file_path() -> PathBuf {
    // Env override so tests write somewhere disposable
    if let Ok(p) = std::env::var("TRAWL_CONFIG_PATH") {
        return PathBuf::from(p);
    }
    PathBuf::from("trawl_config.json")
}

impl ServerConfig {
    /// Split a user-entered URL into origin + path. A missing scheme gets
    /// "http://" prepended; trailing slashes are dropped from the path.
    pub fn from_url_and_key(url: &str, api_key: &str) -> Self {
        let trimmed = url.trim().trim_end_matches('/');
        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };
        match Url::parse(&candidate) {
            Ok(parsed) => Self {
                base_url: parsed.origin().ascii_serialization(),
                base_path: parsed.path().trim_end_matches('/').to_string(),
                api_key: api_key.trim().to_string(),
            },
            Err(_) => Self {
                base_url: candidate,
                base_path: String::new(),
                api_key: api_key.trim().to_string(),
            },
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.api_key.trim().is_empty()
    }

    pub fn load_from_file(path: &std::path::Path) -> std::io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: ServerConfig = serde_json::from_str(&data)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(cfg)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, data)
    }
}

/// Snapshot of the current connection settings.
pub fn current() -> ServerConfig {
    SERVER_CONFIG.read().unwrap().clone()
}

pub fn load_config_from_disk() {
    let path = config_file_path();
    match ServerConfig::load_from_file(&path) {
        Ok(cfg) => {
            *SERVER_CONFIG.write().unwrap() = cfg;
            log::info!("Loaded server config from {}", path.to_string_lossy());
        }
        Err(e) => {
            // Missing or unreadable file keeps the defaults
            log::info!(
                "Using default server config; cannot load {}: {}",
                path.to_string_lossy(),
                e
            );
        }
    }
}

pub fn save_config_to_disk() {
    let path = config_file_path();
    let cfg = SERVER_CONFIG.read().unwrap().clone();
    if let Err(e) = cfg.save_to_file(&path) {
        log::error!(
            "Failed to save server config to {}: {}",
            path.to_string_lossy(),
            e
        );
    } else {
        log::info!("Saved server config to {}", path.to_string_lossy());
    }
}

/// Forget the connection (disconnect). Resets the global and persists the
/// empty config so the next start lands on the setup screen again.
pub fn clear_and_save() {
    *SERVER_CONFIG.write().unwrap() = ServerConfig::default();
    save_config_to_disk();
}

/// Validate the entered URL and key by listing indexers, then store and
/// persist the config. Used by the setup screen's Connect button.
pub async fn connect_and_store(url: String, api_key: String) -> Result<(), String> {
    let candidate = ServerConfig::from_url_and_key(&url, &api_key);
    if !candidate.is_complete() {
        return Err("Please enter the server URL and API key".to_string());
    }
    crate::api::fetch_indexers(&candidate)
        .await
        .map_err(|e| format!("Could not connect: {e}"))?;

    *SERVER_CONFIG.write().unwrap() = candidate;
    save_config_to_disk();
    log::info!("Connected to {}", url.trim());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Temp file path with PID so parallel test runs never collide.
    fn temp_config_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("{}_{}.json", name, std::process::id()));
        p
    }

    #[test]
    fn url_splitting_covers_common_inputs() {
        let cfg = ServerConfig::from_url_and_key("http://localhost:9117/", "k");
        assert_eq!(cfg.base_url, "http://localhost:9117");
        assert_eq!(cfg.base_path, "");

        let cfg = ServerConfig::from_url_and_key("https://box.example/jackett/", "k");
        assert_eq!(cfg.base_url, "https://box.example");
        assert_eq!(cfg.base_path, "/jackett");

        // scheme-less input gets http:// prepended
        let cfg = ServerConfig::from_url_and_key("localhost:9117", "k");
        assert_eq!(cfg.base_url, "http://localhost:9117");
        assert_eq!(cfg.base_path, "");
    }

    #[test]
    fn file_round_trip_preserves_fields() {
        let path = temp_config_path("trawl_config_roundtrip");
        let cfg = ServerConfig {
            base_url: "http://localhost:9117".to_string(),
            base_path: "/jackett".to_string(),
            api_key: "abc123".to_string(),
        };
        cfg.save_to_file(&path).unwrap();
        let loaded = ServerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, cfg);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn completeness_requires_url_and_key() {
        assert!(!ServerConfig::default().is_complete());
        assert!(!ServerConfig::from_url_and_key("http://x", "").is_complete());
        assert!(ServerConfig::from_url_and_key("http://x", "k").is_complete());
    }
}
