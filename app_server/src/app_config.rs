use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use libapplog::{HostApp, LogConfig};
use serde::Deserialize;

fn default_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            address: default_address(),
        }
    }
}

/// Application configuration read from app_config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Unable to read {}: {}", path.display(), e))?;
        toml::from_str(&contents).map_err(|e| format!("Error parsing {}: {}", path.display(), e))
    }
}

impl HostApp for AppConfig {
    fn log_config(&self) -> LogConfig {
        self.logging.clone()
    }
}
