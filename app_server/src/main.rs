mod app_config;
mod routes;

use std::sync::Arc;

use libapplog::{log_critical, log_info, LoggerRegistry};
use tokio::net::TcpListener;

use crate::app_config::AppConfig;

const CONFIG_PATH: &str = "app_config.toml";

#[tokio::main]
async fn main() {
    let app_config = match AppConfig::from_file(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}. Using defaults.", e);
            AppConfig::default()
        }
    };

    // The registry lives at the composition root and is shared with every handler
    let registry = match LoggerRegistry::from_app(&app_config, None) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            eprintln!("Invalid logging configuration: {}", e);
            std::process::exit(1);
        }
    };

    let address = app_config.server.address;
    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(e) => {
            let _ = log_critical!(registry, "server", "Failed to bind {}: {}", address, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = log_info!(registry, "server", "Listening at http://{}", address) {
        eprintln!("Logging failed: {}", e);
    }

    let app = routes::router(Arc::clone(&registry));
    if let Err(e) = axum::serve(listener, app).await {
        let _ = log_critical!(registry, "server", "Server stopped: {}", e);
    }
}
