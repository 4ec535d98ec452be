/*
 * Error types for logger configuration
 *
 * Every fallible operation in the crate returns LogError. Logging itself never fails once a
 * handle is built; only building handles and loading or validating configuration can.
 */

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Install hint shown when a remote destination is requested without the `remote` feature.
pub const REMOTE_INSTALL_HINT: &str = "cargo build --features remote";

/// Errors raised while configuring loggers and their sinks
#[derive(Debug, Error)]
pub enum LogError {
    /// A remote destination was requested but the reporting client is not compiled in
    #[error("If specifying REMOTE_DSN, the {dependency} must be enabled ({install_hint})")]
    MissingOptionalDependency {
        dependency: &'static str,
        install_hint: &'static str,
    },

    #[error("invalid remote DSN '{dsn}': {reason}")]
    InvalidDsn { dsn: String, reason: String },

    #[error("invalid console format '{template}': {reason}")]
    InvalidFormat { template: String, reason: String },

    #[error("invalid time format '{0}'")]
    InvalidTimeFormat(String),

    #[error("unknown log level '{0}'")]
    InvalidLevel(String),

    #[error("could not read config file '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to create remote client: {0}")]
    RemoteClient(String),
}

impl LogError {
    pub(crate) fn missing_remote_client() -> Self {
        LogError::MissingOptionalDependency {
            dependency: "remote reporting client",
            install_hint: REMOTE_INSTALL_HINT,
        }
    }

    /// True for the error returned when the remote feature is not compiled in
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, LogError::MissingOptionalDependency { .. })
    }
}
