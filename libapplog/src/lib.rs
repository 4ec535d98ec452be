/*
 * Main library entry point that exposes the public API
 *
 * This file defines the public interface for the application logging library, including:
 * - Re-exporting LoggerRegistry, the memoizing per-name logger cache
 * - Re-exporting LogConfig, Level and HostApp for configuration
 * - Re-exporting the sink types and the remote capability probe
 * - Defining logging macros (log_debug, log_info, log_warning, log_error, log_critical)
 *
 * The macros format their message like println! and forward it to the registry with no
 * structured extras and no destination override.
 */

mod config;
mod configurator;
mod error;
mod format;
mod handle;
mod record;
mod registry;
mod remote;
mod sinks;

pub use config::{HostApp, Level, LogConfig, DEFAULT_CONSOLE_FORMAT, DEFAULT_TIME_FORMAT};
pub use configurator::{effective_destination, SinkConfigurator};
pub use error::{LogError, REMOTE_INSTALL_HINT};
pub use format::Formatter;
pub use handle::LogHandle;
pub use record::{ErrorContext, Extra, Record};
pub use registry::{LoggerKey, LoggerRegistry};
pub use remote::{Connector, Dsn, EventTransport, RemoteCapability, RemoteEvent};
pub use sinks::{ConsoleSink, ConsoleTarget, RemoteSink, SharedBuffer, Sink, SinkKind};

#[cfg(feature = "remote")]
pub use remote::http::HttpTransport;

#[macro_export]
macro_rules! log_debug {
    ($registry:expr, $name:expr, $($arg:tt)+) => {
        $registry.debug($name, &format!($($arg)+), None, None)
    };
}

#[macro_export]
macro_rules! log_info {
    ($registry:expr, $name:expr, $($arg:tt)+) => {
        $registry.info($name, &format!($($arg)+), None, None)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($registry:expr, $name:expr, $($arg:tt)+) => {
        $registry.warning($name, &format!($($arg)+), None, None)
    };
}

#[macro_export]
macro_rules! log_error {
    ($registry:expr, $name:expr, $($arg:tt)+) => {
        $registry.error($name, &format!($($arg)+), None, None)
    };
}

#[macro_export]
macro_rules! log_critical {
    ($registry:expr, $name:expr, $($arg:tt)+) => {
        $registry.critical($name, &format!($($arg)+), None, None)
    };
}
