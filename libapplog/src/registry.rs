/*
 * Logger registry
 *
 * This file implements the public logging surface:
 * - Memoizing fully configured handles by (name, destination override)
 * - Building missing handles exactly once, even under concurrent first access
 * - Leveled logging operations that resolve the handle and forward the call
 * - Sourcing configuration from the host application or an explicit override
 *
 * Cached handles are never reconfigured. Changing the live configuration only affects keys
 * that have not been resolved yet; reset() drops every cached handle.
 */

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::OnceCell;

use crate::config::{HostApp, Level, LogConfig};
use crate::configurator::SinkConfigurator;
use crate::error::LogError;
use crate::handle::LogHandle;
use crate::record::{ErrorContext, Extra};
use crate::remote::RemoteCapability;
use crate::sinks::ConsoleTarget;

/// Identity of a cached handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoggerKey {
    pub name: String,
    pub destination_override: Option<String>,
}

impl LoggerKey {
    pub fn new(name: &str, destination_override: Option<&str>) -> Self {
        LoggerKey {
            name: name.to_string(),
            destination_override: destination_override.map(str::to_string),
        }
    }
}

type Slot = Arc<OnceCell<Arc<LogHandle>>>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-wide cache of configured loggers, owned by the application's composition root
pub struct LoggerRegistry {
    config: RwLock<Option<LogConfig>>,
    configurator: SinkConfigurator,
    loggers: RwLock<HashMap<LoggerKey, Slot>>,
}

impl Default for LoggerRegistry {
    /// A registry that has not been given any configuration yet; defaults apply
    fn default() -> Self {
        LoggerRegistry {
            config: RwLock::new(None),
            configurator: SinkConfigurator::default(),
            loggers: RwLock::new(HashMap::new()),
        }
    }
}

impl LoggerRegistry {
    /// Creates a registry with an explicit configuration
    pub fn new(config: LogConfig) -> Result<Self, LogError> {
        config.validate()?;
        let registry = LoggerRegistry::default();
        *write(&registry.config) = Some(config);
        Ok(registry)
    }

    /// Creates a registry for a host application.
    ///
    /// An explicit `config` takes precedence over the application's own configuration.
    pub fn from_app<A: HostApp + ?Sized>(
        app: &A,
        config: Option<LogConfig>,
    ) -> Result<Self, LogError> {
        let registry = LoggerRegistry::default();
        registry.init_app(app, config)?;
        Ok(registry)
    }

    /// Binds the registry to a host application.
    ///
    /// An explicit `config` replaces the current configuration. Without one, the application's
    /// configuration is adopted only if no configuration was set before.
    pub fn init_app<A: HostApp + ?Sized>(
        &self,
        app: &A,
        config: Option<LogConfig>,
    ) -> Result<(), LogError> {
        let mut current = write(&self.config);
        let chosen = match config {
            Some(config) => config,
            None => match current.as_ref() {
                Some(_) => return Ok(()),
                None => app.log_config(),
            },
        };
        chosen.validate()?;
        *current = Some(chosen);
        Ok(())
    }

    /// Sends console output of handles built from now on to `target`
    pub fn with_console_target(mut self, target: ConsoleTarget) -> Self {
        let remote = self.configurator.remote_capability().clone();
        self.configurator = SinkConfigurator::new(target, remote);
        self
    }

    /// Replaces the compiled-in remote capability for handles built from now on
    pub fn with_remote_capability(mut self, remote: RemoteCapability) -> Self {
        let console = self.configurator.console_target().clone();
        self.configurator = SinkConfigurator::new(console, remote);
        self
    }

    /// Snapshot of the live configuration
    pub fn config(&self) -> LogConfig {
        read(&self.config).clone().unwrap_or_default()
    }

    /// Mutates the live configuration.
    ///
    /// Handles that are already cached keep the sinks they were built with.
    pub fn update_config<F>(&self, update: F) -> Result<(), LogError>
    where
        F: FnOnce(&mut LogConfig),
    {
        let mut current = write(&self.config);
        let mut next = current.clone().unwrap_or_default();
        update(&mut next);
        next.validate()?;
        *current = Some(next);
        Ok(())
    }

    /// Returns the cached handle for `(name, destination_override)`, building it on first use
    pub fn resolve(
        &self,
        name: &str,
        destination_override: Option<&str>,
    ) -> Result<Arc<LogHandle>, LogError> {
        let key = LoggerKey::new(name, destination_override);

        let cached = read(&self.loggers).get(&key).cloned();
        let slot = match cached {
            Some(slot) => slot,
            None => write(&self.loggers).entry(key.clone()).or_default().clone(),
        };

        // Built outside the map lock; concurrent callers for the same key wait on the cell
        let built = slot.get_or_try_init(|| {
            let config = self.config();
            self.configurator
                .build(name, destination_override, &config)
                .map(Arc::new)
        });
        match built {
            Ok(handle) => {
                // A failed attempt on the same cell may have discarded it while we waited
                let orphaned = read(&self.loggers).get(&key).is_none();
                if orphaned {
                    write(&self.loggers).entry(key).or_insert_with(|| Arc::clone(&slot));
                }
                Ok(Arc::clone(handle))
            }
            Err(e) => {
                self.discard_empty_slot(&key, &slot);
                Err(e)
            }
        }
    }

    // Failed builds must not leave entries behind
    fn discard_empty_slot(&self, key: &LoggerKey, slot: &Slot) {
        let mut loggers = write(&self.loggers);
        let unused = loggers
            .get(key)
            .map_or(false, |current| Arc::ptr_eq(current, slot) && current.get().is_none());
        if unused {
            loggers.remove(key);
        }
    }

    fn log(
        &self,
        level: Level,
        name: &str,
        message: &str,
        extra: Option<&Extra>,
        destination_override: Option<&str>,
    ) -> Result<(), LogError> {
        self.resolve(name, destination_override)?.log(level, message, extra);
        Ok(())
    }

    /// Log debug level message to named logger
    pub fn debug(
        &self,
        name: &str,
        message: &str,
        extra: Option<&Extra>,
        dsn: Option<&str>,
    ) -> Result<(), LogError> {
        self.log(Level::Debug, name, message, extra, dsn)
    }

    /// Log info level message to named logger
    pub fn info(
        &self,
        name: &str,
        message: &str,
        extra: Option<&Extra>,
        dsn: Option<&str>,
    ) -> Result<(), LogError> {
        self.log(Level::Info, name, message, extra, dsn)
    }

    /// Log warning level message to named logger
    pub fn warning(
        &self,
        name: &str,
        message: &str,
        extra: Option<&Extra>,
        dsn: Option<&str>,
    ) -> Result<(), LogError> {
        self.log(Level::Warning, name, message, extra, dsn)
    }

    /// Log error level message to named logger
    pub fn error(
        &self,
        name: &str,
        message: &str,
        extra: Option<&Extra>,
        dsn: Option<&str>,
    ) -> Result<(), LogError> {
        self.log(Level::Error, name, message, extra, dsn)
    }

    /// Log critical level message to named logger
    pub fn critical(
        &self,
        name: &str,
        message: &str,
        extra: Option<&Extra>,
        dsn: Option<&str>,
    ) -> Result<(), LogError> {
        self.log(Level::Critical, name, message, extra, dsn)
    }

    /// Log an error level message together with the error being handled
    pub fn exception<E>(
        &self,
        name: &str,
        message: &str,
        error: &E,
        extra: Option<&Extra>,
        dsn: Option<&str>,
    ) -> Result<(), LogError>
    where
        E: Error + ?Sized,
    {
        let handle = self.resolve(name, dsn)?;
        handle.exception(message, &ErrorContext::capture(error), extra);
        Ok(())
    }

    /// Drops every cached handle
    pub fn reset(&self) {
        write(&self.loggers).clear();
    }

    /// Number of keys with a configured handle
    pub fn len(&self) -> usize {
        read(&self.loggers).values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records discarded by the sinks of every cached handle
    pub fn dropped_events(&self) -> u64 {
        read(&self.loggers)
            .values()
            .filter_map(|slot| slot.get())
            .map(|handle| handle.dropped_events())
            .sum()
    }

    pub fn contains(&self, name: &str, destination_override: Option<&str>) -> bool {
        read(&self.loggers)
            .get(&LoggerKey::new(name, destination_override))
            .map_or(false, |slot| slot.get().is_some())
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("config", &self.config())
            .field("configurator", &self.configurator)
            .field("loggers", &self.len())
            .finish()
    }
}
