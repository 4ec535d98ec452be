/*
 * Configuration for application loggers
 *
 * This module handles:
 * - The Level enum (Debug, Info, Warning, Error, Critical) and its parsing
 * - The LogConfig record with the recognized LOG_* / REMOTE_DSN / ENVIRONMENT options
 * - Loading configuration from TOML, either top level or under a [logging] table
 * - The HostApp trait through which a web application supplies its default configuration
 *
 * Configuration is validated once when a registry is built and again on every live update,
 * so formatting and DSN mistakes surface before the first log call.
 */

use std::fmt::{self, Write};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LogError;
use crate::format::Formatter;
use crate::remote::Dsn;

pub const DEFAULT_CONSOLE_FORMAT: &str = "{asctime} {name:>10} {levelname:>10}: {message:>10}";
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%T";

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Numeric severity, compatible with the usual 10/20/30/40/50 scale
    pub fn as_number(&self) -> u32 {
        match self {
            Level::Debug => 10,
            Level::Info => 20,
            Level::Warning => 30,
            Level::Error => 40,
            Level::Critical => 50,
        }
    }

    /// Maps a numeric severity onto the closest level at or below it
    pub fn from_number(value: u32) -> Level {
        match value {
            50..=u32::MAX => Level::Critical,
            40..=49 => Level::Error,
            30..=39 => Level::Warning,
            20..=29 => Level::Info,
            _ => Level::Debug,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<u32>() {
            return Ok(Level::from_number(number));
        }
        match trimmed.to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "critical" | "fatal" => Ok(Level::Critical),
            _ => Err(LogError::InvalidLevel(s.to_string())),
        }
    }
}

// Levels may be written as names ("info") or as numbers (20)
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Name(String),
    Number(u32),
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawLevel::deserialize(deserializer)? {
            RawLevel::Name(name) => name.parse().map_err(serde::de::Error::custom),
            RawLevel::Number(number) => Ok(Level::from_number(number)),
        }
    }
}

impl Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

fn default_log_level() -> Level {
    Level::Error
}

/// Logger configuration as supplied by the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LogConfig {
    /// Minimum level for the handle and its console sink
    #[serde(default = "default_log_level")]
    pub log_level: Level,

    /// Console line template, see [`Formatter`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_format_console: Option<String>,

    /// strftime format used for `{asctime}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_format_time: Option<String>,

    /// Destination of the remote error-tracking sink
    #[serde(default, alias = "SENTRY_DSN", skip_serializing_if = "Option::is_none")]
    pub remote_dsn: Option<String>,

    /// Deployment environment tag forwarded with remote events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            log_level: default_log_level(),
            log_format_console: None,
            log_format_time: None,
            remote_dsn: None,
            environment: None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl LogConfig {
    pub fn with_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_remote_dsn(mut self, dsn: impl Into<String>) -> Self {
        self.remote_dsn = Some(dsn.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_console_format(mut self, template: impl Into<String>) -> Self {
        self.log_format_console = Some(template.into());
        self
    }

    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.log_format_time = Some(format.into());
        self
    }

    /// Console template, falling back to the default when unset or empty
    pub fn console_format(&self) -> &str {
        non_empty(&self.log_format_console).unwrap_or(DEFAULT_CONSOLE_FORMAT)
    }

    /// Timestamp format, falling back to the default when unset or empty
    pub fn time_format(&self) -> &str {
        non_empty(&self.log_format_time).unwrap_or(DEFAULT_TIME_FORMAT)
    }

    pub fn remote_dsn(&self) -> Option<&str> {
        non_empty(&self.remote_dsn)
    }

    pub fn environment(&self) -> Option<&str> {
        non_empty(&self.environment)
    }

    /// Checks every option that could otherwise fail later, at sink attachment time
    pub fn validate(&self) -> Result<(), LogError> {
        Formatter::parse(self.console_format(), self.time_format())?;
        if let Some(dsn) = self.remote_dsn() {
            Dsn::parse(dsn)?;
        }
        Ok(())
    }

    /// Parses configuration from TOML text.
    ///
    /// The options may sit under a `[logging]` table or at the top level.
    pub fn from_toml_str(text: &str) -> Result<Self, LogError> {
        let mut table: toml::Table = toml::from_str(text)?;
        let config = match table.remove("logging") {
            Some(section) => section.try_into()?,
            None => toml::Value::Table(table).try_into()?,
        };
        Ok(config)
    }

    /// Create configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LogError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

pub(crate) fn validate_time_format(format: &str) -> Result<(), LogError> {
    let invalid = || LogError::InvalidTimeFormat(format.to_string());
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }
    // Some items parse but cannot be rendered (e.g. %#z)
    let mut rendered = String::new();
    write!(rendered, "{}", Local::now().format(format)).map_err(|_| invalid())?;
    Ok(())
}

/// A host web application that can supply default logger configuration.
///
/// The application object is only consulted for configuration; everything else about it is
/// opaque to the registry.
pub trait HostApp {
    fn log_config(&self) -> LogConfig;
}

impl HostApp for LogConfig {
    fn log_config(&self) -> LogConfig {
        self.clone()
    }
}
