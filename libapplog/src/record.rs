/*
 * Log records
 *
 * This module defines:
 * - Record: one log call as handed to every sink of a handle
 * - Extra: the structured key/value context attached to a call
 * - ErrorContext: type, message, source chain and backtrace of an error passed to exception
 */

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::Level;

/// Structured key/value context attached to a log call
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// A single log call as seen by every sink of a handle
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub timestamp: DateTime<Local>,
    pub logger: &'a str,
    pub level: Level,
    pub message: &'a str,
    pub extra: Option<&'a Extra>,
    pub error: Option<&'a ErrorContext>,
}

impl<'a> Record<'a> {
    pub fn new(logger: &'a str, level: Level, message: &'a str) -> Self {
        Record {
            timestamp: Local::now(),
            logger,
            level,
            message,
            extra: None,
            error: None,
        }
    }

    pub fn with_extra(mut self, extra: Option<&'a Extra>) -> Self {
        self.extra = extra;
        self
    }

    pub fn with_error(mut self, error: Option<&'a ErrorContext>) -> Self {
        self.error = error;
        self
    }
}

/// Rendered form of the error being handled when `exception` is called
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorContext {
    /// Short type name of the error
    #[serde(rename = "type")]
    pub kind: String,
    /// Display output of the error itself
    pub value: String,
    /// Display output of each `source()`, outermost first
    pub chain: Vec<String>,
    /// Backtrace captured at the logging call, when backtraces are enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,
}

impl ErrorContext {
    pub fn capture<E>(error: &E) -> Self
    where
        E: Error + ?Sized,
    {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }

        let backtrace = Backtrace::capture();
        let backtrace = match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };

        ErrorContext {
            kind: short_type_name(std::any::type_name::<E>()),
            value: error.to_string(),
            chain,
            backtrace,
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.value)
    }
}

// "std::io::error::Error" -> "Error", generic arguments are dropped
fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
