/*
 * Named log handles
 *
 * A LogHandle filters records on its threshold and then dispatches them, in attachment
 * order, to every sink whose own level admits the record.
 */

use std::fmt;

use crate::config::Level;
use crate::record::{ErrorContext, Extra, Record};
use crate::sinks::{Sink, SinkKind};

/// A named logger with a severity threshold and an ordered set of sinks.
///
/// Handles are assembled by the configurator and then shared behind an `Arc`; once shared
/// their sinks can no longer change.
pub struct LogHandle {
    name: String,
    threshold: Level,
    sinks: Vec<Box<dyn Sink>>,
}

impl LogHandle {
    /// A bare handle with no sinks
    pub fn new(name: impl Into<String>) -> Self {
        LogHandle {
            name: name.into(),
            threshold: Level::Debug,
            sinks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threshold(&self) -> Level {
        self.threshold
    }

    pub fn set_threshold(&mut self, level: Level) {
        self.threshold = level;
    }

    pub fn attach(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    pub fn clear_sinks(&mut self) {
        self.sinks.clear();
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Kinds of the attached sinks, in attachment order
    pub fn sink_kinds(&self) -> Vec<SinkKind> {
        self.sinks.iter().map(|s| s.kind()).collect()
    }

    /// Records discarded by this handle's sinks since it was built
    pub fn dropped_events(&self) -> u64 {
        self.sinks.iter().map(|s| s.dropped_events()).sum()
    }

    pub fn is_enabled_for(&self, level: Level) -> bool {
        level >= self.threshold
    }

    /// Dispatches a record to every sink whose level admits it
    pub fn emit(&self, record: &Record<'_>) {
        if !self.is_enabled_for(record.level) {
            return;
        }
        for sink in &self.sinks {
            if record.level >= sink.level() {
                sink.emit(record);
            }
        }
    }

    pub fn log(&self, level: Level, message: &str, extra: Option<&Extra>) {
        if self.is_enabled_for(level) {
            self.emit(&Record::new(&self.name, level, message).with_extra(extra));
        }
    }

    pub fn debug(&self, message: &str, extra: Option<&Extra>) {
        self.log(Level::Debug, message, extra)
    }

    pub fn info(&self, message: &str, extra: Option<&Extra>) {
        self.log(Level::Info, message, extra)
    }

    pub fn warning(&self, message: &str, extra: Option<&Extra>) {
        self.log(Level::Warning, message, extra)
    }

    pub fn error(&self, message: &str, extra: Option<&Extra>) {
        self.log(Level::Error, message, extra)
    }

    pub fn critical(&self, message: &str, extra: Option<&Extra>) {
        self.log(Level::Critical, message, extra)
    }

    /// Logs at Error with the details of the error being handled
    pub fn exception(&self, message: &str, error: &ErrorContext, extra: Option<&Extra>) {
        if self.is_enabled_for(Level::Error) {
            let record = Record::new(&self.name, Level::Error, message)
                .with_extra(extra)
                .with_error(Some(error));
            self.emit(&record);
        }
    }
}

impl fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogHandle")
            .field("name", &self.name)
            .field("threshold", &self.threshold)
            .field("sinks", &self.sink_kinds())
            .finish()
    }
}
