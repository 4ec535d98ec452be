/*
 * Sink implementations
 *
 * This module defines the destinations a LogHandle dispatches to:
 * - ConsoleSink: one formatted line per record on stdout (or a shared buffer)
 * - RemoteSink: forwards records at Error and above to an EventTransport
 *
 * Each sink implements the Sink trait and filters on its own level; the handle applies its
 * threshold before any sink is consulted.
 */

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Level;
use crate::format::Formatter;
use crate::record::Record;
use crate::remote::{EventTransport, RemoteEvent};

/// Kinds of sinks a handle can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Console,
    Remote,
}

pub trait Sink: Send + Sync {
    fn kind(&self) -> SinkKind;

    /// Minimum level this sink accepts
    fn level(&self) -> Level;

    fn emit(&self, record: &Record<'_>);

    /// Records this sink discarded instead of delivering
    fn dropped_events(&self) -> u64 {
        0
    }
}

/// An in-memory console, shared between the host and every sink writing to it
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Where console sinks write their lines
#[derive(Debug, Clone, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Buffer(SharedBuffer),
}

impl ConsoleTarget {
    fn write_line(&self, line: &str) -> io::Result<()> {
        match self {
            ConsoleTarget::Stdout => {
                let mut out = io::stdout().lock();
                writeln!(out, "{}", line)?;
                out.flush()
            }
            ConsoleTarget::Buffer(buffer) => writeln!(buffer.lock(), "{}", line),
        }
    }
}

/// Writes human-readable lines to the console target
pub struct ConsoleSink {
    formatter: Formatter,
    level: Level,
    target: ConsoleTarget,
}

impl ConsoleSink {
    pub fn new(formatter: Formatter, level: Level, target: ConsoleTarget) -> Self {
        ConsoleSink {
            formatter,
            level,
            target,
        }
    }

    fn render(&self, record: &Record<'_>) -> String {
        let mut line = self.formatter.format(record);
        // Error details follow the line unless the template already shows them
        if let Some(error) = record.error.filter(|_| !self.formatter.shows_error()) {
            line.push_str(&format!("\n{}", error));
            for cause in &error.chain {
                line.push_str(&format!("\n  caused by: {}", cause));
            }
            if let Some(backtrace) = &error.backtrace {
                line.push_str(&format!("\n{}", backtrace.trim_end()));
            }
        }
        line
    }
}

impl Sink for ConsoleSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    fn level(&self) -> Level {
        self.level
    }

    fn emit(&self, record: &Record<'_>) {
        if let Err(e) = self.target.write_line(&self.render(record)) {
            eprintln!("Failed to write to console: {}", e);
        }
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("level", &self.level)
            .field("target", &self.target)
            .finish()
    }
}

/// Forwards error reports to a remote error-tracking service
pub struct RemoteSink {
    transport: Box<dyn EventTransport>,
    environment: Option<String>,
}

impl RemoteSink {
    /// Remote sinks only see records at this level and above
    pub const LEVEL: Level = Level::Error;

    pub fn new(transport: Box<dyn EventTransport>, environment: Option<String>) -> Self {
        RemoteSink {
            transport,
            environment,
        }
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }
}

impl Sink for RemoteSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Remote
    }

    fn level(&self) -> Level {
        Self::LEVEL
    }

    fn emit(&self, record: &Record<'_>) {
        let event = RemoteEvent::from_record(record, self.environment.as_deref());
        self.transport.send(event);
    }

    fn dropped_events(&self) -> u64 {
        self.transport.dropped_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TIME_FORMAT;
    use crate::record::ErrorContext;

    #[derive(Default, Clone)]
    struct Collect(Arc<Mutex<Vec<RemoteEvent>>>);

    impl EventTransport for Collect {
        fn send(&self, event: RemoteEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn console(template: &str, buffer: &SharedBuffer) -> ConsoleSink {
        let formatter = Formatter::parse(template, DEFAULT_TIME_FORMAT).unwrap();
        ConsoleSink::new(formatter, Level::Debug, ConsoleTarget::Buffer(buffer.clone()))
    }

    #[test]
    fn console_writes_one_line_per_record() {
        let buffer = SharedBuffer::new();
        let sink = console("{levelname} {name}: {message}", &buffer);
        sink.emit(&Record::new("api", Level::Info, "first"));
        sink.emit(&Record::new("api", Level::Error, "second"));
        assert_eq!(buffer.lines(), vec!["INFO api: first", "ERROR api: second"]);
        buffer.clear();
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn console_appends_error_details() {
        let buffer = SharedBuffer::new();
        let sink = console("{message}", &buffer);
        let error = ErrorContext {
            kind: "ParseError".into(),
            value: "bad input".into(),
            chain: vec!["unexpected end".into()],
            backtrace: None,
        };
        sink.emit(&Record::new("api", Level::Error, "failed").with_error(Some(&error)));
        assert_eq!(
            buffer.lines(),
            vec!["failed", "ParseError: bad input", "  caused by: unexpected end"]
        );
    }

    #[test]
    fn console_skips_details_when_template_shows_error() {
        let buffer = SharedBuffer::new();
        let sink = console("{message} [{error}]", &buffer);
        let error = ErrorContext {
            kind: "Io".into(),
            value: "closed".into(),
            chain: vec!["eof".into()],
            backtrace: None,
        };
        sink.emit(&Record::new("api", Level::Error, "failed").with_error(Some(&error)));
        assert_eq!(buffer.lines(), vec!["failed [Io: closed]"]);
    }

    #[test]
    fn remote_sink_tags_environment() {
        let collected = Collect::default();
        let sink = RemoteSink::new(Box::new(collected.clone()), Some("staging".into()));
        assert_eq!(sink.level(), Level::Error);
        assert_eq!(sink.kind(), SinkKind::Remote);

        sink.emit(&Record::new("worker", Level::Error, "job failed"));
        let events = collected.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].environment.as_deref(), Some("staging"));
        assert_eq!(events[0].message, "job failed");
        assert_eq!(sink.dropped_events(), 0);
    }

    struct Saturated;

    impl EventTransport for Saturated {
        fn send(&self, _event: RemoteEvent) {}

        fn dropped_events(&self) -> u64 {
            3
        }
    }

    #[test]
    fn dropped_events_visible_through_sink_trait() {
        let sink: Box<dyn Sink> = Box::new(RemoteSink::new(Box::new(Saturated), None));
        assert_eq!(sink.dropped_events(), 3);

        let buffer = SharedBuffer::new();
        let console: Box<dyn Sink> = Box::new(console("{message}", &buffer));
        assert_eq!(console.dropped_events(), 0);
    }
}
