//! Core domain types and the sink contract for sinkroute
//!
//! This module defines the fundamental data structures and trait contracts
//! that govern how log records flow from the pipeline into attached sinks.

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Log record severity, ordered from most to least verbose.
///
/// Each level carries the conventional numeric code (100-500), so the
/// lowest severity is also the smallest number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// The numeric code for this level (100 = Debug .. 500 = Critical).
    pub fn code(&self) -> u16 {
        match self {
            Level::Debug => 100,
            Level::Info => 200,
            Level::Warning => 300,
            Level::Error => 400,
            Level::Critical => 500,
        }
    }

    /// Uppercase name used in formatted output (e.g. "WARNING").
    pub fn name(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single log record flowing through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// ISO 8601 timestamp when the record was created
    pub timestamp: String,
    /// Logical source channel (e.g. "app")
    pub channel: String,
    /// Severity of the record
    pub level: Level,
    /// The log message itself
    pub message: String,
    /// Structured context attached by the caller
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl Record {
    /// Creates a record stamped with the current time on the "app" channel.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            channel: "app".to_string(),
            level,
            message: message.into(),
            context: Map::new(),
        }
    }

    /// Sets the source channel.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Attaches a context value.
    pub fn with_context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }
}

/// Identifies the family a constructed sink belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Mail,
    TransactionalMail,
    ChatWebhook,
    Syslog,
    Apm,
}

// =============================================================================
// Sink contract
// =============================================================================

/// A constructed, ready-to-receive-records endpoint.
///
/// A sink owns its transport handle exclusively; the pipeline owns the sink
/// for the remainder of the process lifetime.
pub trait Sink: Send + Sync {
    /// The family this sink belongs to. Used for logging and reports.
    fn kind(&self) -> SinkKind;

    /// The least severe level this sink accepts.
    fn min_level(&self) -> Level;

    /// Whether a record handled by this sink keeps propagating to the
    /// sinks attached after it. Defaults to true.
    fn bubble(&self) -> bool {
        true
    }

    /// Delivers one record to the sink's transport.
    ///
    /// # Returns
    /// * `Ok(())` if the record was accepted by the transport
    /// * `Err` if delivery failed (network error, formatting error, etc.)
    fn emit(&self, record: &Record) -> Result<()>;
}

/// The ordered sequence of attached sinks.
///
/// Sinks are attached during the single activation pass; afterwards the
/// pipeline is read-mostly and may be shared across threads by the host.
#[derive(Default)]
pub struct Pipeline {
    sinks: Vec<Box<dyn Sink>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sink. Called at most once per successfully-built sink,
    /// in activation order.
    pub fn attach(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Number of attached sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// The kinds of the attached sinks, in attach order.
    pub fn kinds(&self) -> Vec<SinkKind> {
        self.sinks.iter().map(|s| s.kind()).collect()
    }

    /// Offers a record to each sink in attach order.
    ///
    /// Sinks whose `min_level` exceeds the record's level are passed over
    /// without stopping propagation. A handling sink that does not bubble
    /// stops the walk. Delivery failures are logged and never abort the
    /// dispatch of the remaining sinks.
    pub fn dispatch(&self, record: &Record) {
        for sink in &self.sinks {
            if record.level < sink.min_level() {
                continue;
            }
            if let Err(e) = sink.emit(record) {
                warn!(kind = ?sink.kind(), error = %e, "sink failed to deliver record");
            }
            if !sink.bubble() {
                break;
            }
        }
    }
}
