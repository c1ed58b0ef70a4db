//! The sink implementations, one file per family.
//!
//! Each sink is a thin parameter-mapped wrapper over its transport; the
//! decision of whether a sink exists at all belongs to the router.

pub mod apm;
pub mod chat;
pub mod mail;
pub mod syslog;

use crate::core::Record;

/// Renders records as single text lines for the plain-text sinks.
///
/// Format: `[timestamp] channel.LEVEL: message {context}`, with the context
/// block omitted when empty.
pub struct LineFormatter;

impl LineFormatter {
    pub fn format(&self, record: &Record) -> String {
        let mut line = format!(
            "[{}] {}.{}: {}",
            record.timestamp, record.channel, record.level, record.message
        );
        if !record.context.is_empty() {
            let context = serde_json::Value::Object(record.context.clone());
            line.push(' ');
            line.push_str(&context.to_string());
        }
        line
    }
}
