//! The mail-family sinks.
//!
//! Delivery for both goes through the host's [`MailTransport`]; the difference
//! is message assembly. The native sink renders a complete plain-text report
//! per record, while the transactional sink prepares its envelope once at
//! construction time and only fills in the body per record.

use crate::core::{Level, Record, Sink, SinkKind};
use crate::sinks::LineFormatter;
use crate::transport::{MailMessage, MailTransport};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Mail sink that assembles a fresh message for every record.
pub struct NativeMailSink {
    transport: Arc<dyn MailTransport>,
    from: String,
    recipient: String,
    subject: String,
    min_level: Level,
}

impl NativeMailSink {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        from: String,
        recipient: String,
        subject: String,
        min_level: Level,
    ) -> Self {
        Self {
            transport,
            from,
            recipient,
            subject,
            min_level,
        }
    }
}

impl Sink for NativeMailSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Mail
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn emit(&self, record: &Record) -> Result<()> {
        let message = MailMessage {
            from: self.from.clone(),
            to: self.recipient.clone(),
            subject: self.subject.clone(),
            body: LineFormatter.format(record),
        };
        self.transport.send(&message)?;
        debug!(to = %self.recipient, "mail sink delivered record");
        Ok(())
    }
}

/// Mail sink that reuses a prepared envelope, delivering through the host's
/// transactional mailer.
pub struct TransactionalMailSink {
    transport: Arc<dyn MailTransport>,
    envelope: MailMessage,
    min_level: Level,
}

impl TransactionalMailSink {
    /// Prepares the message envelope once; `emit` only swaps in the body.
    pub fn new(
        transport: Arc<dyn MailTransport>,
        from: String,
        recipient: String,
        subject: String,
        min_level: Level,
    ) -> Self {
        let envelope = MailMessage {
            from,
            to: recipient,
            subject,
            body: String::new(),
        };
        Self {
            transport,
            envelope,
            min_level,
        }
    }
}

impl Sink for TransactionalMailSink {
    fn kind(&self) -> SinkKind {
        SinkKind::TransactionalMail
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn emit(&self, record: &Record) -> Result<()> {
        let message = MailMessage {
            body: LineFormatter.format(record),
            ..self.envelope.clone()
        };
        self.transport.send(&message)?;
        debug!(to = %self.envelope.to, "transactional mail sink delivered record");
        Ok(())
    }
}
