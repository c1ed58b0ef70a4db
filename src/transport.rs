//! Host-provided transport handles.
//!
//! The router never constructs a mail transport or an APM agent itself; the
//! host process hands in already-initialized handles through [`Transports`]
//! and the router only decides which sinks get to borrow them.

use crate::core::Record;
use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;

/// An outbound mail message assembled by a mail-family sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// An already-initialized mail transport owned by the host.
pub trait MailTransport: Send + Sync {
    /// Hands one message to the transport for delivery.
    fn send(&self, message: &MailMessage) -> Result<()>;
}

/// An already-initialized APM agent owned by the host.
pub trait ApmAgent: Send + Sync {
    /// Reports one log record to the agent under the given application name.
    fn notice_error(&self, app_name: &str, record: &Record) -> Result<()>;
}

/// The bundle of transport handles the host makes available to the router.
///
/// Every handle is optional; a sink family whose handle is absent fails
/// construction instead of aborting activation.
#[derive(Default, Clone)]
pub struct Transports {
    pub mailer: Option<Arc<dyn MailTransport>>,
    pub apm: Option<Arc<dyn ApmAgent>>,
}

impl Transports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn MailTransport>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn with_apm(mut self, apm: Arc<dyn ApmAgent>) -> Self {
        self.apm = Some(apm);
        self
    }

    /// The host mailer, or an error if the host never supplied one.
    pub fn mailer(&self) -> Result<Arc<dyn MailTransport>, TransportError> {
        self.mailer
            .clone()
            .ok_or(TransportError::MissingHandle("mail transport"))
    }

    /// The host APM agent, or an error if the host never supplied one.
    pub fn apm(&self) -> Result<Arc<dyn ApmAgent>, TransportError> {
        self.apm
            .clone()
            .ok_or(TransportError::MissingHandle("APM agent"))
    }
}

#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("host did not provide an initialized {0}")]
    MissingHandle(&'static str),
}
