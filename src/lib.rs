//! sinkroute - a conditional log-sink router
//!
//! Given a set of typed sink configurations, this library decides which
//! notification sinks (mail, chat webhook, syslog, APM) are active, builds
//! them, and attaches them to a shared logging [`Pipeline`] in one
//! deterministic startup pass.

pub mod config;
pub mod core;
pub mod router;
pub mod sinks;
pub mod transport;

// Re-export the types a host touches for convenience
pub use crate::core::{Level, Pipeline, Record, Sink, SinkKind};
pub use crate::router::{ActivationReport, SinkRouter, SinkType, SkipReason};
pub use crate::transport::{ApmAgent, MailMessage, MailTransport, Transports};
