//! The conditional sink router.
//!
//! This is the single activation pass run at host startup: for each known
//! sink type, in a fixed order, decide whether its sink should exist, build
//! it, and attach it to the pipeline. Skipping a sink is normal control
//! flow, never an error; the returned [`ActivationReport`] is the only
//! signal besides the pipeline itself.

use crate::config::{
    ApmConfig, ChatConfig, GeneralConfig, MailConfig, SinksConfig, SyslogConfig,
    TransactionalMailConfig,
};
use crate::core::{Pipeline, Sink};
use crate::sinks::apm::ApmSink;
use crate::sinks::chat::ChatWebhookSink;
use crate::sinks::mail::{NativeMailSink, TransactionalMailSink};
use crate::sinks::syslog::{SyslogSink, SyslogSocket};
use crate::transport::Transports;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// The sink families the router knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkType {
    Mail,
    TransactionalMail,
    ChatWebhook,
    Syslog,
    Apm,
}

impl SinkType {
    /// The fixed, deterministic evaluation order: mail family first, then
    /// chat, syslog, APM. Independent of any map iteration order.
    pub const ACTIVATION_ORDER: [SinkType; 5] = [
        SinkType::Mail,
        SinkType::TransactionalMail,
        SinkType::ChatWebhook,
        SinkType::Syslog,
        SinkType::Apm,
    ];
}

impl fmt::Display for SinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SinkType::Mail => "mail",
            SinkType::TransactionalMail => "transactional_mail",
            SinkType::ChatWebhook => "chat",
            SinkType::Syslog => "syslog",
            SinkType::Apm => "apm",
        };
        f.write_str(name)
    }
}

/// Why a sink type was not attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Section absent or `enabled = false`.
    Disabled,
    /// A required configuration value is absent or empty.
    MissingFields,
    /// The sink's debug flag and the host's global debug flag are both set.
    DebugSuppressed,
    /// The transport or client failed to initialize.
    ConstructionFailure(String),
}

/// The outcome of one activation pass.
#[derive(Debug, Default)]
pub struct ActivationReport {
    attached: Vec<SinkType>,
    skipped: Vec<(SinkType, SkipReason)>,
}

impl ActivationReport {
    /// Sink types attached to the pipeline, in activation order.
    pub fn attached(&self) -> &[SinkType] {
        &self.attached
    }

    /// Sink types passed over, with the reason, in activation order.
    pub fn skipped(&self) -> &[(SinkType, SkipReason)] {
        &self.skipped
    }

    pub fn is_attached(&self, sink_type: SinkType) -> bool {
        self.attached.contains(&sink_type)
    }

    pub fn skip_reason(&self, sink_type: SinkType) -> Option<&SkipReason> {
        self.skipped
            .iter()
            .find(|(t, _)| *t == sink_type)
            .map(|(_, reason)| reason)
    }
}

/// What evaluating one sink type produced.
enum Outcome {
    Attach(Box<dyn Sink>),
    Skip(SkipReason),
}

/// Decides, per sink type, whether to construct and attach a sink.
///
/// The router borrows already-initialized transport handles from the host
/// and holds a snapshot of the host-wide settings the mail family needs.
pub struct SinkRouter {
    transports: Transports,
    general: GeneralConfig,
    syslog_socket: Option<Arc<dyn SyslogSocket>>,
}

impl SinkRouter {
    pub fn new(transports: Transports, general: GeneralConfig) -> Self {
        Self {
            transports,
            general,
            syslog_socket: None,
        }
    }

    /// Overrides the syslog socket, for tests or hosts without `/dev/log`.
    pub fn with_syslog_socket(mut self, socket: Arc<dyn SyslogSocket>) -> Self {
        self.syslog_socket = Some(socket);
        self
    }

    /// Runs the activation pass: evaluates every known sink type in
    /// [`SinkType::ACTIVATION_ORDER`], attaching the eligible ones to the
    /// pipeline. A failure local to one sink type never prevents the
    /// evaluation of the others, and nothing in here returns an error.
    pub fn activate(
        &self,
        configs: &SinksConfig,
        pipeline: &mut Pipeline,
        global_debug: bool,
    ) -> ActivationReport {
        let mut report = ActivationReport::default();
        for sink_type in SinkType::ACTIVATION_ORDER {
            match self.evaluate(sink_type, configs, global_debug) {
                Outcome::Attach(sink) => {
                    pipeline.attach(sink);
                    info!(sink = %sink_type, "attached sink to pipeline");
                    report.attached.push(sink_type);
                }
                Outcome::Skip(reason) => {
                    debug!(sink = %sink_type, reason = ?reason, "skipped sink");
                    report.skipped.push((sink_type, reason));
                }
            }
        }
        report
    }

    fn evaluate(&self, sink_type: SinkType, configs: &SinksConfig, global_debug: bool) -> Outcome {
        match sink_type {
            SinkType::Mail => self.evaluate_mail(configs.mail.as_ref(), global_debug),
            SinkType::TransactionalMail => {
                self.evaluate_transactional_mail(configs.transactional_mail.as_ref(), global_debug)
            }
            SinkType::ChatWebhook => Self::evaluate_chat(configs.chat.as_ref()),
            SinkType::Syslog => self.evaluate_syslog(configs.syslog.as_ref()),
            SinkType::Apm => self.evaluate_apm(configs.apm.as_ref()),
        }
    }

    /// Subject line shared by the mail family.
    fn mail_subject(&self) -> String {
        format!("{} - error report", self.general.app_url)
    }

    fn evaluate_mail(&self, config: Option<&MailConfig>, global_debug: bool) -> Outcome {
        let Some(config) = config.filter(|c| c.enabled) else {
            return Outcome::Skip(SkipReason::Disabled);
        };
        if config.missing_required() {
            return Outcome::Skip(SkipReason::MissingFields);
        }
        // Both flags must be set to suppress.
        if config.debug && global_debug {
            return Outcome::Skip(SkipReason::DebugSuppressed);
        }
        match self.transports.mailer() {
            Ok(mailer) => Outcome::Attach(Box::new(NativeMailSink::new(
                mailer,
                self.general.mail_from.clone(),
                config.recipient.clone(),
                self.mail_subject(),
                config.level,
            ))),
            Err(e) => Outcome::Skip(SkipReason::ConstructionFailure(e.to_string())),
        }
    }

    fn evaluate_transactional_mail(
        &self,
        config: Option<&TransactionalMailConfig>,
        global_debug: bool,
    ) -> Outcome {
        let Some(config) = config.filter(|c| c.enabled) else {
            return Outcome::Skip(SkipReason::Disabled);
        };
        if config.missing_required() {
            return Outcome::Skip(SkipReason::MissingFields);
        }
        if config.debug && global_debug {
            return Outcome::Skip(SkipReason::DebugSuppressed);
        }
        match self.transports.mailer() {
            Ok(mailer) => Outcome::Attach(Box::new(TransactionalMailSink::new(
                mailer,
                self.general.mail_from.clone(),
                config.recipient.clone(),
                self.mail_subject(),
                config.level,
            ))),
            Err(e) => Outcome::Skip(SkipReason::ConstructionFailure(e.to_string())),
        }
    }

    fn evaluate_chat(config: Option<&ChatConfig>) -> Outcome {
        let Some(config) = config.filter(|c| c.enabled) else {
            return Outcome::Skip(SkipReason::Disabled);
        };
        if config.missing_required() {
            return Outcome::Skip(SkipReason::MissingFields);
        }
        match ChatWebhookSink::new(config) {
            Ok(sink) => Outcome::Attach(Box::new(sink)),
            Err(e) => Outcome::Skip(SkipReason::ConstructionFailure(e.to_string())),
        }
    }

    fn evaluate_syslog(&self, config: Option<&SyslogConfig>) -> Outcome {
        let Some(config) = config.filter(|c| c.enabled) else {
            return Outcome::Skip(SkipReason::Disabled);
        };
        if config.missing_required() {
            return Outcome::Skip(SkipReason::MissingFields);
        }
        let facility = match config.facility {
            Some(facility) => facility,
            None => return Outcome::Skip(SkipReason::MissingFields),
        };
        match self.resolve_syslog_socket() {
            Ok(socket) => Outcome::Attach(Box::new(SyslogSink::new(
                socket,
                config.ident.clone(),
                facility,
                config.level,
            ))),
            Err(e) => Outcome::Skip(SkipReason::ConstructionFailure(e)),
        }
    }

    fn resolve_syslog_socket(&self) -> Result<Arc<dyn SyslogSocket>, String> {
        if let Some(socket) = &self.syslog_socket {
            return Ok(socket.clone());
        }
        #[cfg(unix)]
        {
            Ok(Arc::new(crate::sinks::syslog::UnixSyslogSocket::new()))
        }
        #[cfg(not(unix))]
        {
            Err("no syslog socket available on this platform".to_string())
        }
    }

    fn evaluate_apm(&self, config: Option<&ApmConfig>) -> Outcome {
        let Some(config) = config.filter(|c| c.enabled) else {
            return Outcome::Skip(SkipReason::Disabled);
        };
        if config.missing_required() {
            return Outcome::Skip(SkipReason::MissingFields);
        }
        match self.transports.apm() {
            Ok(agent) => Outcome::Attach(Box::new(ApmSink::new(
                agent,
                config.app_name.clone(),
                config.level,
            ))),
            Err(e) => Outcome::Skip(SkipReason::ConstructionFailure(e.to_string())),
        }
    }
}
