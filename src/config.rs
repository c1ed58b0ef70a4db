//! Configuration management for sinkroute
//!
//! This module defines the main `Config` struct and its per-sink sub-structs,
//! responsible for holding all router settings. It uses the `figment` crate
//! to load configuration from a TOML file and merge it with environment
//! variables.

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::Level;
use crate::sinks::syslog::Facility;

/// The main configuration struct for the router.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// Host-wide settings shared by several sink families.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Per-sink-type sections.
    #[serde(default)]
    pub sinks: SinksConfig,
}

/// Host-wide settings.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GeneralConfig {
    /// Public URL of the host application; used in mail subjects.
    #[serde(default)]
    pub app_url: String,
    /// Sender address for mail-family sinks.
    #[serde(default)]
    pub mail_from: String,
    /// The host's global debug flag.
    #[serde(default)]
    pub debug: bool,
}

/// The per-sink-type configuration sections. An absent section means the
/// sink is off.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SinksConfig {
    pub mail: Option<MailConfig>,
    pub transactional_mail: Option<TransactionalMailConfig>,
    pub chat: Option<ChatConfig>,
    pub syslog: Option<SyslogConfig>,
    pub apm: Option<ApmConfig>,
}

/// Configuration for the native mail sink.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct MailConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Address that receives the error reports. Required.
    #[serde(default)]
    pub recipient: String,
    /// Suppress this sink while the host runs in debug mode.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub level: Level,
}

impl MailConfig {
    /// True if any required value is absent or empty.
    pub fn missing_required(&self) -> bool {
        self.recipient.trim().is_empty()
    }
}

/// Configuration for the transactional mail sink. Same shape as the native
/// mail sink; delivery goes through the host's own mailer.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TransactionalMailConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub level: Level,
}

impl TransactionalMailConfig {
    pub fn missing_required(&self) -> bool {
        self.recipient.trim().is_empty()
    }
}

/// Configuration for the chat webhook sink.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatConfig {
    #[serde(default)]
    pub enabled: bool,
    /// API token used to authenticate the post. Required.
    #[serde(default)]
    pub token: String,
    /// Channel the messages land in.
    #[serde(default = "default_chat_channel")]
    pub channel: String,
    /// Display name of the posting bot.
    #[serde(default = "default_chat_username")]
    pub username: String,
    /// Include the record context as a rich attachment block.
    #[serde(default)]
    pub attach_rich_content: bool,
    #[serde(default)]
    pub level: Level,
    /// Endpoint the messages are posted to. Overridable for tests.
    #[serde(default = "default_chat_api_url")]
    pub api_url: String,
}

fn default_chat_channel() -> String {
    "random".to_string()
}

fn default_chat_username() -> String {
    "error-bot".to_string()
}

fn default_chat_api_url() -> String {
    "https://slack.com/api/chat.postMessage".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token: String::new(),
            channel: default_chat_channel(),
            username: default_chat_username(),
            attach_rich_content: false,
            level: Level::default(),
            api_url: default_chat_api_url(),
        }
    }
}

impl ChatConfig {
    pub fn missing_required(&self) -> bool {
        self.token.trim().is_empty()
    }
}

/// Configuration for the syslog sink.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SyslogConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Program identifier prepended to each frame. Required.
    #[serde(default)]
    pub ident: String,
    /// Syslog facility. Required.
    pub facility: Option<Facility>,
    #[serde(default)]
    pub level: Level,
}

impl SyslogConfig {
    pub fn missing_required(&self) -> bool {
        self.ident.trim().is_empty() || self.facility.is_none()
    }
}

/// Configuration for the APM sink.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ApmConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Application name reported to the APM agent. Required.
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub level: Level,
}

impl ApmConfig {
    pub fn missing_required(&self) -> bool {
        self.app_name.trim().is_empty()
    }
}

impl Config {
    /// Loads the router configuration by layering sources: defaults, the
    /// TOML file, and `SINKROUTE_`-prefixed environment variables.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path.as_ref()))
            // Allow overriding with environment variables, e.g.
            // SINKROUTE_GENERAL__DEBUG=true
            .merge(Env::prefixed("SINKROUTE_").split("__"))
            .extract()?;
        Ok(config)
    }
}
