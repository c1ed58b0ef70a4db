//! The chat webhook sink.
//!
//! Posts formatted records to a chat API (Slack-shaped `chat.postMessage`)
//! with a bearer token. The HTTP client holds no connection until the first
//! emit; construction stays a fast in-memory operation.

use crate::config::ChatConfig;
use crate::core::{Level, Record, Sink, SinkKind};
use anyhow::Result;
use serde_json::{json, Value};
use tracing::{debug, error};

/// A sink that posts each record as one chat message.
pub struct ChatWebhookSink {
    client: reqwest::blocking::Client,
    api_url: String,
    token: String,
    channel: String,
    username: String,
    attach_rich_content: bool,
    min_level: Level,
}

impl ChatWebhookSink {
    /// Builds the sink from its config section. Fails only if the HTTP
    /// client cannot be assembled.
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            token: config.token.clone(),
            channel: config.channel.clone(),
            username: config.username.clone(),
            attach_rich_content: config.attach_rich_content,
            min_level: config.level,
        })
    }

    fn payload(&self, record: &Record) -> Value {
        let text = format!("{}: {}", record.level, record.message);
        let mut payload = json!({
            "channel": self.channel,
            "username": self.username,
            "text": text,
        });
        if self.attach_rich_content && !record.context.is_empty() {
            let fields: Vec<Value> = record
                .context
                .iter()
                .map(|(key, value)| {
                    json!({
                        "title": key,
                        "value": value.to_string(),
                        "short": true,
                    })
                })
                .collect();
            payload["attachments"] = json!([{
                "fallback": record.message,
                "fields": fields,
            }]);
        }
        payload
    }
}

impl Sink for ChatWebhookSink {
    fn kind(&self) -> SinkKind {
        SinkKind::ChatWebhook
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn emit(&self, record: &Record) -> Result<()> {
        let payload = self.payload(record);
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send();

        match response {
            Ok(res) => {
                if res.status().is_success() {
                    debug!(channel = %self.channel, "chat sink delivered record");
                    Ok(())
                } else {
                    let status = res.status();
                    let text = res.text().unwrap_or_default();
                    error!(
                        status = %status,
                        body = %text,
                        "Failed to post chat notification"
                    );
                    anyhow::bail!(
                        "Failed to post chat notification: status {}, body: {}",
                        status,
                        text
                    );
                }
            }
            Err(e) => {
                error!(error = %e, "HTTP request to chat API failed");
                Err(e.into())
            }
        }
    }
}
