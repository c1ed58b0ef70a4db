//! End-to-end test: activate a pipeline from configuration, dispatch
//! records through it, and check each transport saw what it should.

use anyhow::Result;
use sinkroute::config::{ChatConfig, GeneralConfig, MailConfig, SinksConfig, SyslogConfig};
use sinkroute::sinks::syslog::{Facility, SyslogSocket};
use sinkroute::{
    Level, MailMessage, MailTransport, Pipeline, Record, SinkRouter, SinkType, Transports,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeMailTransport {
    sent: Mutex<Vec<MailMessage>>,
}

impl MailTransport for FakeMailTransport {
    fn send(&self, message: &MailMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
struct CapturingSocket {
    frames: Mutex<Vec<String>>,
}

impl SyslogSocket for CapturingSocket {
    fn write(&self, frame: &[u8]) -> std::io::Result<()> {
        self.frames
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(frame).into_owned());
        Ok(())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[test]
fn activated_pipeline_routes_records_to_all_transports() {
    init_tracing();
    let mut server = mockito::Server::new();
    let chat_mock = server
        .mock("POST", "/api/chat.postMessage")
        .match_header("authorization", "Bearer xoxb-test")
        .with_status(200)
        .expect(1)
        .create();

    let mailer = Arc::new(FakeMailTransport::default());
    let socket = Arc::new(CapturingSocket::default());

    let configs = SinksConfig {
        mail: Some(MailConfig {
            enabled: true,
            recipient: "ops@example.com".to_string(),
            debug: false,
            // Mail only wakes up for errors.
            level: Level::Error,
        }),
        chat: Some(ChatConfig {
            enabled: true,
            token: "xoxb-test".to_string(),
            api_url: format!("{}/api/chat.postMessage", server.url()),
            level: Level::Warning,
            ..Default::default()
        }),
        syslog: Some(SyslogConfig {
            enabled: true,
            ident: "myapp".to_string(),
            facility: Some(Facility::Local1),
            level: Level::Debug,
        }),
        ..Default::default()
    };

    let general = GeneralConfig {
        app_url: "https://example.com".to_string(),
        mail_from: "noreply@example.com".to_string(),
        debug: false,
    };
    let router = SinkRouter::new(
        Transports::new().with_mailer(mailer.clone()),
        general,
    )
    .with_syslog_socket(socket.clone());

    let mut pipeline = Pipeline::new();
    let report = router.activate(&configs, &mut pipeline, false);
    assert_eq!(
        report.attached(),
        [SinkType::Mail, SinkType::ChatWebhook, SinkType::Syslog]
    );

    // An info record only clears the syslog threshold.
    pipeline.dispatch(&Record::new(Level::Info, "cache warmed"));
    // An error record clears all three.
    pipeline.dispatch(&Record::new(Level::Error, "payment gateway down"));

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ops@example.com");
    assert_eq!(sent[0].subject, "https://example.com - error report");
    assert!(sent[0].body.contains("payment gateway down"));

    let frames = socket.frames.lock().unwrap();
    assert_eq!(frames.len(), 2);
    assert!(frames[0].contains("cache warmed"));
    // local1 (17) * 8 + error (3) = 139
    assert!(frames[1].starts_with("<139>myapp["), "frame: {}", frames[1]);

    chat_mock.assert();
}

#[test]
fn empty_activation_leaves_pipeline_inert() {
    let router = SinkRouter::new(Transports::new(), GeneralConfig::default());
    let mut pipeline = Pipeline::new();
    let report = router.activate(&SinksConfig::default(), &mut pipeline, false);

    assert!(report.attached().is_empty());

    // Dispatch into an empty pipeline is a no-op, not a panic.
    pipeline.dispatch(&Record::new(Level::Critical, "nobody listening"));
    assert!(pipeline.is_empty());
}
