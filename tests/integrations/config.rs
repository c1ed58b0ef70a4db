//! Integration tests for configuration loading and layering.

use sinkroute::config::Config;
use sinkroute::sinks::syslog::Facility;
use sinkroute::Level;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// A helper function to run a test with a temporary config file.
fn with_config_file<F>(toml_content: &str, test_fn: F)
where
    F: FnOnce(PathBuf),
{
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();
    let path = file.path().to_path_buf();
    test_fn(path);
}

#[test]
fn test_load_full_valid_config() {
    let toml_content = r#"
        [general]
        app_url = "https://example.com"
        mail_from = "noreply@example.com"
        debug = true

        [sinks.mail]
        enabled = true
        recipient = "ops@example.com"
        debug = true
        level = "error"

        [sinks.transactional_mail]
        enabled = true
        recipient = "oncall@example.com"

        [sinks.chat]
        enabled = true
        token = "xoxb-secret"
        channel = "alerts"
        username = "alert-bot"
        attach_rich_content = true
        level = "warning"

        [sinks.syslog]
        enabled = true
        ident = "myapp"
        facility = "local3"
        level = "info"

        [sinks.apm]
        enabled = true
        app_name = "myapp-production"
        level = "critical"
    "#;

    with_config_file(toml_content, |path| {
        let config = Config::load(&path).unwrap();

        assert_eq!(config.general.app_url, "https://example.com");
        assert_eq!(config.general.mail_from, "noreply@example.com");
        assert!(config.general.debug);

        let mail = config.sinks.mail.as_ref().unwrap();
        assert!(mail.enabled);
        assert_eq!(mail.recipient, "ops@example.com");
        assert!(mail.debug);
        assert_eq!(mail.level, Level::Error);

        let transactional = config.sinks.transactional_mail.as_ref().unwrap();
        assert!(transactional.enabled);
        assert_eq!(transactional.recipient, "oncall@example.com");
        assert!(!transactional.debug);
        assert_eq!(transactional.level, Level::Debug);

        let chat = config.sinks.chat.as_ref().unwrap();
        assert!(chat.enabled);
        assert_eq!(chat.token, "xoxb-secret");
        assert_eq!(chat.channel, "alerts");
        assert_eq!(chat.username, "alert-bot");
        assert!(chat.attach_rich_content);
        assert_eq!(chat.level, Level::Warning);

        let syslog = config.sinks.syslog.as_ref().unwrap();
        assert!(syslog.enabled);
        assert_eq!(syslog.ident, "myapp");
        assert_eq!(syslog.facility, Some(Facility::Local3));
        assert_eq!(syslog.level, Level::Info);

        let apm = config.sinks.apm.as_ref().unwrap();
        assert!(apm.enabled);
        assert_eq!(apm.app_name, "myapp-production");
        assert_eq!(apm.level, Level::Critical);
    });
}

#[test]
fn test_load_partial_config_uses_defaults() {
    let toml_content = r#"
        [sinks.chat]
        enabled = true
        token = "xoxb-secret"
    "#;

    with_config_file(toml_content, |path| {
        let config = Config::load(&path).unwrap();

        // Values from file
        let chat = config.sinks.chat.as_ref().unwrap();
        assert!(chat.enabled);
        assert_eq!(chat.token, "xoxb-secret");

        // Defaulted values
        assert_eq!(chat.channel, "random");
        assert_eq!(chat.username, "error-bot");
        assert!(!chat.attach_rich_content);
        assert_eq!(chat.level, Level::Debug);

        // Absent sections stay absent
        assert!(config.sinks.mail.is_none());
        assert!(config.sinks.syslog.is_none());
        assert!(config.sinks.apm.is_none());
        assert!(!config.general.debug);
    });
}

#[test]
fn test_load_missing_file_yields_defaults() {
    let config = Config::load("does-not-exist.toml").unwrap();

    assert_eq!(config.general.app_url, "");
    assert!(!config.general.debug);
    assert!(config.sinks.mail.is_none());
    assert!(config.sinks.chat.is_none());
}

#[test]
fn test_env_variables_override_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "sinkroute.toml",
            r#"
                [general]
                debug = false
                app_url = "https://example.com"
            "#,
        )?;
        jail.set_env("SINKROUTE_GENERAL__DEBUG", "true");

        let config = Config::load("sinkroute.toml").unwrap();
        assert!(config.general.debug);
        assert_eq!(config.general.app_url, "https://example.com");
        Ok(())
    });
}
