//! The syslog sink.
//!
//! Frames records the classic BSD way (`<PRI>ident[pid]: line`) and writes
//! them through a pluggable [`SyslogSocket`]. The default socket talks to
//! the local syslog daemon at `/dev/log` and connects lazily on the first
//! write, keeping sink construction an in-memory operation.

use crate::core::{Level, Record, Sink, SinkKind};
use crate::sinks::LineFormatter;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Standard syslog facilities with their protocol codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Facility {
    Kern,
    User,
    Mail,
    Daemon,
    Auth,
    Syslog,
    Lpr,
    News,
    Uucp,
    Cron,
    Authpriv,
    Ftp,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
}

impl Facility {
    pub fn code(&self) -> u8 {
        match self {
            Facility::Kern => 0,
            Facility::User => 1,
            Facility::Mail => 2,
            Facility::Daemon => 3,
            Facility::Auth => 4,
            Facility::Syslog => 5,
            Facility::Lpr => 6,
            Facility::News => 7,
            Facility::Uucp => 8,
            Facility::Cron => 9,
            Facility::Authpriv => 10,
            Facility::Ftp => 11,
            Facility::Local0 => 16,
            Facility::Local1 => 17,
            Facility::Local2 => 18,
            Facility::Local3 => 19,
            Facility::Local4 => 20,
            Facility::Local5 => 21,
            Facility::Local6 => 22,
            Facility::Local7 => 23,
        }
    }
}

/// Maps a record level to the syslog severity code.
fn severity(level: Level) -> u8 {
    match level {
        Level::Debug => 7,
        Level::Info => 6,
        Level::Warning => 4,
        Level::Error => 3,
        Level::Critical => 2,
    }
}

/// Where the framed bytes go. Split out so tests can capture frames without
/// a syslog daemon.
pub trait SyslogSocket: Send + Sync {
    fn write(&self, frame: &[u8]) -> std::io::Result<()>;
}

/// Datagram socket to the local syslog daemon, connected on first write.
#[cfg(unix)]
#[derive(Default)]
pub struct UnixSyslogSocket {
    socket: std::sync::Mutex<Option<std::os::unix::net::UnixDatagram>>,
}

#[cfg(unix)]
impl UnixSyslogSocket {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(unix)]
impl SyslogSocket for UnixSyslogSocket {
    fn write(&self, frame: &[u8]) -> std::io::Result<()> {
        let mut guard = self
            .socket
            .lock()
            .map_err(|_| std::io::Error::other("syslog socket lock poisoned"))?;
        if guard.is_none() {
            let socket = std::os::unix::net::UnixDatagram::unbound()?;
            socket.connect("/dev/log")?;
            *guard = Some(socket);
        }
        if let Some(socket) = guard.as_ref() {
            socket.send(frame)?;
        }
        Ok(())
    }
}

/// A sink that writes each record as one syslog frame.
pub struct SyslogSink {
    socket: Arc<dyn SyslogSocket>,
    ident: String,
    facility: Facility,
    min_level: Level,
}

impl SyslogSink {
    pub fn new(
        socket: Arc<dyn SyslogSocket>,
        ident: String,
        facility: Facility,
        min_level: Level,
    ) -> Self {
        Self {
            socket,
            ident,
            facility,
            min_level,
        }
    }

    fn frame(&self, record: &Record) -> Vec<u8> {
        let pri = (self.facility.code() as u16) * 8 + severity(record.level) as u16;
        format!(
            "<{}>{}[{}]: {}",
            pri,
            self.ident,
            std::process::id(),
            LineFormatter.format(record)
        )
        .into_bytes()
    }
}

impl Sink for SyslogSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Syslog
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn emit(&self, record: &Record) -> Result<()> {
        self.socket.write(&self.frame(record))?;
        debug!(ident = %self.ident, "syslog sink delivered record");
        Ok(())
    }
}
