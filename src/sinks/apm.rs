//! The APM sink.
//!
//! Forwards eligible records to the host's APM agent under a configured
//! application name. Records always keep propagating past this sink.

use crate::core::{Level, Record, Sink, SinkKind};
use crate::transport::ApmAgent;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

pub struct ApmSink {
    agent: Arc<dyn ApmAgent>,
    app_name: String,
    min_level: Level,
}

impl ApmSink {
    pub fn new(agent: Arc<dyn ApmAgent>, app_name: String, min_level: Level) -> Self {
        Self {
            agent,
            app_name,
            min_level,
        }
    }
}

impl Sink for ApmSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Apm
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    // Records always bubble past the APM sink, whatever the agent does.
    fn bubble(&self) -> bool {
        true
    }

    fn emit(&self, record: &Record) -> Result<()> {
        self.agent.notice_error(&self.app_name, record)?;
        debug!(app_name = %self.app_name, "APM sink delivered record");
        Ok(())
    }
}
