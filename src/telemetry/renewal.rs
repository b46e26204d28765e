use tokio::time::Instant;
use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;

/// Structured log events for one session-renewal cycle.
#[derive(Clone, Debug)]
pub struct RenewalTelemetry {
    cycle_id: Uuid,
    trigger: String,
    started: Instant,
}

impl RenewalTelemetry {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            trigger: trigger.into(),
            started: Instant::now(),
        }
    }

    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn emit_start(&self) {
        event!(
            Level::INFO,
            cycle_id = %self.cycle_id,
            trigger = %self.trigger,
            "renewal.start"
        );
    }

    pub fn emit_queued(&self, path: &str, position: usize) {
        event!(
            Level::DEBUG,
            cycle_id = %self.cycle_id,
            path,
            position,
            "renewal.queued"
        );
    }

    pub fn emit_success(&self, replayed: usize) {
        event!(
            Level::INFO,
            cycle_id = %self.cycle_id,
            trigger = %self.trigger,
            replayed,
            elapsed_ms = self.elapsed_ms(),
            "renewal.success"
        );
    }

    pub fn emit_failure(&self, error: &Error, failed: usize) {
        event!(
            Level::ERROR,
            cycle_id = %self.cycle_id,
            trigger = %self.trigger,
            failed,
            elapsed_ms = self.elapsed_ms(),
            error = %error,
            "renewal.failure"
        );
    }

    pub fn emit_abandoned(&self, dropped: usize) {
        event!(
            Level::WARN,
            cycle_id = %self.cycle_id,
            trigger = %self.trigger,
            dropped,
            "renewal.abandoned"
        );
    }
}
