//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr via `env_logger` in the binary).  A status
//! display or MQTT bridge would implement the same trait.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as one tagged line.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::PhaseStarted(label) => {
                info!("PHASE | {label} started ({})", label.description());
            }
            AppEvent::PhaseFinished(label) => {
                info!("PHASE | {label} finished");
            }
            AppEvent::PhaseFailed {
                phase,
                error,
                transient: true,
            } => {
                warn!("PHASE | {phase} failed, retrying: {error}");
            }
            AppEvent::PhaseFailed {
                phase,
                error,
                transient: false,
            } => {
                error!("PHASE | {phase} failed, needs an operator, retrying: {error}");
            }
            AppEvent::InterlockEngaged(interlock) => {
                warn!("INTERLOCK | {interlock}");
            }
            AppEvent::InterlocksCleared => {
                info!("INTERLOCK | all cleared");
            }
            AppEvent::TempSampled(Some(t)) => {
                info!("TEMP | {t:.1}\u{00b0}C");
            }
            AppEvent::TempSampled(None) => {
                info!("TEMP | missing");
            }
            AppEvent::ErrorLampFailed(error) => {
                error!("LAMP | couldn't switch the error lamp: {error}");
            }
        }
    }
}
