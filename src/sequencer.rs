//! Wash-cycle sequencer.
//!
//! Walks the phase table in order, forever.  Every attempt of a phase runs
//! the same three steps:
//!
//! ```text
//!   ┌──▶ error lamp off ─▶ reset ─▶ phase ──ok──▶ next phase
//!   │                                 │
//!   │                                err
//!   │                                 ▼
//!   └──── sleep 1 s ◀── error lamp on ◀── log
//! ```
//!
//! A failing phase is never skipped and never aborts the cycle; the
//! sequencer keeps retrying it until the cause is fixed outside.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::app::events::AppEvent;
use crate::app::ports::{Clock, IoBackend};
use crate::error::Result;
use crate::fsm::phases::{build_wash_cycle, reset};
use crate::fsm::{PhaseDescriptor, PhaseLabel};
use crate::machine::WashMachine;

/// Back-off between two attempts of a failing phase.
pub const ERROR_SLEEP: Duration = Duration::from_secs(1);

/// Cooperative stop flag, checked at loop boundaries only.
///
/// Production never stops the loops; tests and embedders do.
#[derive(Debug, Clone)]
pub struct RunControl {
    running: Arc<AtomicBool>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn keep_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

impl<B, C> WashMachine<B, C>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    /// `reset` bracketed by its own notifications.
    pub fn reset(&self) -> Result<()> {
        self.notified(PhaseLabel::Reset, || reset(self))
    }

    /// Run the standard wash cycle until `control` is stopped.
    pub fn wash_the_kegs(&self, control: &RunControl) {
        let cycle = build_wash_cycle::<B, C>();
        while control.keep_running() {
            self.run_phases(&cycle, control);
        }
    }

    /// Run the standard wash cycle once.
    pub fn run_cycle(&self, control: &RunControl) {
        self.run_phases(&build_wash_cycle::<B, C>(), control);
    }

    /// Run `phases` in order, retrying each until it succeeds.
    ///
    /// Returns early only when `control` is stopped.
    pub fn run_phases(&self, phases: &[PhaseDescriptor<B, C>], control: &RunControl) {
        for phase in phases {
            while control.keep_running() {
                match self.attempt(phase) {
                    Ok(()) => break,
                    Err(e) => {
                        self.emit(&AppEvent::PhaseFailed {
                            phase: PhaseLabel::Phase(phase.id),
                            error: e.to_string(),
                            transient: e.is_transient(),
                        });
                        self.signal_error(true);
                        self.clock().sleep(ERROR_SLEEP);
                    }
                }
            }
            if !control.keep_running() {
                return;
            }
        }
    }

    fn attempt(&self, phase: &PhaseDescriptor<B, C>) -> Result<()> {
        self.signal_error(false);
        self.reset()?;
        phase.run_notified(self)
    }
}
