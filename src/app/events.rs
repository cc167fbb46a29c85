//! Outbound application events.
//!
//! The wash machine emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them: log them, count them in tests, forward
//! them to a status display.

use crate::fsm::PhaseLabel;
use crate::safety::Interlock;

/// Structured events emitted by the wash machine core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A phase (or `reset`) began.
    PhaseStarted(PhaseLabel),

    /// A phase (or `reset`) ran to completion.
    PhaseFinished(PhaseLabel),

    /// A phase attempt failed; the sequencer will retry it.  `transient`
    /// tells whether the cause may clear without an operator.
    PhaseFailed {
        phase: PhaseLabel,
        error: String,
        transient: bool,
    },

    /// A safety interlock was detected for the first time since it was
    /// last clear.
    InterlockEngaged(Interlock),

    /// Every interlock is clear again; the process continues.
    InterlocksCleared,

    /// The telemetry sampler appended a sample (`None` = sensor unreadable).
    TempSampled(Option<f32>),

    /// The error lamp could not be switched.
    ErrorLampFailed(String),
}
