//! Volatile runtime state of one wash machine.
//!
//! Each field has exactly one writer: the sequencer owns `current_phase`
//! and `errors`, the sampler owns `temp_log`.  They are locked individually
//! so a status reader always sees whole values and the two loops never
//! contend with each other.

use std::collections::BTreeSet;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::fsm::PhaseLabel;
use crate::telemetry::TempLog;

/// Active error conditions, shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFlag {
    /// The last phase attempt failed; the error lamp is on.
    IoError,
}

#[derive(Debug)]
pub struct MachineState {
    pub current_phase: RwLock<PhaseLabel>,
    pub errors: RwLock<BTreeSet<ErrorFlag>>,
    pub temp_log: Mutex<TempLog>,
}

impl MachineState {
    pub fn new(temp_samples_limit: usize) -> Self {
        Self {
            current_phase: RwLock::new(PhaseLabel::Starting),
            errors: RwLock::new(BTreeSet::new()),
            temp_log: Mutex::new(TempLog::new(temp_samples_limit)),
        }
    }

    pub fn current_phase(&self) -> PhaseLabel {
        *self.current_phase.read()
    }

    pub fn set_phase(&self, label: PhaseLabel) {
        *self.current_phase.write() = label;
    }

    /// Raise or clear an error flag.
    pub fn set_error(&self, flag: ErrorFlag, active: bool) {
        let mut errors = self.errors.write();
        if active {
            errors.insert(flag);
        } else {
            errors.remove(&flag);
        }
    }

    pub fn errors(&self) -> Vec<ErrorFlag> {
        self.errors.read().iter().copied().collect()
    }
}
