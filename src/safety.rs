//! Safety interlocks and the condition gate.
//!
//! Two operator-facing conditions freeze the wash process:
//!
//! - the **total stop** button is pressed;
//! - the peripherals **fuse** reports no voltage.
//!
//! Neither is an error.  The gate ([`WashMachine::wait_until_inputs_ok`])
//! simply blocks, polling both inputs, until they clear.  The phase in
//! progress keeps its context and continues where it stopped.
//!
//! ## Notification lifecycle
//!
//! 1. A poll sees an unsafe condition.
//! 2. If its bit was not latched yet, the monitor latches it and reports it
//!    as newly engaged (one log line per engagement, not one per poll).
//! 3. When a poll sees every condition clear, the latch is released and a
//!    single "cleared" notice is produced if anything had been latched.
//!
//! [`WashMachine::wait_until_inputs_ok`]: crate::machine::WashMachine::wait_until_inputs_ok

use core::fmt;
use std::time::Duration;

/// Poll period of the condition gate.
pub const INTERLOCK_POLL: Duration = Duration::from_millis(50);

/// A safety condition that halts the process while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Interlock {
    /// The total stop button is pressed.
    TotalStop = 0b0000_0001,
    /// No voltage behind the peripherals fuse.
    FuseBlown = 0b0000_0010,
}

impl Interlock {
    /// Return the bitmask for this interlock.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Interlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotalStop => write!(f, "TOTAL_STOP is pressed. Stopping the processes."),
            Self::FuseBlown => write!(f, "No voltage on peripherals fuse. Is it blown?"),
        }
    }
}

/// What one poll of the interlock inputs found.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Interlocks seen for the first time since they were last clear.
    pub engaged: Vec<Interlock>,
    /// All interlocks are clear now, and at least one had been latched.
    pub cleared: bool,
}

/// Edge detector over the interlock inputs.
///
/// One monitor lives for the duration of one gate call; a fresh gate call
/// reports an interlock that is still active once more.
#[derive(Debug, Default)]
pub struct InterlockMonitor {
    /// Latched interlock bitmask.
    latched: u8,
}

impl InterlockMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one poll of the inputs.
    pub fn evaluate(&mut self, total_stop_pressed: bool, fuse_blown: bool) -> PollOutcome {
        let mut outcome = PollOutcome::default();
        let was_latched = self.latched != 0;

        for (interlock, active) in [
            (Interlock::TotalStop, total_stop_pressed),
            (Interlock::FuseBlown, fuse_blown),
        ] {
            if active {
                if self.latched & interlock.mask() == 0 {
                    outcome.engaged.push(interlock);
                }
                self.latched |= interlock.mask();
            }
        }

        if !total_stop_pressed && !fuse_blown {
            outcome.cleared = was_latched;
            self.latched = 0;
        }
        outcome
    }

    /// Latched bitmask (0 = safe).
    pub fn latched(&self) -> u8 {
        self.latched
    }

    /// True if no interlock is active.
    pub fn is_safe(&self) -> bool {
        self.latched == 0
    }

    /// Check if a specific interlock is latched.
    pub fn has(&self, interlock: Interlock) -> bool {
        self.latched & interlock.mask() != 0
    }
}
