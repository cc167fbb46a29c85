//! Phase table for the wash cycle.
//!
//! The classic embedded state-table pattern, applied to a linear sequence:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  Wash cycle (built once at startup)                    │
//! │  ┌───────────────────────┬─────────────────────────┐   │
//! │  │ PhaseId               │ run                     │   │
//! │  ├───────────────────────┼─────────────────────────┤   │
//! │  │ Check                 │ fn(&WashMachine) -> Res │   │
//! │  │ WaitForKeg            │ fn(&WashMachine) -> Res │   │
//! │  │ Heating               │ fn(&WashMachine) -> Res │   │
//! │  │ ...                   │ ...                     │   │
//! │  │ FillWithCo2           │ fn(&WashMachine) -> Res │   │
//! │  └───────────────────────┴─────────────────────────┘   │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! The sequencer walks the table in order.  Every entry is run through the
//! same start/finish notification wrapper, and a failing entry is retried
//! in place; see [`crate::sequencer`].

pub mod phases;

use core::fmt;

use serde::{Serialize, Serializer};

use crate::app::ports::{Clock, IoBackend};
use crate::error::Result;
use crate::machine::WashMachine;

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// Every phase of the wash cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PhaseId {
    Check = 0,
    WaitForKeg = 1,
    Heating = 2,
    Prewash = 3,
    Drain = 4,
    WashWithLye = 5,
    RinseWithColdWater = 6,
    WashWithHotWater = 7,
    Dry = 8,
    FillWithCo2 = 9,
}

impl PhaseId {
    /// Total number of phases, sizes the table array.
    pub const COUNT: usize = 10;

    /// All phases in cycle order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Check,
        Self::WaitForKeg,
        Self::Heating,
        Self::Prewash,
        Self::Drain,
        Self::WashWithLye,
        Self::RinseWithColdWater,
        Self::WashWithHotWater,
        Self::Dry,
        Self::FillWithCo2,
    ];

    /// Stable machine name, reported in the status snapshot.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::WaitForKeg => "wait_for_keg",
            Self::Heating => "heating",
            Self::Prewash => "prewash",
            Self::Drain => "drain",
            Self::WashWithLye => "wash_with_lye",
            Self::RinseWithColdWater => "rinse_with_cold_water",
            Self::WashWithHotWater => "wash_with_hot_water",
            Self::Dry => "dry",
            Self::FillWithCo2 => "fill_with_co2",
        }
    }

    /// Operator-facing wording used in log lines.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Check => "checking IO",
            Self::WaitForKeg => "waiting for keg",
            Self::Heating => "heating",
            Self::Prewash => "prewashing",
            Self::Drain => "draining",
            Self::WashWithLye => "washing with lye",
            Self::RinseWithColdWater => "washing with cold water",
            Self::WashWithHotWater => "washing with hot water",
            Self::Dry => "drying",
            Self::FillWithCo2 => "filling with CO2",
        }
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Current-phase label
// ---------------------------------------------------------------------------

/// What the machine is doing right now, as shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseLabel {
    /// Process just started, no phase has run yet.
    Starting,
    /// Between two phases.
    Idle,
    /// Returning every actuator to its rest position.
    Reset,
    /// A phase of the wash cycle is running.
    Phase(PhaseId),
}

impl PhaseLabel {
    pub fn name(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Idle => "idle",
            Self::Reset => "reset",
            Self::Phase(id) => id.name(),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Phase(id) => id.description(),
            other => other.name(),
        }
    }
}

impl fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for PhaseLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Phase descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Signature of a phase body.
pub type PhaseFn<B, C> = fn(&WashMachine<B, C>) -> Result<()>;

/// Static descriptor for a single phase.
pub struct PhaseDescriptor<B: IoBackend + ?Sized, C: Clock + ?Sized> {
    pub id: PhaseId,
    pub run: PhaseFn<B, C>,
}

impl<B: IoBackend + ?Sized, C: Clock + ?Sized> PhaseDescriptor<B, C> {
    /// Run the phase body bracketed by start/finish notifications.
    pub fn run_notified(&self, wm: &WashMachine<B, C>) -> Result<()> {
        wm.notified(PhaseLabel::Phase(self.id), || (self.run)(wm))
    }
}

impl<B: IoBackend + ?Sized, C: Clock + ?Sized> Clone for PhaseDescriptor<B, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: IoBackend + ?Sized, C: Clock + ?Sized> Copy for PhaseDescriptor<B, C> {}

impl<B: IoBackend + ?Sized, C: Clock + ?Sized> fmt::Debug for PhaseDescriptor<B, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseDescriptor").field("id", &self.id).finish()
    }
}
