//! Motor-driven three-way valves.
//!
//! A motor valve is a relay whose physical effect lags the command: the
//! motor needs `transition_time` to travel from one end stop to the other.
//! Every switch therefore waits out that time unless the caller batches
//! several transitions into a single wait (see `reset`).
//!
//! ```text
//!   WaterOrLye            on ─▶ lye             off ─▶ water
//!   DrainOrRecirculation  on ─▶ recirculation   off ─▶ drain
//! ```

use core::fmt;
use core::ops::Deref;
use std::time::Duration;

use log::debug;

use super::relay::Relay;
use crate::app::ports::{Clock, IoBackend};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorValve {
    relay: Relay,
    transition_time: Duration,
}

impl MotorValve {
    pub fn new(alias: impl Into<String>, transition_time: Duration) -> Self {
        Self {
            relay: Relay::new(alias),
            transition_time,
        }
    }

    pub fn alias(&self) -> &str {
        self.relay.alias()
    }

    pub fn transition_time(&self) -> Duration {
        self.transition_time
    }

    pub fn turn_on<B, C>(&self, io: &B, clock: &C, wait: bool) -> Result<()>
    where
        B: IoBackend + ?Sized,
        C: Clock + ?Sized,
    {
        self.relay.turn_on(io)?;
        if wait {
            self.wait_for_valve_to_switch(clock);
        }
        Ok(())
    }

    pub fn turn_off<B, C>(&self, io: &B, clock: &C, wait: bool) -> Result<()>
    where
        B: IoBackend + ?Sized,
        C: Clock + ?Sized,
    {
        self.relay.turn_off(io)?;
        if wait {
            self.wait_for_valve_to_switch(clock);
        }
        Ok(())
    }

    pub fn read_state<B: IoBackend + ?Sized>(&self, io: &B) -> Result<bool> {
        self.relay.read_state(io)
    }

    pub fn is_defined<B: IoBackend + ?Sized>(&self, io: &B) -> Result<bool> {
        self.relay.is_defined(io)
    }

    fn wait_for_valve_to_switch<C: Clock + ?Sized>(&self, clock: &C) {
        debug!("Waiting {:?} for {} to switch", self.transition_time, self);
        clock.sleep(self.transition_time);
    }
}

impl fmt::Display for MotorValve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MotorValve({})", self.relay.alias())
    }
}

// ---------------------------------------------------------------------------
// Named valves
// ---------------------------------------------------------------------------

/// Selects what the pump draws: fresh water or lye from the lye tank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaterOrLye(MotorValve);

impl WaterOrLye {
    pub fn new(valve: MotorValve) -> Self {
        Self(valve)
    }

    pub fn turn_to_water<B, C>(&self, io: &B, clock: &C) -> Result<()>
    where
        B: IoBackend + ?Sized,
        C: Clock + ?Sized,
    {
        self.0.turn_off(io, clock, true)
    }

    pub fn turn_to_lye<B, C>(&self, io: &B, clock: &C) -> Result<()>
    where
        B: IoBackend + ?Sized,
        C: Clock + ?Sized,
    {
        self.0.turn_on(io, clock, true)
    }
}

impl Deref for WaterOrLye {
    type Target = MotorValve;

    fn deref(&self) -> &MotorValve {
        &self.0
    }
}

/// Selects where the keg outflow goes: the drain or back into the tank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainOrRecirculation(MotorValve);

impl DrainOrRecirculation {
    pub fn new(valve: MotorValve) -> Self {
        Self(valve)
    }

    pub fn turn_to_drain<B, C>(&self, io: &B, clock: &C) -> Result<()>
    where
        B: IoBackend + ?Sized,
        C: Clock + ?Sized,
    {
        self.0.turn_off(io, clock, true)
    }

    pub fn turn_to_recirculation<B, C>(&self, io: &B, clock: &C) -> Result<()>
    where
        B: IoBackend + ?Sized,
        C: Clock + ?Sized,
    {
        self.0.turn_on(io, clock, true)
    }
}

impl Deref for DrainOrRecirculation {
    type Target = MotorValve;

    fn deref(&self) -> &MotorValve {
        &self.0
    }
}
