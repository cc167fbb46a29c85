//! Switchable output: a relay or a panel lamp on the UniPi.
//!
//! The handle owns nothing but the alias; the physical state lives in the
//! backend, so every call goes over the wire.

use core::fmt;

use log::{debug, info};

use crate::app::ports::{IoBackend, probe_defined};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relay {
    alias: String,
}

impl Relay {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn set<B: IoBackend + ?Sized>(&self, io: &B, on: bool) -> Result<()> {
        debug!("Setting {} to '{}'", self, on);
        io.set_relay_state(&self.alias, on)
    }

    pub fn turn_on<B: IoBackend + ?Sized>(&self, io: &B) -> Result<()> {
        self.set(io, true)
    }

    pub fn turn_off<B: IoBackend + ?Sized>(&self, io: &B) -> Result<()> {
        self.set(io, false)
    }

    pub fn read_state<B: IoBackend + ?Sized>(&self, io: &B) -> Result<bool> {
        io.get_relay_state(&self.alias)
    }

    /// Probe the backend with a read.  Only an unknown-alias reply counts as
    /// "not defined"; other failures are returned.
    pub fn is_defined<B: IoBackend + ?Sized>(&self, io: &B) -> Result<bool> {
        info!("Checking whether {} exists.", self);
        probe_defined(self, self.read_state(io))
    }
}

impl fmt::Display for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Relay({})", self.alias)
    }
}
