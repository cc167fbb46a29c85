//! Digital input: a switch on the machine or the operator panel.

use core::fmt;

use log::info;

use crate::app::ports::{IoBackend, probe_defined};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    alias: String,
}

impl Input {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn read_state<B: IoBackend + ?Sized>(&self, io: &B) -> Result<bool> {
        io.get_input_state(&self.alias)
    }

    pub fn is_defined<B: IoBackend + ?Sized>(&self, io: &B) -> Result<bool> {
        info!("Checking whether {} exists.", self);
        probe_defined(self, self.read_state(io))
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Input({})", self.alias)
    }
}
