//! In-memory IO backend.
//!
//! Stands in for the UniPi on a workstation: `--simulate` dry runs and the
//! unit tests use it.  Every alias of the default configuration starts out
//! defined, with the inputs in the "safe to run" position and the water
//! already at temperature.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::app::ports::{IoBackend, SensorReading};
use crate::config::IoAliases;
use crate::error::{Error, Result};

/// evok's reply code for an unknown alias.
const UNKNOWN_ALIAS: i64 = -32000;

#[derive(Debug)]
struct SimState {
    relays: HashMap<String, bool>,
    inputs: HashMap<String, bool>,
    sensor: String,
    temperature: f32,
    sensor_lost: bool,
    undefined: HashSet<String>,
}

#[derive(Debug)]
pub struct SimulatedIo {
    state: Mutex<SimState>,
}

impl Default for SimulatedIo {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedIo {
    /// Simulator exposing the default aliases.
    pub fn new() -> Self {
        Self::with_aliases(&IoAliases::default())
    }

    /// Simulator exposing exactly the aliases of `aliases`.
    pub fn with_aliases(aliases: &IoAliases) -> Self {
        let mut relays: HashMap<String, bool> = aliases
            .relays
            .iter()
            .chain(aliases.outputs.iter())
            .map(|(_, alias)| (alias.to_string(), false))
            .collect();
        relays.insert(aliases.motor_valves.water_or_lye.alias.clone(), false);
        relays.insert(aliases.motor_valves.drain_or_recirculation.alias.clone(), false);

        let mut inputs: HashMap<String, bool> = aliases
            .inputs
            .iter()
            .map(|(_, alias)| (alias.to_string(), false))
            .collect();
        inputs.insert(aliases.inputs.fuse_ok.clone(), true);
        inputs.insert(aliases.inputs.keg_present.clone(), true);

        Self {
            state: Mutex::new(SimState {
                relays,
                inputs,
                sensor: aliases.water_temp.clone(),
                temperature: 85.0,
                sensor_lost: false,
                undefined: HashSet::new(),
            }),
        }
    }

    /// Make the backend reject `alias` as unknown.
    pub fn undefine(&self, alias: &str) {
        self.state.lock().undefined.insert(alias.to_string());
    }

    /// Undo [`undefine`](Self::undefine).
    pub fn define(&self, alias: &str) {
        self.state.lock().undefined.remove(alias);
    }

    /// Current relay level; unknown relays read as off.
    pub fn relay(&self, alias: &str) -> bool {
        self.state.lock().relays.get(alias).copied().unwrap_or(false)
    }

    pub fn set_input(&self, alias: &str, on: bool) {
        self.state.lock().inputs.insert(alias.to_string(), on);
    }

    pub fn set_temperature(&self, celsius: f32) {
        self.state.lock().temperature = celsius;
    }

    pub fn set_sensor_lost(&self, lost: bool) {
        self.state.lock().sensor_lost = lost;
    }
}

fn unknown(kind: &str, alias: &str) -> Error {
    Error::Protocol {
        code: UNKNOWN_ALIAS,
        message: format!("Invalid {kind} '{alias}'"),
    }
}

impl IoBackend for SimulatedIo {
    fn get_relay_state(&self, alias: &str) -> Result<bool> {
        let s = self.state.lock();
        if s.undefined.contains(alias) {
            return Err(unknown("relay", alias));
        }
        s.relays.get(alias).copied().ok_or_else(|| unknown("relay", alias))
    }

    fn set_relay_state(&self, alias: &str, on: bool) -> Result<()> {
        let mut s = self.state.lock();
        if s.undefined.contains(alias) || !s.relays.contains_key(alias) {
            return Err(unknown("relay", alias));
        }
        s.relays.insert(alias.to_string(), on);
        Ok(())
    }

    fn get_input_state(&self, alias: &str) -> Result<bool> {
        let s = self.state.lock();
        if s.undefined.contains(alias) {
            return Err(unknown("input", alias));
        }
        s.inputs.get(alias).copied().ok_or_else(|| unknown("input", alias))
    }

    fn get_sensor_reading(&self, alias: &str) -> Result<SensorReading> {
        let s = self.state.lock();
        if s.undefined.contains(alias) || alias != s.sensor {
            return Err(unknown("sensor", alias));
        }
        Ok(SensorReading {
            value: s.temperature,
            lost: s.sensor_lost,
            timestamp: chrono::Utc::now().timestamp() as f64,
            interval: 15.0,
        })
    }
}
