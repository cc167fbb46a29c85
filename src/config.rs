//! Wash machine configuration.
//!
//! All tunable parameters for one wash machine.  A configuration file is a
//! JSON object mapping section names to machine configurations, so a single
//! file can describe several machines:
//!
//! ```json
//! { "wash_machine_1": { "name": "Wash machine 1", "tick_secs": 1.0 } }
//! ```
//!
//! Missing fields fall back to [`WashMachineConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upper bound for every interval in the configuration (one day).
pub const MAX_INTERVAL_SECS: f64 = 60.0 * 60.0 * 24.0;

/// Core wash machine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WashMachineConfig {
    /// Human-readable machine name shown in the status snapshot.
    pub name: String,
    /// evok JSON-RPC endpoint of the UniPi controller.
    pub unipi_jsonrpc_url: String,

    // --- Heating ---
    /// Water temperature (Celsius) to wait for before washing.
    pub required_water_temp: f32,
    /// Seconds between temperature polls while heating.
    pub heating_sleep_secs: f64,

    // --- Timing ---
    /// Seconds per tick; every phase duration is expressed in ticks.
    pub tick_secs: f64,
    /// Seconds between temperature log samples.
    pub temp_sample_secs: f64,

    // --- IO ---
    pub io: IoAliases,
}

impl Default for WashMachineConfig {
    fn default() -> Self {
        Self {
            name: "Wash machine".into(),
            unipi_jsonrpc_url: "http://localhost/rpc".into(),

            required_water_temp: 80.0,
            heating_sleep_secs: 5.0,

            tick_secs: 1.0,
            temp_sample_secs: 15.0,

            io: IoAliases::default(),
        }
    }
}

impl WashMachineConfig {
    /// Load the section `section` from a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>, section: &str) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_section(&text, section)
    }

    /// Parse the section `section` out of a JSON document of machine sections.
    pub fn from_json_section(text: &str, section: &str) -> Result<Self> {
        let mut sections: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        let value = sections
            .remove(section)
            .ok_or_else(|| Error::Config(format!("no section named '{section}'")))?;
        let config: Self =
            serde_json::from_value(value).map_err(|e| Error::Config(format!("{section}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the sequencer spin or never finish.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("name must not be empty".into()));
        }
        for (field, value) in [
            ("tick_secs", self.tick_secs),
            ("heating_sleep_secs", self.heating_sleep_secs),
            ("temp_sample_secs", self.temp_sample_secs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("{field} must be positive, got {value}")));
            }
            if value > MAX_INTERVAL_SECS {
                return Err(Error::Config(format!(
                    "{field} must not exceed {MAX_INTERVAL_SECS} s, got {value}"
                )));
            }
        }
        if !self.required_water_temp.is_finite() {
            return Err(Error::Config("required_water_temp must be finite".into()));
        }
        self.io.validate()
    }

    /// Maximum number of samples kept in the rolling 24 h temperature log.
    pub fn temp_samples_limit(&self) -> usize {
        ((60.0 * 60.0 * 24.0) / self.temp_sample_secs) as usize
    }
}

// ---------------------------------------------------------------------------
// IO aliases
// ---------------------------------------------------------------------------

/// Aliases under which each IO point is registered in the evok backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoAliases {
    pub relays: RelayAliases,
    pub outputs: OutputAliases,
    pub inputs: InputAliases,
    pub motor_valves: MotorValveConfigs,
    /// 1-Wire address or alias of the water temperature sensor.
    pub water_temp: String,
}

impl Default for IoAliases {
    fn default() -> Self {
        Self {
            relays: RelayAliases::default(),
            outputs: OutputAliases::default(),
            inputs: InputAliases::default(),
            motor_valves: MotorValveConfigs::default(),
            water_temp: "al_water_temp".into(),
        }
    }
}

impl IoAliases {
    fn validate(&self) -> Result<()> {
        let aliases = self
            .relays
            .iter()
            .chain(self.outputs.iter())
            .chain(self.inputs.iter())
            .chain([
                ("water_or_lye", self.motor_valves.water_or_lye.alias.as_str()),
                (
                    "drain_or_recirculation",
                    self.motor_valves.drain_or_recirculation.alias.as_str(),
                ),
                ("water_temp", self.water_temp.as_str()),
            ]);
        for (name, alias) in aliases {
            if alias.trim().is_empty() {
                return Err(Error::Config(format!("alias for '{name}' must not be empty")));
            }
        }
        for valve in [&self.motor_valves.water_or_lye, &self.motor_valves.drain_or_recirculation] {
            if !(valve.transition_secs.is_finite()
                && (0.0..=MAX_INTERVAL_SECS).contains(&valve.transition_secs))
            {
                return Err(Error::Config(format!(
                    "transition_secs of '{}' must be within 0..={MAX_INTERVAL_SECS}, got {}",
                    valve.alias, valve.transition_secs
                )));
            }
        }
        Ok(())
    }
}

/// Plain relays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayAliases {
    pub air: String,
    pub pump: String,
    pub co2: String,
    pub cold_water: String,
    pub drain: String,
}

impl Default for RelayAliases {
    fn default() -> Self {
        Self {
            air: "al_air".into(),
            pump: "al_pump".into(),
            co2: "al_co2".into(),
            cold_water: "al_cold_water".into(),
            drain: "al_drain".into(),
        }
    }
}

impl RelayAliases {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("air", self.air.as_str()),
            ("pump", self.pump.as_str()),
            ("co2", self.co2.as_str()),
            ("cold_water", self.cold_water.as_str()),
            ("drain", self.drain.as_str()),
        ]
        .into_iter()
    }
}

/// Lamps on the operator panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputAliases {
    pub error_lamp: String,
    pub ready_lamp: String,
    pub waiting_for_input_lamp: String,
}

impl Default for OutputAliases {
    fn default() -> Self {
        Self {
            error_lamp: "al_error_lamp".into(),
            ready_lamp: "al_ready_lamp".into(),
            waiting_for_input_lamp: "al_waiting_for_input_lamp".into(),
        }
    }
}

impl OutputAliases {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("error_lamp", self.error_lamp.as_str()),
            ("ready_lamp", self.ready_lamp.as_str()),
            ("waiting_for_input_lamp", self.waiting_for_input_lamp.as_str()),
        ]
        .into_iter()
    }
}

/// Digital inputs (switches on the machine and the operator panel).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputAliases {
    pub total_stop: String,
    pub fuse_ok: String,
    pub keg_present: String,
    pub keg_50l: String,
    pub aux_wash: String,
}

impl Default for InputAliases {
    fn default() -> Self {
        Self {
            total_stop: "al_total_stop".into(),
            fuse_ok: "al_fuse_ok".into(),
            keg_present: "al_keg_present".into(),
            keg_50l: "al_keg_50l".into(),
            aux_wash: "al_aux_wash".into(),
        }
    }
}

impl InputAliases {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("total_stop", self.total_stop.as_str()),
            ("fuse_ok", self.fuse_ok.as_str()),
            ("keg_present", self.keg_present.as_str()),
            ("keg_50l", self.keg_50l.as_str()),
            ("aux_wash", self.aux_wash.as_str()),
        ]
        .into_iter()
    }
}

/// The two motor-driven three-way valves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorValveConfigs {
    pub water_or_lye: MotorValveConfig,
    pub drain_or_recirculation: MotorValveConfig,
}

impl Default for MotorValveConfigs {
    fn default() -> Self {
        Self {
            water_or_lye: MotorValveConfig::new("al_water_or_lye"),
            drain_or_recirculation: MotorValveConfig::new("al_drain_or_recirculation"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorValveConfig {
    pub alias: String,
    /// Seconds the valve needs to travel between its two positions.
    #[serde(default = "default_transition_secs")]
    pub transition_secs: f64,
}

impl MotorValveConfig {
    fn new(alias: &str) -> Self {
        Self {
            alias: alias.into(),
            transition_secs: default_transition_secs(),
        }
    }
}

fn default_transition_secs() -> f64 {
    3.0
}
