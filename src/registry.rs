//! Fixed registry of every IO point a wash machine uses.
//!
//! Built once from [`IoAliases`] and owned by the
//! [`WashMachine`](crate::machine::WashMachine).  The groups mirror the
//! physical wiring:
//!
//! | Group | Handles                                             |
//! |-------|-----------------------------------------------------|
//! | `rly` | air, pump, co2, cold water, drain                   |
//! | `out` | error lamp, ready lamp, waiting-for-input lamp      |
//! | `inp` | total stop, fuse ok, keg present, 50 l keg, aux wash |
//! | `mv`  | water-or-lye, drain-or-recirculation                |
//!
//! plus the single water temperature sensor.  Motor valve relays are not
//! part of `rly`: `reset` switches them separately so their travel time can
//! be waited out once.

use std::fmt::Display;

use crate::app::ports::{IoBackend, secs};
use crate::config::IoAliases;
use crate::drivers::motor_valve::{DrainOrRecirculation, MotorValve, WaterOrLye};
use crate::drivers::relay::Relay;
use crate::error::Result;
use crate::sensors::input::Input;
use crate::sensors::temperature::TemperatureSensor;

#[derive(Debug, Clone)]
pub struct Relays {
    pub air: Relay,
    pub pump: Relay,
    pub co2: Relay,
    pub cold_water: Relay,
    pub drain: Relay,
}

impl Relays {
    pub fn all(&self) -> [&Relay; 5] {
        [&self.air, &self.pump, &self.co2, &self.cold_water, &self.drain]
    }
}

#[derive(Debug, Clone)]
pub struct Outputs {
    pub error_lamp: Relay,
    pub ready_lamp: Relay,
    pub waiting_for_input_lamp: Relay,
}

impl Outputs {
    pub fn all(&self) -> [&Relay; 3] {
        [&self.error_lamp, &self.ready_lamp, &self.waiting_for_input_lamp]
    }
}

#[derive(Debug, Clone)]
pub struct Inputs {
    pub total_stop: Input,
    pub fuse_ok: Input,
    pub keg_present: Input,
    pub keg_50l: Input,
    pub aux_wash: Input,
}

impl Inputs {
    pub fn all(&self) -> [&Input; 5] {
        [
            &self.total_stop,
            &self.fuse_ok,
            &self.keg_present,
            &self.keg_50l,
            &self.aux_wash,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct MotorValves {
    pub water_or_lye: WaterOrLye,
    pub drain_or_recirculation: DrainOrRecirculation,
}

impl MotorValves {
    pub fn all(&self) -> [&MotorValve; 2] {
        [&*self.water_or_lye, &*self.drain_or_recirculation]
    }
}

#[derive(Debug, Clone)]
pub struct IoRegistry {
    pub rly: Relays,
    pub out: Outputs,
    pub inp: Inputs,
    pub mv: MotorValves,
    pub water_temp: TemperatureSensor,
}

impl IoRegistry {
    pub fn from_aliases(aliases: &IoAliases) -> Self {
        let r = &aliases.relays;
        let o = &aliases.outputs;
        let i = &aliases.inputs;
        let mv = &aliases.motor_valves;
        Self {
            rly: Relays {
                air: Relay::new(&r.air),
                pump: Relay::new(&r.pump),
                co2: Relay::new(&r.co2),
                cold_water: Relay::new(&r.cold_water),
                drain: Relay::new(&r.drain),
            },
            out: Outputs {
                error_lamp: Relay::new(&o.error_lamp),
                ready_lamp: Relay::new(&o.ready_lamp),
                waiting_for_input_lamp: Relay::new(&o.waiting_for_input_lamp),
            },
            inp: Inputs {
                total_stop: Input::new(&i.total_stop),
                fuse_ok: Input::new(&i.fuse_ok),
                keg_present: Input::new(&i.keg_present),
                keg_50l: Input::new(&i.keg_50l),
                aux_wash: Input::new(&i.aux_wash),
            },
            mv: MotorValves {
                water_or_lye: WaterOrLye::new(MotorValve::new(
                    &mv.water_or_lye.alias,
                    secs(mv.water_or_lye.transition_secs),
                )),
                drain_or_recirculation: DrainOrRecirculation::new(MotorValve::new(
                    &mv.drain_or_recirculation.alias,
                    secs(mv.drain_or_recirculation.transition_secs),
                )),
            },
            water_temp: TemperatureSensor::new(&aliases.water_temp),
        }
    }

    /// Probe every IO point and return the names of those the backend does
    /// not expose.  Probes all of them; never stops at the first miss, but
    /// a probe that fails for any other reason aborts with that error.
    pub fn undefined_points<B: IoBackend + ?Sized>(&self, io: &B) -> Result<Vec<String>> {
        let mut failed = Vec::new();
        let mut probe = |defined: bool, name: &dyn Display| {
            if !defined {
                failed.push(name.to_string());
            }
        };

        for rly in self.rly.all() {
            probe(rly.is_defined(io)?, rly);
        }
        for out in self.out.all() {
            probe(out.is_defined(io)?, out);
        }
        for inp in self.inp.all() {
            probe(inp.is_defined(io)?, inp);
        }
        for mv in self.mv.all() {
            probe(mv.is_defined(io)?, mv);
        }
        probe(self.water_temp.is_defined(io)?, &self.water_temp);

        Ok(failed)
    }
}
