//! Sensor handles: digital inputs and the water temperature probe.

pub mod input;
pub mod temperature;
