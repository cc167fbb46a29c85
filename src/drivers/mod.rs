//! Actuator handles: relays, lamps and motor valves.

pub mod motor_valve;
pub mod relay;
