//! Application boundary: port traits and the events the core emits.
//!
//! The wash logic in [`crate::machine`] and [`crate::fsm`] never touches
//! the network or a real clock.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping the sequencer
//! fully testable without a UniPi controller.

pub mod events;
pub mod ports;
