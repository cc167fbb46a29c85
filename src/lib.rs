//! Keg wash machine control library.
//!
//! Exposes the sequencer, the phase library and the IO adapters for the
//! binary, integration tests and embedders.  Nothing here talks to the
//! hardware directly: every IO call goes through the
//! [`IoBackend`](app::ports::IoBackend) port.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod machine;
pub mod registry;
pub mod safety;
pub mod sensors;
pub mod sequencer;
pub mod state;
pub mod telemetry;

pub use error::{Error, Result};
pub use machine::WashMachine;
