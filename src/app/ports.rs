//! Port traits: the hexagonal boundary between the wash logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ WashMachine (domain)
//! ```
//!
//! Driven adapters (the evok JSON-RPC client, the simulator, the system
//! clock, the log sink) implement these traits.  The
//! [`WashMachine`](crate::machine::WashMachine) consumes them via generics,
//! so the domain never talks HTTP or sleeps on a real clock directly.
//!
//! Ports take `&self`: the sequencer and the telemetry sampler run on
//! separate threads and share one backend through an `Arc`.

use std::time::Duration;

use core::fmt::Display;

use chrono::{DateTime, Local};
use log::error;

use crate::error::{Error, Result};

// ───────────────────────────────────────────────────────────────
// IO port (driven adapter: domain ↔ remote IO backend)
// ───────────────────────────────────────────────────────────────

/// One reading of a 1-Wire temperature sensor as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Temperature in Celsius.
    pub value: f32,
    /// The backend has not heard from the sensor recently; `value` is stale.
    pub lost: bool,
    /// Backend timestamp of the last successful read (seconds since epoch).
    pub timestamp: f64,
    /// Backend polling interval of the sensor (seconds).
    pub interval: f64,
}

/// Remote IO facility addressed by alias.
///
/// Every call may fail with a protocol or communication error; the domain
/// treats all of them as recoverable.
pub trait IoBackend: Send + Sync {
    /// Current state of a relay or digital output.
    fn get_relay_state(&self, alias: &str) -> Result<bool>;

    /// Switch a relay or digital output.
    fn set_relay_state(&self, alias: &str, on: bool) -> Result<()>;

    /// Current level of a digital input.
    fn get_input_state(&self, alias: &str) -> Result<bool>;

    /// Latest reading of a temperature sensor.
    fn get_sensor_reading(&self, alias: &str) -> Result<SensorReading>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Time source.  Every wait in the domain goes through here, which lets
/// tests run a full wash cycle without real sleeping.
pub trait Clock: Send + Sync {
    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);

    /// Wall-clock time, used to stamp temperature samples.
    fn now(&self) -> DateTime<Local>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &super::events::AppEvent);
}

/// Convert fractional seconds into a [`Duration`], clamping negative and
/// non-finite inputs to zero and saturating at [`Duration::MAX`].
pub fn secs(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Interpret the outcome of a probing read of `point`.
///
/// Only a JSON-RPC error object means the backend does not know the alias.
/// A transport or decode failure says nothing about the configuration and
/// is returned unchanged.
pub fn probe_defined<T>(point: &dyn Display, read: Result<T>) -> Result<bool> {
    match read {
        Ok(_) => Ok(true),
        Err(e @ Error::Protocol { .. }) => {
            error!("IO alias {point} not configured in UniPi: {e}");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
