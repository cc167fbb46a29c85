//! 1-Wire water temperature sensor behind the UniPi.
//!
//! The backend keeps polling the sensor on its own and reports the last
//! value together with a `lost` flag once the sensor stops answering.  A
//! lost sensor's value is stale and must never be used for control.

use core::fmt;

use log::{info, warn};

use crate::app::ports::{IoBackend, SensorReading, probe_defined};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemperatureSensor {
    alias: String,
}

impl TemperatureSensor {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Raw backend reading, including the `lost` flag.
    pub fn reading<B: IoBackend + ?Sized>(&self, io: &B) -> Result<SensorReading> {
        io.get_sensor_reading(&self.alias)
    }

    /// Temperature in Celsius; a lost sensor is an error.
    pub fn read_temperature<B: IoBackend + ?Sized>(&self, io: &B) -> Result<f32> {
        let reading = self.reading(io)?;
        if reading.lost {
            return Err(Error::SensorLost(self.alias.clone()));
        }
        Ok(reading.value)
    }

    /// A sensor counts as defined when the backend knows it and it is not lost.
    pub fn is_defined<B: IoBackend + ?Sized>(&self, io: &B) -> Result<bool> {
        info!("Checking {} exists.", self);
        match self.reading(io) {
            Ok(r) if r.lost => {
                warn!("{} is known to UniPi but has been lost", self);
                Ok(false)
            }
            other => probe_defined(self, other),
        }
    }
}

impl fmt::Display for TemperatureSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TemperatureSensor({})", self.alias)
    }
}
