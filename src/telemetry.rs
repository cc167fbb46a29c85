//! Water temperature telemetry.
//!
//! A dedicated thread samples the water temperature sensor every
//! `temp_sample_secs` and appends the result to a rolling log covering the
//! last 24 hours.  A sensor that is lost, or any failed read, becomes an
//! absent sample rather than an error: the chart shows a gap and the
//! sampler carries on.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use log::error;
use serde::Serialize;

use crate::app::events::AppEvent;
use crate::app::ports::{Clock, IoBackend, secs};
use crate::machine::WashMachine;
use crate::sequencer::RunControl;

/// Timestamp format of the exported series.
pub const SERIES_TIME_FORMAT: &str = "%y-%m-%d %H:%M:%S";

/// One point of the temperature log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempSample {
    pub timestamp: DateTime<Local>,
    /// `None` when the sensor could not be read.
    pub celsius: Option<f32>,
}

// ---------------------------------------------------------------------------
// Bounded log
// ---------------------------------------------------------------------------

/// FIFO of temperature samples capped at `limit` entries.
///
/// Appending past the cap drops the oldest samples first, so the log stays
/// in chronological order.
#[derive(Debug, Clone)]
pub struct TempLog {
    samples: VecDeque<TempSample>,
    limit: usize,
}

impl TempLog {
    pub fn new(limit: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(limit.min(8192)),
            limit,
        }
    }

    pub fn push(&mut self, sample: TempSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.limit {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn iter(&self) -> impl Iterator<Item = &TempSample> {
        self.samples.iter()
    }

    /// Positionally aligned columns for charting.
    pub fn series(&self) -> TempSeries {
        TempSeries {
            timestamps: self
                .samples
                .iter()
                .map(|s| s.timestamp.format(SERIES_TIME_FORMAT).to_string())
                .collect(),
            temperatures: self.samples.iter().map(|s| s.celsius).collect(),
        }
    }
}

/// Exported time series: absent samples serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TempSeries {
    pub timestamps: Vec<String>,
    pub temperatures: Vec<Option<f32>>,
}

// ---------------------------------------------------------------------------
// Sampler
// ---------------------------------------------------------------------------

impl<B, C> WashMachine<B, C>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    /// Append one sample stamped `timestamp`.
    pub fn add_temp(&self, timestamp: DateTime<Local>, celsius: Option<f32>) {
        self.state()
            .temp_log
            .lock()
            .push(TempSample { timestamp, celsius });
        self.emit(&AppEvent::TempSampled(celsius));
    }

    /// Read the sensor once and append the result.  Never fails.
    pub fn sample_temperature(&self) -> Option<f32> {
        let celsius = match self.registry().water_temp.read_temperature(self.io()) {
            Ok(t) => Some(t),
            Err(e) => {
                error!("Error happened in the temps update: {e}");
                None
            }
        };
        self.add_temp(self.clock().now(), celsius);
        celsius
    }

    /// Sampler loop: sample, sleep `temp_sample_secs`, repeat until stopped.
    pub fn temps_update(&self, control: &RunControl) {
        let period = secs(self.config().temp_sample_secs);
        while control.keep_running() {
            self.sample_temperature();
            self.clock().sleep(period);
        }
    }

    /// Snapshot of the temperature log.
    pub fn temp_series(&self) -> TempSeries {
        self.state().temp_log.lock().series()
    }
}
