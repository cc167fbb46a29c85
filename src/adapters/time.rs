//! Host time adapter.
//!
//! Implements the [`Clock`] port over the operating system: blocking
//! `std::thread::sleep` for waits and `chrono::Local` for wall-clock
//! timestamps.

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::app::ports::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
