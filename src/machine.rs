//! The wash machine, aggregate root of the domain.
//!
//! [`WashMachine`] owns the IO registry, the configuration, and the
//! volatile runtime state.  All IO flows through the injected ports, so the
//! same machine runs against the evok backend, the simulator, or a test
//! mock.
//!
//! ```text
//!   IoBackend ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │         WashMachine          │
//!       Clock ──▶ │  registry · config · state   │
//!                 └──────────────────────────────┘
//!                    ▲                        ▲
//!              sequencer thread        sampler thread
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::app::events::AppEvent;
use crate::app::ports::{Clock, EventSink, IoBackend, secs};
use crate::config::WashMachineConfig;
use crate::drivers::relay::Relay;
use crate::error::Result;
use crate::fsm::{PhaseId, PhaseLabel};
use crate::registry::IoRegistry;
use crate::safety::{INTERLOCK_POLL, InterlockMonitor};
use crate::state::{ErrorFlag, MachineState};

/// Point-in-time view of the machine for status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub name: String,
    pub required_water_temp: f32,
    pub current_phase: PhaseLabel,
    pub phases: Vec<&'static str>,
    pub errors: Vec<ErrorFlag>,
}

pub struct WashMachine<B: IoBackend + ?Sized, C: Clock + ?Sized> {
    config: WashMachineConfig,
    registry: IoRegistry,
    io: Arc<B>,
    clock: Arc<C>,
    sink: Arc<dyn EventSink>,
    state: MachineState,
}

impl<B, C> WashMachine<B, C>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(
        config: WashMachineConfig,
        io: Arc<B>,
        clock: Arc<C>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let registry = IoRegistry::from_aliases(&config.io);
        let state = MachineState::new(config.temp_samples_limit());
        Self {
            config,
            registry,
            io,
            clock,
            sink,
            state,
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &WashMachineConfig {
        &self.config
    }

    pub fn registry(&self) -> &IoRegistry {
        &self.registry
    }

    pub fn io(&self) -> &B {
        &self.io
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub(crate) fn emit(&self, event: &AppEvent) {
        self.sink.emit(event);
    }

    // ── Notifications ─────────────────────────────────────────

    /// Run `body` bracketed by start/finish notifications for `label`.
    ///
    /// On failure the label is left in place so the status shows which
    /// phase is being retried.
    pub fn notified<F>(&self, label: PhaseLabel, body: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        self.phase_started(label);
        body()?;
        self.phase_finished(label);
        Ok(())
    }

    fn phase_started(&self, label: PhaseLabel) {
        self.state.set_phase(label);
        self.emit(&AppEvent::PhaseStarted(label));
    }

    fn phase_finished(&self, label: PhaseLabel) {
        self.state.set_phase(PhaseLabel::Idle);
        self.emit(&AppEvent::PhaseFinished(label));
    }

    // ── Inputs ────────────────────────────────────────────────

    pub fn is_keg_present(&self) -> Result<bool> {
        self.registry.inp.keg_present.read_state(&*self.io)
    }

    pub fn is_total_stop_pressed(&self) -> Result<bool> {
        self.registry.inp.total_stop.read_state(&*self.io)
    }

    pub fn is_fuse_blown(&self) -> Result<bool> {
        Ok(!self.registry.inp.fuse_ok.read_state(&*self.io)?)
    }

    pub fn is_50l_keg_selected(&self) -> Result<bool> {
        self.registry.inp.keg_50l.read_state(&*self.io)
    }

    pub fn is_aux_wash_selected(&self) -> Result<bool> {
        self.registry.inp.aux_wash.read_state(&*self.io)
    }

    /// Scale factor of the main wash phases.
    ///
    /// Aux wash wins over the keg size selector.
    pub fn main_phase_delay_coef(&self) -> Result<f64> {
        if self.is_aux_wash_selected()? {
            return Ok(5.0);
        }
        if self.is_50l_keg_selected()? {
            Ok(1.0)
        } else {
            Ok(0.75)
        }
    }

    // ── Waiting ───────────────────────────────────────────────

    /// Block while total stop is pressed or the fuse is blown.
    pub fn wait_until_inputs_ok(&self) -> Result<()> {
        let mut monitor = InterlockMonitor::new();
        loop {
            let stop = self.is_total_stop_pressed()?;
            let blown = self.is_fuse_blown()?;
            let outcome = monitor.evaluate(stop, blown);

            for interlock in &outcome.engaged {
                self.emit(&AppEvent::InterlockEngaged(*interlock));
            }
            if outcome.cleared {
                self.emit(&AppEvent::InterlocksCleared);
            }
            if monitor.is_safe() {
                return Ok(());
            }
            self.clock.sleep(INTERLOCK_POLL);
        }
    }

    /// Sleep `ticks` ticks, then pass the interlock gate.
    pub fn delay(&self, ticks: f64) -> Result<()> {
        self.clock.sleep(secs(ticks * self.config.tick_secs));
        self.wait_until_inputs_ok()
    }

    // ── Compound actions ──────────────────────────────────────

    /// Switch `relay` on and off `count` times spread over `duration` ticks.
    ///
    /// Each period is on for `duty_cycle` of its length.  The trailing off
    /// time of the last period is not waited.
    pub fn pulse(&self, relay: &Relay, count: u32, duration: f64, duty_cycle: f64) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let period = duration / f64::from(count);
        let t_on = period * duty_cycle;
        let t_off = period * (1.0 - duty_cycle);
        for i in 1..=count {
            relay.turn_on(&*self.io)?;
            self.delay(t_on)?;
            relay.turn_off(&*self.io)?;
            if i < count {
                self.delay(t_off)?;
            }
        }
        Ok(())
    }

    /// Purge the lines: drain open, air blowing for `ticks`.
    ///
    /// The drain relay is left on; the next `reset` closes it.
    pub fn system_flush(&self, ticks: f64) -> Result<()> {
        let io = &*self.io;
        self.registry
            .mv
            .drain_or_recirculation
            .turn_to_drain(io, &*self.clock)?;
        self.registry.rly.drain.turn_on(io)?;
        self.registry.rly.air.turn_on(io)?;
        self.delay(ticks)?;
        self.registry.rly.air.turn_off(io)
    }

    /// Best effort: a lamp failure is reported as an event, never returned.
    pub fn signal_error(&self, active: bool) {
        self.state.set_error(ErrorFlag::IoError, active);
        if let Err(e) = self.registry.out.error_lamp.set(&*self.io, active) {
            self.emit(&AppEvent::ErrorLampFailed(e.to_string()));
        }
    }

    // ── Status ────────────────────────────────────────────────

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            name: self.config.name.clone(),
            required_water_temp: self.config.required_water_temp,
            current_phase: self.state.current_phase(),
            phases: PhaseId::ALL.iter().map(|id| id.name()).collect(),
            errors: self.state.errors(),
        }
    }
}
