//! Phase bodies and the wash-cycle table builder.
//!
//! Each phase is a plain `fn` pointer over the [`WashMachine`]; no closures
//! and no dynamic dispatch.  Phase bodies wait only through
//! [`WashMachine::delay`] (which re-checks the interlocks) or through the
//! dedicated keg and temperature polls.
//!
//! ```text
//!  check ─▶ wait_for_keg ─▶ heating ─▶ prewash ─▶ drain ─▶ wash_with_lye
//!    ▲                                                          │
//!    │                                                          ▼
//!  fill_with_co2 ◀── dry ◀── wash_with_hot_water ◀── rinse_with_cold_water
//! ```
//!
//! `reset` is not part of the table; the sequencer runs it before every
//! phase attempt.

use std::time::Duration;

use log::info;

use super::{PhaseDescriptor, PhaseId};
use crate::app::ports::{Clock, IoBackend, secs};
use crate::error::{Error, Result};
use crate::machine::WashMachine;

/// Poll period of the keg-present switch.
const KEG_POLL: Duration = Duration::from_millis(10);

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static wash-cycle table.  Called once at startup.
pub fn build_wash_cycle<B, C>() -> [PhaseDescriptor<B, C>; PhaseId::COUNT]
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    [
        PhaseDescriptor { id: PhaseId::Check, run: check },
        PhaseDescriptor { id: PhaseId::WaitForKeg, run: wait_for_keg },
        PhaseDescriptor { id: PhaseId::Heating, run: heating },
        PhaseDescriptor { id: PhaseId::Prewash, run: prewash },
        PhaseDescriptor { id: PhaseId::Drain, run: drain },
        PhaseDescriptor { id: PhaseId::WashWithLye, run: wash_with_lye },
        PhaseDescriptor { id: PhaseId::RinseWithColdWater, run: rinse_with_cold_water },
        PhaseDescriptor { id: PhaseId::WashWithHotWater, run: wash_with_hot_water },
        PhaseDescriptor { id: PhaseId::Dry, run: dry },
        PhaseDescriptor { id: PhaseId::FillWithCo2, run: fill_with_co2 },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Reset (runs before every attempt)
// ═══════════════════════════════════════════════════════════════════════════

/// Return every actuator to rest.
///
/// Relays are read first and only the ones that are on get switched.  Motor
/// valves are all released without waiting, then a single sleep covers the
/// slowest valve that actually had to move.
pub fn reset<B, C>(wm: &WashMachine<B, C>) -> Result<()>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    let io = wm.io();
    let reg = wm.registry();

    reg.out.waiting_for_input_lamp.turn_off(io)?;

    for rly in reg.rly.all() {
        if rly.read_state(io)? {
            rly.turn_off(io)?;
        }
    }

    let mut wait = None;
    for mv in reg.mv.all() {
        if mv.read_state(io)? {
            wait = wait.max(Some(mv.transition_time()));
        }
    }
    if let Some(wait) = wait {
        for mv in reg.mv.all() {
            mv.turn_off(io, wm.clock(), false)?;
        }
        wm.clock().sleep(wait);
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
//  Preparation
// ═══════════════════════════════════════════════════════════════════════════

fn check<B, C>(wm: &WashMachine<B, C>) -> Result<()>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    let failed = wm.registry().undefined_points(wm.io())?;
    if failed.is_empty() {
        Ok(())
    } else {
        Err(Error::UndefinedIo(failed))
    }
}

fn wait_for_keg<B, C>(wm: &WashMachine<B, C>) -> Result<()>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    let io = wm.io();
    let reg = wm.registry();
    info!("Waiting for keg.");
    reg.out.waiting_for_input_lamp.turn_on(io)?;
    while !wm.is_keg_present()? {
        wm.clock().sleep(KEG_POLL);
        wm.wait_until_inputs_ok()?;
    }
    Ok(())
}

fn heating<B, C>(wm: &WashMachine<B, C>) -> Result<()>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    let io = wm.io();
    let reg = wm.registry();
    let required = wm.config().required_water_temp;

    let mut actual = reg.water_temp.read_temperature(io)?;
    reg.out.waiting_for_input_lamp.turn_on(io)?;
    while actual < required {
        info!(
            "Waiting for water (actual temperature {actual:.2}) to get to required temperature: {required:.2}."
        );
        wm.clock().sleep(secs(wm.config().heating_sleep_secs));
        actual = reg.water_temp.read_temperature(io)?;
    }
    info!("Water ready (actual temperature {actual:.2}. Required {required:.2})");
    wm.wait_until_inputs_ok()
}

// ═══════════════════════════════════════════════════════════════════════════
//  Washing
// ═══════════════════════════════════════════════════════════════════════════

fn prewash<B, C>(wm: &WashMachine<B, C>) -> Result<()>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    wm.pulse(&wm.registry().rly.cold_water, 5, 30.0, 0.8)
}

fn drain<B, C>(wm: &WashMachine<B, C>) -> Result<()>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    let (io, clock, reg) = (wm.io(), wm.clock(), wm.registry());
    reg.mv.drain_or_recirculation.turn_to_drain(io, clock)?;
    reg.rly.drain.turn_on(io)?;
    reg.rly.air.turn_on(io)?;
    wm.delay(5.0 * wm.main_phase_delay_coef()?)?;
    reg.rly.air.turn_off(io)?;
    reg.rly.drain.turn_off(io)
}

fn wash_with_lye<B, C>(wm: &WashMachine<B, C>) -> Result<()>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    let (io, clock, reg) = (wm.io(), wm.clock(), wm.registry());
    reg.mv.water_or_lye.turn_to_lye(io, clock)?;
    reg.rly.pump.turn_on(io)?;
    wm.delay(50.0 * wm.main_phase_delay_coef()?)?;
    reg.rly.pump.turn_off(io)?;
    reg.mv.water_or_lye.turn_to_water(io, clock)
}

fn rinse_with_cold_water<B, C>(wm: &WashMachine<B, C>) -> Result<()>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    let (io, clock, reg) = (wm.io(), wm.clock(), wm.registry());
    reg.mv.drain_or_recirculation.turn_to_recirculation(io, clock)?;
    reg.rly.cold_water.turn_on(io)?;
    wm.delay(30.0 * wm.main_phase_delay_coef()?)?;
    reg.rly.cold_water.turn_off(io)?;
    reg.mv.drain_or_recirculation.turn_to_drain(io, clock)?;
    wm.system_flush(1.0)
}

fn wash_with_hot_water<B, C>(wm: &WashMachine<B, C>) -> Result<()>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    let (io, clock, reg) = (wm.io(), wm.clock(), wm.registry());
    reg.mv.drain_or_recirculation.turn_to_recirculation(io, clock)?;
    reg.rly.pump.turn_on(io)?;
    wm.delay(30.0 * wm.main_phase_delay_coef()?)?;
    reg.rly.pump.turn_off(io)?;
    reg.mv.drain_or_recirculation.turn_to_drain(io, clock)
}

// ═══════════════════════════════════════════════════════════════════════════
//  Finishing
// ═══════════════════════════════════════════════════════════════════════════

fn dry<B, C>(wm: &WashMachine<B, C>) -> Result<()>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    let (io, clock, reg) = (wm.io(), wm.clock(), wm.registry());
    reg.mv.drain_or_recirculation.turn_to_drain(io, clock)?;
    reg.rly.air.turn_on(io)?;
    wm.delay(30.0 * wm.main_phase_delay_coef()?)?;
    reg.rly.air.turn_off(io)?;
    reg.rly.drain.turn_off(io)
}

fn fill_with_co2<B, C>(wm: &WashMachine<B, C>) -> Result<()>
where
    B: IoBackend + ?Sized,
    C: Clock + ?Sized,
{
    let (io, reg) = (wm.io(), wm.registry());
    reg.rly.co2.turn_on(io)?;
    wm.delay(10.0 * wm.main_phase_delay_coef()?)?;
    reg.rly.co2.turn_off(io)
}
