//! Integration tests for the sequencer retry loop and the interlock gate.

use std::time::Duration;

use kegwash::app::events::AppEvent;
use kegwash::fsm::phases::build_wash_cycle;
use kegwash::fsm::{PhaseId, PhaseLabel};
use kegwash::safety::{INTERLOCK_POLL, Interlock};
use kegwash::sequencer::{ERROR_SLEEP, RunControl};
use kegwash::state::ErrorFlag;

use crate::mock_hw::{MockClock, MockIo, Rig};

fn started(e: &AppEvent) -> Option<PhaseLabel> {
    match e {
        AppEvent::PhaseStarted(label) => Some(*label),
        _ => None,
    }
}

// ── Full cycle ────────────────────────────────────────────────

#[test]
fn full_cycle_runs_every_phase_in_order_with_reset_before_each() {
    let rig = Rig::new();
    rig.wm.run_cycle(&RunControl::new());

    let starts: Vec<PhaseLabel> = rig.sink.events().iter().filter_map(started).collect();
    let mut expected = Vec::new();
    for id in PhaseId::ALL {
        expected.push(PhaseLabel::Reset);
        expected.push(PhaseLabel::Phase(id));
    }
    assert_eq!(starts, expected);
    assert_eq!(rig.wm.state().current_phase(), PhaseLabel::Idle);
    assert!(rig.wm.status().errors.is_empty());
}

#[test]
fn full_cycle_leaves_the_process_relays_off() {
    let rig = Rig::new();
    rig.wm.run_cycle(&RunControl::new());
    for alias in ["al_air", "al_pump", "al_co2", "al_cold_water"] {
        assert!(!rig.io.relay(alias), "{alias} left on");
    }
}

// ── Retry ─────────────────────────────────────────────────────

#[test]
fn failing_phase_is_retried_once_with_error_lamp_off_on_off() {
    let rig = Rig::new();
    rig.io.fail_sets("al_co2", 1);

    let cycle = build_wash_cycle::<MockIo, MockClock>();
    let co2 = &cycle[PhaseId::FillWithCo2 as usize..];
    rig.wm.run_phases(co2, &RunControl::new());

    assert_eq!(rig.io.writes_to("al_error_lamp"), vec![false, true, false]);
    assert!(rig.clock.sleeps().contains(&ERROR_SLEEP));

    let failures = rig
        .sink
        .count(|e| matches!(e, AppEvent::PhaseFailed { phase, transient: true, .. } if *phase == PhaseLabel::Phase(PhaseId::FillWithCo2)));
    assert_eq!(failures, 1);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::PhaseFinished(PhaseLabel::Phase(PhaseId::FillWithCo2))),
        1
    );
    assert!(rig.wm.status().errors.is_empty());
}

#[test]
fn reset_precedes_every_attempt() {
    let rig = Rig::new();
    rig.io.fail_sets("al_co2", 2);

    let cycle = build_wash_cycle::<MockIo, MockClock>();
    rig.wm
        .run_phases(&cycle[PhaseId::FillWithCo2 as usize..], &RunControl::new());

    let starts: Vec<PhaseLabel> = rig.sink.events().iter().filter_map(started).collect();
    let co2 = PhaseLabel::Phase(PhaseId::FillWithCo2);
    assert_eq!(
        starts,
        vec![PhaseLabel::Reset, co2, PhaseLabel::Reset, co2, PhaseLabel::Reset, co2]
    );
}

#[test]
fn persistent_failure_never_advances() {
    let rig = Rig::new();
    rig.io.undefine("al_keg_50l");
    let control = RunControl::new();
    rig.clock.stop_after(5, &control);

    let cycle = build_wash_cycle::<MockIo, MockClock>();
    rig.wm.run_phases(&cycle, &control);

    let starts: Vec<PhaseLabel> = rig.sink.events().iter().filter_map(started).collect();
    assert!(starts.iter().all(|l| matches!(l, PhaseLabel::Reset | PhaseLabel::Phase(PhaseId::Check))));
    assert_eq!(rig.wm.state().current_phase(), PhaseLabel::Phase(PhaseId::Check));
    assert_eq!(rig.wm.status().errors, vec![ErrorFlag::IoError]);
    assert_eq!(rig.clock.sleeps(), vec![ERROR_SLEEP; 5]);
    // A missing IO point needs an operator.
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::PhaseFailed { transient: false, .. })),
        5
    );
}

#[test]
fn wash_the_kegs_repeats_the_cycle() {
    let rig = Rig::new();
    let control = RunControl::new();
    // Enough sleeps for more than one full cycle.
    rig.clock.stop_after(200, &control);
    rig.wm.wash_the_kegs(&control);

    let checks = rig
        .sink
        .count(|e| *e == AppEvent::PhaseStarted(PhaseLabel::Phase(PhaseId::Check)));
    assert!(checks >= 2, "cycle ran {checks} times");
}

#[test]
fn error_lamp_failure_does_not_block_the_retry() {
    let rig = Rig::new();
    rig.io.undefine("al_error_lamp");
    rig.io.fail_sets("al_co2", 1);

    let cycle = build_wash_cycle::<MockIo, MockClock>();
    rig.wm
        .run_phases(&cycle[PhaseId::FillWithCo2 as usize..], &RunControl::new());

    assert!(rig.sink.count(|e| matches!(e, AppEvent::ErrorLampFailed(_))) >= 3);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::PhaseFinished(PhaseLabel::Phase(PhaseId::FillWithCo2))),
        1
    );
}

// ── Interlock gate ────────────────────────────────────────────

#[test]
fn total_stop_pulse_logs_one_engagement() {
    let rig = Rig::new();
    rig.io.script_input("al_total_stop", &[true, false]);

    rig.wm.wait_until_inputs_ok().unwrap();

    let engaged = rig.sink.count(|e| *e == AppEvent::InterlockEngaged(Interlock::TotalStop));
    assert_eq!(engaged, 1);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::InterlocksCleared), 1);
    assert_eq!(rig.clock.sleeps(), vec![INTERLOCK_POLL]);
}

#[test]
fn held_stop_and_blown_fuse_each_report_once() {
    let rig = Rig::new();
    rig.io.script_input("al_total_stop", &[true, true, true, true, false]);
    rig.io.script_input("al_fuse_ok", &[true, false, false, true, true]);

    rig.wm.wait_until_inputs_ok().unwrap();

    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::InterlockEngaged(Interlock::TotalStop)),
        1
    );
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::InterlockEngaged(Interlock::FuseBlown)),
        1
    );
    assert_eq!(rig.sink.count(|e| *e == AppEvent::InterlocksCleared), 1);
    assert_eq!(rig.clock.sleeps().len(), 4);
}

#[test]
fn gate_propagates_input_read_errors() {
    let rig = Rig::new();
    rig.io.undefine("al_fuse_ok");
    assert!(rig.wm.wait_until_inputs_ok().is_err());
}

#[test]
fn delay_waits_out_an_interlock_after_sleeping() {
    let rig = Rig::new();
    rig.io.script_input("al_total_stop", &[true, true, false]);
    rig.wm.delay(3.0).unwrap();
    assert_eq!(
        rig.clock.sleeps(),
        vec![Duration::from_secs(3), INTERLOCK_POLL, INTERLOCK_POLL]
    );
}
