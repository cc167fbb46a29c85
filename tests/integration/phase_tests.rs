//! Integration tests for individual phases of the wash cycle.

use std::time::Duration;

use kegwash::app::events::AppEvent;
use kegwash::config::WashMachineConfig;
use kegwash::error::Error;
use kegwash::fsm::phases::build_wash_cycle;
use kegwash::fsm::{PhaseDescriptor, PhaseId, PhaseLabel};

use crate::mock_hw::{IoCall, MockClock, MockIo, Rig};

fn phase(id: PhaseId) -> PhaseDescriptor<MockIo, MockClock> {
    build_wash_cycle::<MockIo, MockClock>()[id as usize]
}

// ── check ─────────────────────────────────────────────────────

#[test]
fn check_passes_when_everything_is_defined() {
    let rig = Rig::new();
    phase(PhaseId::Check).run_notified(&rig.wm).unwrap();
    assert_eq!(rig.wm.state().current_phase(), PhaseLabel::Idle);
}

#[test]
fn check_aggregates_every_missing_point() {
    let rig = Rig::new();
    for alias in ["al_pump", "al_ready_lamp", "al_fuse_ok", "al_drain_or_recirculation", "al_water_temp"] {
        rig.io.undefine(alias);
    }
    let err = phase(PhaseId::Check).run_notified(&rig.wm).unwrap_err();
    match err {
        Error::UndefinedIo(points) => assert_eq!(
            points,
            vec![
                "Relay(al_pump)",
                "Relay(al_ready_lamp)",
                "Input(al_fuse_ok)",
                "MotorValve(al_drain_or_recirculation)",
                "TemperatureSensor(al_water_temp)",
            ]
        ),
        other => panic!("expected UndefinedIo, got {other:?}"),
    }
}

#[test]
fn check_treats_a_lost_sensor_as_missing() {
    let rig = Rig::new();
    rig.io.set_sensor_lost(true);
    assert!(matches!(
        phase(PhaseId::Check).run_notified(&rig.wm),
        Err(Error::UndefinedIo(points)) if points == vec!["TemperatureSensor(al_water_temp)"]
    ));
}

#[test]
fn check_propagates_an_unreachable_backend() {
    let rig = Rig::new();
    rig.io.set_offline(true);
    let err = phase(PhaseId::Check).run_notified(&rig.wm).unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    assert!(err.is_transient());
}

// ── wait_for_keg ──────────────────────────────────────────────

#[test]
fn wait_for_keg_polls_until_present() {
    let rig = Rig::new();
    rig.io.script_input("al_keg_present", &[false, false, false, true]);

    phase(PhaseId::WaitForKeg).run_notified(&rig.wm).unwrap();

    assert!(rig.io.relay("al_waiting_for_input_lamp"));
    assert_eq!(rig.clock.sleeps(), vec![Duration::from_millis(10); 3]);
}

// ── heating ───────────────────────────────────────────────────

#[test]
fn heating_polls_until_required_temperature() {
    let rig = Rig::new();
    rig.io
        .script_temperatures(&[Some(20.0), Some(21.0), Some(80.0)]);

    phase(PhaseId::Heating).run_notified(&rig.wm).unwrap();

    assert_eq!(rig.io.sensor_reads(), 3);
    assert_eq!(rig.clock.sleeps(), vec![Duration::from_secs(5); 2]);
    assert!(rig.io.relay("al_waiting_for_input_lamp"));
}

#[test]
fn heating_fails_on_lost_sensor() {
    let rig = Rig::new();
    rig.io.set_sensor_lost(true);
    assert!(matches!(
        phase(PhaseId::Heating).run_notified(&rig.wm),
        Err(Error::SensorLost(_))
    ));
    assert_eq!(
        rig.wm.state().current_phase(),
        PhaseLabel::Phase(PhaseId::Heating)
    );
}

// ── main washing phases ───────────────────────────────────────

#[test]
fn prewash_pulses_cold_water_five_times() {
    let rig = Rig::new();
    phase(PhaseId::Prewash).run_notified(&rig.wm).unwrap();

    assert_eq!(
        rig.io.writes_to("al_cold_water"),
        vec![true, false, true, false, true, false, true, false, true, false]
    );
    // Five on periods and four off periods between them.
    let sleeps = rig.clock.sleeps();
    assert_eq!(sleeps.len(), 9);
    let total: Duration = sleeps.iter().sum();
    let expected = Duration::from_secs_f64(30.0 - 6.0 * 0.2);
    assert!(total.abs_diff(expected) < Duration::from_millis(1), "{total:?}");
}

#[test]
fn drain_scales_with_aux_wash() {
    let rig = Rig::new();
    rig.io.set_input("al_aux_wash", true);
    phase(PhaseId::Drain).run_notified(&rig.wm).unwrap();

    // Valve travel, then 5 ticks times 5.
    assert_eq!(
        rig.clock.sleeps(),
        vec![Duration::from_secs(3), Duration::from_secs(25)]
    );
    assert!(!rig.io.relay("al_drain"));
    assert!(!rig.io.relay("al_air"));
}

#[test]
fn wash_with_lye_uses_50l_coefficient() {
    let rig = Rig::new();
    rig.io.set_input("al_keg_50l", true);
    phase(PhaseId::WashWithLye).run_notified(&rig.wm).unwrap();

    assert_eq!(
        rig.clock.sleeps(),
        vec![
            Duration::from_secs(3),
            Duration::from_secs(50),
            Duration::from_secs(3),
        ]
    );
    assert_eq!(rig.io.writes_to("al_water_or_lye"), vec![true, false]);
    assert!(!rig.io.relay("al_pump"));
}

#[test]
fn rinse_ends_with_a_system_flush() {
    let rig = Rig::new();
    phase(PhaseId::RinseWithColdWater).run_notified(&rig.wm).unwrap();

    assert_eq!(rig.io.writes_to("al_cold_water"), vec![true, false]);
    assert_eq!(rig.io.writes_to("al_air"), vec![true, false]);
    // The flush leaves the drain open for the next reset.
    assert!(rig.io.relay("al_drain"));
    let sleeps = rig.clock.sleeps();
    assert!(sleeps.contains(&Duration::from_secs_f64(30.0 * 0.75)));
    assert_eq!(sleeps.last(), Some(&Duration::from_secs(1)));
}

#[test]
fn hot_water_recirculates_then_returns_to_drain() {
    let rig = Rig::new();
    phase(PhaseId::WashWithHotWater).run_notified(&rig.wm).unwrap();
    assert_eq!(
        rig.io.writes_to("al_drain_or_recirculation"),
        vec![true, false]
    );
    assert_eq!(rig.io.writes_to("al_pump"), vec![true, false]);
}

#[test]
fn fill_with_co2_switches_co2_for_ten_ticks() {
    let rig = Rig::with_config(WashMachineConfig {
        tick_secs: 0.5,
        ..WashMachineConfig::default()
    });
    rig.io.set_input("al_keg_50l", true);
    phase(PhaseId::FillWithCo2).run_notified(&rig.wm).unwrap();
    assert_eq!(rig.io.writes_to("al_co2"), vec![true, false]);
    assert_eq!(rig.clock.sleeps(), vec![Duration::from_secs(5)]);
}

// ── reset ─────────────────────────────────────────────────────

#[test]
fn reset_only_switches_relays_that_are_on() {
    let rig = Rig::new();
    rig.io.force_relay("al_air", true);
    rig.io.force_relay("al_drain", true);

    rig.wm.reset().unwrap();

    let sets: Vec<IoCall> = rig
        .io
        .calls()
        .into_iter()
        .filter(|c| matches!(c, IoCall::SetRelay(..)))
        .collect();
    assert_eq!(
        sets,
        vec![
            IoCall::SetRelay("al_waiting_for_input_lamp".into(), false),
            IoCall::SetRelay("al_air".into(), false),
            IoCall::SetRelay("al_drain".into(), false),
        ]
    );
    assert!(rig.clock.sleeps().is_empty());
}

#[test]
fn reset_releases_all_valves_with_one_wait() {
    let mut config = WashMachineConfig::default();
    config.io.motor_valves.water_or_lye.transition_secs = 4.0;
    config.io.motor_valves.drain_or_recirculation.transition_secs = 6.0;
    let rig = Rig::with_config(config);
    rig.io.force_relay("al_water_or_lye", true);
    rig.io.force_relay("al_drain_or_recirculation", true);

    rig.wm.reset().unwrap();

    assert!(!rig.io.relay("al_water_or_lye"));
    assert!(!rig.io.relay("al_drain_or_recirculation"));
    assert_eq!(rig.clock.sleeps(), vec![Duration::from_secs(6)]);
    assert_eq!(
        rig.sink.events(),
        vec![
            AppEvent::PhaseStarted(PhaseLabel::Reset),
            AppEvent::PhaseFinished(PhaseLabel::Reset),
        ]
    );
}
