//! The sequencer and the sampler sharing one machine across threads, the
//! way the binary runs them.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use kegwash::app::events::AppEvent;
use kegwash::app::ports::Clock;
use kegwash::config::WashMachineConfig;
use kegwash::fsm::{PhaseId, PhaseLabel};
use kegwash::machine::WashMachine;
use kegwash::sequencer::RunControl;

use crate::mock_hw::{MockIo, RecordingSink};

/// Real clock running 10 000 times faster, so both loops interleave.
struct FastClock;

impl Clock for FastClock {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration.div_f64(10_000.0));
    }

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[test]
fn sequencer_and_sampler_share_one_machine() {
    let io = Arc::new(MockIo::new());
    let sink = Arc::new(RecordingSink::new());
    let config = WashMachineConfig {
        temp_sample_secs: 900.0,
        ..WashMachineConfig::default()
    };
    let limit = config.temp_samples_limit();
    let wm = Arc::new(WashMachine::new(config, io, Arc::new(FastClock), sink.clone()));

    let sampling = RunControl::new();
    let sampler = {
        let wm = Arc::clone(&wm);
        let sampling = sampling.clone();
        thread::Builder::new()
            .name("temps-update".into())
            .spawn(move || wm.temps_update(&sampling))
            .unwrap()
    };
    let reader = {
        let wm = Arc::clone(&wm);
        let sampling = sampling.clone();
        thread::spawn(move || {
            let mut reads = 0usize;
            loop {
                let status = wm.status();
                assert_eq!(status.phases.len(), PhaseId::COUNT);
                let series = wm.temp_series();
                assert_eq!(series.timestamps.len(), series.temperatures.len());
                assert!(series.temperatures.len() <= limit);
                reads += 1;
                if !sampling.keep_running() {
                    return reads;
                }
                thread::yield_now();
            }
        })
    };

    while wm.temp_series().temperatures.is_empty() {
        thread::yield_now();
    }
    wm.run_cycle(&RunControl::new());
    sampling.stop();
    sampler.join().unwrap();
    let reads = reader.join().unwrap();

    let status = wm.status();
    assert_eq!(status.current_phase, PhaseLabel::Idle);
    assert!(status.errors.is_empty());
    assert_eq!(
        sink.count(|e| *e == AppEvent::PhaseFinished(PhaseLabel::Phase(PhaseId::FillWithCo2))),
        1
    );

    let samples = wm.temp_series().temperatures.len();
    assert!((1..=limit).contains(&samples), "{samples} samples");
    assert!(sink.count(|e| matches!(e, AppEvent::TempSampled(_))) >= samples);
    assert!(reads >= 1);
}
