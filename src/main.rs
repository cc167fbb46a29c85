//! Keg wash machine main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  EvokClient / SimulatedIo   SystemClock   LogEventSink       │
//! │  (IoBackend)                (Clock)       (EventSink)        │
//! │                                                              │
//! │  ─────────────────── Port Trait Boundary ──────────────────  │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            WashMachine (pure sequencing logic)         │  │
//! │  │   phase table · interlock gate · temperature log       │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  Threads: sequencer (main) · temps-update (sampler)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::{info, warn};

use kegwash::adapters::evok::EvokClient;
use kegwash::adapters::log_sink::LogEventSink;
use kegwash::adapters::sim::SimulatedIo;
use kegwash::adapters::time::SystemClock;
use kegwash::app::ports::IoBackend;
use kegwash::config::WashMachineConfig;
use kegwash::Error;
use kegwash::fsm::PhaseId;
use kegwash::fsm::phases::build_wash_cycle;
use kegwash::machine::WashMachine;
use kegwash::sequencer::RunControl;

type Machine = WashMachine<dyn IoBackend, SystemClock>;

/// Keg washing control.
#[derive(Parser)]
#[command(name = "kegwash", version, about, long_about = None)]
struct Cli {
    /// JSON configuration file with one section per wash machine
    #[arg(short, long, env = "KEGWASH_CONFIG")]
    config: Option<PathBuf>,

    /// Configuration section to use
    #[arg(short, long, default_value = "wash_machine_1")]
    section: String,

    /// Address of the UniPi JSON-RPC server (overrides the config file)
    #[arg(long)]
    unipi_jsonrpc: Option<String>,

    /// Run against the in-memory simulator instead of a UniPi
    #[arg(long)]
    simulate: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run the wash cycle forever (default)
    Run,
    /// Verify that every configured IO point exists, then exit
    Check,
    /// Print the status snapshot as JSON, then exit
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── 1. Logging ────────────────────────────────────────────
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // ── 2. Configuration ──────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => WashMachineConfig::from_file(path, &cli.section)
            .with_context(|| format!("loading section '{}' of {}", cli.section, path.display()))?,
        None => {
            warn!("No config file given, using built-in defaults");
            WashMachineConfig::default()
        }
    };
    if let Some(url) = cli.unipi_jsonrpc {
        config.unipi_jsonrpc_url = url;
    }
    config.validate().context("invalid configuration")?;

    // ── 3. Adapters ───────────────────────────────────────────
    let io: Arc<dyn IoBackend> = if cli.simulate {
        info!("Using the simulated IO backend");
        Arc::new(SimulatedIo::with_aliases(&config.io))
    } else {
        info!("Using UniPi JSON-RPC at {}", config.unipi_jsonrpc_url);
        Arc::new(EvokClient::new(config.unipi_jsonrpc_url.clone())?)
    };
    let wm: Arc<Machine> = Arc::new(WashMachine::new(
        config,
        io,
        Arc::new(SystemClock::new()),
        Arc::new(LogEventSink::new()),
    ));

    // ── 4. Dispatch ───────────────────────────────────────────
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&wm),
        Command::Check => check(&wm),
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&wm.status())?);
            Ok(())
        }
    }
}

fn run(wm: &Arc<Machine>) -> Result<()> {
    info!("{} v{} starting", wm.name(), env!("CARGO_PKG_VERSION"));
    let control = RunControl::new();

    let sampler = {
        let wm = Arc::clone(wm);
        let control = control.clone();
        thread::Builder::new()
            .name("temps-update".into())
            .spawn(move || wm.temps_update(&control))
            .context("spawning the temperature sampler")?
    };

    wm.wash_the_kegs(&control);

    control.stop();
    if sampler.join().is_err() {
        bail!("temperature sampler panicked");
    }
    Ok(())
}

fn check(wm: &Machine) -> Result<()> {
    let check = build_wash_cycle::<dyn IoBackend, SystemClock>()[PhaseId::Check as usize];
    match check.run_notified(wm) {
        Ok(()) => {
            println!("all IO points are defined");
            Ok(())
        }
        Err(Error::UndefinedIo(failed)) => {
            for point in &failed {
                println!("missing: {point}");
            }
            bail!("{} of the configured IO points are missing", failed.len())
        }
        Err(e) => Err(e.into()),
    }
}
