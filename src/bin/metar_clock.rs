//! METAR clock for a Linux single-board computer with a serial touchscreen.
//!
//! Opens the display UART, loads the saved settings, brings the display
//! up, and then runs the scheduler loop forever.
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features linux
//! ```
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=metar_clock=debug metar_clock --device /dev/ttyS1 --config /etc/metar-clock.toml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use metar_clock::hal::{HttpMetarSource, LinuxSerial, NmcliNetwork, SystemClock, DEFAULT_METAR_URL};
use metar_clock::logging::init_tracing;
use metar_clock::store::TomlConfigStore;
use metar_clock::traits::ConfigStore;
use metar_clock::{Panel, Scheduler};
use tracing::{error, info};

/// Command line and environment settings.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Serial device wired to the display.
    #[arg(long, env = "METAR_CLOCK_DEVICE", default_value = "/dev/ttyS1")]
    device: String,

    /// Network interface to report and reconfigure.
    #[arg(long, env = "METAR_CLOCK_INTERFACE", default_value = "wlan0")]
    interface: String,

    /// Saved display settings.
    #[arg(
        long,
        env = "METAR_CLOCK_CONFIG",
        default_value = "/etc/metar-clock/config.toml"
    )]
    config: PathBuf,

    /// Observation URL; `{station}` is replaced with the station id.
    #[arg(long, env = "METAR_CLOCK_URL", default_value = DEFAULT_METAR_URL)]
    metar_url: String,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "METAR_CLOCK_LOG", default_value = "metar_clock=info")]
    log_filter: String,
}

fn main() -> ExitCode {
    if let Err(e) = run() {
        error!("{e:#}");
        eprintln!("{e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_filter)?;
    info!(version = env!("CARGO_PKG_VERSION"), "metar clock starting");

    let mut store = TomlConfigStore::new(&args.config);
    let config = store.load_or_default();

    let link = LinuxSerial::open(&args.device)
        .with_context(|| format!("failed to open display on {}", args.device))?;

    let mut scheduler = Scheduler::new(
        Panel::new(link),
        SystemClock::new(),
        HttpMetarSource::new(args.metar_url),
        NmcliNetwork::new(args.interface),
        store,
        config,
    );

    scheduler.startup();
    scheduler.run()
}
