//! PedalGlow daemon: renders live cycling power as LED zone colors
//! with a cadence-paced chase animation.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use clap::Parser;
use log::{info, LevelFilter};
use rgb::RGB8;

mod config;
mod meter;
mod render;
mod sensor;
mod strip;

use config::{Config, DaemonError, LogLevel};
use meter::{start_ingest_task, PowerMeter};
use pedalglow_zones_lib::PowerSmoother;
use render::{render_loop, RenderSettings};
use sensor::{start_simulated_sensor, SimulatorOptions};
use strip::{color_wipe, BufferedStrip, ConsoleDriver};

/// Per-pixel delay of the boot wipe animations.
const WIPE_STEP: Duration = Duration::from_millis(5);

#[derive(Debug, Parser)]
#[command(name = "pedalglow", about = "Cycling power zone display on an LED strip")]
struct Args {
    /// Path to a JSON config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many seconds (runs until killed when omitted)
    #[arg(long)]
    duration: Option<u64>,

    /// Override the configured LED count
    #[arg(long)]
    leds: Option<usize>,

    /// Override the configured FTP (watts)
    #[arg(long)]
    ftp: Option<f64>,
}

fn main() -> Result<(), DaemonError> {
    let args = Args::parse();

    // The logger has to exist before config loading emits anything.
    // env_logger's own filter stays permissive; the effective level is
    // the default until the configured one is known.
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .init();
    log::set_max_level(LogLevel::default().as_level_filter());

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(leds) = args.leds {
        config.led_count = leds;
    }
    if let Some(ftp) = args.ftp {
        config.ftp = ftp;
    }
    log::set_max_level(config.log_level.as_level_filter());

    // Reject malformed configuration before anything starts moving.
    config.validate()?;
    info!(
        "Starting pedalglow: {} LEDs, FTP {}W",
        config.led_count, config.ftp
    );

    let zones = config.zone_map()?;
    let mut smoother = PowerSmoother::new(config.smoothing_weight)?;
    let mut strip = BufferedStrip::new(ConsoleDriver, config.led_count, config.brightness);
    let mut sleep = |d: Duration| std::thread::sleep(d);

    // Red wipe: powered up.
    color_wipe(&mut strip, RGB8::new(127, 0, 0), WIPE_STEP, &mut sleep)?;

    let meter = Arc::new(PowerMeter::new());
    let shutdown = Arc::new(AtomicBool::new(false));
    let (payload_tx, payload_rx) = mpsc::channel();

    let sensor = start_simulated_sensor(
        payload_tx,
        SimulatorOptions {
            duration: args.duration.map(Duration::from_secs),
            ..SimulatorOptions::default()
        },
    );
    // Yellow wipe: sensor attached.
    color_wipe(&mut strip, RGB8::new(127, 127, 0), WIPE_STEP, &mut sleep)?;

    let ingest = start_ingest_task(meter.clone(), payload_rx, shutdown.clone());
    // Blue wipe: pipeline running.
    color_wipe(&mut strip, RGB8::new(0, 0, 127), WIPE_STEP, &mut sleep)?;

    let settings = RenderSettings {
        no_data_poll: Duration::from_millis(config.no_data_poll_ms),
        tuning: config.chase,
    };
    render_loop(
        &meter,
        &mut strip,
        &zones,
        &mut smoother,
        &settings,
        &shutdown,
        &mut sleep,
    )?;

    // The strip is already blanked; unwind the sensor side.
    let _ = ingest.join();
    let _ = sensor.join();
    println!();
    info!("Shutdown complete");
    Ok(())
}
