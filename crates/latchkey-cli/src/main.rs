//! Latchkey - keypad door lock controller
//!
//! Runs the full controller against simulated devices: key presses are read
//! from stdin (each character `1`-`8` presses that key, `7` submits, `8`
//! clears) and every LED, motor and buzzer write is logged.
//!
//! ```text
//! $ latchkey --skip-self-test
//! 12347        # secret code, door opens for 5 s
//! 15157        # admin session
//! 43217 43217  # new secret, confirmed
//! ```
//!
//! # Configuration
//!
//! 1. CLI arguments (highest priority)
//! 2. Config file given with `--config` (TOML)
//! 3. Default values
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default `info`; `--debug` overrides it)

use anyhow::{Context, Result};
use clap::Parser;
use latchkey_controller::{BuzzerArbiter, Doorlock, ModeController};
use latchkey_core::{Code, KeyId, LockConfig, ScanPolicy};
use latchkey_hardware::mock::{MockSensor, MockSensorHandle};
use latchkey_hardware::sim::{TracingActuator, TracingTone};
use latchkey_hardware::LockActuator;
use latchkey_keypad::KeypadReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Teardown waits at most this long for the buzzer to be released.
const TEARDOWN_TIMEOUT: Duration = Duration::from_millis(500);

/// Latchkey - keypad door lock controller
#[derive(Parser, Debug)]
#[command(name = "latchkey")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the secret code
    #[arg(long, value_name = "CODE")]
    secret: Option<Code>,

    /// Key reported when several keys rise in one poll (first, last)
    #[arg(long, value_name = "POLICY")]
    scan_policy: Option<ScanPolicy>,

    /// Disable the click on every key press
    #[arg(long)]
    no_key_feedback: bool,

    /// Skip the startup buzzer test
    #[arg(long)]
    skip_self_test: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(filter))
        .init();
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    info!(version = env!("CARGO_PKG_VERSION"), "latchkey starting");

    let actuator = Arc::new(TracingActuator::new());
    let buzzer = BuzzerArbiter::new(TracingTone::new());
    let (sensor, keys) = MockSensor::with_name("stdin keypad".to_string());

    // Keep one handle here so the sensor stays connected after stdin closes
    let feeder = tokio::spawn(feed_keypad(keys.clone()));

    let outcome = drive(
        &config,
        !args.skip_self_test,
        sensor,
        Arc::clone(&actuator) as Arc<dyn LockActuator>,
        buzzer.clone(),
    )
    .await;

    feeder.abort();
    drop(keys);
    teardown(&*actuator, &buzzer).await;
    outcome
}

async fn drive(
    config: &LockConfig,
    self_test: bool,
    sensor: MockSensor,
    actuator: Arc<dyn LockActuator>,
    buzzer: BuzzerArbiter,
) -> Result<()> {
    if self_test {
        buzzer.self_test().await.context("buzzer self-test failed")?;
        info!("buzzer self-test passed");
    }

    let controller = ModeController::new(config, actuator, buzzer);
    let reader = KeypadReader::new(sensor, config.keypad.scan_policy)
        .context("keypad unavailable")?;

    let mut doorlock = Doorlock::new(reader, controller, config);
    doorlock
        .run(shutdown_signal())
        .await
        .context("controller stopped")?;

    info!(
        transitions = doorlock.controller().history().len(),
        "doorlock shut down"
    );
    Ok(())
}

fn load_config(args: &Args) -> Result<LockConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => LockConfig::default(),
    };

    if let Some(secret) = &args.secret {
        config.codes.secret = secret.clone();
    }
    if let Some(policy) = args.scan_policy {
        config.keypad.scan_policy = policy;
    }
    if args.no_key_feedback {
        config.keypad.key_feedback = false;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<LockConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "config file not found, using defaults");
        return Ok(LockConfig::default());
    }
    let config = LockConfig::from_file(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Turn stdin characters into key presses.
async fn feed_keypad(keys: MockSensorHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                for c in line.chars().filter(|c| !c.is_whitespace()) {
                    match c.to_string().parse::<KeyId>() {
                        Ok(key) => {
                            if keys.press(key).is_err() {
                                return;
                            }
                        }
                        Err(_) => warn!(input = %c, "not a key, use 1-8"),
                    }
                }
            }
            Ok(None) => {
                info!("keypad input closed, press Ctrl-C to exit");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read keypad input");
                return;
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Switch every output off. Errors are logged, not returned, so the first
/// failure (if any) is what the process reports.
async fn teardown(actuator: &dyn LockActuator, buzzer: &BuzzerArbiter) {
    if let Err(e) = actuator.all_off() {
        warn!(error = %e, "failed to switch actuators off");
    }
    match tokio::time::timeout(TEARDOWN_TIMEOUT, buzzer.silence()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "failed to silence buzzer"),
        Err(_) => warn!("buzzer still busy, not silenced"),
    }
    info!("outputs off");
}
