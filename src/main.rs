//! HandBand CLI
//!
//! Runs the display harness or performs one-shot EMOTE transforms.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use crossbeam_channel::Sender;
use handband::{
    config::Config,
    core::{EmoteEngine, EngineConfig, InputPolicy},
    harness::Harness,
    sensor::{Biosensor, ManualSlider, SensorProvider, SensorType, SliderHandle},
    stats::{create_shared_stats_with_persistence, SharedSessionStats},
    VERSION,
};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "handband")]
#[command(version = VERSION)]
#[command(about = "Maps an emotional-state input onto valence and arousal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the display harness (values are read from stdin, one per line)
    Run {
        /// Arousal exponent (defaults to the configured value)
        #[arg(long)]
        exponent: Option<f64>,

        /// Polling interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Sensor driving the harness (slider or biosensor)
        #[arg(long)]
        sensor: Option<String>,

        /// Lower bound of raw biosensor samples
        #[arg(long, allow_negative_numbers = true)]
        raw_min: Option<f64>,

        /// Upper bound of raw biosensor samples
        #[arg(long, allow_negative_numbers = true)]
        raw_max: Option<f64>,

        /// Out-of-range policy (pass-through, clamp, reject)
        #[arg(long)]
        policy: Option<String>,

        /// Initial slider position
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        value: f64,

        /// Don't clear the terminal between redraws
        #[arg(long)]
        no_clear: bool,
    },

    /// Transform a single value and print valence and arousal
    Transform {
        /// Input value, nominally in [-1, 1]
        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// Arousal exponent (defaults to the configured value)
        #[arg(long)]
        exponent: Option<f64>,

        /// Out-of-range policy (pass-through, clamp, reject)
        #[arg(long)]
        policy: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Store a new arousal exponent in the configuration file
    SetExponent {
        /// Positive arousal exponent
        #[arg(allow_negative_numbers = true)]
        exponent: f64,
    },

    /// Show accumulated session statistics
    Status,

    /// Show configuration
    Config,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            exponent,
            interval_ms,
            sensor,
            raw_min,
            raw_max,
            policy,
            value,
            no_clear,
        } => cmd_run(RunArgs {
            exponent,
            interval_ms,
            sensor,
            raw_min,
            raw_max,
            policy,
            value,
            clear_screen: !no_clear,
        }),
        Commands::Transform {
            value,
            exponent,
            policy,
            json,
        } => cmd_transform(value, exponent, policy.as_deref(), json),
        Commands::SetExponent { exponent } => cmd_set_exponent(exponent),
        Commands::Status => cmd_status(),
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Log to stderr so the panels on stdout stay readable.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("handband=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the configuration, falling back to defaults if it cannot be read.
fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Could not load configuration, using defaults: {e}");
            Config::default()
        }
    }
}

fn parse_policy(policy: Option<&str>, fallback: InputPolicy) -> anyhow::Result<InputPolicy> {
    match policy {
        Some(p) => InputPolicy::parse(p).ok_or_else(|| {
            anyhow!("unknown policy '{p}' (expected pass-through, clamp or reject)")
        }),
        None => Ok(fallback),
    }
}

fn build_engine(exponent: Option<f64>, config: &Config) -> anyhow::Result<EmoteEngine> {
    let engine_config = exponent
        .map(EngineConfig::with_exponent)
        .unwrap_or(config.engine);
    EmoteEngine::new(engine_config).context("invalid engine configuration")
}

struct RunArgs {
    exponent: Option<f64>,
    interval_ms: Option<u64>,
    sensor: Option<String>,
    raw_min: Option<f64>,
    raw_max: Option<f64>,
    policy: Option<String>,
    value: f64,
    clear_screen: bool,
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config();
    if let Err(e) = config.ensure_directories() {
        tracing::warn!("Could not create data directory: {e}");
    }

    let engine = build_engine(args.exponent, &config)?;
    let policy = parse_policy(args.policy.as_deref(), config.input_policy)?;

    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or(config.poll_interval);
    if interval.is_zero() {
        bail!("polling interval must be greater than zero");
    }

    let sensor_type = match args.sensor.as_deref() {
        Some(s) => SensorType::parse(s)
            .ok_or_else(|| anyhow!("unknown sensor '{s}' (expected slider or biosensor)"))?,
        None => config.sensor,
    };

    println!("HandBand v{VERSION}");
    println!("  Sensor: {sensor_type}");
    println!("  Arousal exponent: {}", engine.arousal_exponent());
    println!("  Out-of-range policy: {policy:?}");
    println!("  Poll interval: {}ms", interval.as_millis());
    println!();
    println!("Type a value and press Enter to move the sensor. Ctrl+C to stop.");
    println!();

    let stats = create_shared_stats_with_persistence(config.stats_path());

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    match sensor_type {
        SensorType::ManualSlider => {
            let slider = ManualSlider::with_value(args.value);
            spawn_slider_feed(slider.handle());
            run_harness(
                slider,
                engine,
                policy,
                &config,
                stats.clone(),
                &running,
                interval,
                args.clear_screen,
            )?;
        }
        SensorType::Biosensor => {
            let mut bio_config = config.biosensor;
            if let Some(min) = args.raw_min {
                bio_config.range.min = min;
            }
            if let Some(max) = args.raw_max {
                bio_config.range.max = max;
            }
            let (sensor, sender) = Biosensor::new(bio_config)?;
            spawn_biosensor_feed(sender);
            run_harness(
                sensor,
                engine,
                policy,
                &config,
                stats.clone(),
                &running,
                interval,
                args.clear_screen,
            )?;
        }
    }

    if let Err(e) = stats.save() {
        tracing::warn!("Could not save session statistics: {e}");
    }

    println!();
    println!("{}", stats.summary());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_harness<S: SensorProvider>(
    sensor: S,
    engine: EmoteEngine,
    policy: InputPolicy,
    config: &Config,
    stats: SharedSessionStats,
    running: &AtomicBool,
    interval: Duration,
    clear_screen: bool,
) -> anyhow::Result<()> {
    let harness = Harness::new(sensor, engine)
        .with_policy(policy)
        .with_panels(config.panels.clone())
        .with_stats(stats)
        .with_clear_screen(clear_screen);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    harness
        .run(running, interval, &mut out)
        .context("failed to write to terminal")?;
    Ok(())
}

/// Move the slider to each value typed on stdin.
fn spawn_slider_feed(handle: SliderHandle) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match trimmed.parse::<f64>() {
                Ok(v) => {
                    if let Err(e) = handle.set_value(v) {
                        tracing::warn!("Ignoring slider value: {e}");
                    }
                }
                Err(_) => tracing::warn!("Ignoring non-numeric input '{trimmed}'"),
            }
        }
    });
}

/// Forward raw samples typed on stdin to the biosensor. End of input
/// disconnects the sensor.
fn spawn_biosensor_feed(sender: Sender<f64>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match trimmed.parse::<f64>() {
                Ok(sample) => {
                    if sender.send(sample).is_err() {
                        break;
                    }
                }
                Err(_) => tracing::warn!("Ignoring non-numeric sample '{trimmed}'"),
            }
        }
    });
}

fn cmd_transform(
    value: f64,
    exponent: Option<f64>,
    policy: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config();
    let engine = build_engine(exponent, &config)?;
    let policy = parse_policy(policy, config.input_policy)?;

    let dims = engine.transform_with_policy(value, policy)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dims)?);
    } else {
        println!("{}", dims.display_text());
    }
    Ok(())
}

fn cmd_set_exponent(exponent: f64) -> anyhow::Result<()> {
    let path = Config::config_path();
    Config::set_arousal_exponent(exponent)
        .with_context(|| format!("could not update {}", path.display()))?;

    println!("Arousal exponent set to {exponent}. It applies to the next run.");
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    let config = load_config();

    println!("HandBand Status");
    println!("===============");
    println!();
    println!("Configuration:");
    println!("  Sensor: {}", config.sensor);
    println!("  Arousal exponent: {}", config.engine.arousal_exponent);
    println!("  Poll interval: {}ms", config.poll_interval.as_millis());
    println!();

    let stats_path = config.stats_path();
    if stats_path.exists() {
        let content = std::fs::read_to_string(&stats_path)
            .with_context(|| format!("reading {}", stats_path.display()))?;
        let stats: serde_json::Value = serde_json::from_str(&content)?;

        println!("Cumulative Statistics:");
        for key in [
            "sessions",
            "polls",
            "transforms",
            "sensor_failures",
            "out_of_range_inputs",
        ] {
            if let Some(value) = stats.get(key) {
                println!("  {}: {value}", key.replace('_', " "));
            }
        }
        if let Some(updated) = stats.get("last_updated").and_then(|v| v.as_str()) {
            println!("  last updated: {updated}");
        }
    } else {
        println!("No previous session data found.");
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = load_config();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")
}
