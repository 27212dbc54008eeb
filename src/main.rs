//! kscroll - Entry Point

use clap::Parser;
use kinetic_scroll::config::ConfigError;
use kinetic_scroll::model::AppError;
use kinetic_scroll::script::{Script, ScriptEvent};
use kinetic_scroll::simulation::{Simulation, Trace};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

/// kscroll - replay flicks and drags through the kinetic scrolling engine
#[derive(Parser, Debug)]
#[command(name = "kscroll")]
#[command(version)]
#[command(about = "Simulate kinetic scrolling and print the offset trace")]
pub struct Args {
    /// Initial content offset
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub start: f64,

    /// Lower scroll bound (overrides config)
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<f64>,

    /// Upper scroll bound (overrides config)
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,

    /// Single flick with this raw velocity (positive scrolls toward lower offsets)
    #[arg(long, allow_negative_numbers = true, conflicts_with = "script")]
    pub velocity: Option<f64>,

    /// Gesture script (JSON lines) to replay
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Give up waiting for motion to settle after this many simulated milliseconds
    #[arg(long, default_value_t = 10_000.0)]
    pub limit_ms: f64,

    /// Emit the trace as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override max overscroll distance
    #[arg(long)]
    pub max_overscroll: Option<f64>,

    /// Override base friction (units/ms²)
    #[arg(long)]
    pub friction: Option<f64>,

    /// Override tick interval in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub tick_ms: Option<u32>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    run(&args)?;
    Ok(())
}

fn run(args: &Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = kinetic_scroll::config::load_config_with_precedence(args.config.clone())?;
        let merged = kinetic_scroll::config::merge_config(config_file);
        let with_env = kinetic_scroll::config::apply_env_overrides(merged);
        let mut resolved = kinetic_scroll::config::apply_cli_overrides(
            with_env,
            args.max_overscroll,
            args.friction,
            args.tick_ms,
        );
        if let Some(min) = args.min {
            resolved.scroller.min_bound = min;
        }
        if let Some(max) = args.max {
            resolved.scroller.max_bound = max;
        }
        resolved
    };

    kinetic_scroll::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let script = match (&args.script, args.velocity) {
        (Some(path), _) => Script::load(path)?,
        (None, Some(velocity)) => Script::new(vec![ScriptEvent::Flick { velocity }]),
        (None, None) => Script::default(),
    };

    let mut simulation =
        Simulation::new(config.scroller, args.start).map_err(ConfigError::from)?;
    if simulation.scroller().bounds().is_disabled() {
        warn!("No scroll bounds configured; scrolling is disabled");
    }

    let settled = simulation.run_script(&script, args.limit_ms);
    let offset = simulation.scroller().current_offset();
    let phase = simulation.scroller().phase();
    let now_ms = simulation.now_ms();
    let trace = simulation.into_trace();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &trace).map_err(std::io::Error::from)?;
        writeln!(out)?;
    } else {
        write_text_trace(&mut out, &trace)?;
        writeln!(
            out,
            "final offset={offset:.3} phase={phase:?} t={now_ms:.0}ms samples={} settled={settled}",
            trace.len()
        )?;
    }
    Ok(())
}

fn write_text_trace(out: &mut impl Write, trace: &Trace) -> std::io::Result<()> {
    for sample in trace.samples() {
        writeln!(
            out,
            "t={:>8.1}ms offset={:>11.3} velocity={:>9.4} phase={:?}",
            sample.t_ms, sample.offset, sample.velocity, sample.phase
        )?;
    }
    Ok(())
}
