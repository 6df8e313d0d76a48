//! CAN Overlay CLI Application
//!
//! Command-line front end for the can-overlay library. It loads a scenario
//! (vehicle generation, DBC files, stock snapshots, command) and prints the
//! frames the synthesizer would emit over a run of ticks.

use anyhow::{bail, Context, Result};
use can_overlay::{DbcPacker, FrameSynthesizer};
use chrono::Utc;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

mod config;
mod report;

use config::OutputFormat;
use report::{TraceRecord, TraceSummary};

/// CAN Overlay - synthesize driver-assistance frames from a scenario
#[derive(Parser, Debug)]
#[command(name = "can-overlay-cli")]
#[command(about = "Synthesize outgoing CAN frames from stock snapshots and a command", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the scenario file (scenario.toml)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Path to DBC file(s), replacing those in the scenario (can be repeated)
    #[arg(long, value_name = "FILE")]
    dbc: Vec<PathBuf>,

    /// Number of ticks to run, overriding the scenario
    #[arg(long, value_name = "COUNT")]
    ticks: Option<u64>,

    /// Output format, overriding the scenario
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for the frame trace (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("CAN Overlay CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using overlay library v{}", can_overlay::VERSION);

    let mut app_config = config::load_config(&args.config)?;
    log::debug!("Configuration loaded from {:?}", args.config);

    if !args.dbc.is_empty() {
        app_config.vehicle.dbc_files = args.dbc.clone();
    }
    if let Some(ticks) = args.ticks {
        app_config.run.ticks = ticks;
    }
    if let Some(format) = args.format {
        app_config.output.format = format;
    }
    if args.output.is_some() {
        app_config.output.output_file = args.output.clone();
    }

    run(&app_config)
}

/// Load the DBCs, then synthesize every selected frame for every tick
fn run(app_config: &config::AppConfig) -> Result<()> {
    if app_config.vehicle.dbc_files.is_empty() {
        bail!("No DBC files given (set vehicle.dbc_files or pass --dbc)");
    }

    let mut packer = DbcPacker::new().with_missing_as_zero(app_config.vehicle.missing_as_zero);
    for dbc_path in &app_config.vehicle.dbc_files {
        packer
            .add_dbc(dbc_path)
            .with_context(|| format!("Failed to load DBC {:?}", dbc_path))?;
    }

    let stats = packer.database_stats();
    log::info!(
        "Signal database: {} messages, {} signals",
        stats.num_messages,
        stats.num_signals
    );

    let stock = app_config.stock_snapshots(&packer)?;
    let synth_config = app_config.synthesizer_config();
    let generation = synth_config.generation;
    let frames = app_config.frames();
    let synthesizer = FrameSynthesizer::new(synth_config, packer);

    let format = app_config.output.format;
    let mut out: Box<dyn Write> = match &app_config.output.output_file {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file {:?}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    log::info!(
        "Running {} ticks of {} frame(s) for the {} generation",
        app_config.run.ticks,
        frames.len(),
        generation
    );

    let started = Utc::now();
    let empty = can_overlay::FieldSnapshot::new();
    let mut summary = TraceSummary::default();
    let run = &app_config.run;

    for offset in 0..run.ticks {
        let tick = run.start_tick + offset;
        let timestamp = started + chrono::Duration::milliseconds((offset * run.period_ms) as i64);
        let sequence = synthesizer.config().sequence(tick);

        for &frame in &frames {
            let snapshot = stock.get(&frame).unwrap_or(&empty);
            match synthesizer.synthesize(frame, snapshot, &app_config.command, sequence) {
                Ok(can_frame) => {
                    let message = generation.layout(frame).map(|l| l.message).unwrap_or("?");
                    let record = TraceRecord::new(tick, timestamp, frame, message, &can_frame);
                    report::write_record(out.as_mut(), format, &record)?;
                    summary.frames += 1;
                }
                Err(e) => {
                    log::error!("tick {} {}: {}", tick, frame, e);
                    summary.failures += 1;
                }
            }
        }
    }

    report::write_summary(out.as_mut(), format, &summary)?;
    out.flush()?;

    if summary.failures > 0 {
        bail!("{} frame(s) failed to synthesize", summary.failures);
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
