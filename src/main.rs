//! Hand interaction application: replays hand-pose frames and emits click events.

use anyhow::{bail, Context, Result};
use clap::Parser;
use hand_interaction::{
    config::{Config, EXAMPLE_CONFIG},
    emitter::{EventSink, JsonLinesSink},
    landmarks::InvertMode,
    locator::TargetLocator,
    mapper::PixelPoint,
    pipeline::{ControlCommand, InteractionPipeline},
    source::{HandPoseSource, ReplaySource},
};
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Hand-pose replay file (JSON lines), `-` for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Event output file (JSON lines), stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Trigger strategy (dwell, proximity, double_tap, pinch)
    #[arg(short, long)]
    strategy: Option<String>,

    /// Gesture that arms dwell and proximity (open_hand, present, thumbs_up, pinch)
    #[arg(short, long)]
    gesture: Option<String>,

    /// Smoothing filter (none, exponential[:alpha])
    #[arg(short, long)]
    filter: Option<String>,

    /// Invert landmarks (none, x, y, xy)
    #[arg(long)]
    inv: Option<String>,

    /// Calibration artifact path
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Start a calibration cycle on the first frame
    #[arg(long)]
    calibrate: bool,

    /// Discard any persisted calibration before starting
    #[arg(long)]
    reset_calibration: bool,

    /// Lock the target zone at a camera pixel, as `x,y`
    #[arg(long, value_parser = parse_point)]
    lock: Option<PixelPoint>,

    /// Run the target locator on a PNG frame, print the zone and exit
    #[arg(long)]
    locate: Option<PathBuf>,

    /// Emit continuous touch events
    #[arg(long)]
    touch: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,
}

fn parse_point(s: &str) -> std::result::Result<PixelPoint, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected x,y, got {s}"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y: {e}"))?;
    Ok(PixelPoint::new(x, y))
}

fn apply_overrides(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(strategy) = &args.strategy {
        config.interaction.strategy = strategy.parse()?;
    }
    if let Some(gesture) = &args.gesture {
        config.interaction.qualifying_gesture = gesture.parse()?;
    }
    if let Some(filter) = &args.filter {
        config.mapping.filter.clone_from(filter);
    }
    if let Some(inv) = &args.inv {
        config.hands.invert = inv.parse::<InvertMode>()?;
    }
    if let Some(path) = &args.calibration {
        config.calibration.artifact_path = Some(path.clone());
    }
    if args.touch {
        config.interaction.emit_touch = true;
    }
    Ok(())
}

fn locate_once(config: &Config, path: &PathBuf) -> Result<()> {
    let frame = image::open(path)
        .with_context(|| format!("Failed to read {}", path.display()))?
        .to_rgb8();
    let locator = TargetLocator::new(config.locator.clone());
    match locator.locate(&frame) {
        Some(zone) => println!("{}", serde_json::to_string(&zone)?),
        None => bail!("No target found in {}", path.display()),
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Hand Interaction");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    apply_overrides(&mut config, &args)?;

    if let Some(path) = &args.locate {
        return locate_once(&config, path);
    }

    let mut pipeline = InteractionPipeline::new(config)?;
    if args.reset_calibration {
        pipeline.submit(ControlCommand::ResetCalibration);
    }
    if args.calibrate {
        pipeline.submit(ControlCommand::StartCalibration);
    }
    if let Some(point) = args.lock {
        pipeline.submit(ControlCommand::LockTarget(point));
    }

    let mut source: Box<dyn HandPoseSource> = if args.input == "-" {
        Box::new(ReplaySource::new(BufReader::new(io::stdin())))
    } else {
        Box::new(ReplaySource::open(&args.input)?)
    };

    let mut sink: Box<dyn EventSink> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(JsonLinesSink::new(BufWriter::new(file)))
        }
        None => Box::new(JsonLinesSink::new(io::stdout())),
    };

    let summary = pipeline.run(source.as_mut(), sink.as_mut())?;
    info!("Done: {} frames, {} clicks", summary.frames, summary.clicks);

    Ok(())
}
