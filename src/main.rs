//! Nightwatch CLI
//!
//! Command-line entry point for the single-camera presence monitor.

use clap::Parser;
use nightwatch::capture::{ConfigError, FileConfig};
use nightwatch::detect::ScriptedDetector;
use nightwatch::monitor::Monitor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "nightwatch", version, about = "Single-camera presence monitor")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Capture device index.
    #[arg(long)]
    device: Option<u32>,

    /// Canonical frame width.
    #[arg(long)]
    width: Option<u32>,

    /// Canonical frame height.
    #[arg(long)]
    height: Option<u32>,

    /// Target frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Minimum changed-region area (pixels) to count as motion.
    #[arg(long)]
    min_area: Option<u32>,

    /// Detector confidence threshold.
    #[arg(long)]
    confidence: Option<f32>,

    /// Seconds between persisted snapshots.
    #[arg(long)]
    cooldown: Option<u64>,

    /// Snapshot output directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<FileConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    if let Some(device) = args.device {
        config.capture.device_id = device;
    }
    if let Some(width) = args.width {
        config.capture.width = width;
    }
    if let Some(height) = args.height {
        config.capture.height = height;
    }
    if let Some(fps) = args.fps {
        config.capture.fps = fps;
    }
    if let Some(min_area) = args.min_area {
        config.motion.min_area = min_area;
    }
    if let Some(confidence) = args.confidence {
        config.detection.confidence = confidence;
    }
    if let Some(cooldown) = args.cooldown {
        config.snapshot.cooldown_secs = cooldown;
    }
    if let Some(output_dir) = &args.output_dir {
        config.snapshot.output_dir = output_dir.clone();
    }

    config.capture.validate()?;
    Ok(config)
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Nightwatch v{}", nightwatch::VERSION);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let quit = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&quit);
    if let Err(e) = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    }) {
        eprintln!("Failed to install signal handler: {}", e);
        std::process::exit(1);
    }
    info!("Press Ctrl-C to stop");

    // Inference runs behind the capability seam; wire a real engine
    // here. The scripted stub keeps the binary runnable end to end.
    let detector = ScriptedDetector::new();
    info!("Using scripted demonstration detector");

    let result = {
        #[cfg(feature = "camera")]
        {
            let camera = nightwatch::capture::NokhwaCamera::new();
            Monitor::from_config(camera, detector, &config, quit).run()
        }
        #[cfg(not(feature = "camera"))]
        {
            info!("Built without the `camera` feature; using mock frames");
            let camera = nightwatch::capture::MockCamera::new();
            Monitor::from_config(camera, detector, &config, quit).run()
        }
    };

    if let Err(e) = result {
        eprintln!("Fatal: {}", e);
        std::process::exit(1);
    }
    info!("Shutdown complete");
}
