use std::path::{Path, PathBuf};
use std::time::Instant;
use std::fs;
use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use rayon::prelude::*;

use curve_detector_lib::config::{Config, DetectionMode};
use curve_detector_lib::errors::{CurveDetectorError, Result};
use curve_detector_lib::image_io::{get_image_files_in_dir, load_image};
use curve_detector_lib::pipeline::process_image;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "Curve Detector - circular arc and line segment extraction from shape contours")]
struct Args {
    /// Path to input file or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Primitives to detect (overwrites config)
    #[clap(short, long)]
    mode: Option<ModeArg>,

    /// Random seed for reproducible runs (overwrites config)
    #[clap(short, long)]
    seed: Option<u64>,

    /// Enable debug mode (save overlay images and log more info)
    #[clap(short, long)]
    debug: bool,

    /// Log level filter, e.g. info or debug (RUST_LOG is used when absent)
    #[clap(short, long)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Curves,
    Lines,
    Both,
}

fn init_logging(level: Option<&str>, debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.init();
}

/// Load and process one file, logging instead of aborting on failure
fn process_file(path: &Path, config: &Config, debug: bool) -> bool {
    info!("Processing: {}", path.display());
    match load_image(path).and_then(|input| process_image(input, config, debug)) {
        Ok(_) => true,
        Err(e) => {
            warn!("Failed to process {}: {}", path.display(), e);
            false
        }
    }
}

fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = Config::from_file_or_default(&args.config)?;

    // Override config with command-line arguments
    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }

    if let Some(mode) = args.mode {
        config.mode = match mode {
            ModeArg::Curves => DetectionMode::Curves,
            ModeArg::Lines => DetectionMode::Lines,
            ModeArg::Both => DetectionMode::Both,
        };
    }

    if args.seed.is_some() {
        config.seed = args.seed;
    }

    // Validate configuration
    config.validate()?;
    config.validate_input()?;

    // Start timing
    let start_time = Instant::now();

    let output_base = PathBuf::from(&config.output_base_dir);
    fs::create_dir_all(&output_base)?;

    // Process input
    let input_path = PathBuf::from(&config.input_path);

    if input_path.is_file() {
        info!("Processing single file: {}", input_path.display());
        let input_image = load_image(&input_path)?;
        process_image(input_image, &config, args.debug)?;
    } else if input_path.is_dir() {
        info!("Processing directory: {}", input_path.display());
        let image_files = get_image_files_in_dir(&input_path)?;

        info!("Found {} image files", image_files.len());

        let succeeded = if config.use_parallel {
            image_files
                .par_iter()
                .filter(|path| process_file(path, &config, args.debug))
                .count()
        } else {
            image_files
                .iter()
                .filter(|path| process_file(path, &config, args.debug))
                .count()
        };

        if succeeded < image_files.len() {
            warn!("{} of {} files failed", image_files.len() - succeeded, image_files.len());
        }
    } else {
        return Err(CurveDetectorError::InvalidPath(input_path));
    }

    // Report elapsed time
    let elapsed = start_time.elapsed();
    info!("Processing completed in {:.2} seconds", elapsed.as_secs_f64());

    Ok(())
}

/// Main function
fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_logging(args.log_level.as_deref(), args.debug);

    run(args).map_err(|e| {
        error!("{}", e);
        e
    })
}
