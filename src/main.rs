use clap::{Args, Parser, Subcommand};
use dpiresize::batch::{BatchHandler, BatchRequest, BatchSummary, validate_output_directory};
use dpiresize::config::{self, ResizerConfig};
use dpiresize::error::ValidationError;
use dpiresize::imaging::{
    Background, ImageProcessor, ProcessorSettings, ResampleFilter, ResizeMode,
};
use dpiresize::units::Unit;
use dpiresize::{output, presets, scan};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dpiresize")]
#[command(about = "Batch image resizer for print and screen sizes")]
#[command(long_about = "\
Batch image resizer for print and screen sizes

Sizes can be given in pixels, inches, centimetres or millimetres; physical
units are converted to pixels at the chosen DPI, and that DPI is written into
JPEG and PNG output.

Modes:
  stretch  exact size, aspect ratio ignored
  fit      largest size inside the box, aspect ratio kept (default)
  fill     exact size, image centred on a background colour
  crop     exact size, image covers the box and the overflow is trimmed

Settings are read from ./dpiresize.toml when present (see 'dpiresize gen-config');
command-line flags override it.")]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of ./dpiresize.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize images or directories of images into an output directory
    Resize(ResizeArgs),
    /// List supported images in a directory with their size and resolution
    Scan {
        dir: PathBuf,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
        /// Unit for the physical size column
        #[arg(long, default_value = "cm")]
        unit: Unit,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List or search the built-in size presets
    Presets {
        /// Case-insensitive search over names and keywords
        query: Option<String>,
        /// Only show one category
        #[arg(long)]
        category: Option<String>,
    },
    /// Print a stock dpiresize.toml with all options documented
    GenConfig,
}

#[derive(Args)]
struct ResizeArgs {
    /// Image files and/or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (created if missing)
    #[arg(short, long)]
    output: PathBuf,

    /// Target width
    #[arg(short = 'W', long)]
    width: Option<String>,

    /// Target height
    #[arg(short = 'H', long)]
    height: Option<String>,

    /// Unit for both width and height
    #[arg(short, long)]
    unit: Option<Unit>,

    /// Unit for width only (overrides --unit)
    #[arg(long)]
    width_unit: Option<Unit>,

    /// Unit for height only (overrides --unit)
    #[arg(long)]
    height_unit: Option<Unit>,

    /// Named size from 'dpiresize presets'; explicit width/height win
    #[arg(short, long)]
    preset: Option<String>,

    /// stretch | fit | fill | crop
    #[arg(short, long)]
    mode: Option<ResizeMode>,

    /// Resolution for unit conversion and output metadata
    #[arg(long)]
    dpi: Option<u32>,

    /// JPEG quality (1-100)
    #[arg(short, long)]
    quality: Option<u32>,

    /// Appended to each output file stem
    #[arg(long)]
    suffix: Option<String>,

    /// Parallel workers (0 = auto)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// nearest | bilinear | bicubic | lanczos
    #[arg(long)]
    filter: Option<ResampleFilter>,

    /// Fill mode canvas colour, #RRGGBB or #RRGGBBAA
    #[arg(long)]
    background: Option<Background>,

    /// Descend into input directories
    #[arg(short, long)]
    recursive: bool,

    /// Print results as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Resize(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_resize(args, config)?;
        }
        Command::Scan {
            dir,
            recursive,
            unit,
            json,
        } => {
            let files = scan::scan_directory(&dir, recursive)?;
            let processor = ImageProcessor::new(ProcessorSettings::default());
            let images = scan::inspect_images(&processor, &files);
            if json {
                println!("{}", serde_json::to_string_pretty(&images)?);
            } else {
                output::print_scan_output(&images, unit);
            }
        }
        Command::Presets { query, category } => {
            let mut found = presets::search_presets(query.as_deref().unwrap_or(""));
            if let Some(category) = category {
                found.retain(|p| p.category.eq_ignore_ascii_case(&category));
            }
            output::print_presets(&found);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `--config PATH` must exist; the implicit ./dpiresize.toml is optional.
fn load_config(path: Option<&Path>) -> Result<ResizerConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

fn run_resize(args: ResizeArgs, config: ResizerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let config = ResizerConfig {
        dpi: args.dpi.unwrap_or(config.dpi),
        quality: args.quality.unwrap_or(config.quality),
        suffix: args.suffix.clone().unwrap_or(config.suffix),
        mode: args.mode.unwrap_or(config.mode),
        filter: args.filter.unwrap_or(config.filter),
        background: args.background.unwrap_or(config.background),
        processing: config.processing,
    };
    config.validate()?;

    let request = build_request(&args, &config)?;

    let files = collect_inputs(&args.inputs, args.recursive)?;
    if files.is_empty() {
        return Err("no supported images found in the given inputs".into());
    }

    if !validate_output_directory(&args.output) {
        let dir = args.output.display();
        return Err(format!("output directory is not writable: {dir}").into());
    }

    let workers = args.workers.or(config.processing.max_workers).unwrap_or(0);
    let handler = BatchHandler::new(ImageProcessor::new(config.processor_settings()), workers)
        .with_progress(|done, total, name| {
            eprintln!("{}", output::format_progress(done, total, name));
        });

    let results = handler.process_batch(&files, &args.output, &request);

    if args.json {
        println!("{}", output::format_batch_json(&results)?);
    } else {
        output::print_batch_results(&results);
    }

    let summary = BatchSummary::from_results(&results);
    if summary.all_succeeded() {
        Ok(())
    } else {
        let missed = summary.total - summary.succeeded;
        Err(format!("{missed} of {} files were not resized", summary.total).into())
    }
}

/// Size, units and naming for the batch; a preset supplies defaults that
/// explicit flags override.
fn build_request(
    args: &ResizeArgs,
    config: &ResizerConfig,
) -> Result<BatchRequest, Box<dyn std::error::Error>> {
    let preset = match &args.preset {
        Some(name) => Some(
            presets::find_preset(name)
                .ok_or_else(|| format!("unknown preset '{name}' (see 'dpiresize presets')"))?,
        ),
        None => None,
    };

    let width = match &args.width {
        Some(text) => dpiresize::units::parse_optional_dimension(text)?,
        None => preset.map(|p| p.width),
    };
    let height = match &args.height {
        Some(text) => dpiresize::units::parse_optional_dimension(text)?,
        None => preset.map(|p| p.height),
    };
    if width.is_none() && height.is_none() {
        return Err(ValidationError::MissingDimensions.into());
    }

    let base_unit = args.unit.or(preset.map(|p| p.unit)).unwrap_or(Unit::Px);

    Ok(BatchRequest {
        width,
        height,
        width_unit: args.width_unit.unwrap_or(base_unit),
        height_unit: args.height_unit.unwrap_or(base_unit),
        mode: config.mode,
        suffix: config.suffix.clone(),
    })
}

/// Expand directories through the scanner; files are passed through as given
/// so a missing or unsupported file is reported per file by the batch.
fn collect_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, scan::ScanError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(scan::scan_directory(input, recursive)?);
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}
