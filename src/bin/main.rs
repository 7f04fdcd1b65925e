//! rperceptron Command Line Interface
//!
//! A command-line interface for generating margin-separated datasets and
//! running the perceptron on them.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rperceptron::core::{PerceptronError, Result};
use rperceptron::{
    BiasPolicy, Dataset, Granularity, Hyperplane, LoggingObserver, Perceptron, Preset, RunReport,
    TrainingObserver, UpdateRule,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rperceptron")]
#[command(about = "A Rust implementation of the linear perceptron")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "rperceptron Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a labeled dataset and print it as CSV
    Generate(GenerateArgs),
    /// Generate a dataset and train a perceptron on it
    Train(TrainArgs),
    /// Run one of the preset demonstrations
    Demo(DemoArgs),
}

#[derive(Args, Clone)]
struct DataArgs {
    /// Number of points to generate
    #[arg(short = 'n', long = "points", default_value = "30")]
    n: usize,

    /// Minimum margin between the points and the ground-truth boundary
    #[arg(short, long, default_value = "0.01", allow_negative_numbers = true)]
    gamma: f64,

    /// Dimensionality of the points
    #[arg(short = 'i', long, default_value = "2")]
    dimensionality: usize,

    /// Coordinates and ground-truth weights are drawn from [-scale, scale]
    #[arg(short, long, default_value = "1.0")]
    scale: f64,

    /// How the ground-truth bias is chosen
    #[arg(long, default_value = "random")]
    bias: CliBiasPolicy,

    /// Seed for the random source (generation uses seed, training seed + 1)
    #[arg(long)]
    seed: Option<u64>,

    /// Give up generation after this many candidate points
    #[arg(long)]
    max_attempts: Option<usize>,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Output CSV file (prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct TrainingArgs {
    /// Training rate (step size of each correction)
    #[arg(short = 'c', long, default_value = "0.001")]
    rate: f64,

    /// Weight correction formula
    #[arg(long, default_value = "observed")]
    rule: CliUpdateRule,

    /// Observe after every epoch or after every point
    #[arg(long, default_value = "epoch")]
    granularity: CliGranularity,

    /// Stop after this many epochs even without convergence
    #[arg(short = 'e', long)]
    max_epochs: Option<usize>,

    /// Seconds to pause between observed frames (a non-zero pause implies --trace)
    #[arg(long, default_value = "0")]
    pause: f64,

    /// Log every frame of the training run
    #[arg(long)]
    trace: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Also write the JSON run report to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args)]
struct TrainArgs {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    training: TrainingArgs,
}

#[derive(Args)]
struct DemoArgs {
    /// Which preset to run
    preset: CliPreset,

    /// Stop after this many epochs even without convergence
    #[arg(short = 'e', long)]
    max_epochs: Option<usize>,

    /// Weight correction formula
    #[arg(long, default_value = "observed")]
    rule: CliUpdateRule,

    /// Seed for the random source
    #[arg(long)]
    seed: Option<u64>,

    /// Log every epoch of the training run
    #[arg(long)]
    trace: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliBiasPolicy {
    /// Draw the bias like every other coefficient
    #[value(name = "random")]
    Random,
    /// Fix the bias at zero
    #[value(name = "origin")]
    Origin,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliUpdateRule {
    /// w -= c * (label + y) * x
    #[value(name = "observed")]
    Observed,
    /// w += c * (label - y) * x
    #[value(name = "textbook")]
    Textbook,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliGranularity {
    #[value(name = "epoch")]
    Epoch,
    #[value(name = "point")]
    Point,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliPreset {
    /// 30 points in 2D, gamma 0.01, c = 0.001
    #[value(name = "planar")]
    Planar,
    /// 1000 points in 10D, gamma 0.001, c = 0.001
    #[value(name = "parallel")]
    Parallel,
    /// 30 points in 3D, gamma 0.01, c = 0.01
    #[value(name = "spatial")]
    Spatial,
}

impl From<CliBiasPolicy> for BiasPolicy {
    fn from(cli_policy: CliBiasPolicy) -> Self {
        match cli_policy {
            CliBiasPolicy::Random => BiasPolicy::Random,
            CliBiasPolicy::Origin => BiasPolicy::ThroughOrigin,
        }
    }
}

impl From<CliUpdateRule> for UpdateRule {
    fn from(cli_rule: CliUpdateRule) -> Self {
        match cli_rule {
            CliUpdateRule::Observed => UpdateRule::Observed,
            CliUpdateRule::Textbook => UpdateRule::Textbook,
        }
    }
}

impl From<CliGranularity> for Granularity {
    fn from(cli_granularity: CliGranularity) -> Self {
        match cli_granularity {
            CliGranularity::Epoch => Granularity::Epoch,
            CliGranularity::Point => Granularity::Point,
        }
    }
}

impl From<CliPreset> for Preset {
    fn from(cli_preset: CliPreset) -> Self {
        match cli_preset {
            CliPreset::Planar => Preset::Planar,
            CliPreset::Parallel => Preset::Parallel,
            CliPreset::Spatial => Preset::Spatial,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Generate(args) => generate_command(args),
        Commands::Train(args) => train_command(args),
        Commands::Demo(args) => demo_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn configure_data(perceptron: Perceptron, args: &DataArgs) -> Perceptron {
    let perceptron = perceptron
        .with_points(args.n)
        .with_gamma(args.gamma)
        .with_dimensionality(args.dimensionality)
        .with_scale(args.scale)
        .with_bias_policy(args.bias.into());
    match args.max_attempts {
        Some(max_attempts) => perceptron.with_max_attempts(max_attempts),
        None => perceptron,
    }
}

fn configure_training(perceptron: Perceptron, args: &TrainingArgs) -> Result<Perceptron> {
    let pause = Duration::try_from_secs_f64(args.pause).map_err(|e| {
        PerceptronError::InvalidParameter(format!("invalid pause {}: {e}", args.pause))
    })?;
    let perceptron = perceptron
        .with_training_rate(args.rate)
        .with_update_rule(args.rule.into())
        .with_granularity(args.granularity.into())
        .with_pause(pause);
    Ok(match args.max_epochs {
        Some(max_epochs) => perceptron.with_max_epochs(max_epochs),
        None => perceptron,
    })
}

/// Seed to use for the run; drawn from entropy when not given
fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

fn generate_command(args: GenerateArgs) -> Result<()> {
    let seed = resolve_seed(args.data.seed);
    info!("Generating dataset with seed {seed}");

    let perceptron = configure_data(Perceptron::new(), &args.data);
    let (dataset, w_star) = perceptron.generate(&mut StdRng::seed_from_u64(seed))?;

    let (negative, positive) = dataset.class_counts();
    info!(
        "Generated {} points ({} negative, {} positive), w* = {}",
        dataset.len(),
        negative,
        positive,
        w_star
    );

    if let Some(output_path) = args.output {
        let file = File::create(&output_path).map_err(PerceptronError::IoError)?;
        let mut writer = BufWriter::new(file);
        write_csv(&mut writer, &dataset, &w_star)?;
        writer.flush().map_err(PerceptronError::IoError)?;
        info!("Dataset saved to: {output_path:?}");
    } else {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        write_csv(&mut writer, &dataset, &w_star)?;
    }

    Ok(())
}

/// Write `w_star` as a comment line followed by `x1,...,xi,label` rows
fn write_csv<W: Write>(writer: &mut W, dataset: &Dataset, w_star: &Hyperplane) -> Result<()> {
    let weights: Vec<String> = w_star.as_slice().iter().map(|w| w.to_string()).collect();
    writeln!(writer, "# w_star: {}", weights.join(",")).map_err(PerceptronError::IoError)?;

    let header: Vec<String> = (1..=dataset.dim()).map(|k| format!("x{k}")).collect();
    writeln!(writer, "{},label", header.join(",")).map_err(PerceptronError::IoError)?;

    for point in dataset {
        let coords: Vec<String> = point.coordinates().iter().map(|x| x.to_string()).collect();
        writeln!(writer, "{},{}", coords.join(","), point.label())
            .map_err(PerceptronError::IoError)?;
    }
    Ok(())
}

fn train_command(args: TrainArgs) -> Result<()> {
    let seed = resolve_seed(args.data.seed);
    info!("Training perceptron with seed {seed}");
    info!(
        "Parameters: c={}, n={}, gamma={}, i={}, scale={}",
        args.training.rate,
        args.data.n,
        args.data.gamma,
        args.data.dimensionality,
        args.data.scale
    );

    let perceptron = configure_data(Perceptron::new(), &args.data);
    let perceptron = configure_training(perceptron, &args.training)?;

    run_and_report(
        &perceptron,
        seed,
        args.training.trace || args.training.pause > 0.0,
        args.training.json,
        args.training.report.as_ref(),
    )
}

fn demo_command(args: DemoArgs) -> Result<()> {
    let seed = resolve_seed(args.seed);
    let preset: Preset = args.preset.into();
    info!("Running {preset:?} demo with seed {seed}");

    let perceptron = preset.perceptron().with_update_rule(args.rule.into());
    let perceptron = match args.max_epochs {
        Some(max_epochs) => perceptron.with_max_epochs(max_epochs),
        None => perceptron,
    };

    run_and_report(&perceptron, seed, args.trace, args.json, None)
}

fn run_and_report(
    perceptron: &Perceptron,
    seed: u64,
    trace: bool,
    json: bool,
    report_path: Option<&PathBuf>,
) -> Result<()> {
    let mut logger = LoggingObserver::new();
    let observer: Option<&mut dyn TrainingObserver> = if trace { Some(&mut logger) } else { None };

    let trained = perceptron.run_seeded(seed, observer)?;
    info!(
        "Training finished after {} epochs (converged: {})",
        trained.outcome().epochs,
        trained.converged()
    );

    let report = RunReport::new(
        &trained,
        perceptron.generator_config(),
        perceptron.trainer_config(),
        Some(seed),
    );

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        info!("Report saved to: {path:?}");
    }

    if json {
        println!("{}", report.to_json()?);
    } else {
        report.print_summary();
    }

    Ok(())
}
