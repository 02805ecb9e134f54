//! `luma-grade`: train a brightness model and grade camera frames.

mod dataset;

use std::fs;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use log::{info, LevelFilter};

use dataset::{decode_frame, load_training_set, DatasetError, DatasetOptions, FrameLoadError};
use luma_grade_core::{hog_descriptor, init_with_level, BrightnessLabel, HogParams};
use luma_grade_model::{
    train, FramePipeline, LogisticModel, ModelIoError, PipelineError, TrainError, TrainParams,
};

#[derive(Parser)]
#[command(name = "luma-grade", version, about = "Brightness grading for camera frames")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a model from three labelled image directories.
    Train(TrainArgs),
    /// Grade frames through the full pipeline, in argument order.
    Classify(ClassifyArgs),
    /// Dump the descriptor of a single image as JSON.
    Features(FeaturesArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Directory of frames graded Low.
    #[arg(long)]
    low: PathBuf,
    /// Directory of frames graded Optimal.
    #[arg(long)]
    optimal: PathBuf,
    /// Directory of frames graded High.
    #[arg(long)]
    high: PathBuf,
    /// Output path for the model artifact.
    #[arg(long, default_value = "model.json")]
    out: PathBuf,
    /// Gradient steps per class.
    #[arg(long, default_value_t = 1000)]
    steps: usize,
    /// Gradient step size.
    #[arg(long, default_value_t = 5e-3)]
    learning_rate: f32,
    /// Images decoded per parallel batch.
    #[arg(long, default_value_t = 10)]
    batch_size: usize,
}

#[derive(Args)]
struct ClassifyArgs {
    /// Trained model artifact.
    #[arg(long)]
    model: PathBuf,
    /// Frames in temporal order; one pipeline (and one smoothing window)
    /// spans the whole sequence.
    #[arg(required = true)]
    frames: Vec<PathBuf>,
}

#[derive(Args)]
struct FeaturesArgs {
    image: PathBuf,
    /// Write the descriptor here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    FrameLoad(#[from] FrameLoadError),
    #[error(transparent)]
    Train(#[from] TrainError),
    #[error(transparent)]
    ModelIo(#[from] ModelIoError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn run_train(args: TrainArgs) -> Result<(), CliError> {
    let opts = DatasetOptions {
        batch_size: args.batch_size,
        ..DatasetOptions::default()
    };
    let dirs = [
        (args.low, BrightnessLabel::Low),
        (args.optimal, BrightnessLabel::Optimal),
        (args.high, BrightnessLabel::High),
    ];
    let (features, labels) = load_training_set(&dirs, &opts)?;
    info!(
        "training set ready: {} frames x {} features",
        features.nrows(),
        features.ncols()
    );

    let params = TrainParams {
        num_steps: args.steps,
        learning_rate: args.learning_rate,
    };
    let model = train(&features, &labels, &params)?;
    model.write_json(&args.out)?;
    info!("wrote model to {}", args.out.display());
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<(), CliError> {
    let model = LogisticModel::load_json(&args.model)?;
    info!(
        "loaded model: {} features, {} classes",
        model.num_features(),
        model.num_classes()
    );

    let mut pipeline = FramePipeline::new(model);
    for path in &args.frames {
        let frame = decode_frame(path)?;
        let grade = pipeline.process(&frame.view())?;
        println!(
            "{} raw={} smoothed={}",
            path.display(),
            grade.raw,
            grade.smoothed
        );
    }
    Ok(())
}

fn run_features(args: FeaturesArgs) -> Result<(), CliError> {
    let frame = decode_frame(&args.image)?;
    let features = hog_descriptor(&frame.view(), &HogParams::default());
    let json = serde_json::to_string(&features)?;
    match args.out {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Train(args) => run_train(args),
        Command::Classify(args) => run_classify(args),
        Command::Features(args) => run_features(args),
    }
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = init_with_level(level);

    if let Err(err) = run(cli.command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
