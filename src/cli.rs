use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use nn_exercises::config::{load_config, AgesConfig, MoonsConfig, NamesConfig};
use nn_exercises::exercises::{self, make_rng};

#[derive(Parser, Debug)]
#[command(
    name = "nn-exercises",
    version,
    about = "Small neural network exercises: two-moons MLP, name-origin RNN, age-group CNN."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Feed-forward classifier on the synthetic two-moons dataset.
    Moons(MoonsArgs),
    /// Character-level RNN classifying surnames by language of origin.
    Names(NamesArgs),
    /// Convolutional network classifying face images into age groups.
    Ages(AgesArgs),
}

/// Flags shared by every exercise; each overrides the config file.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// JSON config file; missing keys keep their defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub epochs: Option<usize>,
    #[arg(long)]
    pub learning_rate: Option<f64>,
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Fixed RNG seed for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Skip the terminal plots.
    #[arg(long)]
    pub no_plot: bool,
    /// Write the trained model as JSON.
    #[arg(long)]
    pub save_model: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MoonsArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    #[arg(long)]
    pub samples: Option<usize>,
    #[arg(long)]
    pub noise: Option<f64>,
}

#[derive(Args, Debug)]
pub struct NamesArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Directory of <Language>.txt files.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub hidden_size: Option<usize>,
    /// Names to classify after training (replaces the configured list).
    #[arg(long = "predict", num_args = 1..)]
    pub predict: Vec<String>,
}

#[derive(Args, Debug)]
pub struct AgesArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// CSV with ID,Class columns.
    #[arg(long)]
    pub labels_csv: Option<PathBuf>,
    #[arg(long)]
    pub image_dir: Option<PathBuf>,
    /// Preprocessed tensor JSON (read if present, written otherwise).
    #[arg(long)]
    pub tensor_cache: Option<PathBuf>,
    #[arg(long)]
    pub image_size: Option<u32>,
    #[arg(long)]
    pub limit: Option<usize>,
    /// Unlabelled ID listing to classify after training.
    #[arg(long)]
    pub predict_csv: Option<PathBuf>,
    #[arg(long)]
    pub predictions_out: Option<PathBuf>,
}

fn load_or_default<T: Default + serde::de::DeserializeOwned>(path: &Option<PathBuf>) -> Result<T> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("reading config {}", path.display())),
        None => Ok(T::default()),
    }
}

/// Applies `Some` overrides onto a config field.
macro_rules! override_field {
    ($target:expr, $value:expr) => {
        if let Some(v) = $value {
            $target = v;
        }
    };
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Moons(args) => run_moons(args),
            Commands::Names(args) => run_names(args),
            Commands::Ages(args) => run_ages(args),
        }
    }
}

fn run_moons(args: MoonsArgs) -> Result<()> {
    let mut config: MoonsConfig = load_or_default(&args.common.config)?;
    let c = args.common;
    override_field!(config.epochs, c.epochs);
    override_field!(config.batch_size, c.batch_size);
    override_field!(config.optimizer, c.learning_rate.map(|lr| config.optimizer.with_learning_rate(lr)));
    override_field!(config.n_samples, args.samples);
    override_field!(config.noise, args.noise);
    if c.seed.is_some() { config.seed = c.seed; }
    if c.save_model.is_some() { config.save_model = c.save_model; }
    config.plot &= !c.no_plot;

    let mut rng = make_rng(config.seed);
    exercises::moons::run(&config, &mut rng).context("two-moons exercise failed")?;
    Ok(())
}

fn run_names(args: NamesArgs) -> Result<()> {
    let mut config: NamesConfig = load_or_default(&args.common.config)?;
    let c = args.common;
    override_field!(config.epochs, c.epochs);
    override_field!(config.batch_size, c.batch_size);
    override_field!(config.optimizer, c.learning_rate.map(|lr| config.optimizer.with_learning_rate(lr)));
    override_field!(config.data_dir, args.data_dir);
    override_field!(config.hidden_size, args.hidden_size);
    if !args.predict.is_empty() { config.predict = args.predict; }
    if c.seed.is_some() { config.seed = c.seed; }
    if c.save_model.is_some() { config.save_model = c.save_model; }
    config.plot &= !c.no_plot;

    let mut rng = make_rng(config.seed);
    exercises::names::run(&config, &mut rng).context("name classification exercise failed")?;
    Ok(())
}

fn run_ages(args: AgesArgs) -> Result<()> {
    let mut config: AgesConfig = load_or_default(&args.common.config)?;
    let c = args.common;
    override_field!(config.epochs, c.epochs);
    override_field!(config.batch_size, c.batch_size);
    override_field!(config.optimizer, c.learning_rate.map(|lr| config.optimizer.with_learning_rate(lr)));
    override_field!(config.labels_csv, args.labels_csv);
    override_field!(config.image_dir, args.image_dir);
    override_field!(config.image_size, args.image_size);
    override_field!(config.predictions_out, args.predictions_out);
    if args.tensor_cache.is_some() { config.tensor_cache = args.tensor_cache; }
    if args.limit.is_some() { config.limit = args.limit; }
    if args.predict_csv.is_some() { config.predict_csv = args.predict_csv; }
    if c.seed.is_some() { config.seed = c.seed; }
    if c.save_model.is_some() { config.save_model = c.save_model; }
    config.plot &= !c.no_plot;

    let mut rng = make_rng(config.seed);
    exercises::ages::run(&config, &mut rng).context("age-group exercise failed")?;
    Ok(())
}
