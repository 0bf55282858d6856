mod app_config;

use std::{error::Error, path::PathBuf};

use app_config::AppConfig;
use clap::Parser;
use perceptron::{subcommands::Sweep, utils};

/// Trains one perceptron per digit and reports accuracy for every epoch.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
  /// YAML file with the run configuration
  #[arg(short, long, value_name = "PATH")]
  config: Option<PathBuf>,
  /// Training dataset (CSV)
  #[arg(long, value_name = "PATH")]
  training_data: Option<PathBuf>,
  /// Validation dataset (CSV)
  #[arg(long, value_name = "PATH")]
  validation_data: Option<PathBuf>,
  /// Learning rates to sweep, comma separated
  #[arg(short, long, value_name = "RATE", value_delimiter = ',')]
  learning_rates: Option<Vec<f64>>,
  #[arg(short, long, value_name = "INT")]
  epochs: Option<usize>,
  #[arg(long, value_name = "INT")]
  seed: Option<u64>,
}

impl Cli {
  fn overrides(&self) -> AppConfig {
    AppConfig {
      training_data: self.training_data.clone(),
      validation_data: self.validation_data.clone(),
      learning_rates: self.learning_rates.clone(),
      epochs: self.epochs,
      seed: self.seed,
      ..AppConfig::default()
    }
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  utils::init_logging()?;
  let args = Cli::parse();

  let file_config = match &args.config {
    Some(path) => AppConfig::from_file(path)?,
    None => AppConfig::default(),
  };
  let config = file_config.merge(args.overrides()).into_sweep_config();
  tracing::info!("{:?}", config);

  let outcomes = Sweep::new(config).run()?;
  tracing::info!("Finished {} training runs", outcomes.len());
  Ok(())
}
