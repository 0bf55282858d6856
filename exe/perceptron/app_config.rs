use std::{
  error::Error,
  path::{Path, PathBuf},
};

use perceptron::{model::Label, subcommands::SweepConfig};
use serde::Deserialize;

/// Run configuration. Also defines the config file format (every field can be omitted).
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
  /// Training samples, one `label,pixel_0,...,pixel_783` row per line
  pub training_data: Option<PathBuf>,
  /// Validation samples, same format
  pub validation_data: Option<PathBuf>,
  /// One full training run per learning rate
  pub learning_rates: Option<Vec<f64>>,
  pub epochs: Option<usize>,
  /// Label universe, one perceptron per label
  pub class_labels: Option<Vec<Label>>,
  /// Seeds weight initialisation and shuffling
  pub seed: Option<u64>,
  /// Shuffle the datasets after loading
  pub shuffle: Option<bool>,
}

impl AppConfig {
  pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(content)
  }

  pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(Self::from_yaml(&content)?)
  }

  // merge configs where the second overwrites the first
  pub fn merge(self, other: Self) -> Self {
    Self {
      training_data: other.training_data.or(self.training_data),
      validation_data: other.validation_data.or(self.validation_data),
      learning_rates: other.learning_rates.or(self.learning_rates),
      epochs: other.epochs.or(self.epochs),
      class_labels: other.class_labels.or(self.class_labels),
      seed: other.seed.or(self.seed),
      shuffle: other.shuffle.or(self.shuffle),
    }
  }

  /// Fills whatever is still unset with the defaults of the MNIST experiment.
  pub fn into_sweep_config(self) -> SweepConfig {
    SweepConfig {
      training_data: self
        .training_data
        .unwrap_or_else(|| PathBuf::from("data/mnist_train.csv")),
      validation_data: self
        .validation_data
        .unwrap_or_else(|| PathBuf::from("data/mnist_test.csv")),
      learning_rates: self.learning_rates.unwrap_or_else(|| vec![0.1, 0.01, 0.001]),
      epochs: self.epochs.unwrap_or(50),
      class_labels: self.class_labels.unwrap_or_else(|| (0..=9).collect()),
      seed: self.seed.unwrap_or(1),
      shuffle: self.shuffle.unwrap_or(true),
    }
  }
}
