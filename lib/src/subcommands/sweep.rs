use std::path::PathBuf;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  model::{
    read_dataset, shuffle_samples, AccuracyHistory, Label, Sample, TrainingCoordinator,
    TrainingParams,
  },
  Error, Result,
};

/// Datasets plus the hyperparameters to sweep over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
  pub training_data: PathBuf,
  pub validation_data: PathBuf,
  /// One full training run per entry, in order.
  pub learning_rates: Vec<f64>,
  pub epochs: usize,
  pub class_labels: Vec<Label>,
  pub seed: u64,
  /// Shuffle both datasets once after loading.
  pub shuffle: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
  pub learning_rate: f64,
  pub history: AccuracyHistory,
}

pub struct Sweep {
  config: SweepConfig,
}

impl Sweep {
  pub fn new(config: SweepConfig) -> Self {
    Self { config }
  }

  fn check_learning_rates(&self) -> Result<()> {
    if self.config.learning_rates.is_empty() {
      return Err(Error::invalid_config(
        "learning_rates",
        &self.config.learning_rates,
        "at least one learning rate is required",
      ));
    }
    Ok(())
  }

  pub fn run(self) -> Result<Vec<SweepOutcome>> {
    // fail before reading the datasets
    self.check_learning_rates()?;
    let mut training = read_dataset(&self.config.training_data)?;
    let mut validation = read_dataset(&self.config.validation_data)?;
    if self.config.shuffle {
      let mut rng = StdRng::seed_from_u64(self.config.seed);
      shuffle_samples(&mut training, &mut rng);
      shuffle_samples(&mut validation, &mut rng);
    }
    self.run_on(&training, &validation)
  }

  /// Same as `run` for samples that are already in memory.
  pub fn run_on(&self, training: &[Sample], validation: &[Sample]) -> Result<Vec<SweepOutcome>> {
    self.check_learning_rates()?;
    self
      .config
      .learning_rates
      .iter()
      .map(|&learning_rate| -> Result<SweepOutcome> {
        let params = TrainingParams {
          learning_rate,
          epochs: self.config.epochs,
          class_labels: self.config.class_labels.clone(),
          seed: self.config.seed,
        };
        let mut coordinator = TrainingCoordinator::new(&params, training, validation)?;
        let history = coordinator.train_and_evaluate()?.clone();
        if let Some(last) = history.last() {
          info!(
            learning_rate,
            "final accuracy after epoch {}: training = {}, validation = {}",
            last.epoch,
            last.training.percent(),
            last.validation.percent()
          );
        }
        Ok(SweepOutcome {
          learning_rate,
          history,
        })
      })
      .collect()
  }
}
