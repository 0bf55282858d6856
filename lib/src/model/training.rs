use std::collections::BTreeSet;

use itertools::Itertools;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use super::{Label, Perceptron, Sample, TrainingParams, INPUT_DIMENSION, MAX_LABEL};
use crate::{Error, Result};

/// Where a coordinator is in its run. Every epoch is evaluated exactly once, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Initialized,
  Evaluated { epoch: usize },
  Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accuracy {
  correct: usize,
  total: usize,
}

impl Accuracy {
  pub fn correct(&self) -> usize {
    self.correct
  }

  pub fn total(&self) -> usize {
    self.total
  }

  /// Never NaN: only `TrainingCoordinator::accuracy` builds one, and it rejects empty sets.
  pub fn percent(&self) -> f64 {
    self.correct as f64 / self.total as f64 * 100.0
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochAccuracy {
  pub epoch: usize,
  pub training: Accuracy,
  pub validation: Accuracy,
}

/// Accuracy of both sample sets at every epoch boundary, epoch 0 first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccuracyHistory {
  epochs: Vec<EpochAccuracy>,
}

impl AccuracyHistory {
  pub fn epochs(&self) -> &[EpochAccuracy] {
    &self.epochs
  }

  pub fn training(&self) -> impl Iterator<Item = f64> + '_ {
    self.epochs.iter().map(|e| e.training.percent())
  }

  pub fn validation(&self) -> impl Iterator<Item = f64> + '_ {
    self.epochs.iter().map(|e| e.validation.percent())
  }

  pub fn last(&self) -> Option<&EpochAccuracy> {
    self.epochs.last()
  }

  fn record(&mut self, entry: EpochAccuracy) {
    debug_assert_eq!(entry.epoch, self.epochs.len());
    self.epochs.push(entry);
  }
}

/// Trains one perceptron per class and scores them together by argmax voting.
#[derive(Debug)]
pub struct TrainingCoordinator<'a> {
  learning_rate: f64,
  epochs: usize,
  training_samples: &'a [Sample],
  validation_samples: &'a [Sample],
  /// Sorted by class label; `predict` relies on this for tie-breaking.
  perceptrons: Vec<Perceptron>,
  history: AccuracyHistory,
  phase: Phase,
}

impl<'a> TrainingCoordinator<'a> {
  /// Creates one randomly initialised perceptron per distinct label, lowest label first.
  pub fn new(
    params: &TrainingParams,
    training_samples: &'a [Sample],
    validation_samples: &'a [Sample],
  ) -> Result<Self> {
    let labels: BTreeSet<Label> = params.class_labels.iter().copied().collect();
    if labels.is_empty() {
      return Err(Error::invalid_config(
        "class_labels",
        &params.class_labels,
        "at least one class label is required",
      ));
    }
    if let Some(label) = labels.iter().find(|&&l| l > MAX_LABEL) {
      return Err(Error::invalid_config(
        "class_labels",
        label,
        "labels must be digits 0..=9",
      ));
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let perceptrons = labels
      .into_iter()
      .map(|label| Perceptron::new(label, INPUT_DIMENSION, &mut rng))
      .collect();
    Self::from_perceptrons(
      params.learning_rate,
      params.epochs,
      perceptrons,
      training_samples,
      validation_samples,
    )
  }

  /// Takes ownership of already built perceptrons. Fails if two of them share a label.
  pub fn from_perceptrons(
    learning_rate: f64,
    epochs: usize,
    mut perceptrons: Vec<Perceptron>,
    training_samples: &'a [Sample],
    validation_samples: &'a [Sample],
  ) -> Result<Self> {
    if !(learning_rate > 0.0 && learning_rate.is_finite()) {
      return Err(Error::invalid_config(
        "learning_rate",
        learning_rate,
        "must be a positive finite number",
      ));
    }
    if perceptrons.is_empty() {
      return Err(Error::invalid_config(
        "class_labels",
        Vec::<Label>::new(),
        "at least one class label is required",
      ));
    }
    perceptrons.sort_by_key(Perceptron::class_label);
    if let Some((a, _)) = perceptrons
      .iter()
      .tuple_windows()
      .find(|(a, b)| a.class_label() == b.class_label())
    {
      return Err(Error::DuplicateLabel(a.class_label()));
    }

    Ok(Self {
      learning_rate,
      epochs,
      training_samples,
      validation_samples,
      perceptrons,
      history: AccuracyHistory::default(),
      phase: Phase::Initialized,
    })
  }

  pub fn learning_rate(&self) -> f64 {
    self.learning_rate
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn perceptrons(&self) -> &[Perceptron] {
    &self.perceptrons
  }

  pub fn history(&self) -> &AccuracyHistory {
    &self.history
  }

  pub fn class_labels(&self) -> impl Iterator<Item = Label> + '_ {
    self.perceptrons.iter().map(Perceptron::class_label)
  }

  /// Label of the perceptron with the largest net input. Ties go to the lowest label.
  pub fn predict(&self, sample: &Sample) -> Label {
    // NaN never compares greater, so it cannot take the lead
    let (best, _) = self.perceptrons.iter().fold(
      (self.perceptrons[0].class_label(), f64::NEG_INFINITY),
      |(best, max), p| {
        let net = p.net_input(sample);
        if net > max {
          (p.class_label(), net)
        } else {
          (best, max)
        }
      },
    );
    best
  }

  pub fn accuracy(&self, samples: &[Sample], dataset: &str) -> Result<Accuracy> {
    if samples.is_empty() {
      return Err(Error::EmptySampleSet {
        dataset: dataset.to_string(),
      });
    }
    let correct = samples
      .iter()
      .filter(|sample| self.predict(sample) == sample.true_label())
      .count();
    Ok(Accuracy {
      correct,
      total: samples.len(),
    })
  }

  /// Performs exactly one transition of the run and returns the new phase.
  ///
  /// `Initialized` scores the untrained weights as epoch 0. From `Evaluated { epoch }`
  /// every perceptron is trained once over the training set and epoch + 1 is scored,
  /// until the configured epoch count is reached, after which the run is `Done`.
  pub fn step(&mut self) -> Result<Phase> {
    let next = match self.phase {
      Phase::Initialized => {
        self.evaluate(0)?;
        Phase::Evaluated { epoch: 0 }
      }
      Phase::Evaluated { epoch } if epoch < self.epochs => {
        self.train_epoch(epoch + 1);
        self.evaluate(epoch + 1)?;
        Phase::Evaluated { epoch: epoch + 1 }
      }
      Phase::Evaluated { .. } => Phase::Done,
      Phase::Done => return Err(Error::TrainingFinished),
    };
    self.phase = next;
    Ok(next)
  }

  /// Runs every remaining transition and hands back the full history.
  #[tracing::instrument(name = "train", skip_all, fields(learning_rate = self.learning_rate))]
  pub fn train_and_evaluate(&mut self) -> Result<&AccuracyHistory> {
    info!(
      "Training {} perceptrons [{}] for {} epochs",
      self.perceptrons.len(),
      self.class_labels().join(", "),
      self.epochs
    );
    while self.step()? != Phase::Done {}
    Ok(&self.history)
  }

  fn train_epoch(&mut self, epoch: usize) {
    let (samples, learning_rate) = (self.training_samples, self.learning_rate);
    for perceptron in self.perceptrons.iter_mut() {
      let updates = perceptron.train_epoch(samples, learning_rate);
      debug!(
        epoch,
        class_label = perceptron.class_label(),
        updates,
        "perceptron trained"
      );
    }
  }

  fn evaluate(&mut self, epoch: usize) -> Result<()> {
    let validation = self.accuracy(self.validation_samples, "validation")?;
    info!(epoch, "accuracy for validation dataset = {}", validation.percent());
    let training = self.accuracy(self.training_samples, "training")?;
    info!(epoch, "accuracy for training dataset = {}", training.percent());
    self.history.record(EpochAccuracy {
      epoch,
      training,
      validation,
    });
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;
  use crate::model::PIXEL_COUNT;
  use crate::utils;

  fn sample(index: usize, label: Label, lit: &[(usize, u8)]) -> Sample {
    let mut pixels = vec![0u8; PIXEL_COUNT];
    for &(i, v) in lit {
      pixels[i] = v;
    }
    Sample::from_pixels(index, label, &pixels).unwrap()
  }

  fn toy_dataset() -> Vec<Sample> {
    vec![
      sample(0, 0, &[(0, 255)]),
      sample(1, 1, &[(1, 255)]),
      sample(2, 0, &[(0, 128)]),
      sample(3, 1, &[(1, 128)]),
    ]
  }

  #[test]
  fn test_separable_toy_set_reaches_full_accuracy() {
    let _scope = utils::init_logging_tests();
    let samples = toy_dataset();
    for seed in 0..20 {
      let params = TrainingParams {
        learning_rate: 0.1,
        epochs: 10,
        class_labels: vec![0, 1],
        seed,
      };
      let mut coordinator = TrainingCoordinator::new(&params, &samples, &samples).unwrap();
      let history = coordinator.train_and_evaluate().unwrap();
      assert_eq!(history.epochs().len(), 11);
      let last = history.last().unwrap();
      assert_eq!(last.epoch, 10);
      assert_eq!(last.training.percent(), 100.0, "seed {}", seed);
      let training: Vec<f64> = history.training().collect();
      let validation: Vec<f64> = history.validation().collect();
      assert_eq!(training.len(), 11);
      // both sets are the same samples here
      assert_eq!(training, validation);
      assert_eq!(training[10], 100.0);
      assert_eq!(coordinator.phase(), Phase::Done);
    }
  }

  #[test]
  fn test_zero_epochs_only_scores_baseline() {
    let samples = vec![sample(0, 3, &[(10, 200)])];
    let params = TrainingParams::digits(0.1, 0, 42);
    let mut coordinator = TrainingCoordinator::new(&params, &samples, &samples).unwrap();
    let initial = coordinator.perceptrons().to_vec();

    let history = coordinator.train_and_evaluate().unwrap().clone();

    assert_eq!(history.epochs().len(), 1);
    let baseline = history.epochs()[0];
    assert_eq!(baseline.epoch, 0);
    assert_eq!(baseline.training, baseline.validation);
    assert_eq!(coordinator.perceptrons(), initial.as_slice());
  }

  #[test]
  fn test_phases_advance_in_order() {
    let samples = toy_dataset();
    let params = TrainingParams {
      learning_rate: 0.5,
      epochs: 2,
      class_labels: vec![0, 1],
      seed: 1,
    };
    let mut coordinator = TrainingCoordinator::new(&params, &samples, &samples).unwrap();
    assert_eq!(coordinator.learning_rate(), 0.5);
    assert_eq!(coordinator.phase(), Phase::Initialized);
    assert_eq!(coordinator.step().unwrap(), Phase::Evaluated { epoch: 0 });
    assert_eq!(coordinator.step().unwrap(), Phase::Evaluated { epoch: 1 });
    assert_eq!(coordinator.step().unwrap(), Phase::Evaluated { epoch: 2 });
    assert_eq!(coordinator.step().unwrap(), Phase::Done);
    assert!(matches!(coordinator.step(), Err(Error::TrainingFinished)));
    let epochs: Vec<usize> = coordinator.history().epochs().iter().map(|e| e.epoch).collect();
    assert_eq!(epochs, vec![0, 1, 2]);
  }

  #[test]
  fn test_tie_goes_to_lowest_label() {
    let mut weights = vec![0.0; INPUT_DIMENSION];
    weights[0] = 0.3;
    // handed over out of order on purpose
    let perceptrons = vec![
      Perceptron::with_weights(7, weights.clone()),
      Perceptron::with_weights(2, weights.clone()),
      Perceptron::with_weights(5, weights),
    ];
    let samples = vec![sample(0, 5, &[(3, 90)])];
    let coordinator =
      TrainingCoordinator::from_perceptrons(0.1, 1, perceptrons, &samples, &samples).unwrap();
    for _ in 0..10 {
      assert_eq!(coordinator.predict(&samples[0]), 2);
    }
  }

  #[test]
  fn test_nan_net_input_never_wins() {
    let mut broken = vec![0.0; INPUT_DIMENSION];
    broken[0] = f64::NAN;
    let mut sound = vec![0.0; INPUT_DIMENSION];
    sound[0] = -0.2;
    let perceptrons = vec![
      Perceptron::with_weights(0, broken),
      Perceptron::with_weights(6, sound),
    ];
    let samples = vec![sample(0, 6, &[])];
    let coordinator =
      TrainingCoordinator::from_perceptrons(0.1, 1, perceptrons, &samples, &samples).unwrap();
    assert_eq!(coordinator.predict(&samples[0]), 6);
  }

  #[test]
  fn test_accuracy_counts_are_exposed() {
    let samples = toy_dataset();
    let perceptrons = vec![
      Perceptron::with_weights(0, vec![0.0; INPUT_DIMENSION]),
      Perceptron::with_weights(1, vec![0.0; INPUT_DIMENSION]),
    ];
    let coordinator =
      TrainingCoordinator::from_perceptrons(0.1, 1, perceptrons, &samples, &samples).unwrap();
    // every net input ties at zero, so label 0 is always predicted
    let accuracy = coordinator.accuracy(&samples, "training").unwrap();
    assert_eq!((accuracy.correct(), accuracy.total()), (2, 4));
    assert_eq!(accuracy.percent(), 50.0);
  }

  #[test]
  fn test_predict_picks_largest_net_input() {
    let mut low = vec![0.0; INPUT_DIMENSION];
    low[0] = 0.1;
    let mut high = vec![0.0; INPUT_DIMENSION];
    high[0] = 0.9;
    let perceptrons = vec![
      Perceptron::with_weights(0, low),
      Perceptron::with_weights(8, high),
    ];
    let samples = vec![sample(0, 8, &[])];
    let coordinator =
      TrainingCoordinator::from_perceptrons(0.1, 1, perceptrons, &samples, &samples).unwrap();
    assert_eq!(coordinator.predict(&samples[0]), 8);
    assert_eq!(coordinator.accuracy(&samples, "validation").unwrap().percent(), 100.0);
  }

  #[test]
  fn test_empty_sample_set_is_rejected() {
    let samples = toy_dataset();
    let params = TrainingParams::digits(0.1, 3, 0);
    let mut coordinator = TrainingCoordinator::new(&params, &samples, &[]).unwrap();
    assert!(matches!(
      coordinator.step(),
      Err(Error::EmptySampleSet { ref dataset }) if dataset == "validation"
    ));
    assert!(coordinator.history().epochs().is_empty());
  }

  #[test]
  fn test_rejects_bad_configuration() {
    let samples = toy_dataset();
    for rate in [0.0, -0.1, f64::NAN, f64::INFINITY] {
      let params = TrainingParams::digits(rate, 1, 0);
      assert!(matches!(
        TrainingCoordinator::new(&params, &samples, &samples),
        Err(Error::InvalidConfiguration { .. })
      ));
    }
    let mut params = TrainingParams::digits(0.1, 1, 0);
    params.class_labels = vec![];
    assert!(TrainingCoordinator::new(&params, &samples, &samples).is_err());
    params.class_labels = vec![3, 12];
    assert!(TrainingCoordinator::new(&params, &samples, &samples).is_err());
  }

  #[test]
  fn test_duplicate_labels_are_rejected() {
    let perceptrons = vec![
      Perceptron::with_weights(4, vec![0.0; INPUT_DIMENSION]),
      Perceptron::with_weights(4, vec![1.0; INPUT_DIMENSION]),
    ];
    assert!(matches!(
      TrainingCoordinator::from_perceptrons(0.1, 1, perceptrons, &[], &[]),
      Err(Error::DuplicateLabel(4))
    ));
  }

  #[test]
  fn test_repeated_labels_in_params_collapse() {
    let samples = toy_dataset();
    let params = TrainingParams {
      learning_rate: 0.1,
      epochs: 1,
      class_labels: vec![1, 0, 1],
      seed: 3,
    };
    let coordinator = TrainingCoordinator::new(&params, &samples, &samples).unwrap();
    assert_eq!(coordinator.class_labels().collect::<Vec<_>>(), vec![0, 1]);
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_predictions_and_accuracy_stay_in_bounds(
      seed in any::<u64>(),
      labels in proptest::collection::btree_set(0u8..=9, 1..10),
      rows in proptest::collection::vec((0u8..=9, 0usize..PIXEL_COUNT, any::<u8>()), 1..12),
    ) {
      let samples: Vec<Sample> = rows
        .iter()
        .enumerate()
        .map(|(i, &(label, pixel, value))| sample(i, label, &[(pixel, value)]))
        .collect();
      let params = TrainingParams {
        learning_rate: 0.05,
        epochs: 2,
        class_labels: labels.iter().copied().collect(),
        seed,
      };
      let mut coordinator = TrainingCoordinator::new(&params, &samples, &samples).unwrap();
      for s in &samples {
        prop_assert!(labels.contains(&coordinator.predict(s)));
      }
      let history = coordinator.train_and_evaluate().unwrap();
      for entry in history.epochs() {
        for accuracy in [entry.training, entry.validation] {
          prop_assert!(accuracy.correct() <= accuracy.total());
          prop_assert!((0.0..=100.0).contains(&accuracy.percent()));
        }
      }
    }
  }
}
