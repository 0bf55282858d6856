use rand::Rng;

use super::{Label, Sample};

pub const INITIAL_WEIGHT_BOUND: f64 = 0.5;

/// Binary one-vs-rest unit: fires when a sample belongs to `class_label`.
#[derive(Debug, Clone, PartialEq)]
pub struct Perceptron {
  class_label: Label,
  weights: Vec<f64>,
}

impl Perceptron {
  /// Weights are drawn uniformly from `[-0.5, 0.5]`.
  pub fn new<R: Rng>(class_label: Label, dimension: usize, rng: &mut R) -> Self {
    let weights = (0..dimension)
      .map(|_| rng.gen_range(-INITIAL_WEIGHT_BOUND..=INITIAL_WEIGHT_BOUND))
      .collect();
    Self {
      class_label,
      weights,
    }
  }

  pub fn with_weights(class_label: Label, weights: Vec<f64>) -> Self {
    Self {
      class_label,
      weights,
    }
  }

  pub fn class_label(&self) -> Label {
    self.class_label
  }

  pub fn weights(&self) -> &[f64] {
    &self.weights
  }

  pub fn net_input(&self, sample: &Sample) -> f64 {
    let inputs = sample.inputs();
    assert_eq!(
      inputs.len(),
      self.weights.len(),
      "sample #{} has {} inputs but perceptron {} has {} weights",
      sample.index(),
      inputs.len(),
      self.class_label,
      self.weights.len()
    );
    inputs.iter().zip(&self.weights).map(|(x, w)| x * w).sum()
  }

  /// Step activation: 1 for strictly positive net input, 0 otherwise.
  pub fn decision(net_input: f64) -> u8 {
    if net_input > 0.0 {
      1
    } else {
      0
    }
  }

  /// Ground truth activation for this unit.
  pub fn target(&self, sample: &Sample) -> u8 {
    if sample.true_label() == self.class_label {
      1
    } else {
      0
    }
  }

  /// Applies the perceptron rule for one sample. Returns whether the weights changed.
  pub fn train_step(&mut self, sample: &Sample, learning_rate: f64) -> bool {
    let predicted = Self::decision(self.net_input(sample));
    let expected = self.target(sample);
    if predicted == expected {
      return false;
    }
    // same scalar for every component
    let step = learning_rate * (f64::from(expected) - f64::from(predicted));
    for (w, x) in self.weights.iter_mut().zip(sample.inputs()) {
      *w += step * x;
    }
    true
  }

  /// One pass over `samples` in order. Returns how many samples caused an update.
  pub fn train_epoch(&mut self, samples: &[Sample], learning_rate: f64) -> usize {
    samples
      .iter()
      .filter(|sample| self.train_step(sample, learning_rate))
      .count()
  }
}
