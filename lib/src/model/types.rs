use serde::{Deserialize, Serialize};

/// Pixels in one 28x28 MNIST image.
pub const PIXEL_COUNT: usize = 784;
/// Bias feature followed by the pixels.
pub const INPUT_DIMENSION: usize = PIXEL_COUNT + 1;
pub const MAX_PIXEL_VALUE: f64 = 255.0;
pub const MAX_LABEL: Label = 9;

/// Digit class, always in `0..=MAX_LABEL`.
pub type Label = u8;

/// Everything a single training run needs besides the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
  pub learning_rate: f64,
  pub epochs: usize,
  /// The label universe: one perceptron is trained per entry.
  pub class_labels: Vec<Label>,
  /// Seeds the initial weights of every perceptron.
  pub seed: u64,
}

impl TrainingParams {
  pub fn digits(learning_rate: f64, epochs: usize, seed: u64) -> Self {
    Self {
      learning_rate,
      epochs,
      class_labels: (0..=MAX_LABEL).collect(),
      seed,
    }
  }
}
