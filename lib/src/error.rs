//! Error type shared by dataset loading, training and the sweep driver.

use std::fmt;

use crate::model::Label;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
  /// Dataset file could not be opened or read.
  Io(std::io::Error),
  /// The CSV reader failed on a record.
  Csv(csv::Error),
  /// A dataset row does not describe a valid sample. Aborts the whole load.
  MalformedRow { row: usize, reason: String },
  /// Accuracy was requested over zero samples.
  EmptySampleSet { dataset: String },
  InvalidConfiguration {
    parameter: String,
    value: String,
    reason: String,
  },
  /// Two perceptrons detect the same class.
  DuplicateLabel(Label),
  /// `step` was called after the last epoch was evaluated.
  TrainingFinished,
}

impl Error {
  pub(crate) fn invalid_config(
    parameter: &str,
    value: impl fmt::Debug,
    reason: &str,
  ) -> Self {
    Error::InvalidConfiguration {
      parameter: parameter.to_string(),
      value: format!("{:?}", value),
      reason: reason.to_string(),
    }
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::Io(e) => write!(f, "I/O error: {}", e),
      Error::Csv(e) => write!(f, "CSV error: {}", e),
      Error::MalformedRow { row, reason } => write!(f, "malformed row #{}: {}", row, reason),
      Error::EmptySampleSet { dataset } => {
        write!(f, "cannot compute accuracy over the empty {} set", dataset)
      }
      Error::InvalidConfiguration {
        parameter,
        value,
        reason,
      } => write!(
        f,
        "invalid configuration: {} = {} ({})",
        parameter, value, reason
      ),
      Error::DuplicateLabel(label) => {
        write!(f, "more than one perceptron for class label {}", label)
      }
      Error::TrainingFinished => write!(f, "training already finished"),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Error::Io(e) => Some(e),
      Error::Csv(e) => Some(e),
      _ => None,
    }
  }
}

impl From<std::io::Error> for Error {
  fn from(e: std::io::Error) -> Self {
    Error::Io(e)
  }
}

impl From<csv::Error> for Error {
  fn from(e: csv::Error) -> Self {
    Error::Csv(e)
  }
}
