//! One-vs-rest perceptron classifier for MNIST digits.
//!
//! Samples are loaded from headerless CSV rows, one binary perceptron is trained per
//! class label, and multi-class predictions are made by picking the unit with the
//! largest net input.

pub mod error;
pub mod model;
pub mod subcommands;
pub mod utils;

pub use error::{Error, Result};
