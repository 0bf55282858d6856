pub mod perceptron;
pub mod sample;
pub mod training;
pub mod types;
pub mod utils;

pub use perceptron::*;
pub use sample::*;
pub use training::*;
pub use types::*;
pub use utils::*;
