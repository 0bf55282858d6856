pub use sweep::*;

pub mod sweep;
