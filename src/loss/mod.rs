//! Cost functions comparing output-layer activations with expected outputs.

pub mod functions;

pub use functions::{Loss, SquaredError};
