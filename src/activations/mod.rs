//! # Activation Functions Module
//!
//! Every layer in this crate uses the logistic sigmoid as its nonlinearity:
//!
//! - **Sigmoid**: `1 / (1 + e^(-x))` - Outputs strictly between 0 and 1
//!
//! ## Usage Example
//!
//! ```rust
//! use feedforward::activations::Sigmoid;
//! use ndarray::array;
//!
//! let mut data = array![0.0, 2.0, -2.0];
//! Sigmoid::apply(&mut data);
//! assert!((data[0] - 0.5).abs() < 1e-12);
//! ```

pub mod functions;

pub use functions::Sigmoid;
