//! # feedforward - Sigmoid Multilayer Perceptron Core
//!
//! The numerical core of a feedforward neural network: forward propagation through a chain of
//! sigmoid layers, error back-propagation, gradient accumulation over a batch, and plain
//! gradient-descent parameter updates.
//!
//! ## Key Features
//!
//! - **Layers**: fully connected sigmoid layers with normalized uniform initialization
//! - **Explicit pass results**: the forward pass returns a [`layers::LayerOutput`] that the
//!   backward operations take as an argument, so they cannot read stale caches
//! - **Training**: batch gradient descent, sequential or data-parallel with rayon
//! - **Gradient checking**: finite-difference verification of back-propagation
//!
//! ## Quick Start
//!
//! ```rust
//! use feedforward::{DataPoint, NetworkBuilder};
//! use ndarray::array;
//!
//! # fn main() -> feedforward::Result<()> {
//! let mut network = NetworkBuilder::input(2).add_layer(3).add_layer(1).seed(0).build()?;
//!
//! let batch = vec![
//!     DataPoint::new(array![0.0, 1.0], array![1.0]),
//!     DataPoint::new(array![1.0, 1.0], array![0.0]),
//! ];
//!
//! let before = network.batch_cost(&batch)?;
//! for _ in 0..100 {
//!     network.learn(&batch, 0.5)?;
//! }
//! assert!(network.batch_cost(&batch)? < before);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - The sigmoid nonlinearity
//! - [`builders`] - Builder for reproducible network construction
//! - [`config`] - Training step configuration
//! - [`data`] - Training examples
//! - [`debug`] - Finite-difference gradient checking
//! - [`error`] - Error types and result handling
//! - [`layers`] - The layer engine: forward pass, error signals, gradients
//! - [`loss`] - Cost functions
//! - [`network`] - The layer chain: forward propagation, cost, classification, training
//!
//! ## Logging
//!
//! Operations emit [`tracing`] events (`debug` per network operation, `trace` per layer).
//! Install any subscriber to see them.

pub mod activations;
pub mod builders;
pub mod config;
pub mod data;
pub mod debug;
pub mod error;
pub mod layers;
pub mod loss;
pub mod network;
mod parallel;

pub use builders::NetworkBuilder;
pub use config::{GradientScaling, TrainingConfig};
pub use data::DataPoint;
pub use error::{NetworkError, Result};
pub use layers::{Layer, LayerGradients, LayerOutput, WeightInit};
pub use network::NeuralNetwork;
