//! Configuration for a gradient-descent training step.

use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// How accumulated gradients are scaled before being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientScaling {
    /// Apply the summed gradient as-is
    Sum,
    /// Divide by the batch size (average gradient)
    #[default]
    Mean,
}

/// Settings for [`NeuralNetwork::train`](crate::network::NeuralNetwork::train).
///
/// Deserializable so callers can keep it in their own config files; missing fields take
/// their defaults.
///
/// ```json
/// { "learn_rate": 0.25, "gradient_scaling": "sum", "parallel": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub learn_rate: f64,
    pub gradient_scaling: GradientScaling,
    /// Accumulate per-point gradients on the rayon thread pool
    pub parallel: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            learn_rate: 0.05,
            gradient_scaling: GradientScaling::Mean,
            parallel: false,
        }
    }
}

impl TrainingConfig {
    pub fn new(learn_rate: f64) -> Self {
        TrainingConfig {
            learn_rate,
            ..Default::default()
        }
    }

    pub fn with_gradient_scaling(mut self, gradient_scaling: GradientScaling) -> Self {
        self.gradient_scaling = gradient_scaling;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_learn_rate(self.learn_rate)
    }

    /// The rate actually applied to the accumulated gradient of a batch of `batch_size` points.
    pub(crate) fn effective_learn_rate(&self, batch_size: usize) -> f64 {
        match self.gradient_scaling {
            GradientScaling::Sum => self.learn_rate,
            GradientScaling::Mean => self.learn_rate / batch_size as f64,
        }
    }
}

pub(crate) fn validate_learn_rate(learn_rate: f64) -> Result<()> {
    if learn_rate.is_finite() && learn_rate >= 0.0 {
        Ok(())
    } else {
        Err(NetworkError::invalid_parameter(
            "learn_rate".to_string(),
            format!("must be finite and non-negative, got {}", learn_rate),
        ))
    }
}
