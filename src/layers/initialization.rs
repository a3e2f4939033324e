use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum WeightInit {
    /// Uniform in `[-1, 1)` scaled by `1 / sqrt(fan_in)`
    #[default]
    NormalizedUniform,

    /// Uniform distribution with custom range
    Uniform { min: f64, max: f64 },

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Reject ranges `Uniform` cannot sample from.
    pub fn validate(&self) -> Result<()> {
        if let WeightInit::Uniform { min, max } = *self {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(NetworkError::invalid_parameter(
                    "weight_init".to_string(),
                    format!("uniform range [{}, {}) is empty or not finite", min, max),
                ));
            }
        }
        Ok(())
    }

    /// Initialize a `(fan_in, fan_out)` weight matrix, drawing from `rng`.
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f64> {
        let (fan_in, _) = shape;

        match self {
            WeightInit::NormalizedUniform => {
                let scale = (fan_in as f64).sqrt();
                Array2::random_using(shape, Uniform::new(-1.0, 1.0), rng) / scale
            }

            WeightInit::Uniform { min, max } => {
                Array2::random_using(shape, Uniform::new(*min, *max), rng)
            }

            WeightInit::Zeros => Array2::zeros(shape),
        }
    }

    /// Biases always start at zero.
    pub fn initialize_biases(&self, size: usize) -> Array1<f64> {
        Array1::zeros(size)
    }
}
