use ndarray::{Array1, ArrayView1, Zip};

/// Trait defining the interface for per-node cost functions
pub trait Loss: Send + Sync {
    /// Cost contributed by a single output node
    fn node_cost(&self, activation: f64, expected: f64) -> f64;

    /// Derivative of `node_cost` with respect to the activation
    fn node_cost_derivative(&self, activation: f64, expected: f64) -> f64;

    /// Total cost of an output vector: the sum of its node costs
    fn compute(&self, activations: ArrayView1<f64>, expected: ArrayView1<f64>) -> f64 {
        activations
            .iter()
            .zip(expected.iter())
            .map(|(&a, &e)| self.node_cost(a, e))
            .sum()
    }

    /// Elementwise derivative of the cost with respect to every activation
    fn gradient(&self, activations: ArrayView1<f64>, expected: ArrayView1<f64>) -> Array1<f64> {
        Zip::from(activations)
            .and(expected)
            .map_collect(|&a, &e| self.node_cost_derivative(a, e))
    }
}

/// Squared error: `(a - e)^2` per node, derivative `2(a - e)`.
///
/// Not halved and not averaged over nodes, so a network's cost for one data point is
/// the plain sum of squared errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct SquaredError;

impl Loss for SquaredError {
    #[inline]
    fn node_cost(&self, activation: f64, expected: f64) -> f64 {
        let error = activation - expected;
        error * error
    }

    #[inline]
    fn node_cost_derivative(&self, activation: f64, expected: f64) -> f64 {
        2.0 * (activation - expected)
    }
}
