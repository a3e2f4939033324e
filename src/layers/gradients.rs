use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::{NetworkError, Result};

/// Everything one forward pass through a layer produced.
///
/// Backward operations take this value explicitly instead of reading a hidden cache, so
/// they can only run after a forward pass. `generation` ties it to the parameters that
/// produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOutput {
    pub(crate) inputs: Array1<f64>,
    pub(crate) weighted_inputs: Array1<f64>,
    pub(crate) activations: Array1<f64>,
    pub(crate) generation: u64,
}

impl LayerOutput {
    /// The input vector fed into the layer.
    pub fn inputs(&self) -> &Array1<f64> {
        &self.inputs
    }

    /// Pre-activation sums, one per output node.
    pub fn weighted_inputs(&self) -> &Array1<f64> {
        &self.weighted_inputs
    }

    /// Post-activation values, one per output node.
    pub fn activations(&self) -> &Array1<f64> {
        &self.activations
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn into_activations(self) -> Array1<f64> {
        self.activations
    }
}

/// Cost gradient accumulators for one layer.
///
/// Shapes always match the owning layer's `weights` and `biases`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
}

impl LayerGradients {
    pub fn zeros(num_nodes_in: usize, num_nodes_out: usize) -> Self {
        LayerGradients {
            weights: Array2::zeros((num_nodes_in, num_nodes_out)),
            biases: Array1::zeros(num_nodes_out),
        }
    }

    pub fn num_nodes_in(&self) -> usize {
        self.weights.nrows()
    }

    pub fn num_nodes_out(&self) -> usize {
        self.weights.ncols()
    }

    /// Add the contribution of one data point: `inputs ⊗ node_values` to the weights,
    /// `node_values` to the biases.
    pub fn accumulate(&mut self, inputs: ArrayView1<f64>, node_values: ArrayView1<f64>) -> Result<()> {
        NetworkError::check_len("layer inputs", self.num_nodes_in(), inputs.len())?;
        NetworkError::check_len("node values", self.num_nodes_out(), node_values.len())?;

        let column = inputs.insert_axis(Axis(1));
        let row = node_values.insert_axis(Axis(0));
        self.weights += &column.dot(&row);
        self.biases += &node_values;
        Ok(())
    }

    /// Sum another accumulator into this one.
    pub fn merge(&mut self, other: &LayerGradients) -> Result<()> {
        if self.weights.dim() != other.weights.dim() {
            return Err(NetworkError::dimension_mismatch(
                format!("gradients of shape {:?}", self.weights.dim()),
                format!("{:?}", other.weights.dim()),
            ));
        }
        NetworkError::check_len("bias gradients", self.biases.len(), other.biases.len())?;
        self.weights += &other.weights;
        self.biases += &other.biases;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.weights.fill(0.0);
        self.biases.fill(0.0);
    }

    /// Multiply every accumulated value by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.weights *= factor;
        self.biases *= factor;
    }

    /// Largest absolute difference to `other`, over weights and biases.
    pub fn max_abs_difference(&self, other: &LayerGradients) -> f64 {
        let weights = self
            .weights
            .iter()
            .zip(other.weights.iter())
            .map(|(a, b)| (a - b).abs());
        let biases = self
            .biases
            .iter()
            .zip(other.biases.iter())
            .map(|(a, b)| (a - b).abs());
        weights.chain(biases).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, arr2};

    #[test]
    fn test_accumulate_outer_product() {
        let mut grads = LayerGradients::zeros(2, 3);
        grads.accumulate(array![1.0, 2.0].view(), array![0.5, -1.0, 2.0].view()).unwrap();
        grads.accumulate(array![1.0, 2.0].view(), array![0.5, -1.0, 2.0].view()).unwrap();

        assert_eq!(grads.weights, arr2(&[[1.0, -2.0, 4.0], [2.0, -4.0, 8.0]]));
        assert_eq!(grads.biases, array![1.0, -2.0, 4.0]);
    }

    #[test]
    fn test_accumulate_rejects_wrong_lengths() {
        let mut grads = LayerGradients::zeros(2, 3);
        let err = grads.accumulate(array![1.0].view(), array![0.0, 0.0, 0.0].view());
        assert!(matches!(err, Err(NetworkError::DimensionMismatch { .. })));
        assert_eq!(grads, LayerGradients::zeros(2, 3));
    }

    #[test]
    fn test_merge_and_clear() {
        let mut a = LayerGradients::zeros(1, 2);
        let mut b = LayerGradients::zeros(1, 2);
        b.accumulate(array![2.0].view(), array![1.0, 3.0].view()).unwrap();
        a.merge(&b).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.weights, arr2(&[[4.0, 12.0]]));

        a.clear();
        assert_eq!(a, LayerGradients::zeros(1, 2));
        assert!(a.merge(&LayerGradients::zeros(2, 2)).is_err());
    }

    #[test]
    fn test_merge_rejects_mismatched_biases() {
        let mut a = LayerGradients::zeros(2, 3);

        // A single bias must not be broadcast over every node
        let short = LayerGradients {
            weights: Array2::zeros((2, 3)),
            biases: array![1.0],
        };
        assert!(matches!(a.merge(&short), Err(NetworkError::DimensionMismatch { .. })));

        let long = LayerGradients {
            weights: Array2::ones((2, 3)),
            biases: Array1::zeros(2),
        };
        assert!(matches!(a.merge(&long), Err(NetworkError::DimensionMismatch { .. })));
        assert_eq!(a, LayerGradients::zeros(2, 3));
    }
}
