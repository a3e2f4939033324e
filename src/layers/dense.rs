use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use tracing::trace;

use super::gradients::{LayerGradients, LayerOutput};
use super::initialization::WeightInit;
use crate::activations::Sigmoid;
use crate::error::{NetworkError, Result};
use crate::loss::{Loss, SquaredError};

// Source of parameter generations. Unique across every layer in the process, so a
// forward pass is only accepted by the layer state that produced it.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// A fully connected sigmoid layer: one affine transform followed by `σ`.
///
/// `weights` has shape `(num_nodes_in, num_nodes_out)`: row = input node,
/// column = output node.
///
/// Equality compares parameters and accumulators, not the generation stamp.
#[derive(Debug, Clone)]
pub struct Layer {
    weights: Array2<f64>,
    biases: Array1<f64>,
    gradients: LayerGradients,
    generation: u64,
}

impl Layer {
    /// Create a new layer with randomly initialized weights and zero biases.
    ///
    /// Uses the thread-local generator; see [`Layer::with_rng`] for reproducible layers.
    pub fn new(num_nodes_in: usize, num_nodes_out: usize) -> Result<Self> {
        Self::with_rng(num_nodes_in, num_nodes_out, &mut rand::thread_rng())
    }

    /// Create a new layer drawing its initial weights from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(num_nodes_in: usize, num_nodes_out: usize, rng: &mut R) -> Result<Self> {
        Self::with_init(num_nodes_in, num_nodes_out, WeightInit::default(), rng)
    }

    /// Create a new layer using the given initialization strategy.
    pub fn with_init<R: Rng + ?Sized>(
        num_nodes_in: usize,
        num_nodes_out: usize,
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        if num_nodes_in == 0 || num_nodes_out == 0 {
            return Err(NetworkError::InvalidDimension {
                num_nodes_in,
                num_nodes_out,
            });
        }
        init.validate()?;

        trace!(num_nodes_in, num_nodes_out, ?init, "creating layer");
        Ok(Layer {
            weights: init.initialize_weights((num_nodes_in, num_nodes_out), rng),
            biases: init.initialize_biases(num_nodes_out),
            gradients: LayerGradients::zeros(num_nodes_in, num_nodes_out),
            generation: next_generation(),
        })
    }

    pub fn with_weights(mut self, weights: Array2<f64>) -> Result<Self> {
        self.set_weights(weights)?;
        Ok(self)
    }

    pub fn with_biases(mut self, biases: Array1<f64>) -> Result<Self> {
        self.set_biases(biases)?;
        Ok(self)
    }

    /// Replace the weight matrix. Invalidates every outstanding [`LayerOutput`].
    pub fn set_weights(&mut self, weights: Array2<f64>) -> Result<()> {
        if weights.dim() != self.weights.dim() {
            return Err(NetworkError::dimension_mismatch(
                format!("weights of shape {:?}", self.weights.dim()),
                format!("{:?}", weights.dim()),
            ));
        }
        self.weights = weights;
        self.generation = next_generation();
        Ok(())
    }

    /// Replace the bias vector. Invalidates every outstanding [`LayerOutput`].
    pub fn set_biases(&mut self, biases: Array1<f64>) -> Result<()> {
        NetworkError::check_len("biases", self.num_nodes_out(), biases.len())?;
        self.biases = biases;
        self.generation = next_generation();
        Ok(())
    }

    pub fn num_nodes_in(&self) -> usize {
        self.weights.nrows()
    }

    pub fn num_nodes_out(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn biases(&self) -> &Array1<f64> {
        &self.biases
    }

    pub fn cost_gradient_weights(&self) -> &Array2<f64> {
        &self.gradients.weights
    }

    pub fn cost_gradient_biases(&self) -> &Array1<f64> {
        &self.gradients.biases
    }

    pub fn gradients(&self) -> &LayerGradients {
        &self.gradients
    }

    /// Stamp of the current parameters. Changes on every parameter update and is never
    /// shared between two independently changed layers.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forward pass for a single input vector.
    ///
    /// Computes `weighted_input[o] = bias[o] + Σ_i inputs[i] * weight[i][o]` and
    /// `activation[o] = σ(weighted_input[o])`, returning both together with the inputs.
    pub fn calculate_outputs(&self, inputs: ArrayView1<f64>) -> Result<LayerOutput> {
        NetworkError::check_len("layer inputs", self.num_nodes_in(), inputs.len())?;

        let weighted_inputs = inputs.dot(&self.weights) + &self.biases;
        let mut activations = weighted_inputs.clone();
        Sigmoid::apply(&mut activations);

        trace!(generation = self.generation, "layer forward pass");
        Ok(LayerOutput {
            inputs: inputs.to_owned(),
            weighted_inputs,
            activations,
            generation: self.generation,
        })
    }

    /// Error signal `∂cost/∂weighted_input` for the output layer.
    ///
    /// `nodeValue[i] = σ'(z_i) * 2(a_i - e_i)`.
    pub fn calculate_output_layer_node_values(
        &self,
        forward: &LayerOutput,
        expected_outputs: ArrayView1<f64>,
    ) -> Result<Array1<f64>> {
        self.check_forward(forward)?;
        NetworkError::check_len("expected outputs", self.num_nodes_out(), expected_outputs.len())?;

        let cost_derivative = SquaredError.gradient(forward.activations.view(), expected_outputs);
        Ok(Sigmoid::derivative_array(forward.weighted_inputs.view()) * cost_derivative)
    }

    /// Back-propagate `next_node_values` through `next_layer`'s weights into this layer.
    ///
    /// `nodeValue[o] = σ'(z_o) * Σ_k next.weight[o][k] * next_node_values[k]`.
    pub fn calculate_hidden_layer_node_values(
        &self,
        forward: &LayerOutput,
        next_layer: &Layer,
        next_node_values: ArrayView1<f64>,
    ) -> Result<Array1<f64>> {
        self.check_forward(forward)?;
        NetworkError::check_len("next layer inputs", self.num_nodes_out(), next_layer.num_nodes_in())?;
        NetworkError::check_len("next node values", next_layer.num_nodes_out(), next_node_values.len())?;

        let propagated = next_layer.weights.dot(&next_node_values);
        Ok(Sigmoid::derivative_array(forward.weighted_inputs.view()) * propagated)
    }

    /// Accumulate this data point's partial derivatives into the cost gradients.
    ///
    /// The weight gradient uses the inputs recorded in `forward`. Repeated calls sum; callers
    /// clear with [`Layer::clear_gradients`] before a batch.
    pub fn update_gradients(&mut self, forward: &LayerOutput, node_values: ArrayView1<f64>) -> Result<()> {
        self.check_forward(forward)?;
        self.gradients.accumulate(forward.inputs.view(), node_values)
    }

    /// Sum gradients accumulated elsewhere (e.g. by a worker thread) into this layer.
    pub fn merge_gradients(&mut self, gradients: &LayerGradients) -> Result<()> {
        self.gradients.merge(gradients)
    }

    /// Gradient descent step: `w -= learn_rate * grad_w`, `b -= learn_rate * grad_b`.
    ///
    /// Accumulators are left untouched.
    pub fn apply_gradients(&mut self, learn_rate: f64) {
        self.weights.scaled_add(-learn_rate, &self.gradients.weights);
        self.biases.scaled_add(-learn_rate, &self.gradients.biases);
        self.generation = next_generation();
        trace!(learn_rate, generation = self.generation, "applied layer gradients");
    }

    /// Direct access to one weight for finite-difference probing. Counts as a parameter change.
    pub(crate) fn weight_mut(&mut self, node_in: usize, node_out: usize) -> &mut f64 {
        self.generation = next_generation();
        &mut self.weights[[node_in, node_out]]
    }

    pub(crate) fn bias_mut(&mut self, node_out: usize) -> &mut f64 {
        self.generation = next_generation();
        &mut self.biases[node_out]
    }

    pub fn clear_gradients(&mut self) {
        self.gradients.clear();
    }

    /// `σ(z)`
    pub fn activation_function(weighted_input: f64) -> f64 {
        Sigmoid::value(weighted_input)
    }

    /// `σ'(z)`
    pub fn activation_function_derivative(weighted_input: f64) -> f64 {
        Sigmoid::derivative(weighted_input)
    }

    /// `(a - e)^2`
    pub fn node_cost(output_activation: f64, expected_output: f64) -> f64 {
        SquaredError.node_cost(output_activation, expected_output)
    }

    /// `2(a - e)`
    pub fn node_cost_derivative(output_activation: f64, expected_output: f64) -> f64 {
        SquaredError.node_cost_derivative(output_activation, expected_output)
    }

    fn check_forward(&self, forward: &LayerOutput) -> Result<()> {
        if forward.generation != self.generation {
            return Err(NetworkError::StaleForwardPass {
                expected: self.generation,
                actual: forward.generation,
            });
        }
        NetworkError::check_len("forward pass inputs", self.num_nodes_in(), forward.inputs.len())?;
        NetworkError::check_len("forward pass outputs", self.num_nodes_out(), forward.weighted_inputs.len())
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.weights == other.weights && self.biases == other.biases && self.gradients == other.gradients
    }
}
