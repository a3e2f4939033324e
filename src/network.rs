use std::fmt::Debug;

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use tracing::{debug, trace};

use crate::config::TrainingConfig;
use crate::data::{argmax, DataPoint};
use crate::error::{NetworkError, Result};
use crate::layers::{Layer, LayerGradients, LayerOutput, WeightInit};
use crate::loss::{Loss, SquaredError};

/// A feedforward network: an ordered chain of sigmoid layers where every layer's output
/// count equals the next layer's input count.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    layers: Vec<Layer>,
}

/// Per-layer results of back-propagating one data point.
pub(crate) struct Backpropagation {
    pub(crate) trace: Vec<LayerOutput>,
    pub(crate) node_values: Vec<Array1<f64>>,
    pub(crate) cost: f64,
}

impl NeuralNetwork {
    /// Create a network from layer sizes `[s0, s1, …, sn]`, building `n` randomly
    /// initialized layers where layer `k` maps `s_k` inputs to `s_{k+1}` outputs.
    ///
    /// Sizes may be given as any integer type; negative or zero sizes are rejected with
    /// [`NetworkError::InvalidTopology`], as are fewer than two sizes.
    pub fn new<S>(layer_sizes: &[S]) -> Result<Self>
    where
        S: Copy + Debug + TryInto<usize>,
    {
        Self::with_rng(layer_sizes, &mut rand::thread_rng())
    }

    /// Like [`NeuralNetwork::new`], drawing initial weights from `rng`.
    pub fn with_rng<S, R>(layer_sizes: &[S], rng: &mut R) -> Result<Self>
    where
        S: Copy + Debug + TryInto<usize>,
        R: Rng + ?Sized,
    {
        Self::with_init(layer_sizes, WeightInit::default(), rng)
    }

    pub fn with_init<S, R>(layer_sizes: &[S], init: WeightInit, rng: &mut R) -> Result<Self>
    where
        S: Copy + Debug + TryInto<usize>,
        R: Rng + ?Sized,
    {
        let sizes = topology(layer_sizes)?;
        let layers = sizes
            .windows(2)
            .map(|window| Layer::with_init(window[0], window[1], init, &mut *rng))
            .collect::<Result<Vec<_>>>()?;

        debug!(?sizes, "created neural network");
        Ok(NeuralNetwork { layers })
    }

    /// Assemble a network from pre-built layers, checking that adjacent sizes agree.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(NetworkError::InvalidTopology(
                "a network needs at least one layer".to_string(),
            ));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].num_nodes_out() != pair[1].num_nodes_in() {
                return Err(NetworkError::InvalidTopology(format!(
                    "layer {} produces {} outputs but layer {} expects {} inputs",
                    i,
                    pair[0].num_nodes_out(),
                    i + 1,
                    pair[1].num_nodes_in()
                )));
            }
        }
        Ok(NeuralNetwork { layers })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Mutable access to one layer. Its shape cannot change through this handle, so the
    /// chain stays consistent.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// `[s0, s1, …, sn]` as passed at construction.
    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(self.num_inputs())
            .chain(self.layers.iter().map(Layer::num_nodes_out))
            .collect()
    }

    pub fn num_inputs(&self) -> usize {
        self.layers[0].num_nodes_in()
    }

    pub fn num_outputs(&self) -> usize {
        self.output_layer().num_nodes_out()
    }

    pub fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Feed `inputs` through every layer in order and return the final activations.
    pub fn calculate_outputs(&self, inputs: ArrayView1<f64>) -> Result<Array1<f64>> {
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            current = layer.calculate_outputs(current.view())?.into_activations();
        }
        Ok(current)
    }

    /// Forward pass that keeps every layer's inputs, weighted inputs and activations.
    pub fn forward_trace(&self, inputs: ArrayView1<f64>) -> Result<Vec<LayerOutput>> {
        let mut trace: Vec<LayerOutput> = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let output = match trace.last() {
                Some(previous) => layer.calculate_outputs(previous.activations().view())?,
                None => layer.calculate_outputs(inputs)?,
            };
            trace.push(output);
        }
        Ok(trace)
    }

    /// Index of the highest output: the predicted class.
    pub fn classify(&self, inputs: ArrayView1<f64>) -> Result<usize> {
        let outputs = self.calculate_outputs(inputs)?;
        argmax(outputs.view()).ok_or_else(|| {
            NetworkError::invalid_parameter("inputs", "network produced no comparable output")
        })
    }

    /// Squared-error cost of one data point, summed over the output nodes.
    pub fn cost(&self, data_point: &DataPoint) -> Result<f64> {
        self.validate_data_point(data_point)?;
        let outputs = self.calculate_outputs(data_point.inputs.view())?;
        Ok(output_cost(outputs.view(), data_point.expected_outputs.view()))
    }

    /// Mean cost over `data`.
    pub fn batch_cost(&self, data: &[DataPoint]) -> Result<f64> {
        if data.is_empty() {
            return Err(NetworkError::EmptyBatch("cost"));
        }
        let mut total_cost = 0.0;
        for data_point in data {
            total_cost += self.cost(data_point)?;
        }
        Ok(total_cost / data.len() as f64)
    }

    /// Fraction of `data` whose predicted class equals its label.
    pub fn accuracy(&self, data: &[DataPoint]) -> Result<f64> {
        if data.is_empty() {
            return Err(NetworkError::EmptyBatch("accuracy"));
        }
        let mut correct = 0usize;
        for data_point in data {
            self.validate_data_point(data_point)?;
            if Some(self.classify(data_point.inputs.view())?) == data_point.label() {
                correct += 1;
            }
        }
        Ok(correct as f64 / data.len() as f64)
    }

    /// One gradient-descent step over `batch`, applying the mean gradient scaled by
    /// `learn_rate`.
    ///
    /// Returns the batch's mean cost measured before the update.
    pub fn learn(&mut self, batch: &[DataPoint], learn_rate: f64) -> Result<f64> {
        self.train(batch, &TrainingConfig::new(learn_rate))
    }

    /// [`NeuralNetwork::learn`] with per-point gradients computed on the rayon thread pool.
    pub fn learn_parallel(&mut self, batch: &[DataPoint], learn_rate: f64) -> Result<f64> {
        self.train(batch, &TrainingConfig::new(learn_rate).with_parallel(true))
    }

    /// One gradient-descent step over `batch` as described by `config`.
    ///
    /// Every precondition is checked before any layer is touched. Returns the batch's mean
    /// cost measured before the update.
    pub fn train(&mut self, batch: &[DataPoint], config: &TrainingConfig) -> Result<f64> {
        config.validate()?;
        self.validate_batch(batch)?;

        let total_cost = if config.parallel {
            let (gradients, total_cost) = self.batch_gradients_parallel(batch)?;
            self.clear_all_gradients();
            for (layer, layer_gradients) in self.layers.iter_mut().zip(&gradients) {
                layer.merge_gradients(layer_gradients)?;
            }
            total_cost
        } else {
            self.clear_all_gradients();
            let mut total_cost = 0.0;
            for data_point in batch {
                total_cost += self.update_all_gradients(data_point)?;
            }
            total_cost
        };

        let learn_rate = config.effective_learn_rate(batch.len());
        self.apply_all_gradients(learn_rate);

        let cost = total_cost / batch.len() as f64;
        debug!(
            batch_size = batch.len(),
            learn_rate,
            parallel = config.parallel,
            cost,
            "applied training step"
        );
        Ok(cost)
    }

    /// Back-propagate one data point and add its gradients to every layer's accumulators.
    ///
    /// Returns the point's cost under the current parameters.
    pub fn update_all_gradients(&mut self, data_point: &DataPoint) -> Result<f64> {
        self.validate_data_point(data_point)?;
        let backprop = self.backpropagate(data_point)?;
        for ((layer, forward), node_values) in self
            .layers
            .iter_mut()
            .zip(&backprop.trace)
            .zip(&backprop.node_values)
        {
            layer.update_gradients(forward, node_values.view())?;
        }
        Ok(backprop.cost)
    }

    pub fn apply_all_gradients(&mut self, learn_rate: f64) {
        for layer in &mut self.layers {
            layer.apply_gradients(learn_rate);
        }
    }

    pub fn clear_all_gradients(&mut self) {
        for layer in &mut self.layers {
            layer.clear_gradients();
        }
    }

    /// Summed gradients of `batch` without touching the layers' own accumulators,
    /// together with the summed cost.
    pub fn batch_gradients(&self, batch: &[DataPoint]) -> Result<(Vec<LayerGradients>, f64)> {
        self.validate_batch(batch)?;
        let mut gradients = self.zero_gradients();
        let mut total_cost = 0.0;
        for data_point in batch {
            total_cost += self.accumulate_into(&mut gradients, data_point)?;
        }
        Ok((gradients, total_cost))
    }

    pub(crate) fn zero_gradients(&self) -> Vec<LayerGradients> {
        self.layers
            .iter()
            .map(|layer| LayerGradients::zeros(layer.num_nodes_in(), layer.num_nodes_out()))
            .collect()
    }

    pub(crate) fn accumulate_into(&self, gradients: &mut [LayerGradients], data_point: &DataPoint) -> Result<f64> {
        let backprop = self.backpropagate(data_point)?;
        for ((layer_gradients, forward), node_values) in gradients
            .iter_mut()
            .zip(&backprop.trace)
            .zip(&backprop.node_values)
        {
            layer_gradients.accumulate(forward.inputs().view(), node_values.view())?;
        }
        Ok(backprop.cost)
    }

    /// Forward pass, output-layer error signal, then hidden-layer error signals from the
    /// last layer back to the first.
    pub(crate) fn backpropagate(&self, data_point: &DataPoint) -> Result<Backpropagation> {
        let trace = self.forward_trace(data_point.inputs.view())?;
        let last = self.layers.len() - 1;
        let expected = data_point.expected_outputs.view();
        let cost = output_cost(trace[last].activations().view(), expected);

        let mut current = self.layers[last].calculate_output_layer_node_values(&trace[last], expected)?;
        let mut node_values = Vec::with_capacity(self.layers.len());
        for i in (0..last).rev() {
            let hidden = self.layers[i].calculate_hidden_layer_node_values(
                &trace[i],
                &self.layers[i + 1],
                current.view(),
            )?;
            node_values.push(std::mem::replace(&mut current, hidden));
        }
        node_values.push(current);
        node_values.reverse();

        trace!(cost, "back-propagated data point");
        Ok(Backpropagation {
            trace,
            node_values,
            cost,
        })
    }

    pub fn validate_data_point(&self, data_point: &DataPoint) -> Result<()> {
        NetworkError::check_len("network inputs", self.num_inputs(), data_point.inputs.len())?;
        NetworkError::check_len(
            "expected outputs",
            self.num_outputs(),
            data_point.expected_outputs.len(),
        )
    }

    pub(crate) fn validate_batch(&self, batch: &[DataPoint]) -> Result<()> {
        if batch.is_empty() {
            return Err(NetworkError::EmptyBatch("training"));
        }
        batch
            .iter()
            .try_for_each(|data_point| self.validate_data_point(data_point))
    }
}

/// Sum of node costs of the output layer.
fn output_cost(activations: ArrayView1<f64>, expected: ArrayView1<f64>) -> f64 {
    SquaredError.compute(activations, expected)
}

fn topology<S>(layer_sizes: &[S]) -> Result<Vec<usize>>
where
    S: Copy + Debug + TryInto<usize>,
{
    if layer_sizes.len() < 2 {
        return Err(NetworkError::InvalidTopology(format!(
            "need at least two layer sizes, got {}",
            layer_sizes.len()
        )));
    }
    layer_sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| match size.try_into() {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(NetworkError::InvalidTopology(format!(
                "layer size {:?} at position {} must be positive",
                size, i
            ))),
        })
        .collect()
}
