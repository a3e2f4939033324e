use crate::data::DataPoint;
use crate::error::{NetworkError, Result};
use crate::layers::LayerGradients;
use crate::network::NeuralNetwork;

#[derive(Clone, Copy)]
enum Parameter {
    Weight {
        layer: usize,
        node_in: usize,
        node_out: usize,
    },
    Bias {
        layer: usize,
        node_out: usize,
    },
}

fn parameter_mut(network: &mut NeuralNetwork, parameter: Parameter) -> &mut f64 {
    match parameter {
        Parameter::Weight {
            layer,
            node_in,
            node_out,
        } => network.layers_mut()[layer].weight_mut(node_in, node_out),
        Parameter::Bias { layer, node_out } => network.layers_mut()[layer].bias_mut(node_out),
    }
}

/// Central difference of the mean batch cost with respect to one parameter.
///
/// The parameter is restored to its exact original value even when a cost evaluation fails.
fn central_difference(
    network: &mut NeuralNetwork,
    batch: &[DataPoint],
    parameter: Parameter,
    h: f64,
) -> Result<f64> {
    let original = *parameter_mut(network, parameter);

    *parameter_mut(network, parameter) = original + h;
    let cost_plus = network.batch_cost(batch);
    *parameter_mut(network, parameter) = original - h;
    let cost_minus = network.batch_cost(batch);
    *parameter_mut(network, parameter) = original;

    Ok((cost_plus? - cost_minus?) / (2.0 * h))
}

/// Estimate the gradient of the mean batch cost for every weight and bias by nudging each
/// parameter by `±h`.
///
/// Costs two full batch evaluations per parameter; meant for checking back-propagation on
/// small networks.
pub fn numerical_gradients(
    network: &mut NeuralNetwork,
    batch: &[DataPoint],
    h: f64,
) -> Result<Vec<LayerGradients>> {
    if !(h.is_finite() && h > 0.0) {
        return Err(NetworkError::invalid_parameter(
            "h".to_string(),
            format!("step must be finite and positive, got {}", h),
        ));
    }
    network.validate_batch(batch)?;

    let mut gradients = network.zero_gradients();
    for (layer, layer_gradients) in gradients.iter_mut().enumerate() {
        let (num_nodes_in, num_nodes_out) = layer_gradients.weights.dim();
        for node_in in 0..num_nodes_in {
            for node_out in 0..num_nodes_out {
                let parameter = Parameter::Weight {
                    layer,
                    node_in,
                    node_out,
                };
                layer_gradients.weights[[node_in, node_out]] =
                    central_difference(network, batch, parameter, h)?;
            }
        }
        for node_out in 0..num_nodes_out {
            let parameter = Parameter::Bias { layer, node_out };
            layer_gradients.biases[node_out] = central_difference(network, batch, parameter, h)?;
        }
    }
    Ok(gradients)
}

/// Largest absolute difference between the back-propagated mean gradient and the
/// finite-difference estimate, over every parameter of the network.
pub fn max_gradient_error(network: &mut NeuralNetwork, batch: &[DataPoint], h: f64) -> Result<f64> {
    let numerical = numerical_gradients(network, batch, h)?;
    let (mut analytic, _) = network.batch_gradients(batch)?;

    let scale = 1.0 / batch.len() as f64;
    analytic.iter_mut().for_each(|gradients| gradients.scale(scale));

    Ok(analytic
        .iter()
        .zip(&numerical)
        .map(|(a, n)| a.max_abs_difference(n))
        .fold(0.0, f64::max))
}
