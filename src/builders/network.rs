use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::Result;
use crate::layers::WeightInit;
use crate::network::NeuralNetwork;

/// Builder for constructing neural networks with a fluent API
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    layer_sizes: Vec<usize>,
    weight_init: WeightInit,
    seed: Option<u64>,
}

impl NetworkBuilder {
    /// Create a new network builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a network taking `size` inputs
    pub fn input(size: usize) -> Self {
        Self::new().add_layer(size)
    }

    /// Append a layer boundary of `size` nodes
    pub fn add_layer(mut self, size: usize) -> Self {
        self.layer_sizes.push(size);
        self
    }

    /// Replace all layer sizes at once
    pub fn layer_sizes(mut self, layer_sizes: &[usize]) -> Self {
        self.layer_sizes = layer_sizes.to_vec();
        self
    }

    pub fn weight_init(mut self, weight_init: WeightInit) -> Self {
        self.weight_init = weight_init;
        self
    }

    /// Draw initial weights from a generator seeded with `seed` for reproducible networks
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the neural network
    pub fn build(self) -> Result<NeuralNetwork> {
        match self.seed {
            Some(seed) => NeuralNetwork::with_init(
                &self.layer_sizes,
                self.weight_init,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => NeuralNetwork::with_init(&self.layer_sizes, self.weight_init, &mut rand::thread_rng()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    #[test]
    fn test_network_builder() {
        let network = NetworkBuilder::input(4)
            .add_layer(8)
            .add_layer(3)
            .seed(1)
            .build()
            .unwrap();

        assert_eq!(network.layer_sizes(), vec![4, 8, 3]);
        assert_eq!(network.layers().len(), 2);
    }

    #[test]
    fn test_seeded_builds_are_identical() {
        let a = NetworkBuilder::new().layer_sizes(&[3, 5, 2]).seed(42).build().unwrap();
        let b = NetworkBuilder::new().layer_sizes(&[3, 5, 2]).seed(42).build().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_weight_init_is_used() {
        let network = NetworkBuilder::new()
            .layer_sizes(&[2, 2])
            .weight_init(WeightInit::Zeros)
            .build()
            .unwrap();
        assert!(network.layers()[0].weights().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_builder_errors() {
        // No layers
        assert!(matches!(
            NetworkBuilder::new().build(),
            Err(NetworkError::InvalidTopology(_))
        ));

        // Zero-sized layer
        assert!(NetworkBuilder::input(3).add_layer(0).build().is_err());

        // Empty uniform range
        let result = NetworkBuilder::input(2)
            .add_layer(1)
            .weight_init(WeightInit::Uniform { min: 1.0, max: -1.0 })
            .build();
        assert!(matches!(result, Err(NetworkError::InvalidParameter { .. })));
    }
}
