//! Data-parallel gradient accumulation using rayon.
//!
//! Each worker back-propagates its share of the batch into a private set of
//! [`LayerGradients`]; the partial sums are merged before the network applies a single
//! update. Forward passes only read the layers, so workers never share mutable state.

use rayon::prelude::*;

use crate::data::DataPoint;
use crate::error::Result;
use crate::layers::LayerGradients;
use crate::network::NeuralNetwork;

impl NeuralNetwork {
    /// Parallel counterpart of [`NeuralNetwork::batch_gradients`]: summed gradients and
    /// summed cost of `batch`.
    pub fn batch_gradients_parallel(&self, batch: &[DataPoint]) -> Result<(Vec<LayerGradients>, f64)> {
        self.validate_batch(batch)?;
        let identity = || (self.zero_gradients(), 0.0);

        batch
            .par_iter()
            .try_fold(identity, |(mut gradients, total_cost), data_point| -> Result<_> {
                let cost = self.accumulate_into(&mut gradients, data_point)?;
                Ok((gradients, total_cost + cost))
            })
            .try_reduce(identity, |(mut left, left_cost), (right, right_cost)| -> Result<_> {
                for (l, r) in left.iter_mut().zip(&right) {
                    l.merge(r)?;
                }
                Ok((left, left_cost + right_cost))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn batch() -> Vec<DataPoint> {
        (0..17)
            .map(|i| {
                let x = i as f64 / 17.0;
                DataPoint::from_vecs(vec![x, 1.0 - x, x * x], vec![x, 1.0 - x])
            })
            .collect()
    }

    #[test]
    fn test_parallel_gradients_match_sequential() {
        let network = NeuralNetwork::with_rng(&[3usize, 5, 2], &mut StdRng::seed_from_u64(3)).unwrap();
        let data = batch();

        let (sequential, sequential_cost) = network.batch_gradients(&data).unwrap();
        let (parallel, parallel_cost) = network.batch_gradients_parallel(&data).unwrap();

        assert!((sequential_cost - parallel_cost).abs() < 1e-9);
        for (s, p) in sequential.iter().zip(&parallel) {
            assert!(s.max_abs_difference(p) < 1e-9);
        }
    }

    #[test]
    fn test_parallel_learn_matches_sequential_learn() {
        let mut sequential = NeuralNetwork::with_rng(&[3usize, 4, 2], &mut StdRng::seed_from_u64(11)).unwrap();
        let mut parallel = sequential.clone();
        let data = batch();

        sequential.learn(&data, 0.5).unwrap();
        parallel.learn_parallel(&data, 0.5).unwrap();

        for (s, p) in sequential.layers().iter().zip(parallel.layers()) {
            let diff = (s.weights() - p.weights()).mapv(f64::abs).fold(0.0, |a: f64, &b| a.max(b));
            assert!(diff < 1e-9);
        }
    }
}
