//! Training examples handed to the network by the data loader.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// One training example: an input vector and the outputs the network should produce for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub inputs: Array1<f64>,
    pub expected_outputs: Array1<f64>,
    #[serde(default)]
    pub label: Option<usize>,
}

impl DataPoint {
    pub fn new(inputs: Array1<f64>, expected_outputs: Array1<f64>) -> Self {
        DataPoint {
            inputs,
            expected_outputs,
            label: None,
        }
    }

    pub fn from_vecs(inputs: Vec<f64>, expected_outputs: Vec<f64>) -> Self {
        Self::new(Array1::from_vec(inputs), Array1::from_vec(expected_outputs))
    }

    /// A classification example whose expected outputs are the one-hot encoding of `label`.
    pub fn one_hot(inputs: Array1<f64>, label: usize, num_labels: usize) -> Result<Self> {
        if label >= num_labels {
            return Err(NetworkError::invalid_parameter(
                "label".to_string(),
                format!("{} is out of range for {} labels", label, num_labels),
            ));
        }
        let mut expected_outputs = Array1::zeros(num_labels);
        expected_outputs[label] = 1.0;
        Ok(DataPoint {
            inputs,
            expected_outputs,
            label: Some(label),
        })
    }

    /// The class this example belongs to: the stored label, or else the index of the
    /// largest expected output.
    pub fn label(&self) -> Option<usize> {
        self.label.or_else(|| argmax(self.expected_outputs.view()))
    }
}

/// Index of the largest value, the first one on ties. `None` for an empty vector.
///
/// NaN entries never win a comparison.
pub fn argmax(values: ArrayView1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, max)| v > max) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}
