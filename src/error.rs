use thiserror::Error;

/// Result type for network operations
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Main error type for the network core.
///
/// Every variant is a precondition violation detected before any layer state is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// A layer was requested with zero input or output nodes
    #[error("Invalid layer dimension: {num_nodes_in} inputs, {num_nodes_out} outputs")]
    InvalidDimension {
        num_nodes_in: usize,
        num_nodes_out: usize,
    },

    /// A vector or matrix does not have the length/shape the layer expects
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Layer sizes do not describe a valid network
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Cost, accuracy or training requested over zero data points
    #[error("Empty batch: {0} requires at least one data point")]
    EmptyBatch(&'static str),

    /// A forward pass was used after the layer's parameters changed
    #[error("Stale forward pass: produced at generation {actual}, layer is at generation {expected}")]
    StaleForwardPass {
        expected: u64,
        actual: u64,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },
}

// Helper functions for common error patterns
impl NetworkError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        NetworkError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        NetworkError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Checks that a vector has exactly `expected` entries.
    pub(crate) fn check_len(what: &str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(NetworkError::dimension_mismatch(
                format!("{} of length {}", what, expected),
                format!("length {}", actual),
            ))
        }
    }
}
