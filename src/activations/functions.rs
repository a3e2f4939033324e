use ndarray::{Array1, ArrayView1};

/// The logistic sigmoid `σ(z) = 1 / (1 + e^-z)` and its derivative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sigmoid;

impl Sigmoid {
    /// Evaluate `σ(z)`.
    ///
    /// For large negative `z` the exponential overflows to infinity and the result
    /// saturates to `0.0`, so callers never see a NaN for finite input.
    #[inline]
    pub fn value(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    /// Evaluate `σ'(z) = σ(z)(1 - σ(z))`.
    #[inline]
    pub fn derivative(z: f64) -> f64 {
        let s = Self::value(z);
        s * (1.0 - s)
    }

    /// Apply the sigmoid to an input array in-place.
    pub fn apply(input: &mut Array1<f64>) {
        input.mapv_inplace(Self::value);
    }

    /// Compute the derivative for every element of `input`, treating each as a weighted input.
    pub fn derivative_array(input: ArrayView1<f64>) -> Array1<f64> {
        input.mapv(Self::derivative)
    }
}
