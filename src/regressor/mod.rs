mod mlp;

pub use mlp::{Mlp, MlpRegressor, MlpRegressorConfig};

use crate::error::{Error, Result};

/// A model that learns to predict a scalar from a feature vector one sample at a time
///
/// Used by the [`ApproxEstimator`](crate::estimator::ApproxEstimator) to estimate the value
/// of one action over a continuous state space.
pub trait Regressor {
    /// The number of features the model expects
    fn input_size(&self) -> usize;

    /// Whether the model has been trained on at least one sample
    fn is_fitted(&self) -> bool;

    /// Predict the target for `input`
    ///
    /// **Errors**
    /// - [`Error::DimensionMismatch`](crate::error::Error::DimensionMismatch) if `input` has the wrong length
    /// - [`Error::NotFitted`](crate::error::Error::NotFitted) if the model has not been trained yet
    fn predict(&self, input: &[f32]) -> Result<f32>;

    /// Perform one training step toward `target` for `input`
    fn partial_fit(&mut self, input: &[f32], target: f32) -> Result<()>;
}

/// Fail with a dimension mismatch unless `input` has `expected` features
pub(crate) fn check_input(input: &[f32], expected: usize) -> Result<()> {
    if input.len() == expected {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            expected,
            got: input.len(),
        })
    }
}
