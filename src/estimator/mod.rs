mod approx;
mod tabular;

pub use approx::ApproxEstimator;
pub use tabular::QTable;

use crate::error::Result;

/// Maps a state-action pair to an estimate of its value and moves that estimate toward
/// a target on request
///
/// This is the storage strategy a [`QAgent`](crate::algo::QAgent) learns with. The agent
/// computes the temporal difference target, the estimator only blends or trains toward it.
///
/// ### Contract
/// - [`value`](ValueEstimator::value) returns `0.0` for a pair that has no estimate yet,
///   only precondition violations (out of range index, wrong state shape) are errors
/// - [`update`](ValueEstimator::update) touches the estimate of the given action and no other
pub trait ValueEstimator<S: ?Sized> {
    /// The current estimate for taking `action` in `state`
    fn value(&self, action: usize, state: &S) -> Result<f32>;

    /// Move the estimate for taking `action` in `state` toward `target`
    fn update(&mut self, action: usize, state: &S, target: f32) -> Result<()>;
}
