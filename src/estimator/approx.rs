use log::trace;

use crate::{
    error::{Error, Result},
    regressor::Regressor,
};

use super::ValueEstimator;

/// Estimates action values over continuous states with one independent [`Regressor`] per action
///
/// The models are created once, when the estimator is built, and are only ever trained
/// incrementally afterwards. Training the model of one action never affects another.
///
/// An action whose model has not been trained yet is valued at `0.0`.
pub struct ApproxEstimator<R: Regressor> {
    models: Vec<R>,
}

impl<R: Regressor> ApproxEstimator<R> {
    /// Build one model per action with `factory`, which receives the action index
    pub fn new(actions: usize, factory: impl FnMut(usize) -> R) -> Self {
        Self {
            models: (0..actions).map(factory).collect(),
        }
    }

    pub fn actions(&self) -> usize {
        self.models.len()
    }

    pub fn models(&self) -> &[R] {
        &self.models
    }

    /// The model estimating the value of `action`
    pub fn model(&self, action: usize) -> Result<&R> {
        self.models.get(action).ok_or(Error::ActionOutOfRange {
            action,
            actions: self.models.len(),
        })
    }

    fn model_mut(&mut self, action: usize) -> Result<&mut R> {
        let actions = self.models.len();
        self.models
            .get_mut(action)
            .ok_or(Error::ActionOutOfRange { action, actions })
    }
}

impl<R, S> ValueEstimator<S> for ApproxEstimator<R>
where
    R: Regressor,
    S: AsRef<[f32]> + ?Sized,
{
    fn value(&self, action: usize, state: &S) -> Result<f32> {
        match self.model(action)?.predict(state.as_ref()) {
            Err(Error::NotFitted) => {
                trace!("model for action {action} is not fitted yet, valuing it at 0");
                Ok(0.0)
            }
            result => result,
        }
    }

    fn update(&mut self, action: usize, state: &S, target: f32) -> Result<()> {
        self.model_mut(action)?.partial_fit(state.as_ref(), target)
    }
}
