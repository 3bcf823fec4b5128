use crate::{
    env::DiscreteStateSpace,
    error::{Error, Result},
    util::ensure_interval,
};

use super::ValueEstimator;

/// A dense Q-table with one entry per state-action pair
///
/// Every entry starts at `0.0` and is only ever changed by [`update`](ValueEstimator::update),
/// which blends the old value with the target:
///
/// Q(s, a) ← (1 - α) Q(s, a) + α target
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    table: Vec<f32>,
    states: usize,
    actions: usize,
    alpha: f32, // learning rate
}

impl QTable {
    /// Initialize a zeroed table of `states` × `actions` entries
    ///
    /// **Errors** if `alpha` is not in the interval `(0,1]`
    pub fn new(states: usize, actions: usize, alpha: f32) -> Result<Self> {
        ensure_interval!(alpha, 0.0, 1.0, open, closed);
        Ok(Self {
            table: vec![0.0; states * actions],
            states,
            actions,
            alpha,
        })
    }

    /// Initialize a table sized for the state and action spaces of `env`
    pub fn for_env<E: DiscreteStateSpace>(env: &E, alpha: f32) -> Result<Self> {
        Self::new(env.state_space_size(), env.action_space_size(), alpha)
    }

    pub fn states(&self) -> usize {
        self.states
    }

    pub fn actions(&self) -> usize {
        self.actions
    }

    /// Get the value of a state-action pair, `None` if either index is out of range
    pub fn get(&self, state: usize, action: usize) -> Option<f32> {
        self.index(state, action).ok().map(|i| self.table[i])
    }

    /// The values of every action in `state`
    pub fn row(&self, state: usize) -> Option<&[f32]> {
        (state < self.states).then(|| &self.table[state * self.actions..(state + 1) * self.actions])
    }

    fn index(&self, state: usize, action: usize) -> Result<usize> {
        if state >= self.states {
            return Err(Error::StateOutOfRange {
                state,
                states: self.states,
            });
        }
        if action >= self.actions {
            return Err(Error::ActionOutOfRange {
                action,
                actions: self.actions,
            });
        }
        Ok(state * self.actions + action)
    }
}

impl ValueEstimator<usize> for QTable {
    fn value(&self, action: usize, state: &usize) -> Result<f32> {
        Ok(self.table[self.index(*state, action)?])
    }

    fn update(&mut self, action: usize, state: &usize, target: f32) -> Result<()> {
        let i = self.index(*state, action)?;
        let q_value = self.table[i];
        self.table[i] = (1.0 - self.alpha) * q_value + self.alpha * target;
        Ok(())
    }
}
