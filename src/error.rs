use thiserror::Error;

/// Errors produced by estimators, regressors and agent configuration
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The regressor has not seen any training data yet
    #[error("regressor has not been fitted yet")]
    NotFitted,

    #[error("state has {got} features but the model expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("state {state} is out of range for a table with {states} states")]
    StateOutOfRange { state: usize, states: usize },

    #[error("action {action} is out of range for {actions} actions")]
    ActionOutOfRange { action: usize, actions: usize },

    #[error("invalid value {value} for `{name}`, must be in the interval {interval}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        interval: String,
    },

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
}

/// Convenience alias for results using the crate's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
