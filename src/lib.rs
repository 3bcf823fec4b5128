/// Implemented RL algorithms
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Environment
pub mod env;

/// Error types
pub mod error;

/// Value estimators, the storage strategies an agent learns with
pub mod estimator;

/// Exploration policies
pub mod exploration;

/// Transitions
pub mod memory;

/// Regression models for function approximation
pub mod regressor;

/// Episode driver
pub mod trainer;

mod util;

pub use error::{Error, Result};
