pub mod q_learning;

pub use q_learning::{QAgent, QAgentConfig};
