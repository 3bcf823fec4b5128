/// Represents a single experience or transition in the environment
///
/// Transitions are consumed as soon as they are produced, there is no replay.
#[derive(Debug, Clone, PartialEq)]
pub struct Exp<S> {
    /// The state of the environment before taking the action
    pub state: S,
    /// The action taken in the given state
    pub action: usize,
    /// The reward received after taking the action
    pub reward: f32,
    /// The state of the environment after the action is taken, or if terminal, `None`
    pub next_state: Option<S>,
}

impl<S> Exp<S> {
    /// Whether the transition ended the episode
    pub fn is_terminal(&self) -> bool {
        self.next_state.is_none()
    }
}
