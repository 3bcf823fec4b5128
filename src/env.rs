/// Represents an environment an agent can learn in, with a finite set of actions
/// indexed `0..action_space_size()`.
///
/// The agent only ever reads from the environment through [`legal_actions`](Environment::legal_actions).
/// Stepping and resetting belong to whatever drives the episodes, such as the
/// [`Trainer`](crate::trainer::Trainer).
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// Get the actions available in `state`
    ///
    /// The order of the returned actions is significant, greedy action selection
    /// breaks ties in favor of the action that comes first.
    ///
    /// The returned vector should never be empty, instead specify an action that represents doing nothing if necessary.
    fn legal_actions(&self, state: &Self::State) -> Vec<usize>;

    /// The total number of actions
    fn action_space_size(&self) -> usize;

    /// Update the environment in response to an action taken by an agent, producing a new state and associated reward
    ///
    /// **Returns** `(next_state, reward)`, where `next_state` is `None` if the episode reached a terminal state
    fn step(&mut self, action: usize) -> (Option<Self::State>, f32);

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;
}

/// An [`Environment`] whose states are indices `0..state_space_size()`, required by a
/// [`QTable`](crate::estimator::QTable)
pub trait DiscreteStateSpace: Environment<State = usize> {
    fn state_space_size(&self) -> usize;
}

/// Every action in `0..n`, for environments whose legal actions don't depend on the state
pub fn full_action_range(n: usize) -> Vec<usize> {
    (0..n).collect()
}
