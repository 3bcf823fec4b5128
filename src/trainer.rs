use log::{debug, info};

use crate::{
    algo::QAgent,
    decay::{Constant, Decay},
    env::Environment,
    error::Result,
    estimator::ValueEstimator,
};

/// Configuration for the [`Trainer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerConfig {
    /// Number of episodes the agent learns in
    ///
    /// **Default**: `1000`
    pub train_episodes: usize,
    /// Number of greedy episodes run after training, without learning
    ///
    /// **Default**: `100`
    pub val_episodes: usize,
    /// Cut an episode short after this many steps
    ///
    /// **Default**: `Some(100)`
    pub max_episode_steps: Option<usize>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            train_episodes: 1000,
            val_episodes: 100,
            max_episode_steps: Some(100),
        }
    }
}

/// Summary of a single episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Episode {
    pub steps: usize,
    pub reward: f32,
    /// Whether the step limit ended the episode before a terminal state was reached
    pub truncated: bool,
}

/// Episodes recorded by [`Trainer::run`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub train: Vec<Episode>,
    pub val: Vec<Episode>,
}

impl History {
    pub fn train_steps(&self) -> Vec<f32> {
        self.train.iter().map(|e| e.steps as f32).collect()
    }

    pub fn val_steps(&self) -> Vec<f32> {
        self.val.iter().map(|e| e.steps as f32).collect()
    }

    /// Mean reward over the validation episodes, `None` if there were none
    pub fn mean_val_reward(&self) -> Option<f32> {
        mean(&self.val.iter().map(|e| e.reward).collect::<Vec<_>>())
    }
}

fn mean(values: &[f32]) -> Option<f32> {
    (!values.is_empty()).then(|| values.iter().sum::<f32>() / values.len() as f32)
}

/// Mean of every consecutive window of `w` values, the last window may be shorter
///
/// **Panics** if `w` is zero
pub fn windowed_mean(values: &[f32], w: usize) -> Vec<f32> {
    assert!(w > 0, "Window size must be positive");
    values.chunks(w).filter_map(mean).collect()
}

/// Drives a [`QAgent`] through training and validation episodes
///
/// During training the exploration rate of each episode is taken from the schedule if there
/// is one, otherwise the agent keeps its own. Validation always runs greedily and leaves the
/// agent's exploration rate at `0.0`.
pub struct Trainer<D: Decay = Constant> {
    config: TrainerConfig,
    schedule: Option<D>,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self {
            config,
            schedule: None,
        }
    }
}

impl<D: Decay> Trainer<D> {
    /// Set the exploration rate of training episode `i` to `schedule.evaluate(i)`
    pub fn with_schedule<D2: Decay>(self, schedule: D2) -> Trainer<D2> {
        Trainer {
            config: self.config,
            schedule: Some(schedule),
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train the agent in `env` and then validate it
    pub fn run<E, V>(&self, agent: &mut QAgent<V>, env: &mut E) -> Result<History>
    where
        E: Environment,
        V: ValueEstimator<E::State>,
    {
        let train = self.train(agent, env)?;
        let val = self.validate(agent, env)?;
        Ok(History { train, val })
    }

    /// Run the training episodes, learning from every transition
    ///
    /// **Errors** if the schedule yields an exploration rate outside `[0,1]`
    pub fn train<E, V>(&self, agent: &mut QAgent<V>, env: &mut E) -> Result<Vec<Episode>>
    where
        E: Environment,
        V: ValueEstimator<E::State>,
    {
        let mut episodes = Vec::with_capacity(self.config.train_episodes);
        for i in 0..self.config.train_episodes {
            if let Some(schedule) = &self.schedule {
                agent.set_epsilon(schedule.evaluate(i as f32))?;
            }
            let episode = self.episode(agent, env, true)?;
            debug!(
                "episode {} stops after {} timesteps (epsilon {})",
                i + 1,
                episode.steps,
                agent.epsilon()
            );
            episodes.push(episode);
        }

        if let Some(steps) = mean(&episodes.iter().map(|e| e.steps as f32).collect::<Vec<_>>()) {
            info!(
                "trained for {} episodes, {steps:.2} steps per episode on average",
                episodes.len()
            );
        }
        Ok(episodes)
    }

    /// Run the validation episodes greedily, without learning
    pub fn validate<E, V>(&self, agent: &mut QAgent<V>, env: &mut E) -> Result<Vec<Episode>>
    where
        E: Environment,
        V: ValueEstimator<E::State>,
    {
        agent.set_epsilon(0.0)?;
        let episodes = (0..self.config.val_episodes)
            .map(|_| self.episode(agent, env, false))
            .collect::<Result<Vec<_>>>()?;

        if let Some(steps) = mean(&episodes.iter().map(|e| e.steps as f32).collect::<Vec<_>>()) {
            info!(
                "validated for {} episodes, {steps:.2} steps per episode on average",
                episodes.len()
            );
        }
        Ok(episodes)
    }

    fn episode<E, V>(&self, agent: &mut QAgent<V>, env: &mut E, learn: bool) -> Result<Episode>
    where
        E: Environment,
        V: ValueEstimator<E::State>,
    {
        let mut state = env.reset();
        let mut steps = 0;
        let mut reward = 0.0;

        loop {
            let action = agent.act(&*env, &state)?;
            let (next_state, r) = env.step(action);
            steps += 1;
            reward += r;

            // A truncated episode still bootstraps from its last state
            if learn {
                agent.update(&*env, &state, action, r, next_state.as_ref())?;
            }

            let truncated = self.config.max_episode_steps.is_some_and(|max| steps >= max);
            match next_state {
                Some(next) if !truncated => state = next,
                next_state => {
                    return Ok(Episode {
                        steps,
                        reward,
                        truncated: next_state.is_some(),
                    })
                }
            }
        }
    }
}
