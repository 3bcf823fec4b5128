use log::trace;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    env::{DiscreteStateSpace, Environment},
    error::Result,
    estimator::{ApproxEstimator, QTable, ValueEstimator},
    exploration::{first_argmax, Choice, EpsilonGreedy},
    memory::Exp,
    regressor::Regressor,
    util::ensure_interval,
};

/// Configuration for the [`QAgent`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QAgentConfig {
    /// Probability of taking a random action
    ///
    /// **Default**: `0.01`
    pub epsilon: f32,
    /// Learning rate, used by the [`QTable`] blend or as the step size of the regressors
    ///
    /// **Default**: `0.8`
    pub alpha: f32,
    /// Discount factor
    ///
    /// **Default**: `0.2`
    pub gamma: f32,
    /// Seed for the random number generator used to explore, random if `None`
    ///
    /// **Default**: `None`
    pub seed: Option<u64>,
}

impl Default for QAgentConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            alpha: 0.8,
            gamma: 0.2,
            seed: None,
        }
    }
}

impl QAgentConfig {
    /// **Errors** if `epsilon` is not in `[0,1]`, `alpha` is not in `(0,1]` or `gamma` is not in `[0,1)`
    pub fn validate(&self) -> Result<()> {
        let Self {
            epsilon,
            alpha,
            gamma,
            ..
        } = *self;
        ensure_interval!(epsilon, 0.0, 1.0);
        ensure_interval!(alpha, 0.0, 1.0, open, closed);
        ensure_interval!(gamma, 0.0, 1.0, closed, open);
        Ok(())
    }
}

/// A Q-learning agent, generic over how it stores its action values
///
/// ### Generics
/// - `V`: The [`ValueEstimator`], e.g. a [`QTable`] for discrete states or an
///   [`ApproxEstimator`] for continuous ones
///
/// The agent picks actions epsilon-greedily and learns from each transition with the
/// one-step off-policy target:
///
/// target = r + γ max<sub>a'</sub> Q(s', a')
pub struct QAgent<V> {
    estimator: V,
    /// The exploration policy, its `epsilon` can be changed between episodes
    pub exploration: EpsilonGreedy,
    gamma: f32, // discount factor
    rng: StdRng,
}

impl<V> QAgent<V> {
    /// Initialize a new `QAgent` around an estimator
    ///
    /// `config.alpha` is validated but otherwise unused here, the estimator is expected
    /// to have been built with it.
    ///
    /// **Errors** if any of the hyperparameters is out of range, see [`QAgentConfig::validate`]
    pub fn new(estimator: V, config: QAgentConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            estimator,
            exploration: EpsilonGreedy::new(config.epsilon),
            gamma: config.gamma,
            rng,
        })
    }

    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon
    }

    /// Change the exploration rate, `0.0` makes the agent purely greedy
    ///
    /// **Errors** if `epsilon` is not in `[0,1]`, the current rate is kept
    pub fn set_epsilon(&mut self, epsilon: f32) -> Result<()> {
        ensure_interval!(epsilon, 0.0, 1.0);
        self.exploration.epsilon = epsilon;
        Ok(())
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn estimator(&self) -> &V {
        &self.estimator
    }

    pub fn estimator_mut(&mut self) -> &mut V {
        &mut self.estimator
    }
}

impl QAgent<QTable> {
    /// Initialize an agent with a zeroed [`QTable`] sized for `env`
    pub fn tabular<E: DiscreteStateSpace>(env: &E, config: QAgentConfig) -> Result<Self> {
        Self::new(QTable::for_env(env, config.alpha)?, config)
    }
}

impl<R: Regressor> QAgent<ApproxEstimator<R>> {
    /// Initialize an agent with one regressor per action of `env`
    ///
    /// `factory` receives the action index and the learning rate `config.alpha`.
    pub fn approximate<E: Environment>(
        env: &E,
        config: QAgentConfig,
        mut factory: impl FnMut(usize, f32) -> R,
    ) -> Result<Self> {
        config.validate()?;
        let estimator = ApproxEstimator::new(env.action_space_size(), |a| factory(a, config.alpha));
        Self::new(estimator, config)
    }
}

impl<V> QAgent<V> {
    /// Choose an action for `state` with the epsilon-greedy policy
    ///
    /// **Panics** if `env` reports no legal actions for `state`
    pub fn act<E>(&mut self, env: &E, state: &E::State) -> Result<usize>
    where
        E: Environment,
        V: ValueEstimator<E::State>,
    {
        let actions = env.legal_actions(state);
        match self.exploration.choose(&mut self.rng) {
            Choice::Explore => {
                let action = *actions
                    .choose(&mut self.rng)
                    .expect("There is always at least one action available");
                trace!("explore: action {action}");
                Ok(action)
            }
            Choice::Exploit => self.greedy(&actions, state),
        }
    }

    /// The greedy action for `state`, ties go to the action listed first by `env`
    ///
    /// **Panics** if `env` reports no legal actions for `state`
    pub fn greedy_action<E>(&self, env: &E, state: &E::State) -> Result<usize>
    where
        E: Environment,
        V: ValueEstimator<E::State>,
    {
        self.greedy(&env.legal_actions(state), state)
    }

    /// The estimated value of every legal action in `state`, in the order `env` lists them
    pub fn q_values<E>(&self, env: &E, state: &E::State) -> Result<Vec<(usize, f32)>>
    where
        E: Environment,
        V: ValueEstimator<E::State>,
    {
        env.legal_actions(state)
            .into_iter()
            .map(|a| Ok((a, self.estimator.value(a, state)?)))
            .collect()
    }

    fn greedy<S>(&self, actions: &[usize], state: &S) -> Result<usize>
    where
        S: ?Sized,
        V: ValueEstimator<S>,
    {
        let values = actions
            .iter()
            .map(|&a| self.estimator.value(a, state))
            .collect::<Result<Vec<_>>>()?;
        let i = first_argmax(values).expect("There is always at least one action available");
        trace!("exploit: action {}", actions[i]);
        Ok(actions[i])
    }

    /// Learn from a single transition
    ///
    /// Moves the estimate for `(state, action)` toward `reward + γ max_a' Q(next_state, a')`,
    /// bootstrapping from the estimator as it is now. A terminal transition (`next_state` is
    /// `None`) bootstraps from `0.0`.
    pub fn update<E>(
        &mut self,
        env: &E,
        state: &E::State,
        action: usize,
        reward: f32,
        next_state: Option<&E::State>,
    ) -> Result<()>
    where
        E: Environment,
        V: ValueEstimator<E::State>,
    {
        let bootstrap = match next_state {
            Some(next) => self.max_value(&env.legal_actions(next), next)?,
            None => 0.0,
        };
        let target = reward + self.gamma * bootstrap;
        trace!("td target for action {action}: {target}");

        self.estimator.update(action, state, target)
    }

    /// Learn from a given experience, see [`update`](QAgent::update)
    pub fn learn<E>(&mut self, env: &E, exp: &Exp<E::State>) -> Result<()>
    where
        E: Environment,
        V: ValueEstimator<E::State>,
    {
        self.update(env, &exp.state, exp.action, exp.reward, exp.next_state.as_ref())
    }

    fn max_value<S>(&self, actions: &[usize], state: &S) -> Result<f32>
    where
        S: ?Sized,
        V: ValueEstimator<S>,
    {
        assert!(
            !actions.is_empty(),
            "There is always at least one action available"
        );
        actions.iter().try_fold(f32::NEG_INFINITY, |max, &a| {
            Ok(max.max(self.estimator.value(a, state)?))
        })
    }
}

#[cfg(test)]
mod tests {
    use statrs::distribution::{ChiSquared, ContinuousCDF};

    use crate::{
        env::tests::{Bandit, Chain},
        error::Error,
    };

    use super::*;

    /// A fixed set of action values that ignores the state
    struct Fixed(Vec<f32>);

    impl ValueEstimator<Vec<f32>> for Fixed {
        fn value(&self, action: usize, _state: &Vec<f32>) -> Result<f32> {
            Ok(self.0[action])
        }

        fn update(&mut self, action: usize, _state: &Vec<f32>, target: f32) -> Result<()> {
            self.0[action] = target;
            Ok(())
        }
    }

    fn config(epsilon: f32, seed: u64) -> QAgentConfig {
        QAgentConfig {
            epsilon,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn config_validation() {
        assert!(QAgentConfig::default().validate().is_ok());

        let err = QAgentConfig {
            gamma: 1.0,
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidParameter {
                name: "gamma",
                value: 1.0,
                interval: String::from("[0, 1)"),
            }
        );

        for bad in [
            QAgentConfig {
                epsilon: 1.5,
                ..Default::default()
            },
            QAgentConfig {
                alpha: 0.0,
                ..Default::default()
            },
            QAgentConfig {
                gamma: -0.1,
                ..Default::default()
            },
        ] {
            assert!(bad.validate().is_err(), "{bad:?} is rejected");
            assert!(QAgent::new(Fixed(vec![0.0]), bad).is_err());
        }
    }

    #[test]
    fn set_epsilon_rejects_out_of_range() {
        let env = Bandit {
            actions: 2,
            features: 1,
        };
        let mut agent = QAgent::new(Fixed(vec![0.0, 1.0]), config(0.3, 4)).unwrap();

        for bad in [f32::NAN, -0.1, 1.01, f32::INFINITY] {
            assert!(agent.set_epsilon(bad).is_err(), "{bad} is rejected");
            assert_eq!(agent.epsilon(), 0.3, "Rejected rate leaves epsilon unchanged");
        }
        assert!(agent.act(&env, &env.reset_state()).is_ok());

        agent.set_epsilon(0.0).unwrap();
        assert_eq!(agent.act(&env, &env.reset_state()), Ok(1));
    }

    #[test]
    fn greedy_never_explores() {
        let env = Bandit {
            actions: 4,
            features: 1,
        };
        let mut agent = QAgent::new(Fixed(vec![0.5, -1.0, 2.0, 1.5]), config(0.0, 1)).unwrap();
        let state = env.reset_state();
        for _ in 0..10_000 {
            assert_eq!(agent.act(&env, &state), Ok(2));
        }
    }

    #[test]
    fn random_is_uniform() {
        const ACTIONS: usize = 5;
        const TRIALS: usize = 50_000;

        let env = Bandit {
            actions: ACTIONS,
            features: 1,
        };
        let mut agent = QAgent::new(Fixed(vec![0.0, 9.0, 0.0, 0.0, 0.0]), config(1.0, 2)).unwrap();
        let state = env.reset_state();

        let mut counts = [0usize; ACTIONS];
        for _ in 0..TRIALS {
            counts[agent.act(&env, &state).unwrap()] += 1;
        }

        let expected = TRIALS as f64 / ACTIONS as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| (c as f64 - expected).powi(2) / expected)
            .sum();
        let critical = ChiSquared::new((ACTIONS - 1) as f64)
            .unwrap()
            .inverse_cdf(0.999);
        assert!(
            chi_square < critical,
            "Counts {counts:?} are not uniform: chi-square {chi_square} >= {critical}"
        );
    }

    #[test]
    fn ties_go_to_first_legal_action() {
        let env = Bandit {
            actions: 4,
            features: 1,
        };
        let mut agent = QAgent::new(Fixed(vec![1.0, 3.0, 0.0, 3.0]), config(0.0, 3)).unwrap();
        let state = env.reset_state();
        for _ in 0..100 {
            assert_eq!(agent.act(&env, &state), Ok(1));
        }

        agent.estimator_mut().0 = vec![0.0; 4];
        assert_eq!(agent.greedy_action(&env, &state), Ok(0));
    }

    #[test]
    fn seeded_agents_repeat() {
        let env = Bandit {
            actions: 6,
            features: 1,
        };
        let state = env.reset_state();
        let mut a = QAgent::new(Fixed(vec![0.0; 6]), config(0.5, 42)).unwrap();
        let mut b = QAgent::new(Fixed(vec![0.0; 6]), config(0.5, 42)).unwrap();
        let run_a = (0..200)
            .map(|_| a.act(&env, &state).unwrap())
            .collect::<Vec<_>>();
        let run_b = (0..200)
            .map(|_| b.act(&env, &state).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(run_a, run_b, "Same seed, same action sequence");
    }

    #[test]
    fn two_state_scenario() {
        struct TwoByTwo;

        impl Environment for TwoByTwo {
            type State = usize;

            fn legal_actions(&self, _state: &usize) -> Vec<usize> {
                vec![0, 1]
            }

            fn action_space_size(&self) -> usize {
                2
            }

            fn step(&mut self, _action: usize) -> (Option<usize>, f32) {
                (Some(1), 0.0)
            }

            fn reset(&mut self) -> usize {
                0
            }
        }

        impl DiscreteStateSpace for TwoByTwo {
            fn state_space_size(&self) -> usize {
                2
            }
        }

        let env = TwoByTwo;
        let config = QAgentConfig {
            epsilon: 0.0,
            alpha: 0.8,
            gamma: 0.2,
            seed: Some(0),
        };
        let mut agent = QAgent::tabular(&env, config).unwrap();
        assert_eq!(agent.act(&env, &0), Ok(0), "All zeros, first action wins");

        agent.update(&env, &0, 1, 10.0, Some(&1)).unwrap();

        assert_eq!(agent.estimator().get(0, 1), Some(8.0));
        assert_eq!(agent.estimator().get(0, 0), Some(0.0));
        assert_eq!(agent.estimator().row(1), Some(&[0.0, 0.0][..]));
        assert_eq!(agent.act(&env, &0), Ok(1));
        assert_eq!(agent.q_values(&env, &0), Ok(vec![(0, 0.0), (1, 8.0)]));
    }

    #[test]
    fn tabular_converges_to_geometric_sum() {
        // One state whose only action loops back to itself
        struct SelfLoop;

        impl Environment for SelfLoop {
            type State = usize;

            fn legal_actions(&self, _state: &usize) -> Vec<usize> {
                vec![0]
            }

            fn action_space_size(&self) -> usize {
                1
            }

            fn step(&mut self, _action: usize) -> (Option<usize>, f32) {
                (Some(0), 2.0)
            }

            fn reset(&mut self) -> usize {
                0
            }
        }

        impl DiscreteStateSpace for SelfLoop {
            fn state_space_size(&self) -> usize {
                1
            }
        }

        let mut env = SelfLoop;
        let (r, g) = (2.0, 0.5);
        let mut agent = QAgent::tabular(
            &env,
            QAgentConfig {
                alpha: 0.5,
                gamma: g,
                seed: Some(0),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(agent.estimator().actions(), 1);
        for _ in 0..200 {
            let action = agent.act(&env, &0).unwrap();
            let (next, reward) = env.step(action);
            agent.update(&env, &0, action, reward, next.as_ref()).unwrap();
        }

        let value = agent.estimator().get(0, 0).unwrap();
        assert!(
            (value - r / (1.0 - g)).abs() < 1e-3,
            "Converged to {value}, expected {}",
            r / (1.0 - g)
        );
    }

    #[test]
    fn update_bootstraps_from_best_next_action() {
        let env = Chain::new(3);
        let mut agent = QAgent::tabular(
            &env,
            QAgentConfig {
                alpha: 1.0,
                gamma: 0.5,
                seed: Some(0),
                ..Default::default()
            },
        )
        .unwrap();
        agent.estimator_mut().update(0, &1, 4.0).unwrap();
        agent.estimator_mut().update(1, &1, -2.0).unwrap();

        agent.update(&env, &0, 1, 1.0, Some(&1)).unwrap();
        assert_eq!(agent.estimator().get(0, 1), Some(1.0 + 0.5 * 4.0));

        agent
            .learn(
                &env,
                &Exp {
                    state: 0,
                    action: 0,
                    reward: 3.0,
                    next_state: None,
                },
            )
            .unwrap();
        assert_eq!(
            agent.estimator().get(0, 0),
            Some(3.0),
            "Terminal transitions bootstrap from zero"
        );
    }

    #[test]
    fn update_isolates_actions() {
        let env = Chain::new(4);
        let mut agent = QAgent::tabular(
            &env,
            QAgentConfig {
                seed: Some(0),
                ..Default::default()
            },
        )
        .unwrap();
        for s in 0..4 {
            agent.update(&env, &s, 1, 5.0, Some(&((s + 1) % 4))).unwrap();
        }
        for s in 0..4 {
            assert_eq!(agent.estimator().get(s, 0), Some(0.0), "Action 0 untouched in state {s}");
        }
    }

    #[test]
    fn approximate_agent_falls_back_and_propagates() {
        use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
        use burn::tensor::backend::Backend;

        use crate::regressor::MlpRegressorConfig;

        type B = Autodiff<NdArray>;
        B::seed(0);

        let env = Bandit {
            actions: 3,
            features: 2,
        };
        let mut agent = QAgent::approximate(&env, config(0.0, 5), |_, alpha| {
            MlpRegressorConfig::new(2)
                .with_hidden_size(8)
                .with_learning_rate(f64::from(alpha) * 1e-2)
                .init::<B>(&NdArrayDevice::Cpu)
        })
        .unwrap();
        let state = vec![0.2, -0.4];

        assert_eq!(
            agent.q_values(&env, &state),
            Ok(vec![(0, 0.0), (1, 0.0), (2, 0.0)]),
            "Fresh models are valued at zero"
        );
        assert_eq!(agent.act(&env, &state), Ok(0));

        agent.update(&env, &state, 2, 1.0, None).unwrap();
        assert!(agent.estimator().model(2).unwrap().is_fitted());
        assert_eq!(agent.estimator().value(0, &state), Ok(0.0));
        assert_eq!(agent.estimator().value(1, &state), Ok(0.0));

        assert_eq!(
            agent.act(&env, &vec![0.2]),
            Err(Error::DimensionMismatch {
                expected: 2,
                got: 1
            }),
            "Malformed states are not masked"
        );
    }

    #[test]
    #[should_panic(expected = "There is always at least one action available")]
    fn empty_action_set_panics() {
        let env = Bandit {
            actions: 0,
            features: 1,
        };
        let mut agent = QAgent::new(Fixed(vec![]), config(0.0, 0)).unwrap();
        let _ = agent.act(&env, &vec![0.0]);
    }

    impl Bandit {
        fn reset_state(&self) -> Vec<f32> {
            vec![0.0; self.features]
        }
    }
}
