//! Game environment producing agent states.
use crate::{ActionTable, GameEnvConfig, GameRegistry};
use a3c_core::{A3cError, FramePreprocessor, Simulator, State, StateBuffer};
use anyhow::Result;
use log::trace;

/// The result of [`GameEnv::step`].
#[derive(Debug, Clone)]
pub struct EnvStep {
    /// The state after the step.
    pub state: State,

    /// Raw reward of the step.
    pub reward: f32,

    /// Flag denoting if the episode is terminated.
    pub is_terminated: bool,
}

/// Wraps a [`Simulator`], mapping action indices to native actions and observations
/// to states of stacked, preprocessed frames.
///
/// Each actor-learner exclusively owns its own environment.
pub struct GameEnv<S: Simulator> {
    game: String,
    sim: S,
    action_table: ActionTable,
    preprocessor: FramePreprocessor,
    buffer: StateBuffer,
}

impl<S: Simulator> GameEnv<S> {
    /// Builds an environment.
    ///
    /// Fails with [`A3cError::Configuration`] if the game is not in `registry`.
    pub fn build(
        config: &GameEnvConfig<S::Config>,
        registry: &GameRegistry,
        seed: i64,
    ) -> Result<Self> {
        let action_table = registry.action_table(&config.game)?;
        let preprocessor = FramePreprocessor::new(config.width, config.height)?;
        let buffer = StateBuffer::new(config.history_length)?;
        let sim = S::build(&config.sim, seed)
            .map_err(|e| A3cError::Environment(format!("{}: {}", config.game, e)))?;

        Ok(Self {
            game: config.game.clone(),
            sim,
            action_table,
            preprocessor,
            buffer,
        })
    }

    /// Game identifier.
    pub fn game(&self) -> &str {
        &self.game
    }

    /// The number of actions available to the agent.
    pub fn n_actions(&self) -> usize {
        self.action_table.len()
    }

    /// Action table of the game.
    pub fn action_table(&self) -> &ActionTable {
        &self.action_table
    }

    /// Starts a new episode.
    ///
    /// The returned state consists of copies of the first frame.
    pub fn get_initial_state(&mut self) -> Result<State> {
        let raw = self
            .sim
            .reset()
            .map_err(|e| A3cError::Environment(format!("{}: reset failed: {}", self.game, e)))?;
        let frame = self.preprocessor.preprocess(&raw)?;
        self.buffer.reset(frame)
    }

    /// Performs the action of the given index.
    pub fn step(&mut self, action_index: usize) -> Result<EnvStep> {
        let action = self.action_table.to_native(action_index)?;
        trace!("{}: action {} -> {:?}", self.game, action_index, action);
        let step = self
            .sim
            .step(&action)
            .map_err(|e| A3cError::Environment(format!("{}: step failed: {}", self.game, e)))?;
        let frame = self.preprocessor.preprocess(&step.frame)?;
        let state = self.buffer.push_and_build(frame)?;

        Ok(EnvStep {
            state,
            reward: step.reward,
            is_terminated: step.is_terminated,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        util::test::{StubSim, StubSimConfig},
        ActionTable, GameFamily,
    };

    fn registry() -> GameRegistry {
        let mut registry = GameRegistry::builtin();
        registry.register(
            "Stub-v0",
            ActionTable::new(GameFamily::Atari, vec![1, 2, 3]).unwrap(),
        );
        registry
    }

    fn config(sim: StubSimConfig) -> GameEnvConfig<StubSimConfig> {
        GameEnvConfig::default()
            .game("Stub-v0")
            .frame_size(8, 6)
            .history_length(3)
            .sim(sim)
    }

    #[test]
    fn test_initial_state() {
        let mut env = GameEnv::<StubSim>::build(&config(StubSimConfig::default()), &registry(), 0)
            .unwrap();
        assert_eq!(env.game(), "Stub-v0");
        assert_eq!(env.n_actions(), 3);
        assert_eq!(env.action_table().codes(), &[1, 2, 3]);
        let state = env.get_initial_state().unwrap();
        assert_eq!(state.dim(), (3, 6, 8));
        assert_eq!(state.frame(0), state.frame(2));
    }

    #[test]
    fn test_step_shifts_frames() {
        let mut env = GameEnv::<StubSim>::build(&config(StubSimConfig::default()), &registry(), 0)
            .unwrap();
        let s0 = env.get_initial_state().unwrap();
        let s1 = env.step(0).unwrap().state;
        let s2 = env.step(1).unwrap().state;

        // The newest frame of a state moves one slot back in the next state.
        assert_eq!(s1.frame(1), s0.frame(2));
        assert_eq!(s2.frame(1), s1.frame(2));
        assert_eq!(s2.frame(0), s1.frame(1));
        assert_ne!(s2.frame(2), s1.frame(2));
    }

    #[test]
    fn test_native_action_is_passed() {
        let mut env = GameEnv::<StubSim>::build(&config(StubSimConfig::default()), &registry(), 0)
            .unwrap();
        env.get_initial_state().unwrap();
        env.step(2).unwrap();
        env.step(0).unwrap();
        assert_eq!(
            env.sim.received(),
            &[
                a3c_core::NativeAction::Discrete(3),
                a3c_core::NativeAction::Discrete(1)
            ]
        );
    }

    #[test]
    fn test_invalid_action() {
        let mut env = GameEnv::<StubSim>::build(&config(StubSimConfig::default()), &registry(), 0)
            .unwrap();
        env.get_initial_state().unwrap();
        let err = env.step(3).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<A3cError>(),
            Some(A3cError::InvalidAction { .. })
        ));
        assert!(env.sim.received().is_empty());
    }

    #[test]
    fn test_unknown_game() {
        let config = config(StubSimConfig::default()).game("Unknown-v0");
        assert!(GameEnv::<StubSim>::build(&config, &registry(), 0).is_err());
    }

    #[test]
    fn test_simulator_failure() {
        let sim = StubSimConfig::default().fail_after(1);
        let mut env = GameEnv::<StubSim>::build(&config(sim), &registry(), 0).unwrap();
        env.get_initial_state().unwrap();
        assert!(env.step(0).is_ok());
        let err = env.step(0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<A3cError>(),
            Some(A3cError::Environment(_))
        ));
    }

    #[test]
    fn test_terminal_flag_and_reward() {
        let sim = StubSimConfig::default().episode_len(2).reward(5.0);
        let mut env = GameEnv::<StubSim>::build(&config(sim), &registry(), 0).unwrap();
        env.get_initial_state().unwrap();
        let step = env.step(0).unwrap();
        assert!(!step.is_terminated);
        assert_eq!(step.reward, 5.0);
        assert!(env.step(0).unwrap().is_terminated);
    }
}
