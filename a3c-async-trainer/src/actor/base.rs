use crate::{A3cConfig, ActorStat, Checkpointer, EpisodeMessage};
use a3c_core::{
    record::{Record, RecordValue::Scalar},
    sample_action, GlobalStepCounter, PolicyValueModel, RolloutSegment, Simulator, State,
};
use a3c_game_env::GameEnv;
use anyhow::Result;
use crossbeam_channel::Sender;
use log::{debug, info, trace};
use rand::{rngs::SmallRng, SeedableRng};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// Phases of the rollout cycle of an [`ActorLearner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Copying the global parameters into the local replica.
    Syncing,

    /// Taking up to `t_max` environment steps with the local replica.
    Collecting,

    /// The segment ended with a terminal state, bootstrap value is zero.
    TerminalBootstrap,

    /// The segment was cut, bootstrap value is estimated by the local replica.
    ValueBootstrap,

    /// Applying a gradient update to the global parameters.
    Updating,

    /// The global step budget is exhausted.
    Done,
}

/// Runs the rollout-synchronize-update loop against its own environment.
///
/// Each actor-learner exclusively owns its environment, its local replica of the parameters
/// and its optimizer state. The only things it shares with other actor-learners are the
/// global parameters in `model`, which it reads when syncing and writes when updating,
/// and the global step counter.
pub struct ActorLearner<M, S>
where
    M: PolicyValueModel,
    S: Simulator,
{
    id: usize,
    t_max: usize,
    discount_factor: f32,
    model: Arc<M>,
    env: GameEnv<S>,
    local: M::Local,
    updater: M::Updater,
    counter: Arc<GlobalStepCounter>,
    checkpointer: Arc<Checkpointer>,
    sender: Sender<EpisodeMessage>,
    rng: SmallRng,
    phase: Phase,
    reserved: Option<usize>,
    pending_checkpoints: Vec<usize>,

    env_steps: usize,
    episodes: usize,
    updates: usize,
    episode_return: f32,
    episode_length: usize,
    last_update: Record,
}

impl<M, S> ActorLearner<M, S>
where
    M: PolicyValueModel,
    S: Simulator,
{
    /// Constructs an actor-learner.
    pub fn build(
        id: usize,
        config: &A3cConfig,
        model: Arc<M>,
        env: GameEnv<S>,
        counter: Arc<GlobalStepCounter>,
        checkpointer: Arc<Checkpointer>,
        sender: Sender<EpisodeMessage>,
    ) -> Result<Self> {
        let local = model.new_local()?;
        let updater = model.new_updater()?;
        let rng = SmallRng::seed_from_u64(config.seed.wrapping_add(id as i64) as u64);

        Ok(Self {
            id,
            t_max: config.t_max,
            discount_factor: config.discount_factor,
            model,
            env,
            local,
            updater,
            counter,
            checkpointer,
            sender,
            rng,
            phase: Phase::Syncing,
            reserved: None,
            pending_checkpoints: vec![],
            env_steps: 0,
            episodes: 0,
            updates: 0,
            episode_return: 0.0,
            episode_length: 0,
            last_update: Record::empty(),
        })
    }

    /// Runs rollout cycles until the global step budget is exhausted.
    ///
    /// An error terminates this actor-learner only. Checkpoints due at the steps it has
    /// reserved are still written.
    pub fn run(mut self) -> Result<ActorStat> {
        let start = Instant::now();
        info!("Actor-learner {} starts", self.id);

        match self.run_loop() {
            Ok(()) => {
                info!(
                    "Actor-learner {} finished: {} steps, {} episodes, {} updates",
                    self.id, self.env_steps, self.episodes, self.updates
                );
                Ok(self.stat(start.elapsed()))
            }
            Err(e) => {
                if self.reserved.take().is_some() {
                    self.counter.forfeit();
                }
                self.save_pending_checkpoints();
                Err(e.context(format!(
                    "actor-learner {} failed at global step {}, episode {}",
                    self.id,
                    self.counter.get(),
                    self.episodes
                )))
            }
        }
    }

    fn stat(&self, duration: Duration) -> ActorStat {
        ActorStat {
            id: self.id,
            env_steps: self.env_steps,
            episodes: self.episodes,
            updates: self.updates,
            phase: self.phase,
            duration,
        }
    }

    fn run_loop(&mut self) -> Result<()> {
        let mut state = self.env.get_initial_state()?;
        while let Some(next) = self.cycle(state)? {
            state = next;
        }
        self.phase = Phase::Done;
        Ok(())
    }

    /// Runs a single rollout cycle from `state`.
    ///
    /// Returns the state to start the next cycle from, or `None` if the budget is exhausted.
    fn cycle(&mut self, mut state: State) -> Result<Option<State>> {
        self.phase = Phase::Syncing;
        self.model.copy_parameters_into(&mut self.local)?;

        self.phase = Phase::Collecting;
        let n_actions = self.env.n_actions();
        let mut segment = RolloutSegment::new(self.t_max);
        let mut is_terminated = false;

        while !segment.is_full() {
            // The step number is reserved before acting, so the budget is never exceeded.
            let global_step = match self.counter.try_advance() {
                Some(s) => s,
                None => break,
            };
            self.reserved = Some(global_step);
            if self.checkpointer.is_due(global_step) {
                self.pending_checkpoints.push(global_step);
            }
            let pv = self.model.forward_local(&self.local, &state)?;
            let action = sample_action(&pv.probs, &mut self.rng)?;
            let step = self.env.step(action)?;
            self.reserved = None;
            trace!(
                "Actor-learner {}: global step {}, action {}, reward {}",
                self.id,
                global_step,
                action,
                step.reward
            );

            self.env_steps += 1;
            self.episode_length += 1;
            self.episode_return += step.reward;
            segment.push(state, action, n_actions, step.reward);
            state = step.state;

            if step.is_terminated {
                is_terminated = true;
                break;
            }
        }

        if segment.is_empty() {
            return Ok(None);
        }

        let bootstrap = if is_terminated {
            self.phase = Phase::TerminalBootstrap;
            0.0
        } else {
            self.phase = Phase::ValueBootstrap;
            self.model.forward_local(&self.local, &state)?.value
        };
        let batch = segment.into_batch(bootstrap, self.discount_factor);

        self.phase = Phase::Updating;
        self.last_update = self.model.gradient_update(&mut self.updater, &batch)?;
        self.updates += 1;

        self.save_pending_checkpoints();

        if is_terminated {
            self.finish_episode();
            state = self.env.get_initial_state()?;
        }

        if self.counter.is_exhausted() {
            Ok(None)
        } else {
            Ok(Some(state))
        }
    }

    fn save_pending_checkpoints(&mut self) {
        for step in self.pending_checkpoints.drain(..) {
            self.checkpointer.save(self.model.as_ref(), step);
        }
    }

    fn finish_episode(&mut self) {
        self.episodes += 1;
        let global_step = self.counter.get();
        info!(
            "Actor-learner {}: global step {}, actor step {}, episode {}, return {}",
            self.id, global_step, self.env_steps, self.episodes, self.episode_return
        );

        let record = Record::from_slice(&[
            ("global_step", Scalar(global_step as f32)),
            ("actor_id", Scalar(self.id as f32)),
            ("actor_step", Scalar(self.env_steps as f32)),
            ("episode", Scalar(self.episodes as f32)),
            ("episode_return", Scalar(self.episode_return)),
            ("episode_length", Scalar(self.episode_length as f32)),
        ])
        .merge(self.last_update.clone());
        let msg = EpisodeMessage {
            id: self.id,
            record,
        };
        if self.sender.send(msg).is_err() {
            debug!("Actor-learner {}: coordinator stopped receiving", self.id);
        }

        self.episode_return = 0.0;
        self.episode_length = 0;
    }
}
