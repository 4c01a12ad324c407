use crate::{
    A3cConfig, ActorFailure, ActorLearner, ActorStat, Checkpointer, EpisodeMessage, EvalConfig,
    EvalStat, Observer, TrainStat,
};
use a3c_core::{
    record::Recorder, sample_action, A3cError, GlobalStepCounter, PolicyValueModel, Simulator,
};
use a3c_game_env::{GameEnv, GameEnvConfig, GameRegistry};
use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use log::{error, info, trace, warn};
use rand::{rngs::SmallRng, SeedableRng};
use std::{
    any::Any,
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// What [`Coordinator::run()`] does.
#[derive(Clone, Debug)]
pub enum Mode {
    /// Trains the model with actor-learners.
    Train,

    /// Evaluates a checkpoint.
    Eval(EvalConfig),
}

/// Result of [`Coordinator::run()`].
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Stats of training.
    Train(TrainStat),

    /// Scores of evaluation.
    Eval(EvalStat),
}

impl Outcome {
    /// Returns `true` if training ended with failed actor-learners.
    pub fn is_degraded(&self) -> bool {
        match self {
            Self::Train(stat) => stat.is_degraded(),
            Self::Eval(_) => false,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Owns the global parameters and the global step counter, runs actor-learners.
///
/// # Training
///
/// [`Coordinator::train()`] spawns `n_actor_learners` threads. Each thread builds its own
/// [`GameEnv`] and runs an [`ActorLearner`] until the global step budget is exhausted.
/// Environments are built one at a time, guarded by a lock shared by the threads.
///
/// ```mermaid
/// graph LR
///     A1[ActorLearner 1]-->|gradient_update|M[PolicyValueModel]
///     A2[ActorLearner N]-->|gradient_update|M
///     M-->|copy_parameters_into|A1
///     M-->|copy_parameters_into|A2
///     A1-->|EpisodeMessage|C[Coordinator]
///     A2-->|EpisodeMessage|C
///     C-->|Record|R[Recorder]
///     C-->|global step|O[Observer]
/// ```
///
/// While the threads run, the coordinator writes the records of finished episodes to a
/// [`Recorder`] and calls an [`Observer`] every `observe_interval_ms`. When all threads
/// have finished, it joins them. A thread that returned an error or panicked is logged and
/// reported in [`TrainStat::failures`]; the other threads are not affected.
///
/// # Evaluation
///
/// [`Coordinator::evaluate()`] loads a checkpoint into the global parameters and runs
/// episodes on the calling thread, sampling actions from the policy.
pub struct Coordinator<M, S>
where
    M: PolicyValueModel + 'static,
    S: Simulator + 'static,
{
    config: A3cConfig,
    env_config: GameEnvConfig<S::Config>,
    registry: Arc<GameRegistry>,
    model: Arc<M>,
}

impl<M, S> Coordinator<M, S>
where
    M: PolicyValueModel + 'static,
    S: Simulator + 'static,
    S::Config: Send + 'static,
{
    /// Constructs a coordinator.
    ///
    /// Fails if the configuration is invalid, the game is not in `registry` or the model
    /// does not have as many actions as the action table of the game.
    pub fn build(
        config: A3cConfig,
        env_config: GameEnvConfig<S::Config>,
        registry: GameRegistry,
        model: Arc<M>,
    ) -> Result<Self> {
        config.validate()?;
        let table = registry.action_table(&env_config.game)?;
        if table.len() != model.n_actions() {
            return Err(A3cError::Configuration(format!(
                "model has {} actions, {} has {}",
                model.n_actions(),
                env_config.game,
                table.len()
            ))
            .into());
        }

        Ok(Self {
            config,
            env_config,
            registry: Arc::new(registry),
            model,
        })
    }

    /// The global parameters.
    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    /// Trains or evaluates.
    pub fn run<R: Recorder, O: Observer>(
        &self,
        mode: &Mode,
        recorder: &mut R,
        observer: &mut O,
    ) -> Result<Outcome> {
        match mode {
            Mode::Train => Ok(Outcome::Train(self.train(recorder, observer)?)),
            Mode::Eval(eval_config) => Ok(Outcome::Eval(self.evaluate(eval_config)?)),
        }
    }

    fn spawn_actor(
        &self,
        id: usize,
        counter: &Arc<GlobalStepCounter>,
        checkpointer: &Arc<Checkpointer>,
        sender: &Sender<EpisodeMessage>,
        guard_init_env: &Arc<Mutex<()>>,
    ) -> std::io::Result<JoinHandle<Result<ActorStat>>> {
        let config = self.config.clone();
        let env_config = self.env_config.clone();
        let registry = self.registry.clone();
        let model = self.model.clone();
        let counter = counter.clone();
        let checkpointer = checkpointer.clone();
        let sender = sender.clone();
        let guard_init_env = guard_init_env.clone();

        thread::Builder::new()
            .name(format!("actor-learner-{}", id))
            .spawn(move || -> Result<ActorStat> {
                if config.stagger_start_ms > 0 {
                    thread::sleep(Duration::from_millis(config.stagger_start_ms * id as u64));
                }
                let env = {
                    let _lock = guard_init_env.lock().unwrap_or_else(|e| e.into_inner());
                    GameEnv::<S>::build(&env_config, &registry, config.seed + id as i64)
                        .with_context(|| format!("actor-learner {} failed to build env", id))?
                };
                let actor = ActorLearner::build(
                    id,
                    &config,
                    model,
                    env,
                    counter,
                    checkpointer,
                    sender,
                )?;
                actor.run()
            })
    }

    /// Runs actor-learners until the global step budget is exhausted.
    pub fn train<R: Recorder, O: Observer>(
        &self,
        recorder: &mut R,
        observer: &mut O,
    ) -> Result<TrainStat> {
        let start = Instant::now();
        let checkpointer = Arc::new(Checkpointer::new(
            &self.config.checkpoint_dir,
            &self.env_config.game,
            self.config.checkpoint_interval,
        ));
        checkpointer.prepare();
        let counter = Arc::new(GlobalStepCounter::new(self.config.max_steps));
        let (sender, receiver) = unbounded();

        // guard for initialization of envs in multiple threads
        let guard_init_env = Arc::new(Mutex::new(()));

        info!(
            "Start training {} with {} actor-learners, {} steps",
            self.env_config.game, self.config.n_actor_learners, self.config.max_steps
        );
        let mut handles = Vec::with_capacity(self.config.n_actor_learners);
        let mut failures = vec![];
        for id in 0..self.config.n_actor_learners {
            match self.spawn_actor(id, &counter, &checkpointer, &sender, &guard_init_env) {
                Ok(handle) => handles.push((id, handle)),
                Err(e) => {
                    error!("Failed to spawn actor-learner {}: {}", id, e);
                    failures.push(ActorFailure {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        // The channel is disconnected when all actor-learners have dropped their senders.
        drop(sender);
        let interval = Duration::from_millis(self.config.observe_interval_ms.max(1));
        let mut last_observe = Instant::now();
        let mut n_episodes = 0;
        loop {
            match receiver.recv_timeout(interval) {
                Ok(msg) => {
                    trace!("Episode record from actor-learner {}", msg.id);
                    n_episodes += 1;
                    recorder.write(msg.record);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            if last_observe.elapsed() >= interval {
                observer.observe(counter.get());
                last_observe = Instant::now();
            }
        }

        let mut actor_stats = vec![];
        for (id, handle) in handles {
            match handle.join() {
                Ok(Ok(stat)) => actor_stats.push(stat),
                Ok(Err(e)) => {
                    error!("{:#}", e);
                    failures.push(ActorFailure {
                        id,
                        reason: format!("{:#}", e),
                    });
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    error!("Actor-learner {} panicked: {}", id, reason);
                    failures.push(ActorFailure { id, reason });
                }
            }
        }
        failures.sort_by_key(|f| f.id);

        let stat = TrainStat {
            global_steps: counter.n_taken(),
            n_episodes,
            n_checkpoints: checkpointer.n_written(),
            duration: start.elapsed(),
            actor_stats,
            failures,
        };
        info!("Stats of training");
        info!("{}", stat.fmt());
        if stat.is_degraded() {
            warn!(
                "{} of {} actor-learners failed",
                stat.failures.len(),
                self.config.n_actor_learners
            );
        }

        Ok(stat)
    }

    /// Loads a checkpoint and runs evaluation episodes.
    ///
    /// Fails with [`A3cError::CheckpointIo`] if the checkpoint cannot be read.
    pub fn evaluate(&self, eval_config: &EvalConfig) -> Result<EvalStat> {
        let path = &eval_config.checkpoint_path;
        if !path.is_file() {
            return Err(A3cError::CheckpointIo {
                path: path.display().to_string(),
                reason: "no such file".to_string(),
            }
            .into());
        }
        self.model.load_params(path)?;
        info!("Loaded checkpoint {:?}", path);

        let mut env = GameEnv::<S>::build(&self.env_config, &self.registry, eval_config.seed)?;
        let mut rng = SmallRng::seed_from_u64(eval_config.seed as u64);
        let mut scores = Vec::with_capacity(eval_config.n_episodes);

        for i in 0..eval_config.n_episodes {
            let mut state = env.get_initial_state()?;
            let mut score = 0.0;
            loop {
                let pv = self.model.forward(&state)?;
                let action = sample_action(&pv.probs, &mut rng)?;
                let step = env.step(action)?;
                score += step.reward;
                state = step.state;
                if step.is_terminated {
                    break;
                }
            }
            info!("finished episode {} with score {}", i + 1, score);
            scores.push(score);
        }

        let stat = EvalStat { scores };
        info!("average score {}", stat.mean());
        Ok(stat)
    }
}
