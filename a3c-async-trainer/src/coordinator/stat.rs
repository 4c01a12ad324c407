use crate::{actor_stats_fmt, ActorStat};
use std::time::Duration;

/// An actor-learner that stopped before the step budget was exhausted.
#[derive(Clone, Debug)]
pub struct ActorFailure {
    /// Id of the actor-learner.
    pub id: usize,

    /// Error or panic message.
    pub reason: String,
}

/// Stats of [`Coordinator::train()`](crate::Coordinator::train).
#[derive(Clone, Debug)]
pub struct TrainStat {
    /// The number of environment steps taken by all actor-learners.
    pub global_steps: usize,

    /// The number of episodes finished by all actor-learners.
    pub n_episodes: usize,

    /// The number of checkpoints written.
    pub n_checkpoints: usize,

    /// Duration of training.
    pub duration: Duration,

    /// Stats of the actor-learners that finished normally.
    pub actor_stats: Vec<ActorStat>,

    /// Actor-learners that failed.
    pub failures: Vec<ActorFailure>,
}

impl TrainStat {
    /// Returns `true` if any actor-learner failed.
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Returns a formatted string.
    pub fn fmt(&self) -> String {
        let mut s = "global steps, episodes, checkpoints, duration [sec], steps per sec\n".to_string();
        let d = self.duration.as_secs_f32();
        let p = if d > 0.0 {
            self.global_steps as f32 / d
        } else {
            0.0
        };
        s += format!(
            "{}, {}, {}, {}, {}\n",
            self.global_steps, self.n_episodes, self.n_checkpoints, d, p
        )
        .as_str();
        s += actor_stats_fmt(&self.actor_stats).as_str();
        for f in self.failures.iter() {
            s += format!("actor {} failed: {}\n", f.id, f.reason).as_str();
        }
        s
    }
}

/// Stats of [`Coordinator::evaluate()`](crate::Coordinator::evaluate).
#[derive(Clone, Debug)]
pub struct EvalStat {
    /// Undiscounted, unclipped return of each episode.
    pub scores: Vec<f32>,
}

impl EvalStat {
    /// Average score, zero without any episode.
    pub fn mean(&self) -> f32 {
        if self.scores.is_empty() {
            0.0
        } else {
            self.scores.iter().sum::<f32>() / self.scores.len() as f32
        }
    }
}
