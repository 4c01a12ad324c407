use crate::Phase;
use std::time::Duration;

/// Stats of an [`ActorLearner`](crate::ActorLearner).
#[derive(Clone, Debug)]
pub struct ActorStat {
    /// Id of the actor-learner.
    pub id: usize,

    /// The number of environment steps taken by the actor-learner.
    pub env_steps: usize,

    /// The number of finished episodes.
    pub episodes: usize,

    /// The number of gradient updates.
    pub updates: usize,

    /// Phase the actor-learner stopped in.
    pub phase: Phase,

    /// Duration of the rollout loop.
    pub duration: Duration,
}

/// Returns a formatted string of the set of [`ActorStat`] for reporting.
pub fn actor_stats_fmt(stats: &[ActorStat]) -> String {
    let mut s = "actor id, env steps, episodes, updates, duration [sec], steps per sec\n".to_string();
    for stat in stats.iter() {
        let d = stat.duration.as_secs_f32();
        let p = if d > 0.0 {
            stat.env_steps as f32 / d
        } else {
            0.0
        };
        s += format!(
            "{}, {}, {}, {}, {}, {}\n",
            stat.id, stat.env_steps, stat.episodes, stat.updates, d, p
        )
        .as_str();
    }
    s
}
