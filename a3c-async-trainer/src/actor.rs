mod base;
mod stat;
pub use base::{ActorLearner, Phase};
pub use stat::{actor_stats_fmt, ActorStat};
