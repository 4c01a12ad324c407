mod base;
mod stat;
pub use base::{Coordinator, Mode, Outcome};
pub use stat::{ActorFailure, EvalStat, TrainStat};
