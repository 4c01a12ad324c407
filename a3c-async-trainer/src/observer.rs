//! Hook called periodically by the coordinator while training.
use log::info;
use std::time::Instant;

/// Observes the progress of training.
///
/// [`Coordinator`](crate::Coordinator) calls [`Observer::observe`] on its own thread at a
/// fixed interval until all actor-learners finish. An observer never affects when training
/// ends.
pub trait Observer {
    /// Called with the current value of the global step counter.
    fn observe(&mut self, global_step: usize);
}

/// Logs the global step and the number of steps per second.
#[derive(Default)]
pub struct ProgressLogger {
    last: Option<(Instant, usize)>,
}

impl Observer for ProgressLogger {
    fn observe(&mut self, global_step: usize) {
        let now = Instant::now();
        match self.last {
            Some((t, s)) => {
                let secs = now.duration_since(t).as_secs_f32();
                let sps = if secs > 0.0 {
                    global_step.saturating_sub(s) as f32 / secs
                } else {
                    0.0
                };
                info!("global step {}, {:.1} steps/sec", global_step, sps);
            }
            None => info!("global step {}", global_step),
        }
        self.last = Some((now, global_step));
    }
}

/// Does nothing.
pub struct NullObserver;

impl Observer for NullObserver {
    fn observe(&mut self, _global_step: usize) {}
}
