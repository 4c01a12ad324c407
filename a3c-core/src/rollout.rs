//! Rollout segments and n-step discounted targets.
use crate::State;

/// Clips a reward into `[-1, 1]`.
#[inline]
pub fn clip_reward(reward: f32) -> f32 {
    reward.clamp(-1.0, 1.0)
}

/// Returns a one-hot vector of length `n` with `1` at `index`.
pub fn one_hot(index: usize, n: usize) -> Vec<f32> {
    let mut v = vec![0f32; n];
    if index < n {
        v[index] = 1.0;
    }
    v
}

/// Computes n-step bootstrapped discounted returns.
///
/// Iterates `rewards` backward with `R = r_i + gamma * R`, starting from `bootstrap`.
/// The returned targets are aligned with `rewards`.
pub fn discounted_targets(rewards: &[f32], bootstrap: f32, gamma: f32) -> Vec<f32> {
    let mut targets = vec![0f32; rewards.len()];
    let mut r = bootstrap;
    for i in (0..rewards.len()).rev() {
        r = rewards[i] + gamma * r;
        targets[i] = r;
    }
    targets
}

/// A single step of a rollout segment.
#[derive(Debug, Clone)]
pub struct Transition {
    /// The state in which the action was taken.
    pub state: State,

    /// The action taken, one-hot encoded.
    pub action: Vec<f32>,

    /// The reward, clipped into `[-1, 1]`.
    pub reward: f32,
}

/// Transitions collected by an actor-learner between two synchronizations.
#[derive(Debug, Clone)]
pub struct RolloutSegment {
    t_max: usize,
    transitions: Vec<Transition>,
}

impl RolloutSegment {
    /// Constructs an empty segment holding up to `t_max` transitions.
    pub fn new(t_max: usize) -> Self {
        Self {
            t_max,
            transitions: Vec::with_capacity(t_max),
        }
    }

    /// Appends a transition. The reward is clipped here.
    pub fn push(&mut self, state: State, action: usize, n_actions: usize, reward: f32) {
        debug_assert!(!self.is_full());
        self.transitions.push(Transition {
            state,
            action: one_hot(action, n_actions),
            reward: clip_reward(reward),
        });
    }

    /// The number of transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns `true` if there is no transition.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Returns `true` if the segment holds `t_max` transitions.
    pub fn is_full(&self) -> bool {
        self.transitions.len() >= self.t_max
    }

    /// Returns the transitions in the order they were collected.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Computes targets from `bootstrap` and turns the segment into a training batch.
    pub fn into_batch(self, bootstrap: f32, gamma: f32) -> RolloutBatch {
        let rewards = self.transitions.iter().map(|t| t.reward).collect::<Vec<_>>();
        let targets = discounted_targets(&rewards, bootstrap, gamma);
        let (states, actions) = self
            .transitions
            .into_iter()
            .map(|t| (t.state, t.action))
            .unzip();

        RolloutBatch {
            states,
            actions,
            targets,
        }
    }
}

/// A batch of `(state, one-hot action, target)` given to
/// [`PolicyValueModel::gradient_update`](crate::PolicyValueModel::gradient_update).
#[derive(Debug, Clone)]
pub struct RolloutBatch {
    /// States.
    pub states: Vec<State>,

    /// One-hot actions.
    pub actions: Vec<Vec<f32>>,

    /// Discounted targets.
    pub targets: Vec<f32>,
}

impl RolloutBatch {
    /// The number of samples.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if the batch has no sample.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Array3;
    use proptest::prelude::*;

    fn state(v: f32) -> State {
        State::new(Array3::from_elem((1, 1, 1), v))
    }

    #[test]
    fn test_targets_with_terminal_bootstrap() {
        let targets = discounted_targets(&[1.0, 0.0, 1.0], 0.0, 0.5);
        assert_eq!(targets, vec![1.25, 0.5, 1.0]);
    }

    #[test]
    fn test_targets_symbolic() {
        let (r0, r1, r2) = (0.3f32, -0.7, 1.0);
        let t = discounted_targets(&[r0, r1, r2], 0.0, 0.9);
        assert!((t[2] - r2).abs() < 1e-6);
        assert!((t[1] - (r1 + 0.9 * r2)).abs() < 1e-6);
        assert!((t[0] - (r0 + 0.9 * t[1])).abs() < 1e-6);
    }

    #[test]
    fn test_targets_with_value_bootstrap() {
        let t = discounted_targets(&[0.0, 0.0], 2.0, 0.5);
        assert_eq!(t, vec![0.5, 1.0]);
    }

    #[test]
    fn test_targets_empty() {
        assert!(discounted_targets(&[], 3.0, 0.99).is_empty());
    }

    #[test]
    fn test_segment_into_batch() {
        let mut seg = RolloutSegment::new(5);
        seg.push(state(0.0), 1, 3, 5.0);
        seg.push(state(1.0), 2, 3, -0.5);
        assert!(!seg.is_full());
        assert_eq!(seg.transitions()[0].reward, 1.0);
        assert_eq!(seg.transitions()[1].action, vec![0.0, 0.0, 1.0]);
        let batch = seg.into_batch(0.0, 0.5);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.actions, vec![vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]]);
        // reward 5.0 clipped to 1.0
        assert_eq!(batch.targets, vec![0.75, -0.5]);
        assert_eq!(batch.states[1], state(1.0));
    }

    #[test]
    fn test_segment_full() {
        let mut seg = RolloutSegment::new(2);
        seg.push(state(0.0), 0, 2, 0.0);
        seg.push(state(0.0), 0, 2, 0.0);
        assert!(seg.is_full());
    }

    #[test]
    fn test_one_hot() {
        assert_eq!(one_hot(2, 4), vec![0.0, 0.0, 1.0, 0.0]);
    }

    proptest! {
        #[test]
        fn prop_clip_reward(r in -1e6f32..1e6) {
            let c = clip_reward(r);
            prop_assert!((-1.0..=1.0).contains(&c));
            prop_assert_eq!(c, r.max(-1.0).min(1.0));
            prop_assert_eq!(clip_reward(c), c);
        }
    }
}
