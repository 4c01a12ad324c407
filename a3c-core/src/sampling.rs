//! Sampling actions from a categorical distribution.
use crate::error::A3cError;
use anyhow::Result;
use log::debug;
use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};

/// Subtracted from every probability before sampling (`epsneg` of `f32`).
///
/// Softmax outputs may sum to slightly more than 1; the subtraction keeps them a valid
/// distribution and keeps near-1 probabilities from swallowing rounding errors.
pub const PROB_EPSILON: f32 = 5.960_464_5e-8;

/// Samples an action index in `[0, probs.len())` from action probabilities.
pub fn sample_action<R: Rng + ?Sized>(probs: &[f32], rng: &mut R) -> Result<usize> {
    if probs.is_empty() {
        return Err(A3cError::InvalidDistribution("no action".to_string()).into());
    }
    if probs.iter().any(|p| !p.is_finite()) {
        return Err(A3cError::InvalidDistribution(format!("{:?}", probs)).into());
    }

    let weights = probs.iter().map(|&p| (p - PROB_EPSILON).max(0.0));
    match WeightedIndex::new(weights) {
        Ok(dist) => Ok(dist.sample(rng)),
        // Every probability was within epsilon of zero.
        Err(_) => {
            debug!("Degenerate action probabilities {:?}, take argmax", probs);
            Ok(argmax(probs))
        }
    }
}

/// Index of the largest probability, the first one on ties.
pub fn argmax(probs: &[f32]) -> usize {
    probs
        .iter()
        .enumerate()
        .fold((0, f32::MIN), |(ix, max), (i, &p)| {
            if p > max {
                (i, p)
            } else {
                (ix, max)
            }
        })
        .0
}
