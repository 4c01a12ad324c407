//! Agent state built from the most recent frames.
use crate::{error::A3cError, frame::Frame};
use anyhow::Result;
use ndarray::{stack, Array3, ArrayView2, Axis};
use std::collections::VecDeque;

/// A stack of the last `K` frames, shape `(K, height, width)`, oldest frame first.
///
/// A state is never modified after construction; every environment step produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    frames: Array3<f32>,
}

impl State {
    /// Constructs a state from stacked frames.
    pub fn new(frames: Array3<f32>) -> Self {
        Self { frames }
    }

    /// Returns the stacked frames.
    pub fn frames(&self) -> &Array3<f32> {
        &self.frames
    }

    /// Returns `(K, height, width)`.
    pub fn dim(&self) -> (usize, usize, usize) {
        self.frames.dim()
    }

    /// Returns the `i`-th frame, `0` being the oldest.
    pub fn frame(&self, i: usize) -> ArrayView2<f32> {
        self.frames.index_axis(Axis(0), i)
    }

    /// Returns the frames flattened in row-major order.
    pub fn to_vec(&self) -> Vec<f32> {
        self.frames.iter().copied().collect()
    }
}

/// Sliding window holding the most recent `K - 1` frames.
///
/// The window is completed with the newest frame each time a state is built.
#[derive(Debug, Clone)]
pub struct StateBuffer {
    history_length: usize,
    frames: VecDeque<Frame>,
}

impl StateBuffer {
    /// Constructs a buffer for states of `history_length` frames.
    pub fn new(history_length: usize) -> Result<Self> {
        if history_length == 0 {
            return Err(
                A3cError::Configuration("history length must be at least 1".to_string()).into(),
            );
        }
        Ok(Self {
            history_length,
            frames: VecDeque::with_capacity(history_length),
        })
    }

    /// The number of frames in a state.
    pub fn history_length(&self) -> usize {
        self.history_length
    }

    /// Clears the buffer and fills it with copies of `initial_frame`.
    ///
    /// Returns the first state of an episode, `K` copies of the initial frame.
    pub fn reset(&mut self, initial_frame: Frame) -> Result<State> {
        self.frames.clear();
        for _ in 0..self.history_length - 1 {
            self.frames.push_back(initial_frame.clone());
        }
        self.build(initial_frame.view())
    }

    /// Appends `new_frame` and returns the state made of the buffered frames followed by it.
    pub fn push_and_build(&mut self, new_frame: Frame) -> Result<State> {
        let state = self.build(new_frame.view())?;
        self.frames.push_back(new_frame);
        while self.frames.len() > self.history_length - 1 {
            self.frames.pop_front();
        }
        Ok(state)
    }

    fn build<'a>(&'a self, newest: ArrayView2<'a, f32>) -> Result<State> {
        let mut views = self.frames.iter().map(|f| f.view()).collect::<Vec<_>>();
        views.push(newest);
        let frames = stack(Axis(0), &views).map_err(|e| {
            A3cError::MalformedFrame(format!("frames of different shapes: {}", e))
        })?;
        Ok(State::new(frames))
    }
}
