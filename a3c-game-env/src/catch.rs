//! A small game bundled with this crate.
//!
//! A ball falls from a random column of the top row, one row per step. The agent moves a
//! paddle on the bottom row left or right. The episode terminates when the ball reaches
//! the bottom row, with reward `1` if the paddle catches it and `-1` otherwise.
use a3c_core::{
    record::{Record, RecordValue},
    NativeAction, RawFrame, SimStep, Simulator,
};
use anyhow::{bail, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const BALL_RGB: [u8; 3] = [255, 255, 255];
const PADDLE_RGB: [u8; 3] = [128, 255, 128];

/// Configuration of [`Catch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchConfig {
    /// The number of columns of the board.
    pub columns: u32,

    /// The number of rows of the board.
    pub rows: u32,

    /// Size of a cell in pixels.
    pub cell_size: u32,
}

impl Default for CatchConfig {
    fn default() -> Self {
        Self {
            columns: 10,
            rows: 10,
            cell_size: 8,
        }
    }
}

/// The catch game.
///
/// Native actions are `Discrete(0)` (left), `Discrete(1)` (stay) and `Discrete(2)` (right).
pub struct Catch {
    config: CatchConfig,
    rng: SmallRng,
    ball: (u32, u32),
    paddle: u32,
    episode_done: bool,
}

impl Catch {
    fn render(&self) -> RawFrame {
        let c = self.config.cell_size;
        let width = self.config.columns * c;
        let height = self.config.rows * c;
        let mut pixels = vec![0u8; (width * height * 3) as usize];

        let mut fill = |col: u32, row: u32, rgb: [u8; 3]| {
            for y in row * c..(row + 1) * c {
                for x in col * c..(col + 1) * c {
                    let i = ((y * width + x) * 3) as usize;
                    pixels[i..i + 3].copy_from_slice(&rgb);
                }
            }
        };
        fill(self.paddle, self.config.rows - 1, PADDLE_RGB);
        fill(self.ball.0, self.ball.1, BALL_RGB);

        RawFrame {
            width,
            height,
            pixels,
        }
    }
}

impl Simulator for Catch {
    type Config = CatchConfig;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        if config.columns == 0 || config.rows < 2 || config.cell_size == 0 {
            bail!("invalid board {:?}", config);
        }
        Ok(Self {
            config: config.clone(),
            rng: SmallRng::seed_from_u64(seed as u64),
            ball: (0, 0),
            paddle: config.columns / 2,
            episode_done: true,
        })
    }

    fn reset(&mut self) -> Result<RawFrame> {
        self.ball = (self.rng.gen_range(0..self.config.columns), 0);
        self.paddle = self.config.columns / 2;
        self.episode_done = false;
        Ok(self.render())
    }

    fn step(&mut self, action: &NativeAction) -> Result<SimStep> {
        if self.episode_done {
            bail!("step called on a terminated episode");
        }
        let dx = match action {
            NativeAction::Discrete(0) => -1,
            NativeAction::Discrete(1) => 0,
            NativeAction::Discrete(2) => 1,
            a => bail!("unsupported action {:?}", a),
        };
        let paddle = self.paddle as i64 + dx;
        self.paddle = paddle.clamp(0, self.config.columns as i64 - 1) as u32;
        self.ball.1 += 1;

        let is_terminated = self.ball.1 == self.config.rows - 1;
        let reward = match (is_terminated, self.ball.0 == self.paddle) {
            (false, _) => 0.0,
            (true, true) => 1.0,
            (true, false) => -1.0,
        };
        self.episode_done = is_terminated;

        Ok(SimStep {
            frame: self.render(),
            reward,
            is_terminated,
            info: Record::from_slice(&[("paddle", RecordValue::Scalar(self.paddle as f32))]),
        })
    }
}
