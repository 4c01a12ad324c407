//! Configuration of [`GameEnv`](crate::GameEnv).
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`GameEnv`](crate::GameEnv).
///
/// `S` is the configuration of the underlying simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEnvConfig<S> {
    /// Game identifier, looked up in a [`GameRegistry`](crate::GameRegistry).
    pub game: String,

    /// Width of preprocessed frames.
    pub width: u32,

    /// Height of preprocessed frames.
    pub height: u32,

    /// The number of frames in a state.
    pub history_length: usize,

    /// Configuration of the simulator.
    pub sim: S,
}

impl<S: Default> Default for GameEnvConfig<S> {
    fn default() -> Self {
        Self {
            game: crate::CATCH.to_string(),
            width: 84,
            height: 84,
            history_length: 4,
            sim: S::default(),
        }
    }
}

impl<S> GameEnvConfig<S> {
    /// Sets the game identifier.
    pub fn game(mut self, game: impl Into<String>) -> Self {
        self.game = game.into();
        self
    }

    /// Sets the size of preprocessed frames.
    pub fn frame_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the number of frames in a state.
    pub fn history_length(mut self, history_length: usize) -> Self {
        self.history_length = history_length;
        self
    }

    /// Sets the configuration of the simulator.
    pub fn sim(mut self, sim: S) -> Self {
        self.sim = sim;
        self
    }
}

impl<S: Serialize + DeserializeOwned> GameEnvConfig<S> {
    /// Loads [`GameEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GameEnvConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
