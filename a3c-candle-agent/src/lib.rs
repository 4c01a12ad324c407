#![warn(missing_docs)]
//! Policy and value networks of the A3C trainer implemented with
//! [candle](https://crates.io/crates/candle-core).
mod loss;
mod model;
mod net;
pub mod opt;
use anyhow::Result;
pub use loss::{a3c_loss, A3cLoss};
pub use model::{A3cLocal, A3cModel, A3cModelConfig, A3cUpdater, TrunkConfig};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl Device {
    /// Returns the candle device.
    pub fn build(self) -> Result<candle_core::Device> {
        match self {
            Self::Cpu => Ok(candle_core::Device::Cpu),
            Self::Cuda(n) => Ok(candle_core::Device::new_cuda(n)?),
        }
    }
}
