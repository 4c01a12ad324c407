//! Core traits.
mod model;
mod simulator;
pub use model::{PolicyValue, PolicyValueModel};
pub use simulator::{NativeAction, SimStep, Simulator};
