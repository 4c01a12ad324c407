//! Records of training and evaluation.
//!
//! An actor-learner emits a [`Record`] at the end of every episode. Records are sent to
//! the coordinator thread, which hands them to a [`Recorder`].
//!
//! ```rust
//! use a3c_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("episode_return", 21.0);
//! record.insert("global_step", RecordValue::Scalar(1000.0));
//! assert_eq!(record.get_scalar("episode_return").unwrap(), 21.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
