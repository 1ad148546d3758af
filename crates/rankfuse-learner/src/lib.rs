//! External weight learner for rankfuse.
//!
//! - [`WeightLearner`]: trait for anything that turns a training feature
//!   file into a weight file
//! - [`CommandLearner`]: spawns an external program (RankLib by default)
//!   with a timeout and captured output

mod command;
mod error;
mod learner;

pub use command::CommandLearner;
pub use error::LearnerError;
pub use learner::{LearnerOutput, WeightLearner};
