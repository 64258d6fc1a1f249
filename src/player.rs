//! Player state bound to one audio `Output`, plus the play queue.

mod error;
mod model;
mod queue;

pub use error::PlayerError;
pub use model::*;
pub use queue::PlayQueue;
