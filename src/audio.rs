//! Audio output: the `Output` seam the player drives and its rodio
//! implementation running on a dedicated thread.

mod player;
mod sink;
mod thread;
mod types;

pub use player::RodioOutput;
pub use types::{AudioError, Output, OutputEvent};
