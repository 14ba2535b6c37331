//! Replay module
//!
//! Feeds recorded bars and decision cycles through the engine with a paper
//! executor and summarizes what the gate did

mod analytics;
mod events;
mod simulator;

pub use analytics::ReplaySummary;
pub use events::{EventStream, ReplayEvent};
pub use simulator::Simulator;
