//! Decision engine module
//!
//! Wires the confidence classifier and the risk gate into a single
//! per-cycle decision

mod decision;

pub use decision::{Decision, DecisionEngine, SkipReason};
