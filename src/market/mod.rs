//! Market inputs module
//!
//! Snapshot, inference, and account types supplied by external providers,
//! plus the clock and account seams injected into the risk engine

mod source;
mod types;

pub use source::{AccountSource, Clock, ManualClock, SharedAccount, SystemClock};
pub use types::{
    AccountSnapshot, DirectionalBias, InferenceReading, InputError, MarketSnapshot, Session,
};
