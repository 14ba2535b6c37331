//! Risk management module
//!
//! Kill-switch state machine, daily accounting, and the ordered gate that
//! decides whether a candidate trade may proceed

mod accounting;
mod gate;
mod limits;
mod shared;
mod types;

pub use accounting::{
    AccountingTracker, CooldownTimer, DailyAccounting, DrawdownTracker, LossStreakTracker,
    SessionCounters, StepOutcome,
};
pub use gate::{GateContext, RiskEngine};
pub use limits::ThresholdConfig;
pub use shared::SharedRiskEngine;
pub use types::{GateDecision, RejectReason, RiskState, RiskStatus, Verdict};
