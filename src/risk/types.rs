//! Risk state, gate verdicts, and status snapshots

use crate::market::Session;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Mode of the risk state machine; exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RiskState {
    /// Trading allowed
    #[default]
    Active,
    /// Pausing after a losing close
    Cooldown,
    LockedDailyLoss,
    LockedDrawdown,
    LockedVolatility,
    LockedModelHealth,
    LockedSpreadSpike,
    LockedLatency,
    LockedLossStreak,
}

impl RiskState {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskState::Active => "ACTIVE",
            RiskState::Cooldown => "COOLDOWN",
            RiskState::LockedDailyLoss => "LOCKED_DAILY_LOSS",
            RiskState::LockedDrawdown => "LOCKED_DRAWDOWN",
            RiskState::LockedVolatility => "LOCKED_VOLATILITY",
            RiskState::LockedModelHealth => "LOCKED_MODEL_HEALTH",
            RiskState::LockedSpreadSpike => "LOCKED_SPREAD_SPIKE",
            RiskState::LockedLatency => "LOCKED_LATENCY",
            RiskState::LockedLossStreak => "LOCKED_LOSS_STREAK",
        }
    }

    pub fn is_locked(self) -> bool {
        !matches!(self, RiskState::Active | RiskState::Cooldown)
    }

    /// Stable numeric code for the state gauge
    pub fn code(self) -> u8 {
        match self {
            RiskState::Active => 0,
            RiskState::Cooldown => 1,
            RiskState::LockedDailyLoss => 2,
            RiskState::LockedDrawdown => 3,
            RiskState::LockedVolatility => 4,
            RiskState::LockedModelHealth => 5,
            RiskState::LockedSpreadSpike => 6,
            RiskState::LockedLatency => 7,
            RiskState::LockedLossStreak => 8,
        }
    }
}

impl std::fmt::Display for RiskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the gate refused a candidate trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Inference provider reported an unhealthy model
    ModelUnhealthy,
    /// Spread above the kill-switch ceiling
    SpreadSpike(Decimal),
    /// Average inference latency above the watchdog ceiling (ms)
    LatencyExceeded(Decimal),
    /// Realized daily P&L at or below the currency cap
    DailyLossCap(Decimal),
    /// Drawdown percent at or above the limit, or awaiting review
    Drawdown(Decimal),
    /// Consecutive losing closes
    LossStreak(u32),
    /// Bars left on the cooldown timer
    Cooldown(u32),
    /// Fast/slow ATR ratio above the multiplier
    Volatility(Decimal),
    /// Session already used its quota
    SessionQuota { session: Session, count: u32 },
    /// Spread above the trade-quality ceiling
    SpreadTooWide(Decimal),
    /// Daily loss percent of day-start balance at or above the limit
    DailyLossPercent(Decimal),
    /// Probability below the lowest confidence cut point
    NoConfidence,
}

impl RejectReason {
    /// Short label for logs and metric tags
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::ModelUnhealthy => "model_health",
            RejectReason::SpreadSpike(_) => "spread_spike",
            RejectReason::LatencyExceeded(_) => "latency",
            RejectReason::DailyLossCap(_) => "daily_loss_cap",
            RejectReason::Drawdown(_) => "drawdown",
            RejectReason::LossStreak(_) => "loss_streak",
            RejectReason::Cooldown(_) => "cooldown",
            RejectReason::Volatility(_) => "volatility",
            RejectReason::SessionQuota { .. } => "session_quota",
            RejectReason::SpreadTooWide(_) => "spread",
            RejectReason::DailyLossPercent(_) => "daily_loss_pct",
            RejectReason::NoConfidence => "no_confidence",
        }
    }
}

/// Outcome of one gate evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Allow,
    Reject(RejectReason),
}

/// Verdict plus the machine's mode after evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct GateDecision {
    pub verdict: Verdict,
    pub state: RiskState,
}

impl GateDecision {
    pub fn allowed(&self) -> bool {
        matches!(self.verdict, Verdict::Allow)
    }

    /// Mode reported alongside the verdict
    pub fn reason(&self) -> RiskState {
        self.state
    }

    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match &self.verdict {
            Verdict::Allow => None,
            Verdict::Reject(reason) => Some(reason),
        }
    }
}

/// Read-only view of the engine for status displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskStatus {
    pub state: RiskState,
    pub daily_pnl: Decimal,
    pub drawdown_pct: Decimal,
    pub consecutive_losses: u32,
    pub cooldown_remaining: u32,
    pub today_trade_count: u32,
    pub drawdown_review_pending: bool,
}
