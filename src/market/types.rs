//! Market, inference, and account inputs consumed each decision cycle

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trading-hour window used to bucket per-session quotas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Session {
    /// 00:00-08:00 broker time
    Asia,
    /// 08:00-16:00 broker time
    London,
    /// 16:00-24:00 broker time
    NewYork,
}

impl Session {
    /// All sessions in id order
    pub const ALL: [Session; 3] = [Session::Asia, Session::London, Session::NewYork];

    /// Map a numeric session id (0, 1, 2) to a session
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Session::Asia),
            1 => Some(Session::London),
            2 => Some(Session::NewYork),
            _ => None,
        }
    }

    /// Bucket a broker hour into its session
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            0..=7 => Session::Asia,
            8..=15 => Session::London,
            _ => Session::NewYork,
        }
    }

    /// Numeric session id
    pub fn id(self) -> u8 {
        match self {
            Session::Asia => 0,
            Session::London => 1,
            Session::NewYork => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Session::Asia => "asia",
            Session::London => "london",
            Session::NewYork => "newyork",
        }
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator-derived directional bias, consumed as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionalBias {
    Buy,
    Sell,
    Neutral,
}

/// Market-condition snapshot supplied by the feature pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Current spread in pips
    pub spread_pips: f64,
    /// Active trading session
    pub session: Session,
    /// Fast ATR over slow ATR
    pub volatility_ratio: f64,
    /// Directional bias from the indicator stack
    pub bias: DirectionalBias,
}

/// Output of the inference provider for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceReading {
    /// Continuation probability in [0, 1]
    pub probability: f64,
    /// Whether the model reported itself healthy
    pub model_healthy: bool,
    /// Rolling average inference latency
    pub avg_latency_ms: f64,
}

/// Account balance and equity at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub balance: Decimal,
    pub equity: Decimal,
}

impl AccountSnapshot {
    pub fn new(balance: Decimal, equity: Decimal) -> Self {
        Self { balance, equity }
    }

    /// Flat account where equity equals balance
    pub fn flat(balance: Decimal) -> Self {
        Self::new(balance, balance)
    }
}

/// Malformed provider input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// Value is NaN or infinite
    #[error("{field} is not finite: {value}")]
    NonFinite { field: &'static str, value: f64 },
    /// Value is negative where only non-negative values make sense
    #[error("{field} is negative: {value}")]
    Negative { field: &'static str, value: f64 },
    /// Probability outside [0, 1]
    #[error("probability out of range: {0}")]
    ProbabilityOutOfRange(f64),
    /// Finite but beyond what a decimal can hold
    #[error("{field} is out of decimal range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Convert a provider float to a non-negative decimal
fn non_negative(field: &'static str, value: f64) -> Result<Decimal, InputError> {
    if !value.is_finite() {
        return Err(InputError::NonFinite { field, value });
    }
    if value < 0.0 {
        return Err(InputError::Negative { field, value });
    }
    Decimal::from_f64(value).ok_or(InputError::OutOfRange { field, value })
}

impl MarketSnapshot {
    /// Validated spread in pips
    pub fn spread(&self) -> Result<Decimal, InputError> {
        non_negative("spread_pips", self.spread_pips)
    }

    /// Validated volatility ratio
    pub fn volatility(&self) -> Result<Decimal, InputError> {
        non_negative("volatility_ratio", self.volatility_ratio)
    }
}

impl InferenceReading {
    /// Validated probability
    pub fn probability(&self) -> Result<Decimal, InputError> {
        if !self.probability.is_finite() {
            return Err(InputError::NonFinite {
                field: "probability",
                value: self.probability,
            });
        }
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(InputError::ProbabilityOutOfRange(self.probability));
        }
        Decimal::from_f64(self.probability).ok_or(InputError::ProbabilityOutOfRange(self.probability))
    }

    /// Validated average latency
    pub fn latency(&self) -> Result<Decimal, InputError> {
        non_negative("avg_latency_ms", self.avg_latency_ms)
    }
}
