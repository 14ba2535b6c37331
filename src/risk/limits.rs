//! Gate thresholds

use crate::config::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Thresholds consulted by the gate; fixed once the engine is built
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Fixed lot size per trade
    pub lot_size: Decimal,
    /// Maximum trades opened per session per day
    pub max_trades_per_session: u32,
    /// Daily loss as percent of day-start balance
    pub daily_loss_limit_pct: Decimal,
    /// Ordinary trade-quality spread ceiling (pips)
    pub max_spread_pips: Decimal,
    /// Bars to sit out after a losing close
    pub cooldown_bars: u32,
    /// Drawdown from peak equity, percent
    pub max_drawdown_pct: Decimal,
    /// Ceiling on fast/slow ATR ratio
    pub volatility_multiplier: Decimal,
    /// Losing closes in a row before the streak lock
    pub max_consecutive_losses: u32,
    /// Kill-switch spread ceiling (pips)
    pub max_allowed_spread_pips: Decimal,
    /// Kill-switch ceiling on average inference latency
    pub max_inference_latency_ms: Decimal,
    /// Kill-switch cap on realized daily loss, account currency
    pub max_daily_loss: Decimal,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            lot_size: dec!(0.01),
            max_trades_per_session: 3,
            daily_loss_limit_pct: dec!(3.0),
            max_spread_pips: dec!(2.5),
            cooldown_bars: 3,
            max_drawdown_pct: dec!(10.0),
            volatility_multiplier: dec!(2.0),
            max_consecutive_losses: 3,
            max_allowed_spread_pips: dec!(3.0),
            max_inference_latency_ms: dec!(100),
            max_daily_loss: dec!(50),
        }
    }
}

impl ThresholdConfig {
    /// Reject negative thresholds and out-of-range percentages
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lot_size <= Decimal::ZERO {
            return Err(ConfigError::NonPositive {
                field: "risk.lot_size",
            });
        }

        // Zero would reject every candidate forever
        let counts = [
            ("risk.max_trades_per_session", self.max_trades_per_session),
            ("risk.max_consecutive_losses", self.max_consecutive_losses),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigError::NonPositive { field });
            }
        }

        let non_negative = [
            ("risk.max_spread_pips", self.max_spread_pips),
            ("risk.volatility_multiplier", self.volatility_multiplier),
            ("risk.max_allowed_spread_pips", self.max_allowed_spread_pips),
            ("risk.max_inference_latency_ms", self.max_inference_latency_ms),
            ("risk.max_daily_loss", self.max_daily_loss),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(ConfigError::Negative { field });
            }
        }

        let percents = [
            ("risk.daily_loss_limit_pct", self.daily_loss_limit_pct),
            ("risk.max_drawdown_pct", self.max_drawdown_pct),
        ];
        for (field, value) in percents {
            if value < Decimal::ZERO {
                return Err(ConfigError::Negative { field });
            }
            if value == Decimal::ZERO || value > dec!(100) {
                return Err(ConfigError::PercentOutOfRange { field });
            }
        }

        Ok(())
    }
}
