//! Confidence-scaled protective parameters

use super::ConfidenceTier;
use crate::config::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Base stop distance and reward/risk ratio before tier scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtectionConfig {
    /// Stop-loss distance in pips at medium confidence
    pub base_stop_loss_pips: Decimal,
    /// Take-profit distance as a multiple of the stop distance
    pub base_take_profit_ratio: Decimal,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            base_stop_loss_pips: dec!(30),
            base_take_profit_ratio: dec!(2.0),
        }
    }
}

impl ProtectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_stop_loss_pips <= Decimal::ZERO {
            return Err(ConfigError::NonPositive {
                field: "protection.base_stop_loss_pips",
            });
        }
        if self.base_take_profit_ratio <= Decimal::ZERO {
            return Err(ConfigError::NonPositive {
                field: "protection.base_take_profit_ratio",
            });
        }
        Ok(())
    }
}

/// Stop-loss and take-profit handed to the executor with an approved trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectiveParams {
    pub stop_loss_pips: Decimal,
    pub take_profit_ratio: Decimal,
    pub take_profit_pips: Decimal,
}

impl ProtectiveParams {
    /// Scale the base parameters by the tier's multipliers
    ///
    /// Returns `None` for the `None` tier, which must never reach the executor.
    pub fn for_tier(tier: ConfidenceTier, base: &ProtectionConfig) -> Option<Self> {
        let factors = tier.scaling()?;
        let stop_loss_pips = base.base_stop_loss_pips * factors.stop_loss;
        let take_profit_ratio = base.base_take_profit_ratio * factors.take_profit;
        Some(Self {
            stop_loss_pips,
            take_profit_ratio,
            take_profit_pips: stop_loss_pips * take_profit_ratio,
        })
    }
}
