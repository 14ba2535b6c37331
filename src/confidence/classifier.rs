//! Probability to confidence-tier classification

use crate::config::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Ascending probability cut points partitioning [0, 1] into four tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    pub low: Decimal,
    pub medium: Decimal,
    pub high: Decimal,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            low: dec!(0.72),
            medium: dec!(0.80),
            high: dec!(0.90),
        }
    }
}

impl ConfidenceThresholds {
    /// Require 0 <= low < medium < high <= 1
    pub fn validate(&self) -> Result<(), ConfigError> {
        let points = [
            ("confidence.low", self.low),
            ("confidence.medium", self.medium),
            ("confidence.high", self.high),
        ];
        for (field, value) in points {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(ConfigError::ProbabilityOutOfRange { field });
            }
        }
        if !(self.low < self.medium && self.medium < self.high) {
            return Err(ConfigError::ThresholdOrder {
                low: self.low,
                medium: self.medium,
                high: self.high,
            });
        }
        Ok(())
    }
}

/// Discrete confidence derived from a continuation probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Below the low cut point; the trade is skipped
    None,
    Low,
    Medium,
    High,
}

/// Multipliers applied to the base stop distance and reward/risk ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScalingFactors {
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

impl ConfidenceTier {
    /// Classify a probability against the cut points
    pub fn classify(probability: Decimal, thresholds: &ConfidenceThresholds) -> Self {
        if probability >= thresholds.high {
            ConfidenceTier::High
        } else if probability >= thresholds.medium {
            ConfidenceTier::Medium
        } else if probability >= thresholds.low {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::None
        }
    }

    /// SL/TP multipliers; `None` tier has no tradeable parameters
    pub fn scaling(self) -> Option<ScalingFactors> {
        let (stop_loss, take_profit) = match self {
            ConfidenceTier::None => return None,
            ConfidenceTier::Low => (dec!(0.8), dec!(1.2)),
            ConfidenceTier::Medium => (dec!(1.0), dec!(1.0)),
            ConfidenceTier::High => (dec!(1.0), dec!(1.5)),
        };
        Some(ScalingFactors {
            stop_loss,
            take_profit,
        })
    }

    pub fn is_tradeable(self) -> bool {
        self != ConfidenceTier::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceTier::None => "NONE",
            ConfidenceTier::Low => "LOW",
            ConfidenceTier::Medium => "MEDIUM",
            ConfidenceTier::High => "HIGH",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier bound to a validated set of cut points
#[derive(Debug, Clone)]
pub struct ConfidenceClassifier {
    thresholds: ConfidenceThresholds,
}

impl ConfidenceClassifier {
    pub fn new(thresholds: ConfidenceThresholds) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn classify(&self, probability: Decimal) -> ConfidenceTier {
        ConfidenceTier::classify(probability, &self.thresholds)
    }

    pub fn thresholds(&self) -> &ConfidenceThresholds {
        &self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> ConfidenceThresholds {
        ConfidenceThresholds {
            low: dec!(0.72),
            medium: dec!(0.80),
            high: dec!(0.90),
        }
    }

    #[test]
    fn test_classify_boundaries() {
        let t = thresholds();
        assert_eq!(ConfidenceTier::classify(dec!(0), &t), ConfidenceTier::None);
        assert_eq!(ConfidenceTier::classify(dec!(0.7199), &t), ConfidenceTier::None);
        assert_eq!(ConfidenceTier::classify(dec!(0.72), &t), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::classify(dec!(0.7999), &t), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::classify(dec!(0.80), &t), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::classify(dec!(0.85), &t), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::classify(dec!(0.90), &t), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::classify(dec!(1), &t), ConfidenceTier::High);
    }

    #[test]
    fn test_medium_keeps_base_parameters() {
        let tier = ConfidenceTier::classify(dec!(0.85), &thresholds());
        let factors = tier.scaling().unwrap();
        assert_eq!(factors.stop_loss, dec!(1));
        assert_eq!(factors.take_profit, dec!(1));
    }

    #[test]
    fn test_scaling_table() {
        assert!(ConfidenceTier::None.scaling().is_none());

        let low = ConfidenceTier::Low.scaling().unwrap();
        assert_eq!((low.stop_loss, low.take_profit), (dec!(0.8), dec!(1.2)));

        let high = ConfidenceTier::High.scaling().unwrap();
        assert_eq!((high.stop_loss, high.take_profit), (dec!(1.0), dec!(1.5)));
    }

    #[test]
    fn test_validate_order() {
        let bad = ConfidenceThresholds {
            low: dec!(0.80),
            medium: dec!(0.80),
            high: dec!(0.90),
        };
        assert!(matches!(bad.validate(), Err(ConfigError::ThresholdOrder { .. })));

        let out_of_range = ConfidenceThresholds {
            high: dec!(1.1),
            ..thresholds()
        };
        assert!(matches!(
            out_of_range.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                field: "confidence.high"
            })
        ));
    }

    #[test]
    fn test_classifier_rejects_invalid_thresholds() {
        let bad = ConfidenceThresholds {
            low: dec!(0.9),
            medium: dec!(0.8),
            high: dec!(0.7),
        };
        assert!(ConfidenceClassifier::new(bad).is_err());
    }

    #[test]
    fn test_tier_ordering() {
        assert!(ConfidenceTier::None < ConfidenceTier::Low);
        assert!(ConfidenceTier::Medium < ConfidenceTier::High);
        assert!(!ConfidenceTier::None.is_tradeable());
        assert!(ConfidenceTier::Low.is_tradeable());
    }
}
