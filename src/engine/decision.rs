//! One decision cycle: classify, check bias, gate, build the trade intent

use crate::confidence::{ConfidenceClassifier, ConfidenceTier, ProtectionConfig, ProtectiveParams};
use crate::config::{Config, ConfigError};
use crate::execution::{Direction, TradeIntent};
use crate::market::{AccountSource, Clock, InferenceReading, InputError, MarketSnapshot, Session};
use crate::risk::{GateDecision, RiskEngine};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Why a cycle ended before the gate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SkipReason {
    /// A position is already open for the instrument
    PositionOpen,
    /// Snapshot or inference reading failed validation
    InvalidInput(String),
    /// Probability below the lowest confidence cut point
    LowConfidence,
    /// Indicator stack gave no direction
    NoDirection,
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::PositionOpen => "position_open",
            SkipReason::InvalidInput(_) => "invalid_input",
            SkipReason::LowConfidence => "low_confidence",
            SkipReason::NoDirection => "no_direction",
        }
    }
}

impl From<InputError> for SkipReason {
    fn from(err: InputError) -> Self {
        SkipReason::InvalidInput(err.to_string())
    }
}

/// Result of one decision cycle
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Cycle not attempted or candidate discarded before the gate
    Skip(SkipReason),
    /// Gate refused the candidate
    Rejected(GateDecision),
    /// Trade may be placed with these parameters
    Approved(TradeIntent),
}

impl Decision {
    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved(_))
    }
}

/// Decision loop for one instrument
#[derive(Debug)]
pub struct DecisionEngine {
    risk: RiskEngine,
    classifier: ConfidenceClassifier,
    protection: ProtectionConfig,
}

impl DecisionEngine {
    pub fn new(
        risk: RiskEngine,
        classifier: ConfidenceClassifier,
        protection: ProtectionConfig,
    ) -> Result<Self, ConfigError> {
        protection.validate()?;
        Ok(Self {
            risk,
            classifier,
            protection,
        })
    }

    /// Build from a full configuration and the injected sources
    pub fn from_config(
        config: &Config,
        clock: Box<dyn Clock>,
        account: Box<dyn AccountSource>,
    ) -> Result<Self, ConfigError> {
        let risk = RiskEngine::new(config.risk.clone(), clock, account)?;
        let classifier = ConfidenceClassifier::new(config.confidence)?;
        Self::new(risk, classifier, config.protection)
    }

    /// Classify the reading; re-run every cycle
    pub fn classify(&self, inference: &InferenceReading) -> Result<ConfidenceTier, InputError> {
        Ok(self.classifier.classify(inference.probability()?))
    }

    /// Run one cycle against the current snapshot and inference reading
    pub fn run_cycle(
        &mut self,
        snapshot: &MarketSnapshot,
        inference: &InferenceReading,
        position_open: bool,
    ) -> Decision {
        if position_open {
            return Decision::Skip(SkipReason::PositionOpen);
        }

        let prepared = self.classify(inference).and_then(|tier| {
            let ctx = self.risk.context(snapshot, inference, tier)?;
            Ok((tier, ctx))
        });
        let (tier, ctx) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                tracing::warn!(error = %err, "Discarding malformed cycle input");
                return Decision::Skip(err.into());
            }
        };

        if !tier.is_tradeable() {
            tracing::debug!(probability = inference.probability, "Below confidence floor");
            return Decision::Skip(SkipReason::LowConfidence);
        }

        let Some(direction) = Direction::from_bias(snapshot.bias) else {
            return Decision::Skip(SkipReason::NoDirection);
        };

        let gate = self.risk.evaluate_gate(&ctx);
        if !gate.allowed() {
            return Decision::Rejected(gate);
        }

        let Some(params) = ProtectiveParams::for_tier(tier, &self.protection) else {
            return Decision::Skip(SkipReason::LowConfidence);
        };

        let intent = TradeIntent {
            direction,
            lot_size: self.risk.config().lot_size,
            confidence: tier,
            params,
        };
        tracing::info!(
            %direction,
            confidence = %tier,
            sl_pips = %params.stop_loss_pips,
            tp_pips = %params.take_profit_pips,
            session = %snapshot.session,
            "Trade approved"
        );
        Decision::Approved(intent)
    }

    pub fn on_new_time_step(&mut self, now: DateTime<Utc>) {
        self.risk.on_new_time_step(now);
    }

    pub fn tick(&mut self) {
        self.risk.tick();
    }

    pub fn on_trade_opened(&mut self, session: Session, open_price: Decimal) {
        self.risk.on_trade_opened(session, open_price);
    }

    pub fn on_trade_closed(&mut self, realized_profit: Decimal) {
        self.risk.on_trade_closed(realized_profit);
    }

    pub fn risk(&self) -> &RiskEngine {
        &self.risk
    }

    pub fn risk_mut(&mut self) -> &mut RiskEngine {
        &mut self.risk
    }

    pub fn protection(&self) -> &ProtectionConfig {
        &self.protection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{DirectionalBias, ManualClock, SharedAccount};
    use crate::risk::{RejectReason, RiskState, ThresholdConfig};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn engine(config: Config) -> DecisionEngine {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap());
        let account = SharedAccount::new(dec!(500));
        DecisionEngine::from_config(&config, Box::new(clock), Box::new(account)).unwrap()
    }

    fn snapshot(bias: DirectionalBias) -> MarketSnapshot {
        MarketSnapshot {
            spread_pips: 1.2,
            session: Session::London,
            volatility_ratio: 1.0,
            bias,
        }
    }

    fn reading(probability: f64) -> InferenceReading {
        InferenceReading {
            probability,
            model_healthy: true,
            avg_latency_ms: 15.0,
        }
    }

    #[test]
    fn test_approved_medium_uses_base_params() {
        let mut engine = engine(Config::default());
        let decision = engine.run_cycle(&snapshot(DirectionalBias::Buy), &reading(0.85), false);
        let Decision::Approved(intent) = decision else {
            panic!("expected approval, got {decision:?}");
        };
        assert_eq!(intent.direction, Direction::Buy);
        assert_eq!(intent.confidence, ConfidenceTier::Medium);
        assert_eq!(intent.lot_size, dec!(0.01));
        assert_eq!(intent.params.stop_loss_pips, dec!(30));
        assert_eq!(intent.params.take_profit_ratio, dec!(2));
    }

    #[test]
    fn test_high_confidence_extends_target() {
        let mut engine = engine(Config::default());
        let decision = engine.run_cycle(&snapshot(DirectionalBias::Sell), &reading(0.95), false);
        let Decision::Approved(intent) = decision else {
            panic!("expected approval");
        };
        assert_eq!(intent.direction, Direction::Sell);
        assert_eq!(intent.params.take_profit_ratio, dec!(3));
    }

    #[test]
    fn test_low_probability_skipped() {
        let mut engine = engine(Config::default());
        let decision = engine.run_cycle(&snapshot(DirectionalBias::Buy), &reading(0.5), false);
        assert_eq!(decision, Decision::Skip(SkipReason::LowConfidence));
    }

    #[test]
    fn test_neutral_bias_skipped() {
        let mut engine = engine(Config::default());
        let decision = engine.run_cycle(&snapshot(DirectionalBias::Neutral), &reading(0.9), false);
        assert_eq!(decision, Decision::Skip(SkipReason::NoDirection));
    }

    #[test]
    fn test_open_position_skips_without_touching_gate() {
        let mut engine = engine(Config::default());
        let mut snap = snapshot(DirectionalBias::Buy);
        snap.spread_pips = 9.0;
        let decision = engine.run_cycle(&snap, &reading(0.9), true);
        assert_eq!(decision, Decision::Skip(SkipReason::PositionOpen));
        assert_eq!(engine.risk().risk_state(), RiskState::Active);
    }

    #[test]
    fn test_malformed_input_skipped() {
        let mut engine = engine(Config::default());
        let decision = engine.run_cycle(&snapshot(DirectionalBias::Buy), &reading(f64::NAN), false);
        assert!(matches!(decision, Decision::Skip(SkipReason::InvalidInput(_))));
        assert_eq!(engine.risk().risk_state(), RiskState::Active);
    }

    #[test]
    fn test_gate_rejection_surfaces() {
        let config = Config {
            risk: ThresholdConfig {
                max_allowed_spread_pips: dec!(1.0),
                ..ThresholdConfig::default()
            },
            ..Config::default()
        };
        let mut engine = engine(config);
        let decision = engine.run_cycle(&snapshot(DirectionalBias::Buy), &reading(0.9), false);
        let Decision::Rejected(gate) = decision else {
            panic!("expected rejection");
        };
        assert_eq!(gate.reason(), RiskState::LockedSpreadSpike);
        assert!(matches!(gate.reject_reason(), Some(RejectReason::SpreadSpike(_))));
    }
}
