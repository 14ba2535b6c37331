//! Property tests for accounting and classification invariants.
//!
//! Uses proptest to verify:
//! 1. Drawdown peak is the running maximum of observed equity
//! 2. Drawdown percent stays within [0, 100] for positive equity
//! 3. Classifier tiers partition [0, 1] and are monotonic in probability
//! 4. A None tier never passes the gate

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use trendgate::confidence::{ConfidenceThresholds, ConfidenceTier};
use trendgate::market::{
    DirectionalBias, InferenceReading, ManualClock, MarketSnapshot, Session, SharedAccount,
};
use trendgate::risk::{DrawdownTracker, RiskEngine, ThresholdConfig};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_equity() -> impl Strategy<Value = Decimal> {
    (1_000i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_probability() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|bp| Decimal::new(bp, 4))
}

fn arb_session() -> impl Strategy<Value = Session> {
    prop_oneof![
        Just(Session::Asia),
        Just(Session::London),
        Just(Session::NewYork)
    ]
}

// ── 1–2. Drawdown ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn peak_is_running_max(start in arb_equity(), marks in prop::collection::vec(arb_equity(), 1..50)) {
        let mut tracker = DrawdownTracker::new(start);
        let mut expected = start;
        for equity in marks {
            let before = tracker.peak();
            tracker.observe(equity);
            expected = expected.max(equity);
            prop_assert!(tracker.peak() >= before);
            prop_assert_eq!(tracker.peak(), expected);
        }
    }

    #[test]
    fn drawdown_percent_bounded(start in arb_equity(), marks in prop::collection::vec(arb_equity(), 1..50)) {
        let mut tracker = DrawdownTracker::new(start);
        for equity in marks {
            tracker.observe(equity);
            let dd = tracker.drawdown_percent(equity);
            prop_assert!(dd >= Decimal::ZERO);
            prop_assert!(dd <= dec!(100));
        }
    }
}

// ── 3. Classifier partition ──────────────────────────────────────────

proptest! {
    #[test]
    fn classifier_partitions_unit_interval(p in arb_probability()) {
        let t = ConfidenceThresholds::default();
        let tier = ConfidenceTier::classify(p, &t);
        let expected = if p >= t.high {
            ConfidenceTier::High
        } else if p >= t.medium {
            ConfidenceTier::Medium
        } else if p >= t.low {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::None
        };
        prop_assert_eq!(tier, expected);
        prop_assert_eq!(tier.is_tradeable(), tier.scaling().is_some());
    }

    #[test]
    fn classifier_monotonic(a in arb_probability(), b in arb_probability()) {
        let t = ConfidenceThresholds::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(ConfidenceTier::classify(lo, &t) <= ConfidenceTier::classify(hi, &t));
    }
}

// ── 4. None tier never trades ────────────────────────────────────────

proptest! {
    #[test]
    fn none_tier_never_allowed(
        session in arb_session(),
        spread in 0.0..5.0f64,
        volatility in 0.0..4.0f64,
        latency in 0.0..200.0f64,
        healthy in any::<bool>(),
    ) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap());
        let mut engine = RiskEngine::new(
            ThresholdConfig::default(),
            Box::new(clock),
            Box::new(SharedAccount::new(dec!(500))),
        )
        .unwrap();
        let snapshot = MarketSnapshot {
            spread_pips: spread,
            session,
            volatility_ratio: volatility,
            bias: DirectionalBias::Buy,
        };
        let inference = InferenceReading {
            probability: 0.3,
            model_healthy: healthy,
            avg_latency_ms: latency,
        };
        let ctx = engine.context(&snapshot, &inference, ConfidenceTier::None).unwrap();
        prop_assert!(!engine.evaluate_gate(&ctx).allowed());
    }
}
