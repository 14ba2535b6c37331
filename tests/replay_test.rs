//! End-to-end replay tests

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use std::io::Write;
use trendgate::config::Config;
use trendgate::replay::{EventStream, Simulator};
use trendgate::risk::RiskState;

const SESSION: &str = r#"
{"type":"bar","time":"2024-03-04T08:00:00Z","price":150.00}
{"type":"cycle","snapshot":{"spread_pips":1.1,"session":"london","volatility_ratio":1.0,"bias":"buy"},"inference":{"probability":0.86,"model_healthy":true,"avg_latency_ms":20.0},"price":150.00}
{"type":"bar","time":"2024-03-04T08:05:00Z","price":150.70}
{"type":"cycle","snapshot":{"spread_pips":1.1,"session":"london","volatility_ratio":1.0,"bias":"neutral"},"inference":{"probability":0.95,"model_healthy":true,"avg_latency_ms":20.0},"price":150.70}
{"type":"cycle","snapshot":{"spread_pips":1.1,"session":"london","volatility_ratio":1.0,"bias":"sell"},"inference":{"probability":0.50,"model_healthy":true,"avg_latency_ms":20.0},"price":150.70}
{"type":"cycle","snapshot":{"spread_pips":1.1,"session":"london","volatility_ratio":1.0,"bias":"sell"},"inference":{"probability":0.88,"model_healthy":false,"avg_latency_ms":20.0},"price":150.70}
"#;

#[test]
fn test_replay_file_summary() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SESSION.as_bytes()).unwrap();

    let start = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
    let simulator = Simulator::new(&Config::default(), start).unwrap();
    let summary = simulator.run(EventStream::open(file.path()).unwrap()).unwrap();

    assert_eq!(summary.cycles, 4);
    assert_eq!(summary.approvals, 1);
    // Take profit at 150.60: 60 pips on 0.01 lot
    assert_eq!(summary.trades, 1);
    assert_eq!(summary.wins, 1);
    assert_eq!(summary.net_pnl, dec!(6));
    assert_eq!(summary.final_balance, dec!(506));
    assert_eq!(summary.skips.get("no_direction"), Some(&1));
    assert_eq!(summary.skips.get("low_confidence"), Some(&1));
    assert_eq!(summary.rejections.get("model_health"), Some(&1));
    assert_eq!(summary.final_state, RiskState::LockedModelHealth);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["approvals"], 1);
}

#[test]
fn test_replay_stops_on_malformed_line() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"type":"bar","time":"2024-03-04T08:00:00Z","price":150.0}}"#).unwrap();
    writeln!(file, "not json").unwrap();

    let start = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
    let simulator = Simulator::new(&Config::default(), start).unwrap();
    let err = simulator
        .run(EventStream::open(file.path()).unwrap())
        .unwrap_err();
    assert!(err.to_string().contains("line 2"));
}
