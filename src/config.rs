//! Configuration types for trendgate

use crate::confidence::{ConfidenceThresholds, ProtectionConfig};
use crate::risk::ThresholdConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors; any of these keeps the engine from starting
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A threshold that must be >= 0 is negative
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    /// A threshold that must be > 0 is zero or negative
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },
    /// A percentage outside (0, 100]
    #[error("{field} must be within (0, 100]")]
    PercentOutOfRange { field: &'static str },
    /// A probability cut point outside [0, 1]
    #[error("{field} must be within [0, 1]")]
    ProbabilityOutOfRange { field: &'static str },
    /// Confidence cut points are not strictly ascending
    #[error("confidence thresholds must satisfy low < medium < high (got {low} / {medium} / {high})")]
    ThresholdOrder {
        low: Decimal,
        medium: Decimal,
        high: Decimal,
    },
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub risk: ThresholdConfig,
    #[serde(default)]
    pub confidence: ConfidenceThresholds,
    #[serde(default)]
    pub protection: ProtectionConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Paper execution settings used by replay
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionConfig {
    /// Starting account balance
    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,

    /// Price increment of one pip (0.01 for JPY quotes)
    #[serde(default = "default_pip_size")]
    pub pip_size: Decimal,

    /// Account-currency value of one pip on one standard lot
    #[serde(default = "default_pip_value_per_lot")]
    pub pip_value_per_lot: Decimal,
}

fn default_initial_balance() -> Decimal {
    dec!(500)
}
fn default_pip_size() -> Decimal {
    dec!(0.01)
}
fn default_pip_value_per_lot() -> Decimal {
    dec!(10)
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            pip_size: default_pip_size(),
            pip_value_per_lot: default_pip_value_per_lot(),
        }
    }
}

impl ExecutionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_balance <= Decimal::ZERO {
            return Err(ConfigError::NonPositive {
                field: "execution.initial_balance",
            });
        }
        if self.pip_size <= Decimal::ZERO {
            return Err(ConfigError::NonPositive {
                field: "execution.pip_size",
            });
        }
        if self.pip_value_per_lot <= Decimal::ZERO {
            return Err(ConfigError::NonPositive {
                field: "execution.pip_value_per_lot",
            });
        }
        Ok(())
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Default log filter; RUST_LOG takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable output
    #[serde(default)]
    pub json_logs: bool,

    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            metrics_port: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            risk: ThresholdConfig::default(),
            confidence: ConfidenceThresholds::default(),
            protection: ProtectionConfig::default(),
            execution: ExecutionConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Like [`Config::load`], but a missing file is `Ok(None)`
    ///
    /// Every other failure, including an invalid config, is still an error.
    pub fn load_if_present(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok(Some(config)),
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section; the first violation wins
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.risk.validate()?;
        self.confidence.validate()?;
        self.protection.validate()?;
        self.execution.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
        [risk]
        lot_size = 0.01
        max_trades_per_session = 2
        daily_loss_limit_pct = 3.0
        max_spread_pips = 2.5
        cooldown_bars = 3
        max_drawdown_pct = 10.0
        volatility_multiplier = 2.0
        max_consecutive_losses = 3
        max_allowed_spread_pips = 3.0
        max_inference_latency_ms = 100.0
        max_daily_loss = 50.0

        [confidence]
        low = 0.72
        medium = 0.80
        high = 0.90

        [protection]
        base_stop_loss_pips = 25.0
        base_take_profit_ratio = 2.0

        [execution]
        initial_balance = 1000.0

        [telemetry]
        log_level = "debug"
        json_logs = true
        metrics_port = 9100
    "#;

    #[test]
    fn test_config_deserialize() {
        let config = Config::from_toml(FULL).unwrap();
        assert_eq!(config.risk.max_trades_per_session, 2);
        assert_eq!(config.risk.max_allowed_spread_pips, dec!(3.0));
        assert_eq!(config.confidence.medium, dec!(0.80));
        assert_eq!(config.protection.base_stop_loss_pips, dec!(25));
        assert_eq!(config.execution.initial_balance, dec!(1000));
        assert_eq!(config.execution.pip_size, dec!(0.01));
        assert!(config.telemetry.json_logs);
        assert_eq!(config.telemetry.metrics_port, Some(9100));
    }

    #[test]
    fn test_optional_sections_default() {
        let toml = r#"
            [risk]
            max_trades_per_session = 4
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.risk.max_trades_per_session, 4);
        assert_eq!(config.risk.max_consecutive_losses, 3);
        assert_eq!(config.confidence.low, dec!(0.72));
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.telemetry.metrics_port.is_none());
    }

    #[test]
    fn test_rejects_misordered_confidence() {
        let toml = r#"
            [risk]
            [confidence]
            low = 0.85
            medium = 0.80
            high = 0.90
        "#;
        let err = Config::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ThresholdOrder { .. }));
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let toml = r#"
            [risk]
            max_daily_loss = -5.0
        "#;
        let err = Config::from_toml(toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Negative {
                field: "risk.max_daily_loss"
            }
        ));
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_if_present_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_if_present(dir.path().join("config.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_if_present_invalid_config_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[risk]\n[confidence]\nlow = 0.9\nmedium = 0.8\nhigh = 0.7\n")
            .unwrap();

        let err = Config::load_if_present(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ThresholdOrder { .. }));
    }

    #[test]
    fn test_load_if_present_parse_error_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[risk\n").unwrap();

        let err = Config::load_if_present(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.risk.cooldown_bars, 3);
    }

    #[test]
    fn test_config_parse_error() {
        let result = Config::from_toml("[risk\nlot_size = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = Config::from_toml(include_str!("../config.toml.example")).unwrap();
        assert_eq!(config.risk.max_consecutive_losses, 3);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_execution_rejects_zero_pip_size() {
        let execution = ExecutionConfig {
            pip_size: dec!(0),
            ..ExecutionConfig::default()
        };
        assert!(matches!(
            execution.validate(),
            Err(ConfigError::NonPositive {
                field: "execution.pip_size"
            })
        ));
    }
}
