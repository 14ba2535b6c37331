//! CLI interface for trendgate
//!
//! Provides subcommands for:
//! - `replay`: Run recorded events through the engine with a paper executor
//! - `classify`: Show the confidence tier and protective params for a probability
//! - `check`: Validate the configuration
//! - `config`: Show the effective configuration

mod classify;
mod replay;

pub use classify::ClassifyArgs;
pub use replay::{OutputFormat, ReplayArgs};

use crate::config::Config;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "trendgate")]
#[command(about = "Risk gate and confidence classifier for a single-instrument trading engine")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSON-lines event file
    Replay(ReplayArgs),
    /// Classify a continuation probability
    Classify(ClassifyArgs),
    /// Validate the configuration and print the thresholds
    Check,
    /// Show the effective configuration
    Config,
}

/// Thresholds summary printed by `check`
pub fn describe_thresholds(config: &Config) -> String {
    let r = &config.risk;
    let c = &config.confidence;
    format!(
        "Risk thresholds:
  Lot size:               {}
  Trades per session:     {}
  Daily loss limit:       {}%
  Max daily loss:         {}
  Max drawdown:           {}%
  Loss streak limit:      {}
  Cooldown bars:          {}
  Max spread:             {} pips
  Spread spike:           {} pips
  Volatility multiplier:  {}
  Max inference latency:  {} ms
Confidence cut points:    low {} / medium {} / high {}
Protection:               SL {} pips, TP {}R",
        r.lot_size,
        r.max_trades_per_session,
        r.daily_loss_limit_pct,
        r.max_daily_loss,
        r.max_drawdown_pct,
        r.max_consecutive_losses,
        r.cooldown_bars,
        r.max_spread_pips,
        r.max_allowed_spread_pips,
        r.volatility_multiplier,
        r.max_inference_latency_ms,
        c.low,
        c.medium,
        c.high,
        config.protection.base_stop_loss_pips,
        config.protection.base_take_profit_ratio,
    )
}
