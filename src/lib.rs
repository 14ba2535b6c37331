//! trendgate: pre-trade risk gate for a single-instrument trading engine
//!
//! This library provides the core components for:
//! - Risk/kill-switch state machine with ordered gate checkpoints
//! - Daily, drawdown, loss-streak and cooldown accounting
//! - Confidence classification and stop-loss / take-profit scaling
//! - Decision cycle orchestration
//! - Paper execution and JSON-lines replay
//! - Logging and Prometheus metrics

pub mod cli;
pub mod confidence;
pub mod config;
pub mod engine;
pub mod execution;
pub mod market;
pub mod replay;
pub mod risk;
pub mod telemetry;
