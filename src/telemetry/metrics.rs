//! Gate and accounting metrics

use crate::market::Session;
use crate::risk::{GateDecision, RiskStatus};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Realized P&L since day start
    DailyPnl,
    /// Current drawdown percentage
    DrawdownPct,
    /// Losing closes in a row
    ConsecutiveLosses,
    /// Bars left on the cooldown timer
    CooldownRemaining,
    /// Numeric risk state code
    RiskState,
    /// Trades opened today
    TodayTrades,
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::DailyPnl => "trendgate_daily_pnl",
            GaugeMetric::DrawdownPct => "trendgate_drawdown_pct",
            GaugeMetric::ConsecutiveLosses => "trendgate_consecutive_losses",
            GaugeMetric::CooldownRemaining => "trendgate_cooldown_remaining",
            GaugeMetric::RiskState => "trendgate_risk_state",
            GaugeMetric::TodayTrades => "trendgate_today_trades",
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(metric.name()).set(value);
}

fn decimal(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Mirror an engine status into gauges
pub fn publish_status(status: &RiskStatus) {
    set_gauge(GaugeMetric::DailyPnl, decimal(status.daily_pnl));
    set_gauge(GaugeMetric::DrawdownPct, decimal(status.drawdown_pct));
    set_gauge(GaugeMetric::ConsecutiveLosses, f64::from(status.consecutive_losses));
    set_gauge(GaugeMetric::CooldownRemaining, f64::from(status.cooldown_remaining));
    set_gauge(GaugeMetric::RiskState, f64::from(status.state.code()));
    set_gauge(GaugeMetric::TodayTrades, f64::from(status.today_trade_count));
}

/// Count a gate evaluation and, on rejection, its reason
pub fn record_gate(decision: &GateDecision) {
    ::metrics::counter!("trendgate_gate_evaluations_total").increment(1);
    if let Some(reason) = decision.reject_reason() {
        ::metrics::counter!("trendgate_gate_rejections_total", "reason" => reason.label())
            .increment(1);
    }
}

pub fn record_trade_opened(session: Session) {
    ::metrics::counter!("trendgate_trades_opened_total", "session" => session.as_str()).increment(1);
}

pub fn record_trade_closed(profit: Decimal) {
    let outcome = if profit > Decimal::ZERO {
        "win"
    } else if profit < Decimal::ZERO {
        "loss"
    } else {
        "flat"
    };
    ::metrics::counter!("trendgate_trades_closed_total", "outcome" => outcome).increment(1);
}
