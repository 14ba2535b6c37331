//! Replay simulator engine

use super::{ReplayEvent, ReplaySummary};
use crate::config::{Config, ConfigError};
use crate::engine::{Decision, DecisionEngine};
use crate::execution::{PaperExecutor, TradeExecutor, TradeTicket};
use crate::market::{
    AccountSource, Clock, InferenceReading, ManualClock, MarketSnapshot, SharedAccount,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Drives the decision engine and a paper executor through recorded events
pub struct Simulator {
    engine: DecisionEngine,
    executor: PaperExecutor,
    clock: ManualClock,
    account: SharedAccount,
    open: Option<TradeTicket>,
    peak_equity: Decimal,
    summary: ReplaySummary,
}

impl Simulator {
    /// Create a new simulator with the clock at `start`
    pub fn new(config: &Config, start: DateTime<Utc>) -> Result<Self, ConfigError> {
        config.execution.validate()?;
        let clock = ManualClock::new(start);
        let account = SharedAccount::new(config.execution.initial_balance);
        let engine =
            DecisionEngine::from_config(config, Box::new(clock.clone()), Box::new(account.clone()))?;

        Ok(Self {
            engine,
            executor: PaperExecutor::new(&config.execution),
            clock,
            account,
            open: None,
            peak_equity: config.execution.initial_balance,
            summary: ReplaySummary::default(),
        })
    }

    /// Run every event, then summarize
    pub fn run<I>(mut self, events: I) -> anyhow::Result<ReplaySummary>
    where
        I: IntoIterator<Item = anyhow::Result<ReplayEvent>>,
    {
        for event in events {
            self.process(event?)?;
        }
        Ok(self.finish())
    }

    pub fn process(&mut self, event: ReplayEvent) -> anyhow::Result<()> {
        match event {
            ReplayEvent::Bar { time, price } => self.on_bar(time, price),
            ReplayEvent::Cycle {
                snapshot,
                inference,
                price,
            } => self.on_cycle(&snapshot, &inference, price),
            ReplayEvent::Exit { price } => {
                match self.open.take() {
                    Some(ticket) => self.close(&ticket, price)?,
                    None => tracing::warn!(%price, "Exit event with no open position"),
                }
                Ok(())
            }
        }
    }

    fn on_bar(&mut self, time: DateTime<Utc>, price: Decimal) -> anyhow::Result<()> {
        let now = self.clock.now();
        if time < now {
            anyhow::bail!("bar at {time} precedes replay clock {now}");
        }
        self.clock.set(time);

        if let Some(ticket) = self.open.take() {
            match ticket.exit_level(price) {
                Some(level) => self.close(&ticket, level)?,
                None => {
                    self.account.mark(self.executor.unrealized(&ticket, price));
                    self.open = Some(ticket);
                }
            }
        }
        self.observe_equity();
        self.engine.tick();
        Ok(())
    }

    fn on_cycle(
        &mut self,
        snapshot: &MarketSnapshot,
        inference: &InferenceReading,
        price: Decimal,
    ) -> anyhow::Result<()> {
        self.summary.cycles += 1;
        match self
            .engine
            .run_cycle(snapshot, inference, self.open.is_some())
        {
            Decision::Skip(reason) => {
                *self
                    .summary
                    .skips
                    .entry(reason.label().to_string())
                    .or_default() += 1;
            }
            Decision::Rejected(gate) => {
                let label = gate.reject_reason().map_or("unknown", |r| r.label());
                *self.summary.rejections.entry(label.to_string()).or_default() += 1;
            }
            Decision::Approved(intent) => {
                self.summary.approvals += 1;
                let ticket = self.executor.place(&intent, snapshot.session, price)?;
                self.engine.on_trade_opened(snapshot.session, price);
                self.open = Some(ticket);
            }
        }
        Ok(())
    }

    fn close(&mut self, ticket: &TradeTicket, price: Decimal) -> anyhow::Result<()> {
        let closed = self.executor.close(ticket, price)?;
        let profit = closed.realized_profit;

        self.account.apply_realized(profit);
        self.engine.on_trade_closed(profit);

        self.summary.trades += 1;
        self.summary.net_pnl += profit;
        if profit > Decimal::ZERO {
            self.summary.wins += 1;
        } else if profit < Decimal::ZERO {
            self.summary.losses += 1;
        }
        self.observe_equity();
        Ok(())
    }

    fn observe_equity(&mut self) {
        let equity = self.account.snapshot().equity;
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
        if self.peak_equity > Decimal::ZERO {
            let dd = (self.peak_equity - equity) / self.peak_equity * dec!(100);
            self.summary.max_drawdown_pct = self.summary.max_drawdown_pct.max(dd);
        }
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn open_position(&self) -> Option<&TradeTicket> {
        self.open.as_ref()
    }

    /// Summary so far; an open position is left unrealized
    pub fn finish(mut self) -> ReplaySummary {
        if let Some(ticket) = &self.open {
            tracing::warn!(id = %ticket.id, "Replay ended with an open position");
        }
        self.summary.final_balance = self.account.snapshot().balance;
        self.summary.final_state = self.engine.risk().risk_state();
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{DirectionalBias, Session};
    use crate::risk::RiskState;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
    }

    fn cycle(probability: f64) -> ReplayEvent {
        ReplayEvent::Cycle {
            snapshot: MarketSnapshot {
                spread_pips: 1.0,
                session: Session::London,
                volatility_ratio: 1.0,
                bias: DirectionalBias::Buy,
            },
            inference: InferenceReading {
                probability,
                model_healthy: true,
                avg_latency_ms: 10.0,
            },
            price: dec!(150.00),
        }
    }

    fn bar(minute: u32, price: Decimal) -> ReplayEvent {
        ReplayEvent::Bar {
            time: Utc.with_ymd_and_hms(2024, 3, 4, 9, minute, 0).unwrap(),
            price,
        }
    }

    #[test]
    fn test_winning_round_trip() {
        let mut sim = Simulator::new(&Config::default(), start()).unwrap();
        sim.process(bar(0, dec!(150.00))).unwrap();
        sim.process(cycle(0.85)).unwrap();
        assert!(sim.open_position().is_some());

        // Second cycle is skipped while the position is open
        sim.process(cycle(0.85)).unwrap();
        sim.process(ReplayEvent::Exit { price: dec!(150.30) }).unwrap();

        let summary = sim.finish();
        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.approvals, 1);
        assert_eq!(summary.skips.get("position_open"), Some(&1));
        assert_eq!(summary.trades, 1);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.net_pnl, dec!(3));
        assert_eq!(summary.final_balance, dec!(503));
        assert_eq!(summary.final_state, RiskState::Active);
    }

    #[test]
    fn test_bar_hits_stop_and_arms_cooldown() {
        let mut sim = Simulator::new(&Config::default(), start()).unwrap();
        sim.process(bar(0, dec!(150.00))).unwrap();
        sim.process(cycle(0.85)).unwrap();

        // Medium tier: 30 pip stop at 149.70
        sim.process(bar(1, dec!(149.50))).unwrap();
        assert!(sim.open_position().is_none());
        assert_eq!(sim.engine().risk().risk_state(), RiskState::Cooldown);

        sim.process(cycle(0.85)).unwrap();
        let summary = sim.finish();
        assert_eq!(summary.losses, 1);
        assert_eq!(summary.net_pnl, dec!(-3));
        assert_eq!(summary.rejections.get("cooldown"), Some(&1));
        assert!(summary.max_drawdown_pct > Decimal::ZERO);
    }

    #[test]
    fn test_out_of_order_bar_fails() {
        let mut sim = Simulator::new(&Config::default(), start()).unwrap();
        sim.process(bar(5, dec!(150.00))).unwrap();
        assert!(sim.process(bar(1, dec!(150.00))).is_err());
    }

    #[test]
    fn test_exit_without_position_is_ignored() {
        let sim = Simulator::new(&Config::default(), start()).unwrap();
        let summary = sim
            .run(vec![Ok(ReplayEvent::Exit { price: dec!(150) })])
            .unwrap();
        assert_eq!(summary.trades, 0);
    }
}
