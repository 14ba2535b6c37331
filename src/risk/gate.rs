//! Risk state machine and ordered gate evaluation

use super::accounting::{AccountingTracker, StepOutcome};
use super::{GateDecision, RejectReason, RiskState, RiskStatus, ThresholdConfig, Verdict};
use crate::confidence::ConfidenceTier;
use crate::config::ConfigError;
use crate::market::{AccountSource, Clock, InferenceReading, InputError, MarketSnapshot, Session};
use crate::telemetry;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Everything one gate evaluation looks at
#[derive(Debug, Clone, PartialEq)]
pub struct GateContext {
    pub session: Session,
    pub spread_pips: Decimal,
    pub model_healthy: bool,
    pub avg_latency_ms: Decimal,
    pub balance: Decimal,
    pub equity: Decimal,
    pub consecutive_losses: u32,
    pub session_trade_count: u32,
    pub volatility_ratio: Decimal,
    pub confidence: ConfidenceTier,
}

/// A failed checkpoint and the lock it imposes, if any
type Failure = (RejectReason, Option<RiskState>);

/// Risk/kill-switch state machine for one instrument
///
/// Owns every counter the gate reads. Mutated only through the event methods
/// (`on_new_time_step`, `on_trade_opened`, `on_trade_closed`) and
/// [`RiskEngine::evaluate_gate`]; none of them block or perform I/O beyond
/// reading the injected clock and account.
pub struct RiskEngine {
    config: ThresholdConfig,
    clock: Box<dyn Clock>,
    account: Box<dyn AccountSource>,
    accounting: AccountingTracker,
    state: RiskState,
    /// Set on a drawdown breach; cleared only by operator acknowledgment
    drawdown_review: bool,
}

impl RiskEngine {
    /// Validate thresholds and baseline the day from the injected sources
    pub fn new(
        config: ThresholdConfig,
        clock: Box<dyn Clock>,
        account: Box<dyn AccountSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let today = clock.now().date_naive();
        let snapshot = account.snapshot();
        let accounting = AccountingTracker::new(today, snapshot, config.cooldown_bars);

        tracing::info!(
            %today,
            balance = %snapshot.balance,
            equity = %snapshot.equity,
            "Risk engine initialized"
        );

        Ok(Self {
            config,
            clock,
            account,
            accounting,
            state: RiskState::Active,
            drawdown_review: false,
        })
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Run the calendar-day rollover if `now` is on a later date than the last reset
    pub fn check_day_rollover(&mut self, now: DateTime<Utc>) -> bool {
        let rolled = self.accounting.roll_day(now, self.account.snapshot());
        if rolled {
            self.after_rollover();
        }
        rolled
    }

    /// New-bar event: rollover check, equity observation, cooldown countdown
    pub fn on_new_time_step(&mut self, now: DateTime<Utc>) {
        let StepOutcome {
            rolled_over,
            cooldown_expired,
        } = self.accounting.on_time_step(now, self.account.snapshot());

        if rolled_over {
            self.after_rollover();
        }
        if cooldown_expired && self.state == RiskState::Cooldown {
            self.transition(RiskState::Active, "cooldown expired");
        }
        self.publish();
    }

    /// New-bar event stamped with the injected clock
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.on_new_time_step(now);
    }

    pub fn on_trade_opened(&mut self, session: Session, open_price: Decimal) {
        self.accounting.on_trade_opened(session);
        tracing::info!(
            %session,
            %open_price,
            session_trades = self.accounting.session_trade_count(session),
            "Trade opened"
        );
        telemetry::record_trade_opened(session);
        self.publish();
    }

    /// Book a close; a loss arms the cooldown unless a lock is in force
    pub fn on_trade_closed(&mut self, realized_profit: Decimal) {
        let equity = self.account.snapshot().equity;
        let armed = self.accounting.on_trade_closed(realized_profit, equity);

        tracing::info!(
            profit = %realized_profit,
            daily_pnl = %self.accounting.daily_pnl(),
            streak = self.accounting.consecutive_losses(),
            "Trade closed"
        );
        telemetry::record_trade_closed(realized_profit);

        if armed && !self.state.is_locked() {
            self.transition(RiskState::Cooldown, "losing close");
        }
        self.publish();
    }

    /// Operator sign-off after a drawdown lock
    pub fn acknowledge_drawdown_review(&mut self) {
        if !self.drawdown_review {
            return;
        }
        self.drawdown_review = false;
        tracing::info!(
            drawdown_pct = %self.accounting.drawdown_percent(),
            "Drawdown review acknowledged"
        );
        if self.state == RiskState::LockedDrawdown {
            self.transition(RiskState::Active, "drawdown review acknowledged");
        }
        self.publish();
    }

    /// Validate provider inputs and fill in the engine's own counters
    pub fn context(
        &self,
        snapshot: &MarketSnapshot,
        inference: &InferenceReading,
        confidence: ConfidenceTier,
    ) -> Result<GateContext, InputError> {
        let account = self.account.snapshot();
        Ok(GateContext {
            session: snapshot.session,
            spread_pips: snapshot.spread()?,
            model_healthy: inference.model_healthy,
            avg_latency_ms: inference.latency()?,
            balance: account.balance,
            equity: account.equity,
            consecutive_losses: self.accounting.consecutive_losses(),
            session_trade_count: self.accounting.session_trade_count(snapshot.session),
            volatility_ratio: snapshot.volatility()?,
            confidence,
        })
    }

    /// Evaluate the checkpoints in order; the first failure decides
    ///
    /// A passing run leaves the machine `Active`. Quota and trade-quality
    /// spread rejections leave the mode untouched.
    pub fn evaluate_gate(&mut self, ctx: &GateContext) -> GateDecision {
        self.accounting.observe_equity(ctx.equity);

        let verdict = match self.run_checkpoints(ctx) {
            Err((reason, lock)) => {
                if let Some(lock) = lock {
                    self.transition(lock, reason.label());
                }
                Verdict::Reject(reason)
            }
            Ok(()) => {
                self.transition(RiskState::Active, "all checks passed");
                if ctx.confidence.is_tradeable() {
                    Verdict::Allow
                } else {
                    Verdict::Reject(RejectReason::NoConfidence)
                }
            }
        };

        let decision = GateDecision {
            verdict,
            state: self.state,
        };

        match decision.reject_reason() {
            None => tracing::debug!(session = %ctx.session, confidence = %ctx.confidence, "Gate passed"),
            Some(reason) => tracing::debug!(
                session = %ctx.session,
                reason = reason.label(),
                state = %self.state,
                "Gate rejected"
            ),
        }
        telemetry::record_gate(&decision);
        self.publish();
        decision
    }

    fn run_checkpoints(&mut self, ctx: &GateContext) -> Result<(), Failure> {
        let limits = &self.config;

        if !ctx.model_healthy {
            return Err((RejectReason::ModelUnhealthy, Some(RiskState::LockedModelHealth)));
        }

        if ctx.spread_pips > limits.max_allowed_spread_pips {
            return Err((
                RejectReason::SpreadSpike(ctx.spread_pips),
                Some(RiskState::LockedSpreadSpike),
            ));
        }

        if ctx.avg_latency_ms > limits.max_inference_latency_ms {
            return Err((
                RejectReason::LatencyExceeded(ctx.avg_latency_ms),
                Some(RiskState::LockedLatency),
            ));
        }

        let daily_pnl = self.accounting.daily_pnl();
        if daily_pnl <= -limits.max_daily_loss {
            return Err((
                RejectReason::DailyLossCap(daily_pnl),
                Some(RiskState::LockedDailyLoss),
            ));
        }

        let drawdown = self.accounting.drawdown.drawdown_percent(ctx.equity);
        if self.drawdown_review || drawdown >= limits.max_drawdown_pct {
            if !self.drawdown_review {
                tracing::warn!(%drawdown, limit = %limits.max_drawdown_pct, "Drawdown limit breached, review required");
            }
            self.drawdown_review = true;
            return Err((RejectReason::Drawdown(drawdown), Some(RiskState::LockedDrawdown)));
        }

        if ctx.consecutive_losses >= limits.max_consecutive_losses {
            return Err((
                RejectReason::LossStreak(ctx.consecutive_losses),
                Some(RiskState::LockedLossStreak),
            ));
        }

        let cooldown = self.accounting.cooldown.remaining();
        if cooldown > 0 {
            return Err((RejectReason::Cooldown(cooldown), Some(RiskState::Cooldown)));
        }

        if ctx.volatility_ratio > limits.volatility_multiplier {
            return Err((
                RejectReason::Volatility(ctx.volatility_ratio),
                Some(RiskState::LockedVolatility),
            ));
        }

        if ctx.session_trade_count >= limits.max_trades_per_session {
            return Err((
                RejectReason::SessionQuota {
                    session: ctx.session,
                    count: ctx.session_trade_count,
                },
                None,
            ));
        }

        if ctx.spread_pips > limits.max_spread_pips {
            return Err((RejectReason::SpreadTooWide(ctx.spread_pips), None));
        }

        let loss_pct = self.accounting.daily.loss_percent(ctx.balance);
        if loss_pct >= limits.daily_loss_limit_pct {
            return Err((
                RejectReason::DailyLossPercent(loss_pct),
                Some(RiskState::LockedDailyLoss),
            ));
        }

        Ok(())
    }

    fn after_rollover(&mut self) {
        tracing::info!(
            date = %self.accounting.last_reset(),
            start_balance = %self.accounting.daily.start_balance,
            "Day rollover"
        );
        if matches!(
            self.state,
            RiskState::LockedDailyLoss | RiskState::LockedLossStreak | RiskState::Cooldown
        ) {
            self.transition(RiskState::Active, "day rollover");
        }
    }

    fn transition(&mut self, to: RiskState, cause: &str) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        if to.is_locked() {
            tracing::warn!(%from, %to, cause, "Risk lock engaged");
        } else {
            tracing::info!(%from, %to, cause, "Risk state changed");
        }
    }

    fn publish(&self) {
        telemetry::publish_status(&self.status());
    }

    pub fn risk_state(&self) -> RiskState {
        self.state
    }

    pub fn risk_state_string(&self) -> &'static str {
        self.state.as_str()
    }

    pub fn daily_pnl(&self) -> Decimal {
        self.accounting.daily_pnl()
    }

    pub fn current_drawdown_percent(&self) -> Decimal {
        self.accounting.drawdown_percent()
    }

    pub fn peak_equity(&self) -> Decimal {
        self.accounting.drawdown.peak()
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.accounting.consecutive_losses()
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.accounting.cooldown.remaining()
    }

    pub fn session_trade_count(&self, session: Session) -> u32 {
        self.accounting.session_trade_count(session)
    }

    pub fn today_trade_count(&self) -> u32 {
        self.accounting.sessions.total()
    }

    pub fn drawdown_review_pending(&self) -> bool {
        self.drawdown_review
    }

    pub fn status(&self) -> RiskStatus {
        RiskStatus {
            state: self.state,
            daily_pnl: self.daily_pnl(),
            drawdown_pct: self.current_drawdown_percent(),
            consecutive_losses: self.consecutive_losses(),
            cooldown_remaining: self.cooldown_remaining(),
            today_trade_count: self.today_trade_count(),
            drawdown_review_pending: self.drawdown_review,
        }
    }
}

impl std::fmt::Debug for RiskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskEngine")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("accounting", &self.accounting)
            .field("drawdown_review", &self.drawdown_review)
            .finish()
    }
}
