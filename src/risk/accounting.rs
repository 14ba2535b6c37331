//! Session quotas, daily accounting, drawdown and loss-streak tracking

use crate::market::{AccountSnapshot, Session};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// `(base - value) / base * 100` for a positive base
///
/// Saturates on overflow so an absurd account reading still reads as a breach
/// (or as a gain) instead of panicking.
fn decline_percent(base: Decimal, value: Decimal) -> Decimal {
    let saturated = if value < base {
        Decimal::MAX
    } else {
        Decimal::MIN
    };
    base.checked_sub(value)
        .and_then(|diff| diff.checked_div(base))
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .unwrap_or(saturated)
}

/// Trades opened per session since the last day rollover
#[derive(Debug, Clone, Default)]
pub struct SessionCounters {
    counts: HashMap<Session, u32>,
}

impl SessionCounters {
    pub fn increment(&mut self, session: Session) {
        *self.counts.entry(session).or_insert(0) += 1;
    }

    pub fn get(&self, session: Session) -> u32 {
        self.counts.get(&session).copied().unwrap_or(0)
    }

    /// Trades across all sessions today
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

/// Day-start balance and realized P&L for the current day
#[derive(Debug, Clone)]
pub struct DailyAccounting {
    /// Balance captured at the last rollover
    pub start_balance: Decimal,
    /// Sum of realized profit since the last rollover
    pub realized_pnl: Decimal,
}

impl DailyAccounting {
    pub fn new(start_balance: Decimal) -> Self {
        Self {
            start_balance,
            realized_pnl: dec!(0),
        }
    }

    pub fn record(&mut self, profit: Decimal) {
        self.realized_pnl += profit;
    }

    /// Loss since day start as percent of the start balance; negative on a gain
    pub fn loss_percent(&self, balance: Decimal) -> Decimal {
        if self.start_balance <= dec!(0) {
            return dec!(0);
        }
        decline_percent(self.start_balance, balance)
    }

    /// Re-baseline for a new trading day
    pub fn rebase(&mut self, balance: Decimal) {
        self.start_balance = balance;
        self.realized_pnl = dec!(0);
    }
}

/// Peak equity since the last reset
#[derive(Debug, Clone)]
pub struct DrawdownTracker {
    peak: Decimal,
}

impl DrawdownTracker {
    pub fn new(initial_equity: Decimal) -> Self {
        Self {
            peak: initial_equity,
        }
    }

    /// Raise the peak if equity exceeds it; the peak never falls here
    pub fn observe(&mut self, equity: Decimal) {
        if equity > self.peak {
            self.peak = equity;
        }
    }

    pub fn peak(&self) -> Decimal {
        self.peak
    }

    /// Retracement from peak, percent
    pub fn drawdown_percent(&self, equity: Decimal) -> Decimal {
        if self.peak <= dec!(0) {
            return dec!(0);
        }
        decline_percent(self.peak, equity)
    }

    pub fn reset(&mut self, equity: Decimal) {
        self.peak = equity;
    }
}

/// Consecutive losing closes
#[derive(Debug, Clone, Default)]
pub struct LossStreakTracker {
    count: u32,
}

impl LossStreakTracker {
    /// Losses extend the streak, wins end it, flat closes leave it alone
    pub fn record(&mut self, profit: Decimal) {
        if profit < dec!(0) {
            self.count += 1;
        } else if profit > dec!(0) {
            self.count = 0;
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// Bars remaining before trading resumes after a loss
#[derive(Debug, Clone, Default)]
pub struct CooldownTimer {
    remaining: u32,
}

impl CooldownTimer {
    pub fn arm(&mut self, bars: u32) {
        self.remaining = bars;
    }

    /// Count down one bar; true when this step brought the timer to zero
    pub fn step(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn clear(&mut self) {
        self.remaining = 0;
    }
}

/// What a new time step changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub rolled_over: bool,
    pub cooldown_expired: bool,
}

/// All per-day counters owned by one engine
#[derive(Debug, Clone)]
pub struct AccountingTracker {
    pub sessions: SessionCounters,
    pub daily: DailyAccounting,
    pub drawdown: DrawdownTracker,
    pub streak: LossStreakTracker,
    pub cooldown: CooldownTimer,
    cooldown_bars: u32,
    last_reset: NaiveDate,
    last_equity: Decimal,
}

impl AccountingTracker {
    pub fn new(today: NaiveDate, account: AccountSnapshot, cooldown_bars: u32) -> Self {
        Self {
            sessions: SessionCounters::default(),
            daily: DailyAccounting::new(account.balance),
            drawdown: DrawdownTracker::new(account.equity),
            streak: LossStreakTracker::default(),
            cooldown: CooldownTimer::default(),
            cooldown_bars,
            last_reset: today,
            last_equity: account.equity,
        }
    }

    /// Reset daily counters once per calendar date
    ///
    /// Returns false when `now` falls on the date already reset, so repeated
    /// calls within a day are no-ops.
    pub fn roll_day(&mut self, now: DateTime<Utc>, account: AccountSnapshot) -> bool {
        let today = now.date_naive();
        if today <= self.last_reset {
            return false;
        }
        self.last_reset = today;
        self.sessions.reset();
        self.streak.reset();
        self.cooldown.clear();
        self.daily.rebase(account.balance);
        self.drawdown.reset(account.equity);
        self.last_equity = account.equity;
        true
    }

    /// Rollover check, equity observation, then one cooldown decrement
    pub fn on_time_step(&mut self, now: DateTime<Utc>, account: AccountSnapshot) -> StepOutcome {
        let rolled_over = self.roll_day(now, account);
        self.observe_equity(account.equity);
        let cooldown_expired = self.cooldown.step();
        StepOutcome {
            rolled_over,
            cooldown_expired,
        }
    }

    pub fn on_trade_opened(&mut self, session: Session) {
        self.sessions.increment(session);
    }

    /// Book a close; returns true when it armed the cooldown
    pub fn on_trade_closed(&mut self, profit: Decimal, equity: Decimal) -> bool {
        self.daily.record(profit);
        self.streak.record(profit);
        self.observe_equity(equity);
        if profit < dec!(0) {
            self.cooldown.arm(self.cooldown_bars);
            return self.cooldown.is_active();
        }
        false
    }

    pub fn observe_equity(&mut self, equity: Decimal) {
        self.last_equity = equity;
        self.drawdown.observe(equity);
    }

    pub fn drawdown_percent(&self) -> Decimal {
        self.drawdown.drawdown_percent(self.last_equity)
    }

    pub fn daily_pnl(&self) -> Decimal {
        self.daily.realized_pnl
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.streak.count()
    }

    pub fn session_trade_count(&self, session: Session) -> u32 {
        self.sessions.get(session)
    }

    pub fn last_reset(&self) -> NaiveDate {
        self.last_reset
    }
}
