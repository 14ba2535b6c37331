//! Injected time and account sources
//!
//! The risk engine never reads the wall clock or the broker account directly.
//! Production wiring uses [`SystemClock`]; replay and tests drive
//! [`ManualClock`] and [`SharedAccount`] so day boundaries and balances can be
//! stepped deterministically.

use super::AccountSnapshot;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::{Arc, PoisonError, RwLock};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of the current balance and equity
pub trait AccountSource: Send + Sync {
    fn snapshot(&self) -> AccountSnapshot;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock; clones share the same instant
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = at;
    }

    /// Move forward by a duration
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-process account; clones share the same balance and equity
#[derive(Debug, Clone)]
pub struct SharedAccount {
    inner: Arc<RwLock<AccountSnapshot>>,
}

impl SharedAccount {
    pub fn new(balance: Decimal) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AccountSnapshot::flat(balance))),
        }
    }

    /// Overwrite balance and equity
    pub fn set(&self, snapshot: AccountSnapshot) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Mark open exposure to market: equity = balance + unrealized
    pub fn mark(&self, unrealized: Decimal) {
        let mut account = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        account.equity = account.balance + unrealized;
    }

    /// Book a realized profit into both balance and equity
    pub fn apply_realized(&self, profit: Decimal) {
        let mut account = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        account.balance += profit;
        account.equity = account.balance;
    }
}

impl AccountSource for SharedAccount {
    fn snapshot(&self) -> AccountSnapshot {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}
