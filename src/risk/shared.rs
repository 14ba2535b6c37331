//! Lock-guarded handle for reading engine status from another thread

use super::{GateContext, GateDecision, RiskEngine, RiskState, RiskStatus};
use crate::market::Session;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable handle; mutations take the write lock, accessors the read lock
#[derive(Debug, Clone)]
pub struct SharedRiskEngine {
    inner: Arc<RwLock<RiskEngine>>,
}

impl SharedRiskEngine {
    pub fn new(engine: RiskEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RiskEngine> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RiskEngine> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn evaluate_gate(&self, ctx: &GateContext) -> GateDecision {
        self.write().evaluate_gate(ctx)
    }

    pub fn on_new_time_step(&self, now: DateTime<Utc>) {
        self.write().on_new_time_step(now);
    }

    pub fn tick(&self) {
        self.write().tick();
    }

    pub fn on_trade_opened(&self, session: Session, open_price: Decimal) {
        self.write().on_trade_opened(session, open_price);
    }

    pub fn on_trade_closed(&self, realized_profit: Decimal) {
        self.write().on_trade_closed(realized_profit);
    }

    pub fn acknowledge_drawdown_review(&self) {
        self.write().acknowledge_drawdown_review();
    }

    pub fn risk_state(&self) -> RiskState {
        self.read().risk_state()
    }

    pub fn risk_state_string(&self) -> &'static str {
        self.read().risk_state_string()
    }

    pub fn status(&self) -> RiskStatus {
        self.read().status()
    }

    /// Run a closure against the engine under the write lock
    pub fn with<R>(&self, f: impl FnOnce(&mut RiskEngine) -> R) -> R {
        f(&mut self.write())
    }
}
