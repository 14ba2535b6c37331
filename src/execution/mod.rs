//! Execution module
//!
//! The executor places approved trades and reports closes back to the engine

mod paper;
mod types;

pub use paper::PaperExecutor;
pub use types::{ClosedTrade, Direction, TicketId, TradeIntent, TradeTicket};

use crate::market::Session;
use rust_decimal::Decimal;

/// Trait for executor implementations
pub trait TradeExecutor: Send {
    /// Place an approved trade at `price`
    fn place(
        &mut self,
        intent: &TradeIntent,
        session: Session,
        price: Decimal,
    ) -> anyhow::Result<TradeTicket>;
    /// Close an open ticket at `exit_price`
    fn close(&mut self, ticket: &TradeTicket, exit_price: Decimal) -> anyhow::Result<ClosedTrade>;
}
