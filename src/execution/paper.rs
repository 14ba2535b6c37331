//! Paper trading executor

use super::{ClosedTrade, TicketId, TradeExecutor, TradeIntent, TradeTicket};
use crate::config::ExecutionConfig;
use crate::market::Session;
use rust_decimal::Decimal;

/// Fills immediately at the requested price and books P&L in pips
pub struct PaperExecutor {
    pip_size: Decimal,
    pip_value_per_lot: Decimal,
    history: Vec<ClosedTrade>,
}

impl PaperExecutor {
    pub fn new(config: &ExecutionConfig) -> Self {
        Self {
            pip_size: config.pip_size,
            pip_value_per_lot: config.pip_value_per_lot,
            history: vec![],
        }
    }

    /// Signed pip move from entry to `price` in the ticket's favour
    pub fn pips(&self, ticket: &TradeTicket, price: Decimal) -> Decimal {
        (price - ticket.entry_price) * ticket.direction.sign() / self.pip_size
    }

    /// Mark-to-market profit at `price`
    pub fn unrealized(&self, ticket: &TradeTicket, price: Decimal) -> Decimal {
        self.pips(ticket, price) * self.pip_value_per_lot * ticket.lot_size
    }

    pub fn history(&self) -> &[ClosedTrade] {
        &self.history
    }
}

impl TradeExecutor for PaperExecutor {
    fn place(
        &mut self,
        intent: &TradeIntent,
        session: Session,
        price: Decimal,
    ) -> anyhow::Result<TradeTicket> {
        if price <= Decimal::ZERO {
            anyhow::bail!("cannot fill at non-positive price {}", price);
        }
        let sign = intent.direction.sign();
        let stop_distance = intent.params.stop_loss_pips * self.pip_size;
        let target_distance = intent.params.take_profit_pips * self.pip_size;

        let ticket = TradeTicket {
            id: TicketId::new_v4(),
            session,
            direction: intent.direction,
            lot_size: intent.lot_size,
            entry_price: price,
            stop_loss_price: price - sign * stop_distance,
            take_profit_price: price + sign * target_distance,
            confidence: intent.confidence,
        };

        tracing::info!(
            id = %ticket.id,
            direction = %ticket.direction,
            entry = %ticket.entry_price,
            sl = %ticket.stop_loss_price,
            tp = %ticket.take_profit_price,
            "Paper order filled"
        );
        Ok(ticket)
    }

    fn close(&mut self, ticket: &TradeTicket, exit_price: Decimal) -> anyhow::Result<ClosedTrade> {
        let pips = self.pips(ticket, exit_price);
        let closed = ClosedTrade {
            ticket: ticket.clone(),
            exit_price,
            pips,
            realized_profit: self.unrealized(ticket, exit_price),
        };
        tracing::info!(
            id = %ticket.id,
            exit = %exit_price,
            %pips,
            profit = %closed.realized_profit,
            "Paper position closed"
        );
        self.history.push(closed.clone());
        Ok(closed)
    }
}
