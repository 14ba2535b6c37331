//! Execution types

use crate::confidence::{ConfidenceTier, ProtectiveParams};
use crate::market::{DirectionalBias, Session};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ticket identifier
pub type TicketId = Uuid;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// Neutral bias has no direction
    pub fn from_bias(bias: DirectionalBias) -> Option<Self> {
        match bias {
            DirectionalBias::Buy => Some(Direction::Buy),
            DirectionalBias::Sell => Some(Direction::Sell),
            DirectionalBias::Neutral => None,
        }
    }

    /// +1 for buys, -1 for sells
    pub fn sign(self) -> Decimal {
        match self {
            Direction::Buy => Decimal::ONE,
            Direction::Sell => Decimal::NEGATIVE_ONE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An approved trade handed to the executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub direction: Direction,
    pub lot_size: Decimal,
    pub confidence: ConfidenceTier,
    pub params: ProtectiveParams,
}

/// An open position as placed by the executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeTicket {
    pub id: TicketId,
    pub session: Session,
    pub direction: Direction,
    pub lot_size: Decimal,
    pub entry_price: Decimal,
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,
    pub confidence: ConfidenceTier,
}

impl TradeTicket {
    /// Protective level touched by `price`, if any; the stop wins ties
    pub fn exit_level(&self, price: Decimal) -> Option<Decimal> {
        match self.direction {
            Direction::Buy if price <= self.stop_loss_price => Some(self.stop_loss_price),
            Direction::Buy if price >= self.take_profit_price => Some(self.take_profit_price),
            Direction::Sell if price >= self.stop_loss_price => Some(self.stop_loss_price),
            Direction::Sell if price <= self.take_profit_price => Some(self.take_profit_price),
            _ => None,
        }
    }
}

/// A closed position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub ticket: TradeTicket,
    pub exit_price: Decimal,
    /// Signed pip move in the trade's favour
    pub pips: Decimal,
    /// Realized profit in account currency
    pub realized_profit: Decimal,
}
