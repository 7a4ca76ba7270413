//! Fill — one normalized execution record from a venue.

use crate::domain::ids::TradeId;
use crate::domain::trade::InstrumentKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }
}

/// A single normalized execution record (one side of one order).
///
/// Fills are transient: created per sync call by the normalizer, consumed by
/// the netting engine, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub id: TradeId,
    pub venue: String,
    pub instrument: String,
    pub kind: InstrumentKind,
    pub direction: Direction,
    pub price: f64,
    pub quantity: f64,
    pub timestamp: DateTime<Utc>,
    pub fee: f64,
    /// Venue-reported realized pnl. Present only on venue-reported closes.
    pub reported_pnl: Option<f64>,
    pub leverage: f64,
    /// Notional value per unit of quantity, when the venue supplies one.
    pub notional_per_unit: Option<f64>,
    /// Venue order id of the closing transaction, when stable.
    pub external_order_id: Option<String>,
    /// Raw order tag string (bot markers, client labels).
    pub tag: String,
    /// Set when the venue side code was unrecognized and Long was assumed.
    pub ambiguous_direction: bool,
}

impl Fill {
    /// True when the venue reported a realized pnl for this execution,
    /// marking it as a close rather than an open.
    pub fn is_reported_close(&self) -> bool {
        self.reported_pnl.is_some_and(|pnl| pnl != 0.0)
    }
}
