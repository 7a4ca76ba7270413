//! Lot — an open, unmatched portion of a position awaiting a closing fill.

use crate::domain::fill::{Direction, Fill};
use crate::domain::ids::TradeId;
use crate::domain::trade::InstrumentKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One open position leg.
///
/// Created when a fill opens a position, consumed when a closing fill matches
/// it. The lot's id becomes the trade id on close, which is what keeps trade
/// identity stable across re-syncs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    pub id: TradeId,
    pub venue: String,
    pub instrument: String,
    pub kind: InstrumentKind,
    pub direction: Direction,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    /// Remaining open quantity. Never negative.
    pub quantity: f64,
    pub leverage: f64,
    /// Fees accrued on the opening side.
    pub fee: f64,
    pub notional_per_unit: Option<f64>,
    pub tag: String,
}

impl Lot {
    /// Open a lot from an opening fill.
    pub fn from_fill(fill: &Fill) -> Self {
        Self {
            id: fill.id.clone(),
            venue: fill.venue.clone(),
            instrument: fill.instrument.clone(),
            kind: fill.kind,
            direction: fill.direction,
            entry_time: fill.timestamp,
            entry_price: fill.price,
            quantity: fill.quantity,
            leverage: fill.leverage,
            fee: fill.fee,
            notional_per_unit: fill.notional_per_unit,
            tag: fill.tag.clone(),
        }
    }

    /// Notional value of the remaining quantity.
    ///
    /// Falls back to the entry price when the venue supplied no per-unit
    /// notional.
    pub fn notional(&self) -> f64 {
        let per_unit = self.notional_per_unit.unwrap_or(self.entry_price);
        self.quantity * per_unit
    }
}
