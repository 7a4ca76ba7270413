//! Position netting — turns a chronological stream of fills into trades.
//!
//! FIFO semantics: each instrument keeps an arena of open lots, consumed
//! strictly oldest-first. Three close paths exist:
//! - **Reported close**: the fill carries a venue-reported realized pnl.
//!   The matching lot (quantity match within epsilon, else the FIFO head)
//!   is popped and the reported pnl is trusted.
//! - **Auto-net close**: no reported pnl, but the FIFO head has the
//!   opposite direction. Pnl is computed directionally from lot entry and
//!   fill exit prices.
//! - **Orphan close**: a reported close with no open lot. Emitted with
//!   entry price == exit price and the orphan flag set.
//!
//! Quantity mismatches are matched whole-lot against the FIFO head rather
//! than split (best-effort FIFO, not partial-lot accounting).

use std::collections::HashMap;

use crate::domain::{Direction, Fill, Lot, Trade, TradeStatus};

/// Quantity tolerance when pairing a closing fill with an open lot.
const QTY_EPSILON: f64 = 1e-4;

/// Net a venue's normalized fills into trades.
///
/// Fills may arrive unordered; they are stable-sorted by timestamp first.
/// Output order follows production order: closes as they match, then
/// leftover open lots in instrument-first-seen order.
pub fn net_fills(fills: &[Fill]) -> Vec<Trade> {
    let mut ordered: Vec<&Fill> = fills.iter().collect();
    ordered.sort_by_key(|fill| fill.timestamp);

    let mut book = LotBook::default();
    let mut trades = Vec::new();

    for fill in ordered {
        if fill.is_reported_close() {
            trades.push(close_reported(&mut book, fill));
        } else if let Some(lot) = book.pop_head_if_opposite(&fill.instrument, fill.direction) {
            trades.push(close_auto_net(&lot, fill));
        } else {
            book.push(Lot::from_fill(fill));
        }
    }

    for lot in book.drain_in_order() {
        trades.push(open_trade(&lot));
    }

    trades
}

/// Per-instrument arenas of open lots, preserving instrument first-seen
/// order so leftover-lot emission is deterministic.
#[derive(Default)]
struct LotBook {
    arenas: HashMap<String, Vec<Lot>>,
    seen_order: Vec<String>,
}

impl LotBook {
    fn push(&mut self, lot: Lot) {
        let arena = match self.arenas.get_mut(&lot.instrument) {
            Some(arena) => arena,
            None => {
                self.seen_order.push(lot.instrument.clone());
                self.arenas.entry(lot.instrument.clone()).or_default()
            }
        };
        arena.push(lot);
    }

    /// Pop the lot matching a reported close: quantity match within epsilon
    /// preferred, FIFO head otherwise. None when no lot is open.
    fn pop_for_reported_close(&mut self, instrument: &str, quantity: f64) -> Option<Lot> {
        let arena = self.arenas.get_mut(instrument)?;
        if arena.is_empty() {
            return None;
        }
        let index = arena
            .iter()
            .position(|lot| (lot.quantity - quantity).abs() <= QTY_EPSILON)
            .unwrap_or(0);
        Some(arena.remove(index))
    }

    /// Pop the FIFO head only when it holds the opposite direction.
    fn pop_head_if_opposite(&mut self, instrument: &str, direction: Direction) -> Option<Lot> {
        let arena = self.arenas.get_mut(instrument)?;
        let head = arena.first()?;
        if head.direction == direction.opposite() {
            Some(arena.remove(0))
        } else {
            None
        }
    }

    /// Drain all remaining lots, instruments in first-seen order.
    fn drain_in_order(mut self) -> Vec<Lot> {
        let mut lots = Vec::new();
        for instrument in &self.seen_order {
            if let Some(arena) = self.arenas.remove(instrument) {
                lots.extend(arena);
            }
        }
        lots
    }
}

fn close_reported(book: &mut LotBook, fill: &Fill) -> Trade {
    let pnl = fill.reported_pnl.unwrap_or(0.0);
    match book.pop_for_reported_close(&fill.instrument, fill.quantity) {
        Some(lot) => closed_trade(&lot, fill, pnl, false),
        None => orphan_trade(fill, pnl),
    }
}

fn close_auto_net(lot: &Lot, fill: &Fill) -> Trade {
    let pnl = match lot.direction {
        Direction::Long => (fill.price - lot.entry_price) * fill.quantity,
        Direction::Short => (lot.entry_price - fill.price) * fill.quantity,
    };
    closed_trade(lot, fill, pnl, false)
}

/// Build a closed trade from a lot's entry side and a fill's exit side.
///
/// The trade reuses the lot's id: the id was minted when the position
/// opened, so re-syncs that replay the same fills reproduce the same id.
fn closed_trade(lot: &Lot, fill: &Fill, pnl: f64, orphan: bool) -> Trade {
    let quantity = fill.quantity;
    let per_unit = lot.notional_per_unit.unwrap_or(lot.entry_price);
    let notional = quantity * per_unit;
    let margin = safe_div(notional, lot.leverage);
    let pnl_pct = safe_div(pnl, margin) * 100.0;

    Trade {
        id: lot.id.clone(),
        venue: fill.venue.clone(),
        instrument: lot.instrument.clone(),
        kind: lot.kind,
        direction: lot.direction,
        entry_price: lot.entry_price,
        exit_price: fill.price,
        entry_time: lot.entry_time,
        exit_time: fill.timestamp.max(lot.entry_time),
        quantity,
        fee: lot.fee + fill.fee,
        pnl,
        pnl_pct,
        leverage: lot.leverage,
        notional,
        margin,
        status: TradeStatus::Closed,
        bot: false,
        orphan,
        ambiguous_direction: fill.ambiguous_direction,
        external_order_id: fill.external_order_id.clone(),
        notes: String::new(),
        strategy: None,
        mistakes: Vec::new(),
        risk_amount: None,
        attachment_ids: Vec::new(),
    }
}

/// A reported close with no open lot: entry price mirrors the exit price
/// and the reported pnl is trusted as-is.
fn orphan_trade(fill: &Fill, pnl: f64) -> Trade {
    let per_unit = fill.notional_per_unit.unwrap_or(fill.price);
    let notional = fill.quantity * per_unit;
    let margin = safe_div(notional, fill.leverage);
    let pnl_pct = safe_div(pnl, margin) * 100.0;

    Trade {
        id: fill.id.clone(),
        venue: fill.venue.clone(),
        instrument: fill.instrument.clone(),
        kind: fill.kind,
        // The fill is the closing execution, so the position ran opposite.
        direction: fill.direction.opposite(),
        entry_price: fill.price,
        exit_price: fill.price,
        entry_time: fill.timestamp,
        exit_time: fill.timestamp,
        quantity: fill.quantity,
        fee: fill.fee,
        pnl,
        pnl_pct,
        leverage: fill.leverage,
        notional,
        margin,
        status: TradeStatus::Closed,
        bot: false,
        orphan: true,
        ambiguous_direction: fill.ambiguous_direction,
        external_order_id: fill.external_order_id.clone(),
        notes: String::new(),
        strategy: None,
        mistakes: Vec::new(),
        risk_amount: None,
        attachment_ids: Vec::new(),
    }
}

/// A lot still open at end of stream becomes an OPEN trade.
fn open_trade(lot: &Lot) -> Trade {
    let notional = lot.notional();
    let margin = safe_div(notional, lot.leverage);

    Trade {
        id: lot.id.clone(),
        venue: lot.venue.clone(),
        instrument: lot.instrument.clone(),
        kind: lot.kind,
        direction: lot.direction,
        entry_price: lot.entry_price,
        exit_price: lot.entry_price,
        entry_time: lot.entry_time,
        exit_time: lot.entry_time,
        quantity: lot.quantity,
        fee: lot.fee,
        pnl: 0.0,
        pnl_pct: 0.0,
        leverage: lot.leverage,
        notional,
        margin,
        status: TradeStatus::Open,
        bot: false,
        orphan: false,
        ambiguous_direction: false,
        external_order_id: None,
        notes: String::new(),
        strategy: None,
        mistakes: Vec::new(),
        risk_amount: None,
        attachment_ids: Vec::new(),
    }
}

fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
