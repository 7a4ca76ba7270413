//! Trade fingerprints — derived keys for duplicate detection across syncs
//! and across sources.
//!
//! Three families, in decreasing strictness:
//! - **exact**: venue, raw instrument, exit day, pnl in cents, quantity.
//! - **normalized**: same tuple with the instrument passed through
//!   [`normalize_ticker`], unifying option-contract naming variants.
//! - **fuzzy**: venue, normalized instrument, exit day, quantity — pnl and
//!   direction deliberately omitted to tolerate small cross-source
//!   disagreements about the same underlying fill.

use crate::domain::Trade;
use crate::normalize::normalize_ticker;

/// Exact content fingerprint.
pub fn exact(trade: &Trade) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        trade.venue,
        trade.instrument,
        trade.exit_date(),
        pnl_cents(trade.pnl),
        quantity_key(trade.quantity),
    )
}

/// Exact tuple with a normalized instrument name.
pub fn normalized(trade: &Trade) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        trade.venue,
        normalize_ticker(&trade.instrument),
        trade.exit_date(),
        pnl_cents(trade.pnl),
        quantity_key(trade.quantity),
    )
}

/// Fuzzy fingerprint: no pnl, no direction.
pub fn fuzzy(trade: &Trade) -> String {
    format!(
        "{}|{}|{}|{}",
        trade.venue,
        normalize_ticker(&trade.instrument),
        trade.exit_date(),
        quantity_key(trade.quantity),
    )
}

/// Pnl rounded to cents so float noise below a cent cannot split keys.
fn pnl_cents(pnl: f64) -> i64 {
    (pnl * 100.0).round() as i64
}

/// Fixed-precision quantity rendering keeps keys stable across float
/// formatting differences.
fn quantity_key(quantity: f64) -> String {
    format!("{quantity:.4}")
}
