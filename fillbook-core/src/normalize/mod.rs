//! Fill normalization — heterogeneous raw venue records → canonical [`Fill`]s.
//!
//! Each venue exposes a different schema for the same execution data. The
//! normalizer resolves every canonical attribute through an ordered alias
//! list ([`rules`]), normalizes side codes through a lookup table, and
//! applies the documented fallbacks: unparseable timestamps become `now`,
//! unknown side codes become Long (flagged ambiguous), and zero-quantity
//! records are discarded before they reach netting.

pub mod rules;
pub mod ticker;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{Direction, Fill, InstrumentKind, TradeId};

pub use ticker::normalize_ticker;

/// Errors from normalizing a single raw record.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("raw record is not a JSON object")]
    NotAnObject,
}

/// Result of normalizing a whole raw batch.
///
/// One malformed record never aborts the batch: offenders are counted in
/// `skipped` and the rest flow through.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub fills: Vec<Fill>,
    /// Records that failed normalization outright.
    pub skipped: usize,
    /// Records discarded for zero or negative filled quantity.
    pub discarded_unfilled: usize,
}

/// Normalize one raw venue record.
///
/// Returns `Ok(None)` for cancelled/unfilled orders (non-positive quantity),
/// which are not an error condition. `now` is injected by the caller so the
/// timestamp fallback stays deterministic under test.
pub fn normalize_fill(
    raw: &Value,
    venue: &str,
    kind: InstrumentKind,
    now: DateTime<Utc>,
) -> Result<Option<Fill>, NormalizeError> {
    let obj = raw.as_object().ok_or(NormalizeError::NotAnObject)?;

    let quantity = rules::QUANTITY.get_f64(obj).unwrap_or(0.0);
    if quantity <= 0.0 {
        return Ok(None);
    }

    let instrument = rules::INSTRUMENT
        .get_string(obj)
        .unwrap_or_else(|| "UNKNOWN".to_string());
    let price = rules::PRICE.get_f64(obj).unwrap_or(0.0);
    let timestamp = rules::TIMESTAMP
        .get(obj)
        .and_then(parse_timestamp)
        .unwrap_or(now);
    let fee = rules::FEE.get_f64(obj).unwrap_or(0.0);
    let reported_pnl = rules::PNL.get_f64(obj);
    let leverage = rules::LEVERAGE.get_f64(obj).unwrap_or(1.0);
    let notional_per_unit = rules::NOTIONAL
        .get_f64(obj)
        .filter(|n| *n > 0.0)
        .map(|total| total / quantity);
    let tag = rules::TAG.get_string(obj).unwrap_or_default();
    let external_order_id = rules::ORDER_ID.get_string(obj);

    let (direction, ambiguous_direction) = match rules::SIDE.get(obj) {
        Some(side) => parse_direction(side),
        None => (Direction::Long, true),
    };

    let id = match &external_order_id {
        Some(order_id) => TradeId::from_order_id(venue, order_id),
        None => TradeId::from_content(
            venue,
            &instrument,
            timestamp.timestamp_millis(),
            price,
            quantity,
        ),
    };

    Ok(Some(Fill {
        id,
        venue: venue.to_string(),
        instrument,
        kind,
        direction,
        price,
        quantity,
        timestamp,
        fee,
        reported_pnl,
        leverage,
        notional_per_unit,
        external_order_id,
        tag,
        ambiguous_direction,
    }))
}

/// Normalize a raw batch, skipping (and counting) records that fail.
pub fn normalize_batch(
    raws: &[Value],
    venue: &str,
    kind: InstrumentKind,
    now: DateTime<Utc>,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for raw in raws {
        match normalize_fill(raw, venue, kind, now) {
            Ok(Some(fill)) => batch.fills.push(fill),
            Ok(None) => batch.discarded_unfilled += 1,
            Err(_) => batch.skipped += 1,
        }
    }
    batch
}

/// Side-code lookup: numeric codes, BUY/SELL strings, LONG/SHORT substrings.
///
/// Returns the direction plus an ambiguity flag. An unrecognized code
/// defaults to Long — a documented ambiguity, surfaced on the trade rather
/// than treated as fatal.
pub fn parse_direction(side: &Value) -> (Direction, bool) {
    let text = match side {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return (Direction::Long, true),
    };
    let upper = text.to_uppercase();

    match upper.as_str() {
        "1" => return (Direction::Long, false),
        "2" => return (Direction::Short, false),
        "BUY" | "B" | "BID" => return (Direction::Long, false),
        "SELL" | "S" | "ASK" => return (Direction::Short, false),
        _ => {}
    }
    if upper.contains("LONG") || upper.contains("BUY") {
        (Direction::Long, false)
    } else if upper.contains("SHORT") || upper.contains("SELL") {
        (Direction::Short, false)
    } else {
        (Direction::Long, true)
    }
}

/// Parse a timestamp value: epoch millis, epoch seconds, or RFC 3339.
///
/// The millis/seconds split is at 1e12 — epoch seconds will not reach that
/// until the year 33658.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(epoch_to_datetime),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(parsed) = trimmed.parse::<f64>() {
                return epoch_to_datetime(parsed);
            }
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}

fn epoch_to_datetime(epoch: f64) -> Option<DateTime<Utc>> {
    if !epoch.is_finite() || epoch <= 0.0 {
        return None;
    }
    let millis = if epoch >= 1e12 { epoch } else { epoch * 1000.0 };
    Utc.timestamp_millis_opt(millis as i64).single()
}
