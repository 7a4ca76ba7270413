//! Trade — a fully formed journal record, open or closed.

use crate::domain::fill::Direction;
use crate::domain::ids::TradeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// Instrument category, as reported by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentKind {
    Futures,
    Spot,
    Option,
}

/// A journal trade record: one round-trip position, or one still-open leg.
///
/// Two classes of fields live here and the merge engine treats them very
/// differently:
/// - **Server-confirmed** fields (status, pnl, bot, kind, margin, ...) are
///   recomputed on every sync and may be overwritten by merge.
/// - **Annotation** fields (notes, strategy, mistakes, risk_amount,
///   attachment_ids) originate from the user, never from this core, and
///   merge must never blank them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    // ── Identity ──
    pub id: TradeId,
    pub venue: String,
    pub instrument: String,
    pub kind: InstrumentKind,
    pub direction: Direction,

    // ── Entry / exit ──
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,

    // ── Size and economics ──
    pub quantity: f64,
    pub fee: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
    pub leverage: f64,
    pub notional: f64,
    pub margin: f64,

    // ── Classification ──
    pub status: TradeStatus,
    pub bot: bool,
    /// Closing fill arrived with no matching open lot.
    pub orphan: bool,
    /// Direction was assumed Long because the venue side code was unknown.
    pub ambiguous_direction: bool,

    // ── Merge keys ──
    pub external_order_id: Option<String>,

    // ── User annotations (never originated here) ──
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub mistakes: Vec<String>,
    #[serde(default)]
    pub risk_amount: Option<f64>,
    #[serde(default)]
    pub attachment_ids: Vec<String>,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    /// Exit date truncated to day, used by fingerprinting.
    pub fn exit_date(&self) -> chrono::NaiveDate {
        self.exit_time.date_naive()
    }

    /// Basic shape check: positive quantity, ordered times, and a closed
    /// trade carries both prices.
    pub fn is_sane(&self) -> bool {
        if self.quantity <= 0.0 || self.entry_time > self.exit_time {
            return false;
        }
        match self.status {
            TradeStatus::Closed => self.entry_price > 0.0 && self.exit_price > 0.0,
            TradeStatus::Open => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade() -> Trade {
        let entry = Utc.with_ymd_and_hms(2026, 1, 5, 14, 30, 0).unwrap();
        Trade {
            id: TradeId::new("t1"),
            venue: "bybit".into(),
            instrument: "BTCUSDT".into(),
            kind: InstrumentKind::Futures,
            direction: Direction::Long,
            entry_price: 42000.0,
            exit_price: 43000.0,
            entry_time: entry,
            exit_time: entry + chrono::Duration::hours(2),
            quantity: 0.5,
            fee: 4.2,
            pnl: 500.0,
            pnl_pct: 11.9,
            leverage: 10.0,
            notional: 21000.0,
            margin: 2100.0,
            status: TradeStatus::Closed,
            bot: false,
            orphan: false,
            ambiguous_direction: false,
            external_order_id: Some("ord-9".into()),
            notes: String::new(),
            strategy: None,
            mistakes: Vec::new(),
            risk_amount: None,
            attachment_ids: Vec::new(),
        }
    }

    #[test]
    fn sane_closed_trade() {
        assert!(sample_trade().is_sane());
    }

    #[test]
    fn closed_trade_without_exit_price_is_not_sane() {
        let mut trade = sample_trade();
        trade.exit_price = 0.0;
        assert!(!trade.is_sane());
    }

    #[test]
    fn serialization_roundtrip_keeps_annotations() {
        let mut trade = sample_trade();
        trade.notes = "late entry".into();
        trade.mistakes = vec!["fomo".into()];
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(deser.notes, "late entry");
        assert_eq!(deser.mistakes, vec!["fomo".to_string()]);
    }

    #[test]
    fn older_json_without_annotation_fields_still_loads() {
        let mut value = serde_json::to_value(sample_trade()).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("notes");
        obj.remove("strategy");
        obj.remove("mistakes");
        obj.remove("risk_amount");
        obj.remove("attachment_ids");
        let deser: Trade = serde_json::from_value(value).unwrap();
        assert!(deser.notes.is_empty());
        assert!(deser.attachment_ids.is_empty());
    }
}
