//! Per-venue sync pipelines and the serialized merge fold.
//!
//! Venue pipelines (normalize → net → classify) share no mutable state and
//! run in parallel under rayon. The merge is a strictly sequential fold
//! over the store: one batch's fingerprint-index updates are fully visible
//! before the next batch's merge begins, which is what keeps concurrent
//! syncs from double-inserting the same trade.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use fillbook_core::{classify, net_fills, normalize_batch};
use fillbook_core::{InstrumentKind, MergeStats, Trade, TradeStore};

/// Per-venue policy applied during a sync.
#[derive(Debug, Clone)]
pub struct VenuePolicy {
    pub venue: String,
    pub kind: InstrumentKind,
    pub bot_markers: Vec<String>,
    /// Spot-venue rule: mark every trade bot, independent of tags.
    pub force_bot: bool,
}

/// Candidate trades produced by one venue's pipeline, pre-merge.
#[derive(Debug)]
pub struct VenueSyncOutcome {
    pub venue: String,
    pub trades: Vec<Trade>,
    /// Raw records that failed normalization.
    pub skipped: usize,
    /// Raw records discarded as unfilled/cancelled.
    pub discarded_unfilled: usize,
}

/// Merge results for one venue within a sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueReport {
    pub venue: String,
    pub candidates: usize,
    pub skipped: usize,
    pub stats: MergeStats,
}

/// Aggregate results of a multi-venue sync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub venues: Vec<VenueReport>,
    pub total: MergeStats,
}

/// Run one venue's pipeline: normalize raw records, net fills into trades,
/// classify bot activity. Pure apart from the injected `now` fallback.
///
/// An empty raw batch (the representation of an upstream fetch failure)
/// yields zero candidates, so a failed venue can never corrupt the store.
pub fn sync_venue(raws: &[Value], policy: &VenuePolicy, now: DateTime<Utc>) -> VenueSyncOutcome {
    let batch = normalize_batch(raws, &policy.venue, policy.kind, now);
    let starts = classify::session_starts(&batch.fills, &policy.bot_markers);

    let mut trades = net_fills(&batch.fills);
    classify::apply(&mut trades, &starts);
    if policy.force_bot {
        for trade in &mut trades {
            trade.bot = true;
        }
    }

    debug!(
        venue = %policy.venue,
        fills = batch.fills.len(),
        trades = trades.len(),
        skipped = batch.skipped,
        "venue pipeline complete"
    );

    VenueSyncOutcome {
        venue: policy.venue.clone(),
        trades,
        skipped: batch.skipped,
        discarded_unfilled: batch.discarded_unfilled,
    }
}

/// Sync several venues into one store.
///
/// Pipelines run in parallel; merges are folded sequentially in the input
/// order of `batches`, so results are deterministic for a given input.
pub fn sync_all(
    store: &mut TradeStore,
    batches: &[(VenuePolicy, Vec<Value>)],
    now: DateTime<Utc>,
) -> SyncReport {
    let outcomes: Vec<VenueSyncOutcome> = batches
        .par_iter()
        .map(|(policy, raws)| sync_venue(raws, policy, now))
        .collect();

    let mut report = SyncReport::default();
    for outcome in outcomes {
        let candidates = outcome.trades.len();
        let stats = store.merge_batch(outcome.trades);
        info!(
            venue = %outcome.venue,
            candidates,
            added = stats.added,
            updated = stats.updated,
            duplicate = stats.duplicate,
            "merged venue batch"
        );
        report.total.absorb(stats);
        report.venues.push(VenueReport {
            venue: outcome.venue,
            candidates,
            skipped: outcome.skipped,
            stats,
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fillbook_core::classify::default_markers;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn futures_policy(venue: &str) -> VenuePolicy {
        VenuePolicy {
            venue: venue.into(),
            kind: InstrumentKind::Futures,
            bot_markers: default_markers(),
            force_bot: false,
        }
    }

    fn round_trip_raws() -> Vec<Value> {
        vec![
            json!({"symbol": "X", "orderId": "a1", "qty": 10.0, "side": "BUY",
                   "price": 100.0, "time": 1_760_000_000_000_i64}),
            json!({"symbol": "X", "orderId": "a2", "qty": 10.0, "side": "SELL",
                   "price": 110.0, "closedPnl": 100.0, "time": 1_760_000_060_000_i64}),
        ]
    }

    #[test]
    fn venue_pipeline_produces_the_round_trip_trade() {
        let outcome = sync_venue(&round_trip_raws(), &futures_policy("bybit"), now());
        assert_eq!(outcome.trades.len(), 1);
        let trade = &outcome.trades[0];
        assert_eq!(trade.entry_price, 100.0);
        assert_eq!(trade.exit_price, 110.0);
        assert_eq!(trade.quantity, 10.0);
        assert_eq!(trade.pnl, 100.0);
    }

    #[test]
    fn empty_batch_leaves_store_untouched() {
        let mut store = TradeStore::new();
        let batches = vec![(futures_policy("bybit"), Vec::new())];
        let report = sync_all(&mut store, &batches, now());
        assert!(store.is_empty());
        assert_eq!(report.total, MergeStats::default());
    }

    #[test]
    fn force_bot_marks_every_trade() {
        let mut policy = futures_policy("mexc-spot");
        policy.kind = InstrumentKind::Spot;
        policy.force_bot = true;
        let outcome = sync_venue(&round_trip_raws(), &policy, now());
        assert!(outcome.trades.iter().all(|t| t.bot));
    }

    #[test]
    fn repeated_sync_is_idempotent() {
        let mut store = TradeStore::new();
        let batches = vec![(futures_policy("bybit"), round_trip_raws())];

        let first = sync_all(&mut store, &batches, now());
        assert_eq!(first.total.added, 1);

        let second = sync_all(&mut store, &batches, now());
        assert_eq!(second.total.added, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn venues_merge_in_input_order() {
        let mut store = TradeStore::new();
        let batches = vec![
            (futures_policy("alpha"), round_trip_raws()),
            (futures_policy("beta"), round_trip_raws()),
        ];
        let report = sync_all(&mut store, &batches, now());
        assert_eq!(report.venues[0].venue, "alpha");
        assert_eq!(report.venues[1].venue, "beta");
        // Same fills, different venues: fingerprints differ, both stored.
        assert_eq!(store.len(), 2);
    }
}
