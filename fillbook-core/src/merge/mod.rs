//! Merge/dedup — reconciles candidate trades against the persisted store.
//!
//! Every sync recomputes trades from raw fills, so the same real-world
//! trade arrives again and again. The cascade decides, in strict priority
//! order, whether an incoming candidate is already known:
//!
//! 1. exact id
//! 2. external order id
//! 3. exact content fingerprint
//! 4. normalized-ticker fingerprint
//! 5. fuzzy fingerprint (no pnl, no direction)
//!
//! An id match may overwrite server-confirmed fields; every other match is
//! a duplicate whose only permitted writes are backfilling a missing
//! external id or an empty notes field. User annotations are never
//! touched. The whole operation is idempotent.

pub mod fingerprint;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Trade, TradeId, TradeStatus};

/// Outcome counts for one merged batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub added: usize,
    pub updated: usize,
    pub duplicate: usize,
}

impl MergeStats {
    pub fn absorb(&mut self, other: MergeStats) {
        self.added += other.added;
        self.updated += other.updated;
        self.duplicate += other.duplicate;
    }
}

/// The persisted trade collection, indexed by id and by the fingerprint
/// families the merge cascade consults.
///
/// Indexes hold positions into `trades` and are rebuilt wholesale on load;
/// only the trade list itself is persisted.
#[derive(Debug, Default, Clone)]
pub struct TradeStore {
    trades: Vec<Trade>,
    by_id: HashMap<TradeId, usize>,
    by_external: HashMap<(String, String), usize>,
    by_exact: HashMap<String, usize>,
    by_normalized: HashMap<String, usize>,
    by_fuzzy: HashMap<String, usize>,
}

impl TradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted trades, restoring every index.
    pub fn from_trades(trades: Vec<Trade>) -> Self {
        let mut store = Self::default();
        for trade in trades {
            store.insert(trade);
        }
        store
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn get(&self, id: &TradeId) -> Option<&Trade> {
        self.by_id.get(id).map(|&index| &self.trades[index])
    }

    /// Merge a batch of candidate trades, applying each exactly once.
    ///
    /// New trades are indexed immediately, so later candidates in the same
    /// batch can match against them.
    pub fn merge_batch(&mut self, batch: Vec<Trade>) -> MergeStats {
        let mut stats = MergeStats::default();
        for candidate in batch {
            match self.find_match(&candidate) {
                Some((index, MatchKind::Id)) => {
                    if update_server_fields(&mut self.trades[index], &candidate) {
                        stats.updated += 1;
                    } else {
                        stats.duplicate += 1;
                    }
                    self.backfill(index, &candidate);
                }
                Some((index, _)) => {
                    stats.duplicate += 1;
                    self.backfill(index, &candidate);
                }
                None => {
                    self.insert(candidate);
                    stats.added += 1;
                }
            }
        }
        stats
    }

    /// Walk the cascade in strict priority order; first match wins.
    fn find_match(&self, candidate: &Trade) -> Option<(usize, MatchKind)> {
        if let Some(&index) = self.by_id.get(&candidate.id) {
            return Some((index, MatchKind::Id));
        }
        if let Some(external) = &candidate.external_order_id {
            let key = (candidate.venue.clone(), external.clone());
            if let Some(&index) = self.by_external.get(&key) {
                return Some((index, MatchKind::External));
            }
        }
        // Fingerprints are only defined for closed trades: an open trade
        // has no exit of its own and its keys would collide with any other
        // same-day lot of the same size.
        if candidate.status != TradeStatus::Closed {
            return None;
        }
        if let Some(&index) = self.by_exact.get(&fingerprint::exact(candidate)) {
            return Some((index, MatchKind::Exact));
        }
        if let Some(&index) = self.by_normalized.get(&fingerprint::normalized(candidate)) {
            return Some((index, MatchKind::Normalized));
        }
        if let Some(&index) = self.by_fuzzy.get(&fingerprint::fuzzy(candidate)) {
            return Some((index, MatchKind::Fuzzy));
        }
        None
    }

    /// Duplicate-path writes: a missing external id and an empty notes
    /// field may be backfilled, nothing else.
    fn backfill(&mut self, index: usize, candidate: &Trade) {
        if self.trades[index].external_order_id.is_none() {
            if let Some(external) = &candidate.external_order_id {
                let venue = self.trades[index].venue.clone();
                self.trades[index].external_order_id = Some(external.clone());
                self.by_external
                    .entry((venue, external.clone()))
                    .or_insert(index);
            }
        }
        if self.trades[index].notes.is_empty() && !candidate.notes.is_empty() {
            self.trades[index].notes = candidate.notes.clone();
        }
    }

    /// Insert a genuinely new trade and register all of its lookup keys.
    fn insert(&mut self, trade: Trade) {
        let index = self.trades.len();
        self.by_id.insert(trade.id.clone(), index);
        if let Some(external) = &trade.external_order_id {
            self.by_external
                .entry((trade.venue.clone(), external.clone()))
                .or_insert(index);
        }
        if trade.status == TradeStatus::Closed {
            self.by_exact
                .entry(fingerprint::exact(&trade))
                .or_insert(index);
            self.by_normalized
                .entry(fingerprint::normalized(&trade))
                .or_insert(index);
            self.by_fuzzy
                .entry(fingerprint::fuzzy(&trade))
                .or_insert(index);
        }
        self.trades.push(trade);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    Id,
    External,
    Exact,
    Normalized,
    Fuzzy,
}

/// Overwrite server-confirmed fields on an id match, preserving the user's
/// annotation fields. Returns whether anything actually changed.
fn update_server_fields(existing: &mut Trade, incoming: &Trade) -> bool {
    let changed = existing.status != incoming.status
        || existing.pnl != incoming.pnl
        || existing.bot != incoming.bot
        || existing.kind != incoming.kind
        || existing.margin != incoming.margin;
    if !changed {
        return false;
    }

    existing.status = incoming.status;
    existing.pnl = incoming.pnl;
    existing.pnl_pct = incoming.pnl_pct;
    existing.bot = incoming.bot;
    existing.kind = incoming.kind;
    existing.margin = incoming.margin;
    existing.notional = incoming.notional;
    existing.fee = incoming.fee;
    existing.exit_price = incoming.exit_price;
    existing.exit_time = incoming.exit_time;
    existing.orphan = incoming.orphan;
    // notes: keep existing content; annotations and attachments always stay.
    if existing.notes.is_empty() && !incoming.notes.is_empty() {
        existing.notes = incoming.notes.clone();
    }
    true
}
