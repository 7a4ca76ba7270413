//! Bot/manual classification via order tags and session windowing.
//!
//! Automated strategies tag their parent orders, but child orders (take
//! profits, stop losses, partial closes) often arrive untagged. The
//! session-window rule covers them: once a bot tag appears on an
//! instrument, everything on that instrument from that timestamp onward is
//! treated as bot activity. Anything strictly earlier stays manual.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{Fill, Trade};

/// Default tag markers that identify automated orders.
pub const DEFAULT_BOT_MARKERS: &[&str] = &["BOT", "AUTO", "GRID", "DCA"];

/// Earliest bot-tagged timestamp per instrument — the "session start".
pub type SessionStarts = HashMap<String, DateTime<Utc>>;

/// Scan fills for bot tag markers and record each instrument's session
/// start. Matching is case-insensitive substring.
pub fn session_starts(fills: &[Fill], markers: &[String]) -> SessionStarts {
    let mut starts = SessionStarts::new();
    for fill in fills {
        if !tag_matches(&fill.tag, markers) {
            continue;
        }
        starts
            .entry(fill.instrument.clone())
            .and_modify(|start| {
                if fill.timestamp < *start {
                    *start = fill.timestamp;
                }
            })
            .or_insert(fill.timestamp);
    }
    starts
}

/// Pure classification rule: bot iff the instrument has a session start at
/// or before the given timestamp.
pub fn is_bot(instrument: &str, timestamp: DateTime<Utc>, starts: &SessionStarts) -> bool {
    starts
        .get(instrument)
        .is_some_and(|start| timestamp >= *start)
}

/// Mark trades in place using their entry time against the session map.
pub fn apply(trades: &mut [Trade], starts: &SessionStarts) {
    for trade in trades {
        if is_bot(&trade.instrument, trade.entry_time, starts) {
            trade.bot = true;
        }
    }
}

fn tag_matches(tag: &str, markers: &[String]) -> bool {
    if tag.is_empty() {
        return false;
    }
    let upper = tag.to_uppercase();
    markers
        .iter()
        .any(|marker| !marker.is_empty() && upper.contains(&marker.to_uppercase()))
}

/// Owned copy of the default markers, for configs that don't override them.
pub fn default_markers() -> Vec<String> {
    DEFAULT_BOT_MARKERS.iter().map(|m| m.to_string()).collect()
}
