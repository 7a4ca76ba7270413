//! Fillbook Core — venue-fill ingestion engine for a trading journal.
//!
//! This crate contains the heart of the sync pipeline, as pure computation
//! over collections:
//! - Domain types (fills, lots, trades, stable trade ids)
//! - Fill normalization from heterogeneous raw venue records
//! - FIFO position netting (fills → open/closed trades)
//! - Bot/manual classification via order tags and session windowing
//! - Merge/dedup cascade against the persisted trade store
//!
//! The crate performs no I/O: callers hand it raw fill batches and receive
//! trades plus merge statistics. Persistence, fetching, and rendering live
//! in external collaborators.

pub mod classify;
pub mod domain;
pub mod merge;
pub mod netting;
pub mod normalize;

pub use classify::{is_bot, session_starts, SessionStarts, DEFAULT_BOT_MARKERS};
pub use domain::{Direction, Fill, InstrumentKind, Lot, Trade, TradeId, TradeStatus};
pub use merge::{MergeStats, TradeStore};
pub use netting::net_fills;
pub use normalize::{
    normalize_batch, normalize_fill, normalize_ticker, NormalizeError, NormalizedBatch,
};
