//! Fillbook Sync — orchestration on top of `fillbook-core`.
//!
//! This crate owns everything impure around the core engine:
//! - Per-venue sync pipelines, parallelized with rayon
//! - The serialized merge fold over the trade store
//! - JSONL store persistence (load/save)
//! - TOML venue configuration
//! - CSV trade export

pub mod config;
pub mod export;
pub mod pipeline;
pub mod store;

pub use config::{ConfigError, SyncConfig, VenueConfig};
pub use export::write_trades_csv;
pub use pipeline::{sync_all, sync_venue, SyncReport, VenuePolicy, VenueReport, VenueSyncOutcome};
pub use store::{load_store, save_store, StoreError};
