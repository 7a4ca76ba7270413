//! Trade store persistence — JSONL, one trade per line.
//!
//! Only the trade list is persisted; lookup indexes are rebuilt on load.
//! The format is resilient to partial writes: a malformed line is skipped
//! rather than failing the whole load. Saves go through a temp file and
//! rename so a crash mid-write never truncates the store.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use fillbook_core::{Trade, TradeStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] io::Error),
    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load a store from a JSONL file. A missing file is an empty store.
pub fn load_store(path: &Path) -> Result<TradeStore, StoreError> {
    if !path.exists() {
        return Ok(TradeStore::new());
    }

    let file = fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    let mut trades: Vec<Trade> = Vec::new();
    let mut malformed = 0usize;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Trade>(&line) {
            Ok(trade) => trades.push(trade),
            Err(_) => malformed += 1,
        }
    }
    if malformed > 0 {
        warn!(path = %path.display(), malformed, "skipped malformed store lines");
    }

    Ok(TradeStore::from_trades(trades))
}

/// Save a store as JSONL via temp-file-and-rename.
pub fn save_store(path: &Path, store: &TradeStore) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("jsonl.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        for trade in store.trades() {
            let json = serde_json::to_string(trade)?;
            writeln!(file, "{json}")?;
        }
        file.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
