//! Fillbook CLI — sync, inspect, and export the trade journal store.
//!
//! Commands:
//! - `sync` — read per-venue raw fill JSON files (already fetched by an
//!   external collaborator), merge into the store, print stats
//! - `show` — list trades from the store, with simple filters
//! - `export` — write the store's trades to CSV

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::Value;

use fillbook_core::TradeStatus;
use fillbook_sync::{load_store, save_store, sync_all, write_trades_csv, SyncConfig};

#[derive(Parser)]
#[command(name = "fillbook", about = "Fillbook — trading journal sync engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge raw venue fills into the journal store.
    Sync {
        /// Path to the JSONL trade store.
        #[arg(long, default_value = "trades.jsonl")]
        store: PathBuf,

        /// TOML config listing venues and their raw fill files.
        #[arg(long)]
        config: PathBuf,
    },
    /// List trades from the store.
    Show {
        /// Path to the JSONL trade store.
        #[arg(long, default_value = "trades.jsonl")]
        store: PathBuf,

        /// Only trades on this instrument.
        #[arg(long)]
        instrument: Option<String>,

        /// Only open positions.
        #[arg(long, default_value_t = false)]
        open: bool,
    },
    /// Export the store's trades to CSV.
    Export {
        /// Path to the JSONL trade store.
        #[arg(long, default_value = "trades.jsonl")]
        store: PathBuf,

        /// Output CSV path.
        #[arg(long, default_value = "trades.csv")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sync { store, config } => cmd_sync(&store, &config),
        Commands::Show {
            store,
            instrument,
            open,
        } => cmd_show(&store, instrument.as_deref(), open),
        Commands::Export { store, out } => cmd_export(&store, &out),
    }
}

fn cmd_sync(store_path: &Path, config_path: &Path) -> Result<()> {
    let config = SyncConfig::from_path(config_path)?;
    let mut store = load_store(store_path)?;

    let mut batches = Vec::new();
    for venue in &config.venues {
        let raws = read_raw_fills(&venue.fills)
            .with_context(|| format!("venue '{}' fills", venue.name))?;
        batches.push((venue.policy(), raws));
    }

    let report = sync_all(&mut store, &batches, Utc::now());
    save_store(store_path, &store)?;

    for venue in &report.venues {
        println!(
            "{:12} candidates {:4}  added {:4}  updated {:4}  duplicate {:4}  skipped {}",
            venue.venue,
            venue.candidates,
            venue.stats.added,
            venue.stats.updated,
            venue.stats.duplicate,
            venue.skipped,
        );
    }
    println!(
        "total: {} trades in store (+{} added, {} updated, {} duplicate)",
        store.len(),
        report.total.added,
        report.total.updated,
        report.total.duplicate,
    );
    Ok(())
}

fn cmd_show(store_path: &Path, instrument: Option<&str>, open_only: bool) -> Result<()> {
    let store = load_store(store_path)?;
    let mut shown = 0usize;

    for trade in store.trades() {
        if let Some(wanted) = instrument {
            if trade.instrument != wanted {
                continue;
            }
        }
        if open_only && trade.status != TradeStatus::Open {
            continue;
        }
        let status = match trade.status {
            TradeStatus::Open => "OPEN",
            TradeStatus::Closed => "CLOSED",
        };
        println!(
            "{:8} {:10} {:14} {:?} qty {:.4} entry {:.4} exit {:.4} pnl {:.2} ({:.2}%){}{}",
            status,
            trade.venue,
            trade.instrument,
            trade.direction,
            trade.quantity,
            trade.entry_price,
            trade.exit_price,
            trade.pnl,
            trade.pnl_pct,
            if trade.bot { " [bot]" } else { "" },
            if trade.orphan { " [orphan]" } else { "" },
        );
        shown += 1;
    }
    println!("{shown} trade(s)");
    Ok(())
}

fn cmd_export(store_path: &Path, out: &Path) -> Result<()> {
    let store = load_store(store_path)?;
    write_trades_csv(out, store.trades())?;
    println!("wrote {} trade(s) to {}", store.len(), out.display());
    Ok(())
}

/// Read one venue's raw fill file: a JSON array of venue-schema records.
fn read_raw_fills(path: &Path) -> Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fills file {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse fills file {}", path.display()))?;
    match value {
        Value::Array(items) => Ok(items),
        _ => anyhow::bail!("fills file {} is not a JSON array", path.display()),
    }
}
