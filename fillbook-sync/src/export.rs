//! Trade tape export (CSV) for external analysis tools.

use std::path::Path;

use anyhow::{Context, Result};

use fillbook_core::{Direction, Trade, TradeStatus};

/// Write trades to CSV, one row per trade.
pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;

    writer.write_record([
        "id",
        "venue",
        "instrument",
        "direction",
        "status",
        "entry_time",
        "exit_time",
        "entry_price",
        "exit_price",
        "quantity",
        "fee",
        "pnl",
        "pnl_pct",
        "leverage",
        "bot",
        "notes",
    ])?;

    for trade in trades {
        let direction = match trade.direction {
            Direction::Long => "Long",
            Direction::Short => "Short",
        };
        let status = match trade.status {
            TradeStatus::Open => "OPEN",
            TradeStatus::Closed => "CLOSED",
        };
        writer.write_record([
            trade.id.as_str().to_string(),
            trade.venue.clone(),
            trade.instrument.clone(),
            direction.to_string(),
            status.to_string(),
            trade.entry_time.to_rfc3339(),
            trade.exit_time.to_rfc3339(),
            format!("{:.8}", trade.entry_price),
            format!("{:.8}", trade.exit_price),
            format!("{:.8}", trade.quantity),
            format!("{:.8}", trade.fee),
            format!("{:.2}", trade.pnl),
            format!("{:.2}", trade.pnl_pct),
            format!("{:.2}", trade.leverage),
            trade.bot.to_string(),
            trade.notes.clone(),
        ])?;
    }

    writer.flush().context("failed to flush trades CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fillbook_core::{InstrumentKind, TradeId};

    fn sample_trade() -> Trade {
        let time = Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap();
        Trade {
            id: TradeId::new("a"),
            venue: "bybit".into(),
            instrument: "BTCUSDT".into(),
            kind: InstrumentKind::Futures,
            direction: Direction::Long,
            entry_price: 100.0,
            exit_price: 110.0,
            entry_time: time,
            exit_time: time,
            quantity: 1.0,
            fee: 0.1,
            pnl: 10.0,
            pnl_pct: 10.0,
            leverage: 1.0,
            notional: 100.0,
            margin: 100.0,
            status: TradeStatus::Closed,
            bot: true,
            orphan: false,
            ambiguous_direction: false,
            external_order_id: None,
            notes: "note, with comma".into(),
            strategy: None,
            mistakes: Vec::new(),
            risk_amount: None,
            attachment_ids: Vec::new(),
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_trade() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");
        write_trades_csv(&path, &[sample_trade()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,venue,instrument"));
        assert!(lines[1].contains("BTCUSDT"));
        // csv escaping keeps the comma-bearing note intact
        assert!(lines[1].contains("\"note, with comma\""));
    }
}
