//! End-to-end sync tests: raw JSON batches through pipeline, merge,
//! persistence, and re-sync.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use fillbook_core::classify::default_markers;
use fillbook_core::{InstrumentKind, TradeStatus, TradeStore};
use fillbook_sync::{load_store, save_store, sync_all, VenuePolicy};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn policy(venue: &str, kind: InstrumentKind, force_bot: bool) -> VenuePolicy {
    VenuePolicy {
        venue: venue.into(),
        kind,
        bot_markers: default_markers(),
        force_bot,
    }
}

fn bybit_raws() -> Vec<Value> {
    vec![
        // manual round trip on BTCUSDT
        json!({"symbol": "BTCUSDT", "orderId": "b1", "qty": "0.5", "side": "Buy",
               "avgPrice": "40000", "leverage": "10", "updatedTime": 1_760_000_000_000_i64}),
        json!({"symbol": "BTCUSDT", "orderId": "b2", "qty": "0.5", "side": "Sell",
               "avgPrice": "41000", "closedPnl": "500", "leverage": "10",
               "updatedTime": 1_760_003_600_000_i64}),
        // grid bot session on ETHUSDT; second order untagged but in-session
        json!({"symbol": "ETHUSDT", "orderId": "b3", "qty": 1.0, "side": "Buy",
               "price": 2000.0, "orderTag": "grid-7", "updatedTime": 1_760_000_100_000_i64}),
        json!({"symbol": "ETHUSDT", "orderId": "b4", "qty": 1.0, "side": "Sell",
               "price": 2050.0, "closedPnl": 50.0, "updatedTime": 1_760_000_200_000_i64}),
        // still-open lot
        json!({"symbol": "SOLUSDT", "orderId": "b5", "qty": 10.0, "side": "Buy",
               "price": 150.0, "updatedTime": 1_760_000_300_000_i64}),
        // cancelled order, must be discarded
        json!({"symbol": "SOLUSDT", "orderId": "b6", "qty": 0.0, "side": "Buy",
               "price": 150.0}),
    ]
}

fn spot_raws() -> Vec<Value> {
    vec![
        json!({"symbol": "DOGEUSDT", "orderId": "m1", "qty": 100.0, "side": 1,
               "dealAvgPrice": 0.1, "time": 1_760_000_400_000_i64}),
        json!({"symbol": "DOGEUSDT", "orderId": "m2", "qty": 100.0, "side": 2,
               "dealAvgPrice": 0.12, "profit": 2.0, "time": 1_760_000_500_000_i64}),
    ]
}

fn batches() -> Vec<(VenuePolicy, Vec<Value>)> {
    vec![
        (policy("bybit", InstrumentKind::Futures, false), bybit_raws()),
        (policy("mexc-spot", InstrumentKind::Spot, true), spot_raws()),
    ]
}

#[test]
fn multi_venue_sync_produces_expected_ledger() {
    let mut store = TradeStore::new();
    let report = sync_all(&mut store, &batches(), now());

    // bybit: BTC close, ETH close, SOL open lot; mexc: DOGE close
    assert_eq!(report.total.added, 4);
    assert_eq!(store.len(), 4);

    let trades = store.trades();
    let btc = trades.iter().find(|t| t.instrument == "BTCUSDT").unwrap();
    assert_eq!(btc.status, TradeStatus::Closed);
    assert_eq!(btc.pnl, 500.0);
    assert!(!btc.bot);
    // margin = (0.5 * 40000) / 10 = 2000, pnl_pct = 500/2000*100
    assert!((btc.pnl_pct - 25.0).abs() < 1e-9);

    let eth = trades.iter().find(|t| t.instrument == "ETHUSDT").unwrap();
    assert!(eth.bot, "untagged order inside the grid session is bot");

    let sol = trades.iter().find(|t| t.instrument == "SOLUSDT").unwrap();
    assert_eq!(sol.status, TradeStatus::Open);
    assert_eq!(sol.quantity, 10.0);

    let doge = trades.iter().find(|t| t.instrument == "DOGEUSDT").unwrap();
    assert!(doge.bot, "spot venue policy forces the bot flag");
    assert_eq!(doge.pnl, 2.0);
}

#[test]
fn resync_after_reload_adds_nothing_and_keeps_annotations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store/trades.jsonl");

    let mut store = TradeStore::new();
    sync_all(&mut store, &batches(), now());

    // Simulate a user edit between syncs.
    let mut trades = store.into_trades();
    let btc = trades
        .iter_mut()
        .find(|t| t.instrument == "BTCUSDT")
        .unwrap();
    btc.notes = "textbook breakout".into();
    btc.attachment_ids = vec!["screenshot-1".into()];
    let store = TradeStore::from_trades(trades);
    save_store(&path, &store).unwrap();

    let mut reloaded = load_store(&path).unwrap();
    let report = sync_all(&mut reloaded, &batches(), now());
    assert_eq!(report.total.added, 0);
    assert_eq!(reloaded.len(), 4);

    let btc = reloaded
        .trades()
        .iter()
        .find(|t| t.instrument == "BTCUSDT")
        .unwrap();
    assert_eq!(btc.notes, "textbook breakout");
    assert_eq!(btc.attachment_ids, vec!["screenshot-1".to_string()]);
}

#[test]
fn parallel_sync_is_deterministic() {
    let run = || {
        let mut store = TradeStore::new();
        sync_all(&mut store, &batches(), now());
        store
            .trades()
            .iter()
            .map(|t| t.id.as_str().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn failed_venue_fetch_is_an_empty_batch_and_harmless() {
    let mut store = TradeStore::new();
    sync_all(&mut store, &batches(), now());
    let before = store.len();

    let degraded = vec![
        (policy("bybit", InstrumentKind::Futures, false), Vec::new()),
        (policy("mexc-spot", InstrumentKind::Spot, true), spot_raws()),
    ];
    let report = sync_all(&mut store, &degraded, now());
    assert_eq!(report.total.added, 0);
    assert_eq!(report.venues[0].candidates, 0);
    assert_eq!(store.len(), before);
}

#[test]
fn open_position_closes_on_a_later_sync() {
    let mut store = TradeStore::new();
    sync_all(&mut store, &batches(), now());
    let sol_before = store
        .trades()
        .iter()
        .find(|t| t.instrument == "SOLUSDT")
        .unwrap();
    assert_eq!(sol_before.status, TradeStatus::Open);
    let open_id = sol_before.id.clone();

    // Next sync: the venue now reports the close for the same lot.
    let mut raws = bybit_raws();
    raws.push(json!({"symbol": "SOLUSDT", "orderId": "b7", "qty": 10.0, "side": "Sell",
                     "price": 160.0, "closedPnl": 100.0,
                     "updatedTime": 1_760_000_900_000_i64}));
    let next = vec![(policy("bybit", InstrumentKind::Futures, false), raws)];
    sync_all(&mut store, &next, now());

    let sol_after = store.get(&open_id).unwrap();
    assert_eq!(sol_after.status, TradeStatus::Closed);
    assert_eq!(sol_after.pnl, 100.0);
}
