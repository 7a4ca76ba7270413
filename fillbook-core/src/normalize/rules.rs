//! Accessor rules — ordered alias lists for heterogeneous venue schemas.
//!
//! Each canonical fill attribute has a prioritized list of field names;
//! the first field present in the raw record wins. Values are accepted as
//! JSON numbers or as numeric strings (several venues stringify everything).

use serde_json::{Map, Value};

/// Ordered aliases for a canonical field. Evaluated first-match.
pub struct AccessorRule {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

pub const PRICE: AccessorRule = AccessorRule {
    canonical: "price",
    aliases: &[
        "price",
        "dealAvgPrice",
        "avgPrice",
        "avgEntryPrice",
        "execPrice",
        "orderPrice",
        "fillPrice",
    ],
};

pub const QUANTITY: AccessorRule = AccessorRule {
    canonical: "quantity",
    aliases: &[
        "qty",
        "filledQty",
        "cumExecQty",
        "execQty",
        "dealVol",
        "size",
        "quantity",
        "volume",
    ],
};

pub const TIMESTAMP: AccessorRule = AccessorRule {
    canonical: "timestamp",
    aliases: &[
        "updatedTime",
        "execTime",
        "tradeTime",
        "createdTime",
        "timestamp",
        "time",
    ],
};

pub const FEE: AccessorRule = AccessorRule {
    canonical: "fee",
    aliases: &["fee", "execFee", "closeFee", "openFee", "commission", "fees"],
};

pub const PNL: AccessorRule = AccessorRule {
    canonical: "pnl",
    aliases: &["closedPnl", "realisedPnl", "realizedPnl", "pnl", "profit"],
};

pub const LEVERAGE: AccessorRule = AccessorRule {
    canonical: "leverage",
    aliases: &["leverage", "lever"],
};

pub const NOTIONAL: AccessorRule = AccessorRule {
    canonical: "notional",
    aliases: &["notionalValue", "notional", "positionValue", "cumExecValue"],
};

pub const TAG: AccessorRule = AccessorRule {
    canonical: "tag",
    aliases: &["orderTag", "tag", "orderLinkId", "clientOrderId", "label"],
};

pub const ORDER_ID: AccessorRule = AccessorRule {
    canonical: "order_id",
    aliases: &["orderId", "orderID", "order_id", "execId", "id"],
};

pub const INSTRUMENT: AccessorRule = AccessorRule {
    canonical: "instrument",
    aliases: &["symbol", "instrument", "ticker", "pair", "contract"],
};

pub const SIDE: AccessorRule = AccessorRule {
    canonical: "side",
    aliases: &["side", "direction", "positionSide", "tradeSide", "orderSide"],
};

impl AccessorRule {
    /// First present alias, as a raw value.
    pub fn get<'a>(&self, obj: &'a Map<String, Value>) -> Option<&'a Value> {
        self.aliases
            .iter()
            .find_map(|alias| obj.get(*alias))
            .filter(|v| !v.is_null())
    }

    /// First present alias coerced to f64. JSON numbers and numeric strings
    /// both qualify; anything else falls through to the next alias.
    pub fn get_f64(&self, obj: &Map<String, Value>) -> Option<f64> {
        self.aliases
            .iter()
            .filter_map(|alias| obj.get(*alias))
            .find_map(coerce_f64)
    }

    /// First present alias as a non-empty string.
    pub fn get_string(&self, obj: &Map<String, Value>) -> Option<String> {
        self.aliases
            .iter()
            .filter_map(|alias| obj.get(*alias))
            .find_map(coerce_string)
            .filter(|s| !s.is_empty())
    }
}

/// Coerce a JSON value to f64: numbers directly, strings via parse.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce a JSON value to a display string (numbers included — some venues
/// send numeric side codes and numeric order ids).
pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
