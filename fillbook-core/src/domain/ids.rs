use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable trade identity.
///
/// Built from the venue's external order id when one is present, otherwise
/// from a content hash of the fill's canonical fields. Stability across
/// re-syncs is what keeps user annotations attached to the right trade.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeId(pub String);

impl TradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a stable id from a venue order id.
    pub fn from_order_id(venue: &str, order_id: &str) -> Self {
        Self(format!("{venue}:{order_id}"))
    }

    /// Derive a deterministic id from fill content when no order id exists.
    ///
    /// Uses BLAKE3 over a canonical field rendering, so the same fill always
    /// produces the same id regardless of sync order or platform.
    pub fn from_content(
        venue: &str,
        instrument: &str,
        timestamp_millis: i64,
        price: f64,
        quantity: f64,
    ) -> Self {
        let canonical = format!("{venue}|{instrument}|{timestamp_millis}|{price:.8}|{quantity:.8}");
        let hash = blake3::hash(canonical.as_bytes());
        Self(hash.to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
