//! Domain types for Fillbook.

pub mod fill;
pub mod ids;
pub mod lot;
pub mod trade;

pub use fill::{Direction, Fill};
pub use ids::TradeId;
pub use lot::Lot;
pub use trade::{InstrumentKind, Trade, TradeStatus};

/// Instrument symbol alias
pub type Instrument = String;
