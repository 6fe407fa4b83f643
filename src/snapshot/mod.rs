//! Snapshot module
//!
//! Timestamped order-book captures and the index used to scrub through them.

mod index;

pub use index::{ScrubQuery, ScrubState, SnapshotIndex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp of a snapshot
pub type Timestamp = DateTime<Utc>;

/// Side of the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

/// A single level in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub size: f64,
    pub side: Side,
}

impl PriceLevel {
    pub fn new(price: f64, size: f64, side: Side) -> Self {
        Self { price, size, side }
    }

    pub fn ask(price: f64, size: f64) -> Self {
        Self::new(price, size, Side::Ask)
    }

    pub fn bid(price: f64, size: f64) -> Self {
        Self::new(price, size, Side::Bid)
    }
}

/// One timestamped capture of the visible bid/ask levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: Timestamp,
    pub levels: Vec<PriceLevel>,
}

impl Snapshot {
    pub fn new(time: Timestamp, levels: Vec<PriceLevel>) -> Self {
        Self { time, levels }
    }

    /// Size at a price on one side, first occurrence wins
    pub fn size_at(&self, side: Side, price: f64) -> Option<f64> {
        self.levels
            .iter()
            .find(|level| level.side == side && level.price == price)
            .map(|level| level.size)
    }

    /// Iterate the levels of one side
    pub fn side(&self, side: Side) -> impl Iterator<Item = &PriceLevel> {
        self.levels.iter().filter(move |level| level.side == side)
    }
}
