//! Depth chart module
//!
//! Classifies interpolated levels into bar categories, stacks them around a zero
//! baseline and smooths the axis domain between frames.

mod classifier;
mod stacking;
mod scale;
mod smoother;

pub use classifier::{classify, LevelChange};
pub use stacking::{layout, layout_with, stack, StackedBar};
pub use scale::{ChartFrame, ChartScales, LinearScale, SizeScale, TimeAxis, DEFAULT_PRICE_TICK};
pub use smoother::AxisDomainSmoother;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DepthChartError;
use crate::snapshot::Side;

/// Visible numeric range of the chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisDomain {
    pub max_size: f64,
    pub min_price: f64,
    pub max_price: f64,
}

impl AxisDomain {
    pub fn new(max_size: f64, min_price: f64, max_price: f64) -> Self {
        Self {
            max_size,
            min_price,
            max_price,
        }
    }

    /// Extents of a bar set: widest stacked side at any price, and the price range.
    ///
    /// Ghost bars are counted only when `include_ghosts` is set. Returns `None`
    /// when no bar qualifies.
    pub fn from_bars(bars: &[ClassifiedBar], include_ghosts: bool) -> Option<Self> {
        let mut stacks: BTreeMap<(OrderedFloat<f64>, Side), f64> = BTreeMap::new();
        for bar in bars {
            if !include_ghosts && bar.category.kind() == BarKind::Ghost {
                continue;
            }
            *stacks.entry((OrderedFloat(bar.price), bar.side)).or_default() += bar.size;
        }

        let (&(OrderedFloat(first), _), _) = stacks.first_key_value()?;
        let (&(OrderedFloat(last), _), _) = stacks.last_key_value()?;
        let max_size = stacks.values().copied().fold(0.0, f64::max);

        Some(Self::new(max_size, first, last))
    }
}

/// Role of a bar independent of its side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarKind {
    Last,
    Next,
    NegativeDiff,
    PositiveDiff,
    Ghost,
}

/// Bar categories in stacking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BarCategory {
    LastBid,
    NextBid,
    NegativeBidDiff,
    PositiveBidDiff,
    NextBidGhost,
    LastAsk,
    NextAsk,
    NegativeAskDiff,
    PositiveAskDiff,
    NextAskGhost,
}

impl BarCategory {
    pub const ALL: [BarCategory; 10] = [
        BarCategory::LastBid,
        BarCategory::NextBid,
        BarCategory::NegativeBidDiff,
        BarCategory::PositiveBidDiff,
        BarCategory::NextBidGhost,
        BarCategory::LastAsk,
        BarCategory::NextAsk,
        BarCategory::NegativeAskDiff,
        BarCategory::PositiveAskDiff,
        BarCategory::NextAskGhost,
    ];

    pub fn of(side: Side, kind: BarKind) -> Self {
        match (side, kind) {
            (Side::Bid, BarKind::Last) => BarCategory::LastBid,
            (Side::Bid, BarKind::Next) => BarCategory::NextBid,
            (Side::Bid, BarKind::NegativeDiff) => BarCategory::NegativeBidDiff,
            (Side::Bid, BarKind::PositiveDiff) => BarCategory::PositiveBidDiff,
            (Side::Bid, BarKind::Ghost) => BarCategory::NextBidGhost,
            (Side::Ask, BarKind::Last) => BarCategory::LastAsk,
            (Side::Ask, BarKind::Next) => BarCategory::NextAsk,
            (Side::Ask, BarKind::NegativeDiff) => BarCategory::NegativeAskDiff,
            (Side::Ask, BarKind::PositiveDiff) => BarCategory::PositiveAskDiff,
            (Side::Ask, BarKind::Ghost) => BarCategory::NextAskGhost,
        }
    }

    pub fn side(self) -> Side {
        match self {
            BarCategory::LastBid
            | BarCategory::NextBid
            | BarCategory::NegativeBidDiff
            | BarCategory::PositiveBidDiff
            | BarCategory::NextBidGhost => Side::Bid,
            BarCategory::LastAsk
            | BarCategory::NextAsk
            | BarCategory::NegativeAskDiff
            | BarCategory::PositiveAskDiff
            | BarCategory::NextAskGhost => Side::Ask,
        }
    }

    pub fn kind(self) -> BarKind {
        match self {
            BarCategory::LastBid | BarCategory::LastAsk => BarKind::Last,
            BarCategory::NextBid | BarCategory::NextAsk => BarKind::Next,
            BarCategory::NegativeBidDiff | BarCategory::NegativeAskDiff => BarKind::NegativeDiff,
            BarCategory::PositiveBidDiff | BarCategory::PositiveAskDiff => BarKind::PositiveDiff,
            BarCategory::NextBidGhost | BarCategory::NextAskGhost => BarKind::Ghost,
        }
    }

    /// Position in the stacking order
    pub fn order(self) -> usize {
        self as usize
    }

    /// Stable name used by rendering adapters
    pub fn name(self) -> &'static str {
        match self {
            BarCategory::LastBid => "lastBid",
            BarCategory::NextBid => "nextBid",
            BarCategory::NegativeBidDiff => "negativeBidDifference",
            BarCategory::PositiveBidDiff => "positiveBidDifference",
            BarCategory::NextBidGhost => "nextBidGhost",
            BarCategory::LastAsk => "lastAsk",
            BarCategory::NextAsk => "nextAsk",
            BarCategory::NegativeAskDiff => "negativeAskDifference",
            BarCategory::PositiveAskDiff => "positiveAskDifference",
            BarCategory::NextAskGhost => "nextAskGhost",
        }
    }
}

impl fmt::Display for BarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BarCategory {
    type Err = DepthChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BarCategory::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| DepthChartError::UnknownCategory(s.to_string()))
    }
}

/// One categorized bar at a price level for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedBar {
    pub category: BarCategory,
    pub price: f64,
    pub size: f64,
    pub side: Side,
}

impl ClassifiedBar {
    pub fn new(side: Side, kind: BarKind, price: f64, size: f64) -> Self {
        Self {
            category: BarCategory::of(side, kind),
            price,
            size,
            side,
        }
    }
}

/// Horizontal extent of a bar in pixels, with `x_start <= x_end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x_start: f64,
    pub x_end: f64,
    pub price: f64,
    pub category: BarCategory,
}

impl LayoutRect {
    pub fn width(&self) -> f64 {
        self.x_end - self.x_start
    }
}
