//! Linear scales mapping domain values to chart pixels

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::AxisDomain;
use crate::snapshot::Timestamp;

/// Price distance covered by one bar's height
pub const DEFAULT_PRICE_TICK: f64 = 0.0003;

/// Headroom added on both sides of the size axis
const SIZE_PADDING: f64 = 0.1;
/// Headroom added above and below the price range
const PRICE_PADDING: f64 = 0.05;

/// Maps a signed size (bids negative) to a horizontal pixel position
#[cfg_attr(test, mockall::automock)]
pub trait SizeScale {
    fn size_to_x(&self, size: f64) -> f64;
}

/// Linear mapping from a numeric domain to a pixel range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Map a domain value into the range; a degenerate domain maps to the range midpoint
    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 || !span.is_finite() {
            0.5
        } else {
            (value - d0) / span
        };
        r0 + t * (r1 - r0)
    }

    /// Map a range value back into the domain
    pub fn invert(&self, position: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        if span == 0.0 {
            return d0;
        }
        d0 + (position - r0) / span * (d1 - d0)
    }
}

impl SizeScale for LinearScale {
    fn size_to_x(&self, size: f64) -> f64 {
        self.scale(size)
    }
}

/// Outer chart geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl Default for ChartFrame {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            margin_left: 150.0,
            margin_right: 150.0,
            margin_top: 40.0,
            margin_bottom: 40.0,
        }
    }
}

/// Size and price scales for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartScales {
    pub size: LinearScale,
    pub price: LinearScale,
}

impl ChartScales {
    pub fn new(domain: &AxisDomain, frame: &ChartFrame) -> Self {
        let size_extent = domain.max_size + domain.max_size * SIZE_PADDING;
        let size = LinearScale::new(
            (-size_extent, size_extent),
            (frame.margin_left, frame.width - frame.margin_right),
        );

        // highest price at the top of the chart
        let price_pad = (domain.max_price - domain.min_price) * PRICE_PADDING;
        let price = LinearScale::new(
            (domain.max_price + price_pad, domain.min_price - price_pad),
            (frame.margin_top, frame.height - frame.margin_bottom),
        );

        Self { size, price }
    }

    /// Height in pixels of a bar covering `tick` in price
    pub fn bar_height(&self, tick: f64) -> f64 {
        self.price.scale(0.0) - self.price.scale(tick)
    }

    /// Vertical pixel centre of a price level
    pub fn price_to_y(&self, price: f64) -> f64 {
        self.price.scale(price)
    }
}

/// Scrubber track mapping pixel positions to timestamps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub start: Timestamp,
    pub end: Timestamp,
    pub x_start: f64,
    pub x_end: f64,
}

impl TimeAxis {
    pub fn new(range: (Timestamp, Timestamp), x_start: f64, x_end: f64) -> Self {
        Self {
            start: range.0,
            end: range.1,
            x_start,
            x_end,
        }
    }

    fn span_micros(&self) -> i64 {
        (self.end - self.start).num_microseconds().unwrap_or(i64::MAX)
    }

    /// Timestamp under a drag position, clamped to the track
    pub fn time_at(&self, x: f64) -> Timestamp {
        let width = self.x_end - self.x_start;
        if width <= 0.0 {
            return self.start;
        }
        let fraction = ((x - self.x_start) / width).clamp(0.0, 1.0);
        let offset = (self.span_micros() as f64 * fraction).round() as i64;
        self.start + Duration::microseconds(offset)
    }

    /// Track position of a timestamp, clamped to the track
    pub fn x_at(&self, time: Timestamp) -> f64 {
        let span = self.span_micros();
        if span <= 0 {
            return self.x_start;
        }
        let offset = (time - self.start).num_microseconds().unwrap_or(0) as f64;
        let fraction = (offset / span as f64).clamp(0.0, 1.0);
        self.x_start + fraction * (self.x_end - self.x_start)
    }
}
