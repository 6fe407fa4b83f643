//! Depth Replay - order-book snapshot interpolation library
//!
//! This crate turns a sequence of timestamped order-book snapshots into a
//! scrubbable depth chart: it locates the snapshot pair around a scrub
//! position, classifies how every level changes between them, stacks the
//! resulting bars around a zero baseline and smooths the axis domain across
//! frames. Drawing is left to a rendering adapter.

pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod parser;
pub mod replay;
pub mod snapshot;

pub use chart::{
    classify, layout, AxisDomain, AxisDomainSmoother, BarCategory, BarKind, ChartFrame,
    ChartScales, ClassifiedBar, LayoutRect,
};
pub use config::Config;
pub use engine::{DepthChart, Frame};
pub use error::{DepthChartError, Result};
pub use metrics::ReplayMetrics;
pub use parser::{load_snapshots, parse_snapshots};
pub use replay::{Replay, ReplayHandle, ReplaySettings};
pub use snapshot::{PriceLevel, ScrubQuery, ScrubState, Side, Snapshot, SnapshotIndex};
