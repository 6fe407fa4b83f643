//! Snapshot index
//!
//! Resolves a scrub position into the bracketing snapshot pair and blend factor.

use chrono::Duration;
use tracing::debug;

use super::{Snapshot, Timestamp};
use crate::error::{DepthChartError, Result};

/// A scrub request from the UI layer or the animation clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrubQuery {
    /// Interpolate between the snapshots bracketing this time
    Continuous(Timestamp),
    /// Bind to the snapshot closest to this time
    Nearest(Timestamp),
    /// Explicit pair `(index, index + 1)` with a blend factor
    Pair { index: usize, blend: f64 },
}

/// Bracketing pair resolved for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubState<'a> {
    /// Position of `current` in the index
    pub index: usize,
    pub current: &'a Snapshot,
    pub next: Option<&'a Snapshot>,
    /// Fraction of the way from `current` to `next`, in `[0, 1]`
    pub blend: f64,
}

impl<'a> ScrubState<'a> {
    fn fixed(index: usize, current: &'a Snapshot) -> Self {
        Self {
            index,
            current,
            next: None,
            blend: 1.0,
        }
    }

    /// No animation is in progress
    pub fn is_static(&self) -> bool {
        self.next.is_none() || self.blend >= 1.0
    }
}

/// Snapshots sorted ascending by time
#[derive(Debug, Clone)]
pub struct SnapshotIndex {
    snapshots: Vec<Snapshot>,
}

impl SnapshotIndex {
    /// Build an index, sorting the snapshots by time (stable for equal timestamps)
    pub fn new(mut snapshots: Vec<Snapshot>) -> Result<Self> {
        if snapshots.is_empty() {
            return Err(DepthChartError::EmptySequence);
        }
        snapshots.sort_by_key(|snapshot| snapshot.time);
        debug!(snapshots = snapshots.len(), "Snapshot index built");
        Ok(Self { snapshots })
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: construction rejects empty sequences
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// First and last timestamps
    pub fn time_range(&self) -> (Timestamp, Timestamp) {
        let first = &self.snapshots[0];
        let last = &self.snapshots[self.snapshots.len() - 1];
        (first.time, last.time)
    }

    /// Resolve a scrub query into the pair to draw
    pub fn locate(&self, query: ScrubQuery) -> Result<ScrubState<'_>> {
        match query {
            ScrubQuery::Continuous(time) => Ok(self.bracket(time)),
            ScrubQuery::Nearest(time) => Ok(self.nearest(time)),
            ScrubQuery::Pair { index, blend } => self.pair(index, blend),
        }
    }

    fn bracket(&self, time: Timestamp) -> ScrubState<'_> {
        // Number of snapshots at or before `time`; equal timestamps bind to the last of them
        let upper = self.snapshots.partition_point(|s| s.time <= time);
        if upper == 0 {
            return ScrubState::fixed(0, &self.snapshots[0]);
        }
        if upper == self.snapshots.len() {
            let last = self.snapshots.len() - 1;
            return ScrubState::fixed(last, &self.snapshots[last]);
        }

        let index = upper - 1;
        let current = &self.snapshots[index];
        let next = &self.snapshots[upper];
        let span = seconds(next.time - current.time);
        let blend = if span > 0.0 {
            (seconds(time - current.time) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        ScrubState {
            index,
            current,
            next: Some(next),
            blend,
        }
    }

    fn nearest(&self, time: Timestamp) -> ScrubState<'_> {
        let upper = self.snapshots.partition_point(|s| s.time < time);
        let index = if upper == 0 {
            0
        } else if upper == self.snapshots.len() {
            upper - 1
        } else {
            let before = seconds(time - self.snapshots[upper - 1].time);
            let after = seconds(self.snapshots[upper].time - time);
            if after < before {
                upper
            } else {
                upper - 1
            }
        };
        ScrubState::fixed(index, &self.snapshots[index])
    }

    fn pair(&self, index: usize, blend: f64) -> Result<ScrubState<'_>> {
        if index >= self.snapshots.len() {
            return Err(DepthChartError::InvalidScrub(format!(
                "pair index {index} out of range for {} snapshots",
                self.snapshots.len()
            )));
        }
        if !blend.is_finite() {
            return Err(DepthChartError::InvalidScrub(format!(
                "blend factor {blend} is not finite"
            )));
        }

        let current = &self.snapshots[index];
        match self.snapshots.get(index + 1) {
            Some(next) => Ok(ScrubState {
                index,
                current,
                next: Some(next),
                blend: blend.clamp(0.0, 1.0),
            }),
            None => Ok(ScrubState::fixed(index, current)),
        }
    }
}

fn seconds(duration: Duration) -> f64 {
    match duration.num_microseconds() {
        Some(micros) => micros as f64 / 1e6,
        None => duration.num_milliseconds() as f64 / 1e3,
    }
}
