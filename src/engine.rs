//! Per-frame depth chart pipeline
//!
//! One call to [`DepthChart::render`] locates the bracketing pair, classifies
//! every level, moves the visible axis domain and lays out the bars.

use serde::Serialize;
use tracing::{debug, warn};

use crate::chart::{
    classify, layout_with, AxisDomain, AxisDomainSmoother, ChartFrame, ChartScales, ClassifiedBar,
    LayoutRect,
};
use crate::error::Result;
use crate::snapshot::{ScrubQuery, SnapshotIndex, Timestamp};

/// Immutable result of one frame pass
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Position of the current snapshot in the index
    pub index: usize,
    pub time: Timestamp,
    pub next_time: Option<Timestamp>,
    pub blend: f64,
    pub bars: Vec<ClassifiedBar>,
    pub rects: Vec<LayoutRect>,
    /// Visible (smoothed) domain the rects were laid out against
    pub domain: AxisDomain,
    pub scales: ChartScales,
    /// The visible domain jumped straight to the target this frame
    pub reset: bool,
}

impl Frame {
    pub fn is_static(&self) -> bool {
        self.next_time.is_none() || self.blend >= 1.0
    }
}

/// Depth chart state carried between frames
#[derive(Debug)]
pub struct DepthChart {
    index: SnapshotIndex,
    frame: ChartFrame,
    smoother: AxisDomainSmoother,
    last_index: Option<usize>,
    last_frame: Option<Frame>,
}

impl DepthChart {
    pub fn new(index: SnapshotIndex, frame: ChartFrame) -> Self {
        Self {
            index,
            frame,
            smoother: AxisDomainSmoother::new(),
            last_index: None,
            last_frame: None,
        }
    }

    pub fn index(&self) -> &SnapshotIndex {
        &self.index
    }

    pub fn chart_frame(&self) -> &ChartFrame {
        &self.frame
    }

    /// Last successfully rendered frame
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Forget the carried domain so the next frame snaps to its target
    pub fn reset_domain(&mut self) {
        self.last_index = None;
    }

    /// Run one frame pass.
    ///
    /// On error the previous frame is kept and remains available through
    /// [`DepthChart::last_frame`].
    pub fn render(&mut self, query: ScrubQuery) -> Result<&Frame> {
        let frame = match self.compute(query) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, ?query, "Frame skipped, keeping previous layout");
                return Err(e);
            }
        };
        self.last_index = Some(frame.index);
        Ok(self.last_frame.insert(frame))
    }

    fn compute(&mut self, query: ScrubQuery) -> Result<Frame> {
        let state = self.index.locate(query)?;
        let bars = classify(&state);

        // a jump over more than one pair has no meaningful transition to ease through
        let hard_scrub = self
            .last_index
            .map_or(true, |previous| previous.abs_diff(state.index) > 1);

        let domain = match AxisDomain::from_bars(&bars, true) {
            Some(target) if hard_scrub || self.smoother.visible().is_none() => {
                debug!(index = state.index, "Axis domain reset");
                self.smoother.reset(target)
            }
            Some(target) => {
                let observed = AxisDomain::from_bars(&bars, false).unwrap_or(target);
                let rate = if state.is_static() { 1.0 } else { state.blend };
                self.smoother.update_with_observed(&target, &observed, rate)
            }
            None => self
                .smoother
                .visible()
                .unwrap_or_else(|| AxisDomain::new(0.0, 0.0, 0.0)),
        };

        let scales = ChartScales::new(&domain, &self.frame);
        let rects = layout_with(&bars, &scales.size)?;

        Ok(Frame {
            index: state.index,
            time: state.current.time,
            next_time: state.next.map(|next| next.time),
            blend: state.blend,
            bars,
            rects,
            domain,
            scales,
            reset: hard_scrub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::BarCategory;
    use crate::error::DepthChartError;
    use crate::snapshot::{PriceLevel, Snapshot};
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn create_test_chart() -> DepthChart {
        let snapshots = (0..5)
            .map(|i| {
                let size = 2.0 + i as f64 * 2.0;
                Snapshot::new(
                    at(i * 10),
                    vec![
                        PriceLevel::ask(100.5, size),
                        PriceLevel::ask(101.0, 1.0),
                        PriceLevel::bid(100.0, 3.0),
                    ],
                )
            })
            .collect();
        DepthChart::new(SnapshotIndex::new(snapshots).unwrap(), ChartFrame::default())
    }

    #[test]
    fn test_first_frame_resets_domain() {
        let mut chart = create_test_chart();
        let frame = chart.render(ScrubQuery::Continuous(at(5))).unwrap();
        assert!(frame.reset);
        assert_eq!(frame.index, 0);
        assert_eq!(frame.blend, 0.5);
        // 2 -> 4 at half way: last 2, +1 realized, ghost 1
        assert_eq!(frame.domain, AxisDomain::new(4.0, 100.0, 101.0));
        assert_eq!(frame.rects.len(), frame.bars.len());
    }

    #[test]
    fn test_adjacent_pair_is_smoothed() {
        let mut chart = create_test_chart();
        chart.render(ScrubQuery::Continuous(at(5))).unwrap();

        let frame = chart.render(ScrubQuery::Continuous(at(15))).unwrap();
        assert!(!frame.reset);
        // target max 6 (4 -> 6), visible 4, rate 0.5
        assert_eq!(frame.domain.max_size, 5.0);
    }

    #[test]
    fn test_hard_scrub_resets_domain() {
        let mut chart = create_test_chart();
        chart.render(ScrubQuery::Continuous(at(5))).unwrap();

        let frame = chart.render(ScrubQuery::Continuous(at(35))).unwrap();
        assert!(frame.reset);
        assert_eq!(frame.domain.max_size, 10.0);
    }

    #[test]
    fn test_static_frame_has_no_ghosts() {
        let mut chart = create_test_chart();
        let frame = chart.render(ScrubQuery::Nearest(at(21))).unwrap();
        assert!(frame.is_static());
        assert!(frame
            .bars
            .iter()
            .all(|bar| bar.category == BarCategory::LastAsk || bar.category == BarCategory::LastBid));
    }

    #[test]
    fn test_failed_frame_keeps_previous() {
        let mut chart = create_test_chart();
        chart.render(ScrubQuery::Continuous(at(5))).unwrap();

        let err = chart
            .render(ScrubQuery::Pair { index: 42, blend: 0.5 })
            .unwrap_err();
        assert!(matches!(err, DepthChartError::InvalidScrub(_)));
        assert_eq!(chart.last_frame().unwrap().index, 0);
    }

    #[test]
    fn test_empty_snapshot_keeps_domain() {
        let snapshots = vec![
            Snapshot::new(at(0), vec![PriceLevel::ask(100.5, 2.0)]),
            Snapshot::new(at(10), Vec::new()),
        ];
        let mut chart =
            DepthChart::new(SnapshotIndex::new(snapshots).unwrap(), ChartFrame::default());
        let first = chart.render(ScrubQuery::Nearest(at(0))).unwrap().domain;
        let frame = chart.render(ScrubQuery::Nearest(at(10))).unwrap();
        assert!(frame.rects.is_empty());
        assert_eq!(frame.domain, first);
    }
}
