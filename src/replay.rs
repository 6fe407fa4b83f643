//! Replay driver
//!
//! Runs the frame loop on a timer. Scrub events arrive on a `watch` channel so
//! only the latest position is ever rendered; a stop flag ends the loop before
//! the next frame is scheduled.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::Config;
use crate::engine::{DepthChart, Frame};
use crate::metrics::ReplayMetrics;
use crate::snapshot::ScrubQuery;

/// Timing of the animation loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplaySettings {
    pub frame_interval: Duration,
    /// Ticks spent animating one snapshot pair
    pub frames_per_step: u32,
    /// Step snapshot to snapshot without interpolating
    pub snap_mode: bool,
    /// Start playing without waiting for a scrub
    pub autoplay: bool,
}

impl ReplaySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            frame_interval: Duration::from_millis(config.frame_interval_ms),
            frames_per_step: config.frames_per_step,
            snap_mode: config.snap_mode,
            autoplay: true,
        }
    }
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            frames_per_step: 30,
            snap_mode: false,
            autoplay: true,
        }
    }
}

/// Walks the snapshot pairs in order, `frames_per_step` ticks per pair
#[derive(Debug, Clone)]
struct AnimationClock {
    index: usize,
    tick: u32,
    frames_per_step: u32,
    last: usize,
    done: bool,
}

impl AnimationClock {
    fn new(len: usize, frames_per_step: u32) -> Self {
        Self {
            index: 0,
            tick: 0,
            frames_per_step: frames_per_step.max(1),
            last: len.saturating_sub(1),
            done: false,
        }
    }

    /// Next (pair index, blend); the final snapshot is emitted once as a static frame
    fn advance(&mut self) -> Option<(usize, f64)> {
        if self.done {
            return None;
        }
        if self.index >= self.last {
            self.done = true;
            return Some((self.last, 1.0));
        }

        let step = (self.index, self.tick as f64 / self.frames_per_step as f64);
        self.tick += 1;
        if self.tick == self.frames_per_step {
            self.tick = 0;
            self.index += 1;
        }
        Some(step)
    }
}

/// Handle to a running replay
pub struct ReplayHandle {
    scrub_tx: watch::Sender<Option<ScrubQuery>>,
    stop_tx: watch::Sender<bool>,
    frames_rx: watch::Receiver<Option<Arc<Frame>>>,
    task: JoinHandle<DepthChart>,
}

impl ReplayHandle {
    /// Request a scrub position; a newer request replaces one not yet rendered
    pub fn scrub(&self, query: ScrubQuery) {
        self.scrub_tx.send_replace(Some(query));
    }

    /// Stop scheduling frames
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Receiver of the latest rendered frame
    pub fn frames(&self) -> watch::Receiver<Option<Arc<Frame>>> {
        self.frames_rx.clone()
    }

    /// Wait for the loop to finish and take back the chart state
    pub async fn join(self) -> Result<DepthChart, tokio::task::JoinError> {
        self.task.await
    }
}

/// Animation and scrub driver around a [`DepthChart`]
pub struct Replay {
    chart: DepthChart,
    settings: ReplaySettings,
    metrics: Option<ReplayMetrics>,
}

impl Replay {
    pub fn new(chart: DepthChart, settings: ReplaySettings) -> Self {
        Self {
            chart,
            settings,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: ReplayMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Start the frame loop on the current tokio runtime
    pub fn spawn(self) -> ReplayHandle {
        let (scrub_tx, scrub_rx) = watch::channel(None);
        let (stop_tx, stop_rx) = watch::channel(false);
        let (frames_tx, frames_rx) = watch::channel(None);

        let task = tokio::spawn(self.run(scrub_rx, stop_rx, frames_tx));

        ReplayHandle {
            scrub_tx,
            stop_tx,
            frames_rx,
            task,
        }
    }

    async fn run(
        mut self,
        mut scrub_rx: watch::Receiver<Option<ScrubQuery>>,
        mut stop_rx: watch::Receiver<bool>,
        frames_tx: watch::Sender<Option<Arc<Frame>>>,
    ) -> DepthChart {
        let mut clock = AnimationClock::new(self.chart.index().len(), self.settings.frames_per_step);
        let mut playing = self.settings.autoplay;
        let mut scrub_open = true;

        let mut ticker = interval(self.settings.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            snapshots = self.chart.index().len(),
            frames_per_step = self.settings.frames_per_step,
            snap_mode = self.settings.snap_mode,
            "Replay started"
        );

        loop {
            if *stop_rx.borrow() || (!playing && !scrub_open) {
                break;
            }

            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = scrub_rx.changed(), if scrub_open => {
                    match changed {
                        Ok(()) => {
                            let query = *scrub_rx.borrow_and_update();
                            if let Some(query) = query {
                                // a user scrub takes over from the animation clock
                                playing = false;
                                self.render(query, &frames_tx);
                            }
                        }
                        Err(_) => scrub_open = false,
                    }
                }
                _ = ticker.tick(), if playing => {
                    match clock.advance() {
                        Some((index, blend)) => {
                            let query = self.clock_query(index, blend);
                            self.render(query, &frames_tx);
                        }
                        None => {
                            debug!("Animation reached the last snapshot");
                            playing = false;
                        }
                    }
                }
            }
        }

        info!("Replay stopped");
        self.chart
    }

    fn clock_query(&self, index: usize, blend: f64) -> ScrubQuery {
        match (self.settings.snap_mode, self.chart.index().get(index)) {
            (true, Some(snapshot)) => ScrubQuery::Nearest(snapshot.time),
            _ => ScrubQuery::Pair { index, blend },
        }
    }

    fn render(&mut self, query: ScrubQuery, frames_tx: &watch::Sender<Option<Arc<Frame>>>) {
        match self.chart.render(query) {
            Ok(frame) => {
                if let Some(metrics) = &self.metrics {
                    metrics.frames_rendered.inc();
                    if frame.reset {
                        metrics.domain_resets.inc();
                    }
                }
                frames_tx.send_replace(Some(Arc::new(frame.clone())));
            }
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.frames_skipped.inc();
                }
                debug!(error = %e, "Replay frame skipped");
            }
        }
    }
}
