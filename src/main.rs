//! Depth Replay - snapshot file player
//!
//! Loads a snapshot file, animates through it and logs every laid-out frame
//! for a rendering adapter to pick up.

use prometheus::{Encoder, Registry, TextEncoder};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use depth_replay::{
    load_snapshots, Config, DepthChart, Replay, ReplayMetrics, ReplaySettings, SnapshotIndex,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Starting depth replay");

    // Load configuration
    let config = Config::load()?;
    info!(path = %config.snapshot_path, session = %config.session_date, "Configuration loaded");

    let snapshots = load_snapshots(&config.snapshot_path, config.session_date)?;
    let index = SnapshotIndex::new(snapshots)?;
    let last_index = index.len() - 1;
    let chart = DepthChart::new(index, config.chart_frame());

    let registry = Registry::new();
    let metrics = ReplayMetrics::new(&registry)?;

    let handle = Replay::new(chart, ReplaySettings::from_config(&config))
        .with_metrics(metrics)
        .spawn();

    let mut frames = handle.frames();
    loop {
        tokio::select! {
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = frames.borrow_and_update().clone();
                if let Some(frame) = frame {
                    info!(
                        index = frame.index,
                        time = %frame.time,
                        blend = frame.blend,
                        bars = frame.rects.len(),
                        max_size = frame.domain.max_size,
                        min_price = frame.domain.min_price,
                        max_price = frame.domain.max_price,
                        "Frame"
                    );
                    if frame.index == last_index && frame.is_static() {
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted");
                break;
            }
        }
    }

    handle.stop();
    let chart = handle.join().await?;
    if let Some(frame) = chart.last_frame() {
        info!(index = frame.index, "Replay finished");
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    info!(metrics = %String::from_utf8_lossy(&buffer), "Replay metrics");

    Ok(())
}
