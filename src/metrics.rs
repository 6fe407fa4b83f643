//! Replay metrics

use prometheus::{IntCounter, Registry};

use crate::error::Result;

/// Counters describing the frame loop
#[derive(Debug, Clone)]
pub struct ReplayMetrics {
    pub frames_rendered: IntCounter,
    pub frames_skipped: IntCounter,
    pub domain_resets: IntCounter,
}

impl ReplayMetrics {
    /// Create the counters and register them with `registry`
    pub fn new(registry: &Registry) -> Result<Self> {
        let metrics = Self {
            frames_rendered: IntCounter::new(
                "depth_frames_rendered_total",
                "Frames laid out successfully",
            )?,
            frames_skipped: IntCounter::new(
                "depth_frames_skipped_total",
                "Frames dropped because the pass failed",
            )?,
            domain_resets: IntCounter::new(
                "depth_domain_resets_total",
                "Frames where the visible axis domain snapped to its target",
            )?,
        };

        registry.register(Box::new(metrics.frames_rendered.clone()))?;
        registry.register(Box::new(metrics.frames_skipped.clone()))?;
        registry.register(Box::new(metrics.domain_resets.clone()))?;

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_registered() {
        let registry = Registry::new();
        let metrics = ReplayMetrics::new(&registry).unwrap();
        metrics.frames_rendered.inc();

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"depth_frames_rendered_total".to_string()));
        assert!(names.contains(&"depth_domain_resets_total".to_string()));
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        ReplayMetrics::new(&registry).unwrap();
        assert!(ReplayMetrics::new(&registry).is_err());
    }
}
