//! Axis domain smoothing
//!
//! Eases the visible domain toward the target domain across animation frames
//! instead of rescaling the chart in one jump.

use tracing::trace;

use super::AxisDomain;

/// Carries the visible axis domain from frame to frame
#[derive(Debug, Clone, Default)]
pub struct AxisDomainSmoother {
    visible: Option<AxisDomain>,
}

impl AxisDomainSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible domain, `None` until the first frame
    pub fn visible(&self) -> Option<AxisDomain> {
        self.visible
    }

    /// Jump straight to `target`, used on the first frame and after a hard scrub
    pub fn reset(&mut self, target: AxisDomain) -> AxisDomain {
        self.visible = Some(target);
        target
    }

    /// Step toward `target` when the instantaneous extent equals the target
    pub fn update(&mut self, target: &AxisDomain, rate: f64) -> AxisDomain {
        self.update_with_observed(target, target, rate)
    }

    /// Step toward `target` by `rate` of the remaining distance.
    ///
    /// Growing the domain always follows the target. Shrinking stops at the
    /// larger of target and `observed` (the extent of what is on screen), so a
    /// shrink never cuts through a bar still being drawn.
    pub fn update_with_observed(
        &mut self,
        target: &AxisDomain,
        observed: &AxisDomain,
        rate: f64,
    ) -> AxisDomain {
        let Some(mut visible) = self.visible else {
            return self.reset(*target);
        };
        let rate = if rate.is_finite() {
            rate.clamp(0.0, 1.0)
        } else {
            1.0
        };

        visible.max_size = ease_upper(visible.max_size, target.max_size, observed.max_size, rate);
        visible.max_price =
            ease_upper(visible.max_price, target.max_price, observed.max_price, rate);
        visible.min_price =
            ease_lower(visible.min_price, target.min_price, observed.min_price, rate);

        trace!(
            max_size = visible.max_size,
            min_price = visible.min_price,
            max_price = visible.max_price,
            rate,
            "Axis domain updated"
        );

        self.visible = Some(visible);
        visible
    }
}

/// Upper bound: grow freely, shrink no lower than `max(target, observed)`
fn ease_upper(current: f64, target: f64, observed: f64, rate: f64) -> f64 {
    if target > current {
        current + (target - current) * rate
    } else if target < current && observed < current {
        let floor = target.max(observed);
        current + (floor - current) * rate
    } else {
        current
    }
}

/// Lower bound: extend downward freely, raise no higher than `min(target, observed)`
fn ease_lower(current: f64, target: f64, observed: f64, rate: f64) -> f64 {
    if target < current {
        current + (target - current) * rate
    } else if target > current && observed > current {
        let ceiling = target.min(observed);
        current + (ceiling - current) * rate
    } else {
        current
    }
}
