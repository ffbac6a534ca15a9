//! Indicator configuration.

use morphpull_animation::{Easing, SpringSpec, Tween};

use crate::constants::{
    ACTIVE_INDICATOR_SIZE, DISMISS_DURATION_MS, DRAG_CONTAINMENT_RATIO, DRAG_SIZE_FACTOR_LIMIT,
    MORPH_CYCLE_MS, ROTATION_PERIOD_MS, SNAP_DURATION_MS,
};

/// Where a pull gesture may begin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerMode {
    /// Only a drag that starts at the surface's edge can begin a gesture.
    OnEdge,
    /// A drag update reaching the edge mid-scroll can also begin one.
    Anywhere,
}

/// Tunables for one indicator instance. The defaults reproduce the reference
/// feel; hosts usually only override the trigger mode or indicator size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndicatorConfig {
    /// Fraction of the viewport a full-progress drag spans.
    pub drag_containment: f32,
    /// Overstretch limit; the snap settles at its reciprocal.
    pub limit_ratio: f32,
    /// Interval of normalized drag progress over which the indicator color
    /// ramps to full opacity. The gesture arms when the ramp saturates.
    pub ramp_start: f32,
    pub ramp_end: f32,
    /// Lower bound applied to `position` while the gesture is armed.
    pub armed_floor: f32,
    pub trigger_mode: TriggerMode,
    pub snap: Tween,
    pub dismiss: Tween,
    pub spring: SpringSpec,
    pub morph_cycle_ms: u64,
    pub rotation_period_ms: u64,
    pub active_indicator_size: f32,
}

impl IndicatorConfig {
    pub fn with_trigger_mode(mut self, trigger_mode: TriggerMode) -> Self {
        self.trigger_mode = trigger_mode;
        self
    }

    pub fn with_active_indicator_size(mut self, size: f32) -> Self {
        self.active_indicator_size = size;
        self
    }

    pub fn with_spring(mut self, spring: SpringSpec) -> Self {
        self.spring = spring;
        self
    }

    /// Position value the snap animation settles at.
    pub fn snap_target(&self) -> f32 {
        1.0 / self.limit_ratio
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            drag_containment: DRAG_CONTAINMENT_RATIO,
            limit_ratio: DRAG_SIZE_FACTOR_LIMIT,
            ramp_start: 0.0,
            ramp_end: 1.0,
            armed_floor: 1.0 / DRAG_SIZE_FACTOR_LIMIT,
            trigger_mode: TriggerMode::OnEdge,
            snap: Tween::new(SNAP_DURATION_MS, Easing::FastOutSlowIn),
            dismiss: Tween::new(DISMISS_DURATION_MS, Easing::FastOutSlowIn),
            spring: SpringSpec::morph(),
            morph_cycle_ms: MORPH_CYCLE_MS,
            rotation_period_ms: ROTATION_PERIOD_MS,
            active_indicator_size: ACTIVE_INDICATOR_SIZE,
        }
    }
}
