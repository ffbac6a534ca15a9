//! Scroll event model consumed by the gesture state machine.
//!
//! These types mirror what a host scrollable surface reports per event:
//! kind, axis direction, whether a pointer is actively dragging, the scroll
//! or overscroll delta, and the viewport metrics at the time of the event.

/// Direction the scroll axis grows in, from the host's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisDirection {
    Up,
    Down,
    Left,
    Right,
}

impl AxisDirection {
    /// Only vertical axes are eligible to start a pull gesture.
    pub fn is_vertical(&self) -> bool {
        matches!(self, AxisDirection::Up | AxisDirection::Down)
    }
}

/// What happened in this scroll event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollEventKind {
    /// A scroll interaction began.
    Start,
    /// The scroll position changed by `delta`.
    Update,
    /// The surface was pushed past its edge by `delta`.
    Overscroll,
    /// The interaction ended (pointer released or fling finished).
    End,
}

/// Viewport metrics at the time of an event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    /// Scrollable extent before the visible window, along the axis.
    pub extent_before: f32,
    /// Scrollable extent after the visible window, along the axis.
    pub extent_after: f32,
    /// Size of the visible window along the axis.
    pub viewport_dimension: f32,
}

impl ScrollMetrics {
    /// True when the surface rests at the leading edge of its axis.
    pub fn at_leading_edge(&self) -> bool {
        self.extent_before <= 0.0
    }
}

/// One scroll event from the host surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEvent {
    pub kind: ScrollEventKind,
    pub axis_direction: AxisDirection,
    /// True while a pointer actively drives the scroll; false during
    /// momentum/fling continuation. Meaningful for `Update` events.
    pub dragging: bool,
    /// Scroll delta for `Update`, overscroll magnitude for `Overscroll`,
    /// unused otherwise.
    pub delta: f32,
    pub metrics: ScrollMetrics,
}

/// Edge-glow event from the host's native overscroll indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverscrollGlowEvent {
    /// Nesting depth of the scrollable that produced the glow; 0 is the
    /// surface the indicator is attached to.
    pub depth: u32,
    /// True for the leading edge of the axis.
    pub leading: bool,
}
