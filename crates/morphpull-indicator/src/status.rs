//! Gesture lifecycle status and per-drag state.

/// Lifecycle of one pull-to-refresh interaction.
///
/// Transitions follow the state machine in the controller exactly; no state
/// is ever skipped. `Idle` is the rest state between interactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureStatus {
    /// No gesture active.
    Idle,
    /// Finger down, indicator following the drag.
    Drag,
    /// Dragged far enough that release will trigger a refresh.
    Armed,
    /// Short animation settling the indicator at its refresh position.
    Snap,
    /// The caller's refresh operation is running.
    Refresh,
    /// Operation settled; confirmation/dismissal animation running.
    Done,
    /// Gesture abandoned; dismissal animation running.
    Canceled,
}

impl GestureStatus {
    /// States in which the drag offset is meaningful.
    pub fn has_drag_offset(&self) -> bool {
        matches!(self, GestureStatus::Drag | GestureStatus::Armed)
    }

    /// States in which the time-driven morph sequencer renders.
    pub fn renders_indeterminate(&self) -> bool {
        matches!(self, GestureStatus::Refresh | GestureStatus::Done)
    }
}

/// Which edge of the surface the indicator is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PullDirection {
    Top,
    Bottom,
}

/// Drag bookkeeping, present only while the status has a drag offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub direction: PullDirection,
    /// Accumulated pull distance in logical pixels, positive toward the
    /// anchored edge.
    pub offset: f32,
}
