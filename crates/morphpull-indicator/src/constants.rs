//! Shared gesture and animation constants.
//!
//! Values are in logical pixels, milliseconds, and degrees. They are matched
//! between the gesture state machine and the morph sequencer so the drag and
//! the indeterminate wait feel like one continuous animation.

/// Fraction of the viewport extent the finger must travel for the drag to
/// reach full progress. A quarter of the viewport is far enough to make
/// accidental triggers rare while staying reachable with one thumb.
pub const DRAG_CONTAINMENT_RATIO: f32 = 0.25;

/// The drag may stretch the indicator up to this multiple of its resting
/// position; the snap animation settles it at the reciprocal (`1 / 1.5`).
pub const DRAG_SIZE_FACTOR_LIMIT: f32 = 1.5;

/// Duration of the snap to the refresh resting position.
pub const SNAP_DURATION_MS: u64 = 150;

/// Duration of both dismissal animations (scale reveal on done, position
/// collapse on cancel).
pub const DISMISS_DURATION_MS: u64 = 200;

/// Period of the indeterminate morph cycle: one shape transition, one
/// quarter turn.
pub const MORPH_CYCLE_MS: u64 = 650;

/// Period of the continuous background rotation. Free-runs independently of
/// the morph cycle so the two never lock into a visible beat.
pub const ROTATION_PERIOD_MS: u64 = 4666;

/// Discrete rotation added per morph cycle, in degrees.
pub const QUARTER_TURN_DEGREES: f32 = 90.0;

/// Counter-rotation applied across the full drag, in degrees.
pub const DRAG_ROTATION_DEGREES: f32 = 180.0;

/// On-screen footprint of the active indicator, in logical pixels.
pub const ACTIVE_INDICATOR_SIZE: f32 = 38.0;

/// A morphing indicator needs at least two shapes; fewer degrades to empty
/// rendering.
pub const MIN_MORPH_SHAPES: usize = 2;
