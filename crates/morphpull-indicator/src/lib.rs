//! Pull-to-refresh gesture/animation engine driving a morphing-shape
//! loading indicator.
//!
//! A host scrollable surface feeds [`ScrollEvent`]s into a
//! [`RefreshController`]; the controller converts drag distance into a
//! normalized position, arms the gesture once the color ramp saturates, and
//! on release snaps the indicator into place, runs the caller's refresh
//! operation exactly once, and animates the indicator away when the
//! operation settles. While the operation runs, a [`MorphSequencer`] cycles
//! the shape outline through spring-eased transitions with a free-running
//! background rotation; while dragging, [`drag_morph_frame`] derives the
//! same rendering input from the drag progress alone.
//!
//! Everything is single-threaded and cooperatively scheduled; time comes
//! from the [`morphpull_runtime::Scheduler`] the controller is built with.

pub mod constants;

mod config;
mod controller;
mod error;
mod events;
mod handle;
mod sequence;
mod sequencer;
mod status;

pub use morphpull_geometry::{uniform_morph_scale, MorphShape, OutlineInterpolator, Rect, Size};

pub use config::{IndicatorConfig, TriggerMode};
pub use controller::{IndicatorFrame, RefreshController, RefreshOperation, StatusObserver};
pub use error::RefreshError;
pub use events::{AxisDirection, OverscrollGlowEvent, ScrollEvent, ScrollEventKind, ScrollMetrics};
pub use handle::{RefreshCompletion, RefreshHandle};
pub use sequence::{drag_morph_frame, DragMorphFrame, TransitionSequence};
pub use sequencer::{MorphFrame, MorphSequencer};
pub use status::{DragState, GestureStatus, PullDirection};
