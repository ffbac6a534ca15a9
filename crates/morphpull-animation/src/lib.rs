//! Animation primitives for the morphpull indicator engine.
//!
//! Two distinct mechanisms, used for distinct jobs:
//! - [`Tween`]/[`run_tween`]: fixed-duration eased animations (the snap to
//!   the refresh resting position and the two dismissal animations).
//! - [`SpringSimulator`]: physics-based easing with settlement detection,
//!   used exclusively for the morph progress ramp.

mod easing;
mod spring;
mod tween;

pub use easing::Easing;
pub use spring::{SpringSimulator, SpringSpec};
pub use tween::{run_tween, AnimationHandle, Tween};
