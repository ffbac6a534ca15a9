//! Pure math/data for the morphpull indicator engine.

mod geometry;
mod shape;

pub use geometry::{Rect, Size};
pub use shape::{uniform_morph_scale, MorphShape, OutlineInterpolator};
