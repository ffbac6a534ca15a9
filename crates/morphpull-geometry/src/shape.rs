//! Opaque shape contracts and uniform scale normalization.
//!
//! The engine never touches outline points. It only needs two facts about a
//! shape (its tight bounds and the bounds of its circumscribing reference
//! form) plus the ability of a rendering collaborator to interpolate two
//! shapes at a given ratio. Both capabilities are expressed as traits here so
//! any outline-morph library can plug in.

use crate::geometry::{Rect, Size};

/// A closed shape outline participating in a morph sequence.
///
/// Implementations must be deterministic and side-effect free: the engine
/// may query bounds at any frequency.
pub trait MorphShape {
    /// Tight axis-aligned bounds of the outline at rest.
    fn bounds(&self) -> Rect;

    /// Bounds of the shape's circumscribing reference form, i.e. the largest
    /// footprint the shape can occupy over a full morph.
    fn max_bounds(&self) -> Rect;
}

/// Interpolates two shapes into a drawable outline at `progress` in [0, 1].
///
/// Supplied by the rendering collaborator; the engine hands it the active
/// transition and progress each frame and never inspects the result.
pub trait OutlineInterpolator<S: MorphShape> {
    type Outline;

    fn interpolate(&self, from: &S, to: &S, progress: f32) -> Self::Outline;
}

/// Uniform scale factor so a set of morphing shapes renders at a consistent
/// visual size without any of them overflowing its bounding box.
///
/// Per shape the limiting ratio is `max(bounds/max_bounds)` across the two
/// axes; the overall factor is the minimum ratio over all shapes, scaled by
/// `active_indicator_size / min(container dimensions)` to fit the configured
/// on-screen footprint. An empty shape set or a degenerate container yields
/// 0.0 (nothing to draw).
pub fn uniform_morph_scale<S: MorphShape>(
    shapes: &[S],
    active_indicator_size: f32,
    container: Size,
) -> f32 {
    let min_dimension = container.min_dimension();
    if shapes.is_empty() || min_dimension <= 0.0 {
        return 0.0;
    }

    let mut factor = f32::INFINITY;
    for shape in shapes {
        let bounds = shape.bounds().size();
        let max_bounds = shape.max_bounds().size();
        if max_bounds.width <= 0.0 || max_bounds.height <= 0.0 {
            return 0.0;
        }
        let ratio = (bounds.width / max_bounds.width).max(bounds.height / max_bounds.height);
        factor = factor.min(ratio);
    }

    factor * (active_indicator_size / min_dimension)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeShape {
        bounds: Rect,
        max_bounds: Rect,
    }

    impl MorphShape for FakeShape {
        fn bounds(&self) -> Rect {
            self.bounds
        }

        fn max_bounds(&self) -> Rect {
            self.max_bounds
        }
    }

    fn square(side: f32) -> Rect {
        Rect::from_size(Size::new(side, side))
    }

    #[test]
    fn circle_filling_its_reference_form_scales_by_container_term_only() {
        let circle = FakeShape {
            bounds: square(10.0),
            max_bounds: square(10.0),
        };
        let factor = uniform_morph_scale(&[circle], 38.0, Size::new(48.0, 64.0));
        assert!((factor - 38.0 / 48.0).abs() < 1e-6);
    }

    #[test]
    fn smallest_footprint_shape_limits_the_whole_set() {
        let full = FakeShape {
            bounds: square(10.0),
            max_bounds: square(10.0),
        };
        let half = FakeShape {
            bounds: square(5.0),
            max_bounds: square(10.0),
        };
        let factor = uniform_morph_scale(&[full, half], 40.0, Size::new(40.0, 40.0));
        // ratio 0.5 from the half-footprint shape, container term 1.0
        assert!((factor - 0.5).abs() < 1e-6);
    }

    #[test]
    fn wider_than_tall_bounds_use_the_limiting_axis() {
        let wide = FakeShape {
            bounds: Rect::new(0.0, 0.0, 8.0, 2.0),
            max_bounds: square(10.0),
        };
        let factor = uniform_morph_scale(&[wide], 10.0, Size::new(10.0, 10.0));
        assert!((factor - 0.8).abs() < 1e-6);
    }

    #[test]
    fn empty_set_or_degenerate_container_yields_zero() {
        let shapes: [FakeShape; 0] = [];
        assert_eq!(uniform_morph_scale(&shapes, 38.0, Size::new(48.0, 48.0)), 0.0);

        let circle = FakeShape {
            bounds: square(10.0),
            max_bounds: square(10.0),
        };
        assert_eq!(uniform_morph_scale(&[circle], 38.0, Size::ZERO), 0.0);
    }
}
