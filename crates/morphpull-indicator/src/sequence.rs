//! Transition sequences over an ordered shape list, and the determinate
//! (drag-progress-driven) transition selector.
//!
//! Shapes stay opaque: sequences are index pairs into the caller's ordered
//! shape list, resolved to outlines by the rendering collaborator.

use smallvec::SmallVec;

use crate::constants::{DRAG_ROTATION_DEGREES, MIN_MORPH_SHAPES};

/// Ordered list of `(from, to)` shape-index pairs defining the morph order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionSequence {
    pairs: SmallVec<[(usize, usize); 8]>,
}

impl TransitionSequence {
    /// Build the adjacent pairwise transitions for `shape_count` shapes.
    ///
    /// `circular` appends the wrap-around pair from the last shape back to
    /// the first (used by the indeterminate cycle; the drag selector never
    /// wraps). Fewer than two shapes yields an empty sequence: the indicator
    /// degrades to empty rendering rather than failing.
    pub fn new(shape_count: usize, circular: bool) -> Self {
        let mut pairs = SmallVec::new();
        if shape_count < MIN_MORPH_SHAPES {
            log::warn!(
                "morph sequence needs at least {MIN_MORPH_SHAPES} shapes, got {shape_count}; \
                 rendering will be empty"
            );
            return Self { pairs };
        }
        for from in 0..shape_count - 1 {
            pairs.push((from, from + 1));
        }
        if circular {
            pairs.push((shape_count - 1, 0));
        }
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<(usize, usize)> {
        self.pairs.get(index).copied()
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }
}

/// Rendering input for the determinate (drag) phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragMorphFrame {
    /// Index of the active adjacent pair (`from = index`, `to = index + 1`).
    pub transition_index: usize,
    /// Progress within the active pair, in [0, 1].
    pub local_progress: f32,
    /// Counter-rotation for the drag, in degrees (non-positive).
    pub rotation_degrees: f32,
}

/// Select the active transition and local progress for a drag progress in
/// [0, 1] over `shape_count` shapes (N−1 adjacent pairs, no wrap-around).
///
/// Stateless and pure; safe to call every frame. Returns `None` below the
/// two-shape minimum.
pub fn drag_morph_frame(progress: f32, shape_count: usize) -> Option<DragMorphFrame> {
    if shape_count < MIN_MORPH_SHAPES {
        return None;
    }
    let progress = progress.clamp(0.0, 1.0);
    let segments = shape_count - 1;
    let scaled = progress * segments as f32;
    let transition_index = (scaled.floor() as usize).min(segments - 1);
    // Full progress lands exactly at the end of the last segment instead of
    // wrapping back to 0 through the modulo.
    let local_progress = if progress >= 1.0 && transition_index == segments - 1 {
        1.0
    } else {
        scaled % 1.0
    };
    Some(DragMorphFrame {
        transition_index,
        local_progress,
        rotation_degrees: -progress * DRAG_ROTATION_DEGREES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_sequence_wraps_back_to_the_first_shape() {
        let sequence = TransitionSequence::new(3, true);
        assert_eq!(sequence.pairs(), &[(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn open_sequence_has_only_adjacent_pairs() {
        let sequence = TransitionSequence::new(3, false);
        assert_eq!(sequence.pairs(), &[(0, 1), (1, 2)]);
    }

    #[test]
    fn fewer_than_two_shapes_degrades_to_empty() {
        assert!(TransitionSequence::new(1, true).is_empty());
        assert!(TransitionSequence::new(0, false).is_empty());
        assert_eq!(drag_morph_frame(0.5, 1), None);
    }

    #[test]
    fn half_progress_over_two_segments_lands_on_the_segment_boundary() {
        let frame = drag_morph_frame(0.5, 3).unwrap();
        assert_eq!(frame.transition_index, 1);
        assert_eq!(frame.local_progress, 0.0);
        assert_eq!(frame.rotation_degrees, -90.0);
    }

    #[test]
    fn full_progress_selects_the_last_segment_without_wrapping() {
        let frame = drag_morph_frame(1.0, 3).unwrap();
        assert_eq!(frame.transition_index, 1);
        assert_eq!(frame.local_progress, 1.0);
        assert_eq!(frame.rotation_degrees, -180.0);
    }

    #[test]
    fn progress_zero_starts_on_the_first_segment() {
        let frame = drag_morph_frame(0.0, 4).unwrap();
        assert_eq!(frame.transition_index, 0);
        assert_eq!(frame.local_progress, 0.0);
        assert_eq!(frame.rotation_degrees, 0.0);
    }

    #[test]
    fn transition_index_never_exceeds_the_segment_count() {
        for shape_count in 2..6 {
            for step in 0..=20 {
                let progress = step as f32 / 20.0;
                let frame = drag_morph_frame(progress, shape_count).unwrap();
                assert!(frame.transition_index <= shape_count - 2);
                assert!((0.0..=1.0).contains(&frame.local_progress));
            }
        }
    }
}
