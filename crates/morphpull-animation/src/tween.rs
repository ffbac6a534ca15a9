//! Fixed-duration tween driven by scheduler frames.
//!
//! Used for the snap and dismissal animations. The returned handle cancels
//! the whole chain: a cancelled tween stops producing frames and its
//! completion callback never runs, which is what lets gesture continuations
//! guard against stale animations.

use std::cell::Cell;
use std::rc::Rc;

use morphpull_runtime::Scheduler;

use crate::easing::Easing;

/// Duration + easing pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(duration_ms: u64, easing: Easing) -> Self {
        Self {
            duration_ms,
            easing,
        }
    }

    pub fn linear(duration_ms: u64) -> Self {
        Self::new(duration_ms, Easing::Linear)
    }

    /// Eased fraction for `elapsed_ms` since the tween started.
    pub fn fraction_at(&self, elapsed_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let linear = (elapsed_ms as f32 / self.duration_ms as f32).clamp(0.0, 1.0);
        self.easing.transform(linear)
    }
}

/// Cancellation handle for a running tween.
pub struct AnimationHandle {
    cancelled: Rc<Cell<bool>>,
}

impl AnimationHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Start a tween on the scheduler's frame callbacks.
///
/// `on_frame` receives the eased fraction every frame, ending with exactly
/// 1.0; `on_finished` runs once, after the final frame, unless the tween was
/// cancelled first.
pub fn run_tween(
    scheduler: &Scheduler,
    tween: Tween,
    on_frame: impl FnMut(f32) + 'static,
    on_finished: impl FnOnce(u64) + 'static,
) -> AnimationHandle {
    let cancelled = Rc::new(Cell::new(false));
    step(
        scheduler.clone(),
        tween,
        scheduler.now(),
        Rc::clone(&cancelled),
        Box::new(on_frame),
        Some(Box::new(on_finished)),
    );
    AnimationHandle { cancelled }
}

fn step(
    scheduler: Scheduler,
    tween: Tween,
    start: u64,
    cancelled: Rc<Cell<bool>>,
    mut on_frame: Box<dyn FnMut(f32)>,
    mut on_finished: Option<Box<dyn FnOnce(u64)>>,
) {
    let chain = scheduler.clone();
    scheduler.request_frame(move |time| {
        if cancelled.get() {
            return;
        }
        let elapsed = time.saturating_sub(start);
        on_frame(tween.fraction_at(elapsed));
        if elapsed >= tween.duration_ms {
            if let Some(finish) = on_finished.take() {
                finish(time);
            }
        } else {
            step(chain, tween, start, cancelled, on_frame, on_finished);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn linear_tween_reports_increasing_fractions_and_finishes_at_one() {
        let scheduler = Scheduler::new();
        let frames = Rc::new(RefCell::new(Vec::new()));
        let finished = Rc::new(Cell::new(false));

        let frame_log = Rc::clone(&frames);
        let done = Rc::clone(&finished);
        run_tween(
            &scheduler,
            Tween::linear(100),
            move |fraction| frame_log.borrow_mut().push(fraction),
            move |_| done.set(true),
        );

        scheduler.advance_frames(8, 20);
        let frames = frames.borrow();
        assert!(finished.get());
        assert_eq!(*frames.last().unwrap(), 1.0);
        assert!(frames.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn cancelled_tween_never_finishes() {
        let scheduler = Scheduler::new();
        let finished = Rc::new(Cell::new(false));
        let frames = Rc::new(Cell::new(0u32));

        let done = Rc::clone(&finished);
        let count = Rc::clone(&frames);
        let handle = run_tween(
            &scheduler,
            Tween::linear(100),
            move |_| count.set(count.get() + 1),
            move |_| done.set(true),
        );

        scheduler.advance_by(20);
        handle.cancel();
        scheduler.advance_frames(10, 20);

        assert_eq!(frames.get(), 1);
        assert!(!finished.get());
    }

    #[test]
    fn zero_duration_tween_completes_on_the_first_frame() {
        let scheduler = Scheduler::new();
        let finished = Rc::new(Cell::new(false));
        let done = Rc::clone(&finished);
        run_tween(&scheduler, Tween::linear(0), |_| {}, move |_| done.set(true));
        scheduler.advance_by(1);
        assert!(finished.get());
    }

    #[test]
    fn one_large_advance_completes_the_tween_in_a_single_frame() {
        let scheduler = Scheduler::new();
        let last = Rc::new(Cell::new(0.0f32));
        let sample = Rc::clone(&last);
        run_tween(
            &scheduler,
            Tween::linear(150),
            move |fraction| sample.set(fraction),
            |_| {},
        );
        scheduler.advance_by(150);
        assert_eq!(last.get(), 1.0);
    }
}
