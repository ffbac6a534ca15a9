//! Time-driven morph/rotation loop for the indeterminate refresh wait.
//!
//! Two independent clocks run while refresh rendering is active: a
//! continuous background rotation that free-runs on its own period, and a
//! fixed-period cycle that advances the transition sequence one step, adds a
//! quarter turn, and restarts the spring ramp. Neither clock touches gesture
//! state; cancelling them affects only visual output.

use std::cell::RefCell;
use std::rc::Rc;

use morphpull_animation::{SpringSimulator, SpringSpec};
use morphpull_runtime::{Scheduler, TaskHandle};

use crate::constants::QUARTER_TURN_DEGREES;
use crate::sequence::TransitionSequence;

/// Rendering input for one indeterminate frame, handed to the outline
/// interpolation collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphFrame {
    pub from_index: usize,
    pub to_index: usize,
    /// Spring-eased morph progress in [0, 1]; exactly 1.0 once settled.
    pub progress: f32,
    /// Combined rotation in [0, 360) degrees.
    pub rotation_degrees: f32,
}

impl MorphFrame {
    pub fn rotation_radians(&self) -> f32 {
        self.rotation_degrees.to_radians()
    }
}

struct SequencerState {
    spring: SpringSimulator,
    current_index: usize,
    accumulated_rotation: f32,
    started_at: Option<u64>,
    last_sample: u64,
    timer: Option<TaskHandle>,
}

/// Owns the indeterminate animation loop over a wrap-around transition
/// sequence.
pub struct MorphSequencer {
    scheduler: Scheduler,
    sequence: TransitionSequence,
    cycle_ms: u64,
    rotation_period_ms: u64,
    state: Rc<RefCell<SequencerState>>,
}

impl MorphSequencer {
    pub fn new(
        scheduler: Scheduler,
        sequence: TransitionSequence,
        spring: SpringSpec,
        cycle_ms: u64,
        rotation_period_ms: u64,
    ) -> Self {
        debug_assert!(cycle_ms > 0 && rotation_period_ms > 0);
        Self {
            scheduler,
            sequence,
            cycle_ms,
            rotation_period_ms,
            state: Rc::new(RefCell::new(SequencerState {
                spring: SpringSimulator::new(spring),
                current_index: 0,
                accumulated_rotation: 0.0,
                started_at: None,
                last_sample: 0,
                timer: None,
            })),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().started_at.is_some()
    }

    /// Start (or restart) the loop. Restarting resets the sequence to its
    /// first transition and zeroes the accumulated rotation.
    pub fn start(&self) {
        self.stop();
        if self.sequence.is_empty() {
            return;
        }
        let now = self.scheduler.now();
        {
            let mut state = self.state.borrow_mut();
            state.current_index = 0;
            state.accumulated_rotation = 0.0;
            state.started_at = Some(now);
            state.last_sample = now;
            state.spring.reset(0.0, 1.0);
        }

        let shared = Rc::clone(&self.state);
        let sequence_len = self.sequence.len();
        let timer = self.scheduler.schedule_repeating(self.cycle_ms, move |time| {
            let mut state = shared.borrow_mut();
            state.current_index = (state.current_index + 1) % sequence_len;
            state.accumulated_rotation =
                (state.accumulated_rotation + QUARTER_TURN_DEGREES).rem_euclid(360.0);
            state.spring.reset(0.0, 1.0);
            state.last_sample = time;
        });
        self.state.borrow_mut().timer = Some(timer);
    }

    pub fn stop(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
        state.started_at = None;
    }

    /// Sample the loop at the scheduler's current time.
    ///
    /// Advances the spring by the elapsed time since the previous sample and
    /// returns the rendering input, or `None` while stopped or when the
    /// sequence is empty.
    pub fn sample(&self) -> Option<MorphFrame> {
        let now = self.scheduler.now();
        let mut state = self.state.borrow_mut();
        let started_at = state.started_at?;
        let (from_index, to_index) = self.sequence.get(state.current_index)?;

        let elapsed = now.saturating_sub(state.last_sample);
        state.spring.advance(elapsed);
        state.last_sample = now;

        // Settled springs report exactly 1.0 (see SpringSimulator); clamp
        // covers the overshoot before settlement.
        let progress = state.spring.position().clamp(0.0, 1.0);
        let continuous = (now.saturating_sub(started_at) % self.rotation_period_ms) as f32
            / self.rotation_period_ms as f32
            * 360.0;
        let rotation_degrees = (progress * QUARTER_TURN_DEGREES
            + state.accumulated_rotation
            + continuous)
            .rem_euclid(360.0);

        Some(MorphFrame {
            from_index,
            to_index,
            progress,
            rotation_degrees,
        })
    }
}
