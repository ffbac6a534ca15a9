//! Cooperative single-threaded scheduler.
//!
//! All indicator state transitions, timer callbacks, and animation frames run
//! on the same logical thread as scroll-event delivery, so no locks are
//! involved anywhere in the engine. Time is an explicit millisecond clock
//! advanced by the host (or by tests), never a background thread: hosts with
//! a real frame loop call [`Scheduler::advance_to_instant`] once per frame,
//! tests call [`Scheduler::advance_by`] with whatever step they need.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use web_time::Instant;

/// Monotonically increasing identifier used to keep firing order stable when
/// several tasks share a deadline.
type TaskId = u64;

struct TaskState {
    id: TaskId,
    cancelled: Cell<bool>,
}

/// Cancellation handle for a scheduled task.
///
/// Cancellation is explicit: dropping the handle leaves the task scheduled.
/// `cancel` is idempotent and safe to call after the task has already fired.
pub struct TaskHandle {
    state: Weak<TaskState>,
}

impl TaskHandle {
    fn new(state: &Rc<TaskState>) -> Self {
        Self {
            state: Rc::downgrade(state),
        }
    }

    pub fn cancel(&self) {
        if let Some(state) = self.state.upgrade() {
            state.cancelled.set(true);
        }
    }

    /// True once the task can no longer fire, either because it was cancelled
    /// or because it already completed and was discarded.
    pub fn is_finished(&self) -> bool {
        match self.state.upgrade() {
            Some(state) => state.cancelled.get(),
            None => true,
        }
    }
}

struct Timer {
    state: Rc<TaskState>,
    deadline: u64,
    /// `Some(period)` re-arms the timer after each fire.
    period: Option<u64>,
    callback: Rc<RefCell<dyn FnMut(u64)>>,
}

struct FrameCallback {
    state: Rc<TaskState>,
    callback: Box<dyn FnOnce(u64)>,
}

struct SchedulerInner {
    now: u64,
    next_id: TaskId,
    epoch: Option<Instant>,
    timers: Vec<Timer>,
    frame_callbacks: Vec<FrameCallback>,
}

impl SchedulerInner {
    fn allocate_state(&mut self) -> Rc<TaskState> {
        let id = self.next_id;
        self.next_id += 1;
        Rc::new(TaskState {
            id,
            cancelled: Cell::new(false),
        })
    }
}

/// Shared handle to the engine's cooperative clock and task queue.
///
/// Cloning is cheap and every clone drives the same queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                now: 0,
                next_id: 0,
                epoch: None,
                timers: Vec::new(),
                frame_callbacks: Vec::new(),
            })),
        }
    }

    /// Current scheduler time in milliseconds.
    pub fn now(&self) -> u64 {
        self.inner.borrow().now
    }

    /// Run `callback` once, `delay_ms` from now.
    pub fn schedule_once(&self, delay_ms: u64, callback: impl FnOnce(u64) + 'static) -> TaskHandle {
        let mut slot = Some(callback);
        self.schedule(delay_ms, None, move |time| {
            if let Some(callback) = slot.take() {
                callback(time);
            }
        })
    }

    /// Run `callback` every `period_ms`, first firing one period from now.
    pub fn schedule_repeating(
        &self,
        period_ms: u64,
        callback: impl FnMut(u64) + 'static,
    ) -> TaskHandle {
        debug_assert!(period_ms > 0, "repeating task needs a non-zero period");
        self.schedule(period_ms, Some(period_ms), callback)
    }

    fn schedule(
        &self,
        delay_ms: u64,
        period: Option<u64>,
        callback: impl FnMut(u64) + 'static,
    ) -> TaskHandle {
        let mut inner = self.inner.borrow_mut();
        let state = inner.allocate_state();
        let handle = TaskHandle::new(&state);
        let deadline = inner.now + delay_ms;
        inner.timers.push(Timer {
            state,
            deadline,
            period,
            callback: Rc::new(RefCell::new(callback)),
        });
        handle
    }

    /// Register a one-shot callback fired at the end of the next clock
    /// advance, after any timers due in that advance.
    pub fn request_frame(&self, callback: impl FnOnce(u64) + 'static) -> TaskHandle {
        let mut inner = self.inner.borrow_mut();
        let state = inner.allocate_state();
        let handle = TaskHandle::new(&state);
        inner.frame_callbacks.push(FrameCallback {
            state,
            callback: Box::new(callback),
        });
        handle
    }

    /// Advance the clock by `delta_ms`, firing due timers in deadline order
    /// and then the pending frame callbacks at the target time.
    pub fn advance_by(&self, delta_ms: u64) {
        let target = self.inner.borrow().now + delta_ms;
        self.advance_to(target);
    }

    /// Advance the clock to absolute time `target` (no-op if in the past).
    pub fn advance_to(&self, target: u64) {
        loop {
            // Pick the earliest due timer without holding the borrow across
            // the callback: callbacks re-enter the scheduler freely.
            let due = {
                let mut inner = self.inner.borrow_mut();
                inner.timers.retain(|t| !t.state.cancelled.get());
                let next = inner
                    .timers
                    .iter_mut()
                    .filter(|t| t.deadline <= target)
                    .min_by_key(|t| (t.deadline, t.state.id))
                    .map(|t| {
                        let fired_at = t.deadline;
                        match t.period {
                            Some(period) => t.deadline = fired_at + period,
                            None => t.state.cancelled.set(true),
                        }
                        (fired_at, Rc::clone(&t.callback))
                    });
                if let Some((fired_at, _)) = &next {
                    inner.now = inner.now.max(*fired_at);
                }
                next
            };
            match due {
                Some((fired_at, callback)) => (&mut *callback.borrow_mut())(fired_at),
                None => break,
            }
        }

        let pending = {
            let mut inner = self.inner.borrow_mut();
            inner.now = inner.now.max(target);
            std::mem::take(&mut inner.frame_callbacks)
        };
        for frame in pending {
            if !frame.state.cancelled.get() {
                frame.state.cancelled.set(true);
                (frame.callback)(target);
            }
        }
    }

    /// Advance to the wall-clock `instant`. The first call pins the epoch, so
    /// hosts can feed `Instant::now()` straight from their frame loop.
    pub fn advance_to_instant(&self, instant: Instant) {
        let target = {
            let mut inner = self.inner.borrow_mut();
            let epoch = *inner.epoch.get_or_insert(instant);
            instant
                .checked_duration_since(epoch)
                .map(|elapsed| elapsed.as_millis() as u64)
                .unwrap_or(inner.now)
        };
        self.advance_to(target);
    }

    /// Advance `count` frames of `step_ms` each. Test convenience mirroring a
    /// fixed-rate frame loop.
    pub fn advance_frames(&self, count: usize, step_ms: u64) {
        for _ in 0..count {
            self.advance_by(step_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_fires_once_at_deadline() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&fired);
        scheduler.schedule_once(30, move |time| log.borrow_mut().push(time));

        scheduler.advance_by(29);
        assert!(fired.borrow().is_empty());
        scheduler.advance_by(1);
        assert_eq!(fired.borrow().as_slice(), &[30]);
        scheduler.advance_by(100);
        assert_eq!(fired.borrow().len(), 1);
    }

    #[test]
    fn timers_fire_in_deadline_order_within_one_advance() {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (label, delay) in [("b", 20u64), ("a", 10), ("c", 30)] {
            let order = Rc::clone(&order);
            scheduler.schedule_once(delay, move |_| order.borrow_mut().push(label));
        }
        scheduler.advance_by(50);
        assert_eq!(order.borrow().as_slice(), &["a", "b", "c"]);
    }

    #[test]
    fn cancelled_task_never_fires() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let handle = scheduler.schedule_once(10, move |_| flag.set(true));
        handle.cancel();
        scheduler.advance_by(100);
        assert!(!fired.get());
        assert!(handle.is_finished());
    }

    #[test]
    fn repeating_timer_fires_every_period_until_cancelled() {
        let scheduler = Scheduler::new();
        let count = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&count);
        let handle = scheduler.schedule_repeating(10, move |_| counter.set(counter.get() + 1));

        scheduler.advance_by(35);
        assert_eq!(count.get(), 3);
        handle.cancel();
        scheduler.advance_by(100);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn callback_may_reschedule_itself() {
        let scheduler = Scheduler::new();
        let times = Rc::new(RefCell::new(Vec::new()));

        fn chain(scheduler: &Scheduler, times: Rc<RefCell<Vec<u64>>>, remaining: u32) {
            if remaining == 0 {
                return;
            }
            let next = scheduler.clone();
            scheduler.schedule_once(5, move |time| {
                times.borrow_mut().push(time);
                chain(&next, times, remaining - 1);
            });
        }

        chain(&scheduler, Rc::clone(&times), 3);
        scheduler.advance_by(100);
        assert_eq!(times.borrow().as_slice(), &[5, 10, 15]);
    }

    #[test]
    fn frame_callbacks_run_after_due_timers() {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        {
            let order = Rc::clone(&order);
            scheduler.request_frame(move |_| order.borrow_mut().push("frame"));
        }
        {
            let order = Rc::clone(&order);
            scheduler.schedule_once(5, move |_| order.borrow_mut().push("timer"));
        }
        scheduler.advance_by(16);
        assert_eq!(order.borrow().as_slice(), &["timer", "frame"]);
    }

    #[test]
    fn frame_callback_registered_during_frame_waits_for_next_advance() {
        let scheduler = Scheduler::new();
        let hits = Rc::new(Cell::new(0u32));
        let outer = scheduler.clone();
        let counter = Rc::clone(&hits);
        scheduler.request_frame(move |_| {
            counter.set(counter.get() + 1);
            let inner = Rc::clone(&counter);
            outer.request_frame(move |_| inner.set(inner.get() + 1));
        });

        scheduler.advance_by(16);
        assert_eq!(hits.get(), 1);
        scheduler.advance_by(16);
        assert_eq!(hits.get(), 2);
    }
}
