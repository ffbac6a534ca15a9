//! Gesture state machine and refresh orchestration.
//!
//! One controller instance owns the full drag/arm/snap/refresh/done/canceled
//! lifecycle for one indicator. Scroll events, timer callbacks, and the
//! caller operation's settle all run on the same logical thread; every
//! asynchronous continuation re-checks that the indicator is still alive and
//! that the status is still the one it was scheduled for, so a faster-racing
//! cancellation always wins.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use morphpull_animation::{run_tween, AnimationHandle};
use morphpull_geometry::{uniform_morph_scale, MorphShape, Size};
use morphpull_runtime::Scheduler;

use crate::config::{IndicatorConfig, TriggerMode};
use crate::error::RefreshError;
use crate::events::{AxisDirection, OverscrollGlowEvent, ScrollEvent, ScrollEventKind};
use crate::handle::{RefreshCompletion, RefreshHandle};
use crate::sequence::{drag_morph_frame, DragMorphFrame, TransitionSequence};
use crate::sequencer::{MorphFrame, MorphSequencer};
use crate::status::{DragState, GestureStatus, PullDirection};

/// Callback invoked once per status transition with the new status.
pub type StatusObserver = Box<dyn FnMut(GestureStatus)>;

/// Caller-supplied asynchronous refresh operation. Invoked exactly once per
/// refresh entry; settles by consuming the completion.
pub type RefreshOperation = Box<dyn FnMut(RefreshCompletion)>;

/// Rendering input for the current frame, if the indicator is visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IndicatorFrame {
    /// Drag-progress-linked morph (drag, armed, snap, cancel collapse).
    Determinate(DragMorphFrame),
    /// Time-linked morph while the operation runs or the done reveal plays.
    Indeterminate(MorphFrame),
}

/// Which dismissal animation a terminal state runs.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Terminal {
    Done,
    Canceled,
}

impl Terminal {
    fn status(self) -> GestureStatus {
        match self {
            Terminal::Done => GestureStatus::Done,
            Terminal::Canceled => GestureStatus::Canceled,
        }
    }
}

struct GestureState {
    status: GestureStatus,
    drag: Option<DragState>,
    position: f32,
    /// Reveal scale driven by the done dismissal, in [0, 1].
    scale: f32,
    handle: Option<RefreshHandle>,
    animation: Option<AnimationHandle>,
    alive: bool,
}

struct Shared {
    scheduler: Scheduler,
    config: IndicatorConfig,
    shape_count: usize,
    state: RefCell<GestureState>,
    observer: RefCell<Option<StatusObserver>>,
    /// Transitions awaiting observer delivery. Non-empty only while a
    /// dispatch is on the stack; re-entrant transitions queue behind it.
    pending_statuses: RefCell<VecDeque<GestureStatus>>,
    operation: RefCell<RefreshOperation>,
    sequencer: MorphSequencer,
}

/// Pull-to-refresh controller for one indicator instance.
pub struct RefreshController {
    shared: Rc<Shared>,
}

impl RefreshController {
    pub fn new(
        scheduler: Scheduler,
        config: IndicatorConfig,
        shape_count: usize,
        operation: impl FnMut(RefreshCompletion) + 'static,
    ) -> Self {
        let sequencer = MorphSequencer::new(
            scheduler.clone(),
            TransitionSequence::new(shape_count, true),
            config.spring,
            config.morph_cycle_ms,
            config.rotation_period_ms,
        );
        Self {
            shared: Rc::new(Shared {
                scheduler,
                config,
                shape_count,
                state: RefCell::new(GestureState {
                    status: GestureStatus::Idle,
                    drag: None,
                    position: 0.0,
                    scale: 0.0,
                    handle: None,
                    animation: None,
                    alive: true,
                }),
                observer: RefCell::new(None),
                pending_statuses: RefCell::new(VecDeque::new()),
                operation: RefCell::new(Box::new(operation)),
                sequencer,
            }),
        }
    }

    /// Register the status-change observer, replacing any previous one.
    pub fn set_status_observer(&self, observer: impl FnMut(GestureStatus) + 'static) {
        *self.shared.observer.borrow_mut() = Some(Box::new(observer));
    }

    pub fn status(&self) -> GestureStatus {
        self.shared.state.borrow().status
    }

    /// Normalized drag position in [0, 1].
    pub fn position(&self) -> f32 {
        self.shared.state.borrow().position
    }

    /// Accumulated drag offset, meaningful only while dragging or armed.
    pub fn offset(&self) -> Option<f32> {
        let state = self.shared.state.borrow();
        if state.status.has_drag_offset() {
            state.drag.map(|drag| drag.offset)
        } else {
            None
        }
    }

    pub fn direction(&self) -> Option<PullDirection> {
        self.shared.state.borrow().drag.map(|drag| drag.direction)
    }

    /// Reveal scale in [0, 1], driven by the done dismissal.
    pub fn scale(&self) -> f32 {
        self.shared.state.borrow().scale
    }

    /// Process one scroll event from the host surface. Returns true when the
    /// event affected the gesture.
    pub fn handle_scroll(&self, event: &ScrollEvent) -> bool {
        handle_scroll(&self.shared, event)
    }

    /// Decide whether a native overscroll-glow event must be consumed so the
    /// glow does not co-render with the custom indicator.
    pub fn handle_overscroll_glow(&self, event: &OverscrollGlowEvent) -> bool {
        let state = self.shared.state.borrow();
        state.alive && event.depth == 0 && event.leading && state.status == GestureStatus::Drag
    }

    /// Begin the full show→refresh→dismiss cycle without a physical drag.
    ///
    /// Idempotent: while status is snap or refresh this returns the existing
    /// completion handle. The handle resolves when the refresh operation
    /// settles, not when the dismissal animation finishes.
    pub fn show(&self, direction: PullDirection) -> RefreshHandle {
        show(&self.shared, direction)
    }

    /// Rendering input for the current frame, or `None` while idle or when
    /// fewer than two shapes were configured.
    pub fn render_frame(&self) -> Option<IndicatorFrame> {
        let (status, position) = {
            let state = self.shared.state.borrow();
            (state.status, state.position)
        };
        match status {
            GestureStatus::Idle => None,
            status if status.renders_indeterminate() => self
                .shared
                .sequencer
                .sample()
                .map(IndicatorFrame::Indeterminate),
            _ => {
                drag_morph_frame(position, self.shared.shape_count).map(IndicatorFrame::Determinate)
            }
        }
    }

    /// Uniform scale for the shape set so the morph renders at the
    /// configured on-screen footprint inside `container`.
    pub fn morph_scale<S: MorphShape>(&self, shapes: &[S], container: Size) -> f32 {
        uniform_morph_scale(
            shapes,
            self.shared.config.active_indicator_size,
            container,
        )
    }

    /// Cancel every pending animation and timer. No callback observes any
    /// effect after this returns.
    pub fn teardown(&self) {
        let animation = {
            let mut state = self.shared.state.borrow_mut();
            state.alive = false;
            state.animation.take()
        };
        if let Some(animation) = animation {
            animation.cancel();
        }
        self.shared.sequencer.stop();
    }
}

impl Drop for RefreshController {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn handle_scroll(shared: &Rc<Shared>, event: &ScrollEvent) -> bool {
    if !shared.state.borrow().alive {
        return false;
    }
    match event.kind {
        ScrollEventKind::Start => {
            if shared.state.borrow().status == GestureStatus::Idle && may_start(event) {
                begin_drag(shared, pull_direction(event.axis_direction));
                true
            } else {
                false
            }
        }
        ScrollEventKind::Update | ScrollEventKind::Overscroll => {
            if shared.state.borrow().status == GestureStatus::Idle {
                let late_start = shared.config.trigger_mode == TriggerMode::Anywhere
                    && event.dragging
                    && may_start(event);
                if !late_start {
                    return false;
                }
                begin_drag(shared, pull_direction(event.axis_direction));
            }
            let status = shared.state.borrow().status;
            if !status.has_drag_offset() {
                return false;
            }
            if !event.axis_direction.is_vertical() {
                dismiss(shared, Terminal::Canceled);
                return true;
            }
            if event.kind == ScrollEventKind::Update
                && !event.dragging
                && status == GestureStatus::Armed
            {
                // Fling continuation past the armed threshold counts as a
                // release.
                let direction = current_direction(shared);
                show(shared, direction);
                return true;
            }
            apply_delta(shared, event);
            true
        }
        ScrollEventKind::End => {
            let (status, position) = {
                let state = shared.state.borrow();
                (state.status, state.position)
            };
            match status {
                GestureStatus::Armed if position >= 1.0 => {
                    let direction = current_direction(shared);
                    show(shared, direction);
                    true
                }
                GestureStatus::Armed | GestureStatus::Drag => {
                    dismiss(shared, Terminal::Canceled);
                    true
                }
                _ => false,
            }
        }
    }
}

/// A gesture may start only on a vertical axis with the surface resting at
/// its leading edge.
fn may_start(event: &ScrollEvent) -> bool {
    event.axis_direction.is_vertical() && event.metrics.at_leading_edge()
}

fn pull_direction(axis: AxisDirection) -> PullDirection {
    match axis {
        AxisDirection::Down => PullDirection::Top,
        _ => PullDirection::Bottom,
    }
}

fn current_direction(shared: &Rc<Shared>) -> PullDirection {
    shared
        .state
        .borrow()
        .drag
        .map(|drag| drag.direction)
        .unwrap_or(PullDirection::Top)
}

fn begin_drag(shared: &Rc<Shared>, direction: PullDirection) {
    {
        let mut state = shared.state.borrow_mut();
        if let Some(animation) = state.animation.take() {
            animation.cancel();
        }
        state.drag = Some(DragState {
            direction,
            offset: 0.0,
        });
        state.position = 0.0;
        state.scale = 0.0;
        state.status = GestureStatus::Drag;
    }
    notify(shared, GestureStatus::Drag);
}

fn apply_delta(shared: &Rc<Shared>, event: &ScrollEvent) {
    let newly_armed = {
        let mut state = shared.state.borrow_mut();
        let Some(drag) = state.drag.as_mut() else {
            debug_assert!(false, "delta applied without an active drag");
            return;
        };
        // Top-referenced scrolling: a downward scroll delta means the content
        // moved up, reducing the pull; mirrored for the bottom edge.
        match drag.direction {
            PullDirection::Top => drag.offset -= event.delta,
            PullDirection::Bottom => drag.offset += event.delta,
        }
        let offset = drag.offset;
        state.position = normalized_position(&shared.config, state.status, offset, event);
        state.status == GestureStatus::Drag && state.position >= 1.0
    };
    if newly_armed {
        set_status(shared, GestureStatus::Armed);
    }
}

/// Normalize the drag offset against a quarter of the viewport and map the
/// result through the configured color ramp; the armed floor applies while
/// armed.
fn normalized_position(
    config: &IndicatorConfig,
    status: GestureStatus,
    offset: f32,
    event: &ScrollEvent,
) -> f32 {
    let viewport = event.metrics.viewport_dimension;
    let raw = if viewport > 0.0 {
        offset / (viewport * config.drag_containment)
    } else {
        0.0
    };
    let span = config.ramp_end - config.ramp_start;
    let ramped = if span > 0.0 {
        ((raw - config.ramp_start) / span).clamp(0.0, 1.0)
    } else if raw >= config.ramp_end {
        1.0
    } else {
        0.0
    };
    if status == GestureStatus::Armed {
        ramped.max(config.armed_floor)
    } else {
        ramped
    }
}

fn show(shared: &Rc<Shared>, direction: PullDirection) -> RefreshHandle {
    {
        let state = shared.state.borrow();
        if matches!(state.status, GestureStatus::Snap | GestureStatus::Refresh) {
            if let Some(handle) = &state.handle {
                return handle.clone();
            }
        }
    }
    if shared.state.borrow().status == GestureStatus::Idle {
        // Programmatic trigger: synthesize the drag start.
        begin_drag(shared, direction);
    }
    if shared.state.borrow().status == GestureStatus::Drag {
        // Observers never see a skipped state, whether the drag was real or
        // synthesized.
        set_status(shared, GestureStatus::Armed);
    }

    let handle = RefreshHandle::new();
    {
        let mut state = shared.state.borrow_mut();
        if let Some(animation) = state.animation.take() {
            animation.cancel();
        }
        if state.drag.is_none() {
            state.drag = Some(DragState {
                direction,
                offset: 0.0,
            });
        }
        state.handle = Some(handle.clone());
        state.status = GestureStatus::Snap;
    }
    notify(shared, GestureStatus::Snap);
    start_snap(shared);
    handle
}

/// Drive the position to the snap target, then hand off to the refresh
/// operation if nothing raced the snap.
fn start_snap(shared: &Rc<Shared>) {
    let start_position = shared.state.borrow().position;
    let target = shared.config.snap_target();

    let frame_shared = Rc::clone(shared);
    let finish_shared = Rc::clone(shared);
    let animation = run_tween(
        &shared.scheduler,
        shared.config.snap,
        move |fraction| {
            let mut state = frame_shared.state.borrow_mut();
            if state.status == GestureStatus::Snap {
                state.position = start_position + (target - start_position) * fraction;
            }
        },
        move |_| on_snap_complete(&finish_shared),
    );
    shared.state.borrow_mut().animation = Some(animation);
}

fn on_snap_complete(shared: &Rc<Shared>) {
    {
        let state = shared.state.borrow();
        // A cancellation racing the snap already changed the status; the
        // stale continuation must not start a refresh.
        if !state.alive || state.status != GestureStatus::Snap {
            return;
        }
    }
    shared.state.borrow_mut().status = GestureStatus::Refresh;
    notify(shared, GestureStatus::Refresh);
    shared.sequencer.start();

    let handle = shared.state.borrow().handle.clone();
    let settle_shared = Rc::clone(shared);
    let completion =
        RefreshCompletion::new(move |result| on_operation_settled(&settle_shared, &handle, result));
    (&mut *shared.operation.borrow_mut())(completion);
}

fn on_operation_settled(
    shared: &Rc<Shared>,
    handle: &Option<RefreshHandle>,
    result: Result<(), RefreshError>,
) {
    if !shared.state.borrow().alive {
        return;
    }
    if let Err(error) = &result {
        log::warn!("{error}; dismissing indicator anyway");
    }
    if let Some(handle) = handle {
        handle.resolve(result);
    }
    // Success and failure dismiss identically. The dismissal only runs when
    // the settle belongs to the refresh cycle that is still current; a stale
    // settle after an external reset is recorded on its handle and nothing
    // more.
    let still_current = {
        let state = shared.state.borrow();
        state.status == GestureStatus::Refresh
            && match (&state.handle, handle) {
                (Some(current), Some(settled)) => current.same_cycle(settled),
                _ => false,
            }
    };
    if still_current {
        dismiss(shared, Terminal::Done);
    }
}

fn dismiss(shared: &Rc<Shared>, terminal: Terminal) {
    let start_position = {
        let mut state = shared.state.borrow_mut();
        if let Some(animation) = state.animation.take() {
            animation.cancel();
        }
        state.status = terminal.status();
        if terminal == Terminal::Done {
            state.scale = 0.0;
        }
        state.position
    };
    notify(shared, terminal.status());

    let frame_shared = Rc::clone(shared);
    let finish_shared = Rc::clone(shared);
    let animation = match terminal {
        Terminal::Done => run_tween(
            &shared.scheduler,
            shared.config.dismiss,
            move |fraction| {
                let mut state = frame_shared.state.borrow_mut();
                if state.status == GestureStatus::Done {
                    state.scale = fraction;
                }
            },
            move |_| finish_dismissal(&finish_shared, GestureStatus::Done),
        ),
        Terminal::Canceled => run_tween(
            &shared.scheduler,
            shared.config.dismiss,
            move |fraction| {
                let mut state = frame_shared.state.borrow_mut();
                if state.status == GestureStatus::Canceled {
                    state.position = start_position * (1.0 - fraction);
                }
            },
            move |_| finish_dismissal(&finish_shared, GestureStatus::Canceled),
        ),
    };
    shared.state.borrow_mut().animation = Some(animation);
}

fn finish_dismissal(shared: &Rc<Shared>, expected: GestureStatus) {
    {
        let state = shared.state.borrow();
        if !state.alive || state.status != expected {
            return;
        }
    }
    {
        let mut state = shared.state.borrow_mut();
        state.status = GestureStatus::Idle;
        state.drag = None;
        state.position = 0.0;
        state.scale = 0.0;
        state.animation = None;
    }
    shared.sequencer.stop();
    notify(shared, GestureStatus::Idle);
}

fn set_status(shared: &Rc<Shared>, status: GestureStatus) {
    shared.state.borrow_mut().status = status;
    notify(shared, status);
}

/// Deliver a status transition to the observer.
///
/// The observer may re-enter the controller (e.g. react to `Armed` with
/// `show`); transitions raised from inside the callback queue up and are
/// delivered in order by the dispatch already on the stack. The observer is
/// taken out of its cell for the duration of each call so re-entrant
/// `set_status_observer` stays legal too.
fn notify(shared: &Rc<Shared>, status: GestureStatus) {
    log::trace!("indicator status -> {status:?}");
    {
        let mut pending = shared.pending_statuses.borrow_mut();
        pending.push_back(status);
        if pending.len() > 1 {
            return;
        }
    }
    loop {
        let status = match shared.pending_statuses.borrow().front().copied() {
            Some(status) => status,
            None => break,
        };
        let taken = shared.observer.borrow_mut().take();
        if let Some(mut callback) = taken {
            callback(status);
            let mut slot = shared.observer.borrow_mut();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
        shared.pending_statuses.borrow_mut().pop_front();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
