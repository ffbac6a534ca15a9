//! Completion plumbing between the controller and the caller's operation.
//!
//! Two halves of the same contract: [`RefreshCompletion`] is handed to the
//! caller's operation and consumed exactly once when the operation settles;
//! [`RefreshHandle`] is what `show()` returns and resolves on that settle
//! (not on the dismissal animation that follows).

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::error::RefreshError;

pub(crate) type SettleResult = Result<(), RefreshError>;

struct HandleState {
    result: Option<SettleResult>,
    wakers: Vec<Waker>,
}

/// Handle resolving once the current refresh operation settles.
///
/// Clones share the same settlement. Usable either as a `Future` or through
/// the non-blocking accessors.
#[derive(Clone)]
pub struct RefreshHandle {
    inner: Rc<RefCell<HandleState>>,
}

impl RefreshHandle {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(HandleState {
                result: None,
                wakers: Vec::new(),
            })),
        }
    }

    pub(crate) fn resolve(&self, result: SettleResult) {
        let wakers = {
            let mut state = self.inner.borrow_mut();
            if state.result.is_some() {
                // The operation's result is awaited exactly once.
                debug_assert!(false, "refresh handle resolved twice");
                return;
            }
            state.result = Some(result);
            std::mem::take(&mut state.wakers)
        };
        for waker in wakers {
            waker.wake();
        }
    }

    /// True once the underlying operation settled (success or failure).
    pub fn is_settled(&self) -> bool {
        self.inner.borrow().result.is_some()
    }

    /// The settle result, if any, without suspending.
    pub fn result(&self) -> Option<SettleResult> {
        self.inner.borrow().result.clone()
    }

    /// True when both handles observe the same settlement.
    pub(crate) fn same_cycle(&self, other: &RefreshHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Future for RefreshHandle {
    type Output = SettleResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.inner.borrow_mut();
        if let Some(result) = state.result.clone() {
            return Poll::Ready(result);
        }
        state.wakers.push(cx.waker().clone());
        Poll::Pending
    }
}

/// One-shot settle notifier given to the caller's refresh operation.
///
/// Consumed by value: an operation can settle at most once. Dropping it
/// without settling leaves the indicator waiting forever, which is a caller
/// bug and is logged.
pub struct RefreshCompletion {
    notify: Option<Box<dyn FnOnce(SettleResult)>>,
}

impl RefreshCompletion {
    pub(crate) fn new(notify: impl FnOnce(SettleResult) + 'static) -> Self {
        Self {
            notify: Some(Box::new(notify)),
        }
    }

    pub fn succeed(mut self) {
        if let Some(notify) = self.notify.take() {
            notify(Ok(()));
        }
    }

    pub fn fail(mut self, error: RefreshError) {
        if let Some(notify) = self.notify.take() {
            notify(Err(error));
        }
    }
}

impl Drop for RefreshCompletion {
    fn drop(&mut self) {
        if self.notify.is_some() {
            log::warn!("refresh operation dropped its completion without settling");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_task::noop_waker;
    use std::cell::Cell;

    fn poll(handle: &mut RefreshHandle) -> Poll<SettleResult> {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        Pin::new(handle).poll(&mut cx)
    }

    #[test]
    fn handle_is_pending_until_completion_settles() {
        let mut handle = RefreshHandle::new();
        assert!(poll(&mut handle).is_pending());
        assert!(!handle.is_settled());

        let resolver = handle.clone();
        let completion = RefreshCompletion::new(move |result| resolver.resolve(result));
        completion.succeed();

        assert!(handle.is_settled());
        assert_eq!(poll(&mut handle), Poll::Ready(Ok(())));
    }

    #[test]
    fn failure_reaches_every_clone_of_the_handle() {
        let handle = RefreshHandle::new();
        let mut other = handle.clone();

        let resolver = handle.clone();
        RefreshCompletion::new(move |result| resolver.resolve(result))
            .fail(RefreshError::Operation("backend unreachable".into()));

        assert_eq!(
            poll(&mut other),
            Poll::Ready(Err(RefreshError::Operation("backend unreachable".into())))
        );
    }

    #[test]
    fn completion_settles_at_most_once() {
        let settles = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&settles);
        let completion = RefreshCompletion::new(move |_| count.set(count.get() + 1));
        completion.succeed();
        assert_eq!(settles.get(), 1);
    }
}
