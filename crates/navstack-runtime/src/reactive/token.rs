#![forbid(unsafe_code)]

//! Cancellable observation handles.
//!
//! # Invariants
//!
//! 1. The cancel action runs at most once, no matter how many clones call
//!    [`ObservationToken::cancel`].
//! 2. Dropping the last clone of an uncancelled token cancels it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::observable::Subscription;

struct TokenInner {
    cancelled: Cell<bool>,
    on_cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl TokenInner {
    fn cancel(&self) {
        if self.cancelled.replace(true) {
            return;
        }
        let on_cancel = self.on_cancel.borrow_mut().take();
        if let Some(on_cancel) = on_cancel {
            on_cancel();
        }
    }
}

impl Drop for TokenInner {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Handle to one live observation.
///
/// Clones share state: cancelling any clone cancels them all.
#[derive(Clone)]
pub struct ObservationToken {
    inner: Rc<TokenInner>,
}

impl ObservationToken {
    /// A token that runs `on_cancel` when cancelled.
    pub fn new(on_cancel: impl FnOnce() + 'static) -> Self {
        Self {
            inner: Rc::new(TokenInner {
                cancelled: Cell::new(false),
                on_cancel: RefCell::new(Some(Box::new(on_cancel))),
            }),
        }
    }

    /// A token that releases `subscription` when cancelled.
    #[must_use]
    pub fn from_subscription(subscription: Subscription) -> Self {
        Self::new(move || drop(subscription))
    }

    /// Stop observing. Calling this again is a no-op.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.get()
    }
}

impl fmt::Debug for ObservationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
