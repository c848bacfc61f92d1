#![forbid(unsafe_code)]

//! Handle screens use to reach their enclosing stack.
//!
//! A [`NavigationContext`] is handed out by a controller (see
//! [`NavigationStackController::context`](crate::NavigationStackController::context)).
//! Screens push values and register destinations through it without knowing
//! the host type. A context that is detached, or whose controller is gone,
//! reports a misuse diagnostic and does nothing.

use std::fmt;
use std::rc::Weak;

use navstack_core::{
    Destination, DestinationType, Diagnostic, PathElement, SharedSink, default_sink,
};

use crate::registry::DestinationEntry;

/// What a context needs from its controller.
pub(crate) trait ContextTarget<S> {
    fn push_element(&self, element: PathElement);
    fn register_entry(&self, entry: DestinationEntry<S>);
}

/// Weak handle to the enclosing navigation stack.
pub struct NavigationContext<S> {
    target: Option<Weak<dyn ContextTarget<S>>>,
    sink: SharedSink,
}

impl<S> Clone for NavigationContext<S> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            sink: self.sink.clone(),
        }
    }
}

impl<S> fmt::Debug for NavigationContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationContext")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl<S> Default for NavigationContext<S> {
    fn default() -> Self {
        Self::detached(default_sink())
    }
}

impl<S> NavigationContext<S> {
    pub(crate) fn attached(target: Weak<dyn ContextTarget<S>>, sink: SharedSink) -> Self {
        Self {
            target: Some(target),
            sink,
        }
    }

    /// A context outside any stack. Every call reports to `sink`.
    #[must_use]
    pub fn detached(sink: SharedSink) -> Self {
        Self { target: None, sink }
    }

    /// Whether a live controller is behind this context.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.target
            .as_ref()
            .is_some_and(|target| target.strong_count() > 0)
    }
}

impl<S: 'static> NavigationContext<S> {
    /// Append `value` to the enclosing path as a lazy element.
    pub fn push<T: Destination>(&self, value: T) {
        match self.target.as_ref().and_then(Weak::upgrade) {
            Some(target) => target.push_element(PathElement::lazy(value)),
            None => self.sink.report(Diagnostic::PushOutsideStack {
                destination: DestinationType::of::<T>(),
            }),
        }
    }

    /// Register the screen factory for `T` on the enclosing controller.
    pub fn navigation_destination<T: Destination>(&self, factory: impl Fn(&T) -> S + 'static) {
        match self.target.as_ref().and_then(Weak::upgrade) {
            Some(target) => target.register_entry(DestinationEntry::new(factory)),
            None => self.sink.report(Diagnostic::DestinationOutsideStack {
                destination: DestinationType::of::<T>(),
            }),
        }
    }
}
