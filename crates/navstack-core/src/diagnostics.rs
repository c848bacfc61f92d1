#![forbid(unsafe_code)]

//! Non-fatal diagnostics reported by the navigation layer.
//!
//! Misconfiguration never panics. Instead the navigation layer degrades the
//! visible state (drops or truncates path elements) and reports what happened
//! through a single [`DiagnosticSink`].
//!
//! # Failure Modes
//!
//! | Diagnostic | Cause | Recovery |
//! |------------|-------|----------|
//! | `DecodeFailed` | Stale persisted path | Truncate path at the element |
//! | `MissingDestination` | No factory registered for the type | Drop or truncate |
//! | `PushOutsideStack` | `push` with no enclosing controller | No-op |
//! | `DestinationOutsideStack` | Registration with no controller | No-op |
//! | `PathTypeMismatch` | Foreign value written into a typed path | Drop the value |

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::destination::DestinationType;

/// A recoverable problem detected while synchronizing navigation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An encoded element at `index` could not be decoded.
    DecodeFailed {
        index: usize,
        destination: DestinationType,
        reason: String,
    },
    /// No destination is registered for the element at `index`.
    MissingDestination {
        index: usize,
        destination: DestinationType,
    },
    /// A value was pushed from a context with no stack controller.
    PushOutsideStack { destination: DestinationType },
    /// A destination was registered from a context with no stack controller.
    DestinationOutsideStack { destination: DestinationType },
    /// A typed path received an element of another type.
    PathTypeMismatch {
        index: usize,
        expected: DestinationType,
        found: DestinationType,
    },
}

impl Diagnostic {
    /// Short machine-readable name, used as a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DecodeFailed { .. } => "decode_failed",
            Self::MissingDestination { .. } => "missing_destination",
            Self::PushOutsideStack { .. } => "push_outside_stack",
            Self::DestinationOutsideStack { .. } => "destination_outside_stack",
            Self::PathTypeMismatch { .. } => "path_type_mismatch",
        }
    }

    /// Path index the diagnostic refers to, if any.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::DecodeFailed { index, .. }
            | Self::MissingDestination { index, .. }
            | Self::PathTypeMismatch { index, .. } => Some(*index),
            Self::PushOutsideStack { .. } | Self::DestinationOutsideStack { .. } => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecodeFailed {
                index,
                destination,
                reason,
            } => write!(
                f,
                "failed to decode '{destination}' item in navigation path at index {index} \
                 ({reason}); have the registered destinations changed since the path was encoded?"
            ),
            Self::MissingDestination { index, destination } => write!(
                f,
                "no navigation destination for '{destination}' (path index {index}) was \
                 registered on the stack"
            ),
            Self::PushOutsideStack { destination } => write!(
                f,
                "can't push '{destination}': no navigation stack controller in context"
            ),
            Self::DestinationOutsideStack { destination } => write!(
                f,
                "can't register navigation destination for '{destination}': no navigation \
                 stack controller in context"
            ),
            Self::PathTypeMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "typed navigation path of '{expected}' received a '{found}' element at index \
                 {index}"
            ),
        }
    }
}

/// Receiver for navigation diagnostics.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

impl<F: Fn(Diagnostic)> DiagnosticSink for F {
    fn report(&self, diagnostic: Diagnostic) {
        self(diagnostic);
    }
}

/// Default sink: emits each diagnostic as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!(
            target: "navstack",
            kind = diagnostic.kind(),
            index = diagnostic.index(),
            "{diagnostic}"
        );
    }
}

/// Sink that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: RefCell<Vec<Diagnostic>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Remove and return everything reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::debug!(target: "navstack", kind = diagnostic.kind(), "recorded diagnostic");
        self.entries.borrow_mut().push(diagnostic);
    }
}

/// Shared handle to the sink in use.
pub type SharedSink = Rc<dyn DiagnosticSink>;

/// The sink used when none is configured.
#[must_use]
pub fn default_sink() -> SharedSink {
    Rc::new(TracingSink)
}
