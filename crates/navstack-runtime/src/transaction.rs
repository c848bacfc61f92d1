#![forbid(unsafe_code)]

//! Animation context carried alongside state changes.
//!
//! A [`Transaction`] says how a change should be presented: with a specific
//! animation, with animations disabled, or with no opinion. The ambient
//! transaction is thread-local; [`with_transaction`] installs one for the
//! duration of a closure, and observers read it with [`Transaction::current`]
//! while they are being notified.
//!
//! # Invariants
//!
//! 1. `with_transaction` restores the previous ambient transaction on every
//!    exit path, including unwinding.
//! 2. Outside any `with_transaction` scope, `current()` is the empty
//!    transaction.

use std::cell::RefCell;
use std::time::Duration;

thread_local! {
    static AMBIENT: RefCell<Vec<Transaction>> = const { RefCell::new(Vec::new()) };
}

/// Curve and timing of an animated change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    /// The host's default transition.
    Default,
    Linear { duration: Duration },
    EaseInOut { duration: Duration },
    Spring { response: Duration, damping: f32 },
}

/// Presentation context of a change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    /// Requested animation, if any.
    pub animation: Option<Animation>,
    /// When set, the change must not animate.
    pub disables_animations: bool,
}

impl Transaction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A transaction requesting `animation`.
    #[must_use]
    pub fn animated(animation: Animation) -> Self {
        Self {
            animation: Some(animation),
            disables_animations: false,
        }
    }

    /// A transaction that suppresses animation.
    #[must_use]
    pub fn disabling_animations() -> Self {
        Self {
            animation: None,
            disables_animations: true,
        }
    }

    /// Whether the transaction expresses no animation preference at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.animation.is_none() && !self.disables_animations
    }

    /// Animation flag to hand to a host transition.
    #[must_use]
    pub fn animates(&self) -> bool {
        !self.disables_animations
    }

    /// The ambient transaction.
    #[must_use]
    pub fn current() -> Self {
        AMBIENT.with(|stack| stack.borrow().last().cloned().unwrap_or_default())
    }
}

struct AmbientGuard;

impl Drop for AmbientGuard {
    fn drop(&mut self) {
        AMBIENT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Run `f` with `transaction` as the ambient transaction.
pub fn with_transaction<R>(transaction: Transaction, f: impl FnOnce() -> R) -> R {
    AMBIENT.with(|stack| stack.borrow_mut().push(transaction));
    let _guard = AmbientGuard;
    f()
}

/// Run `f` with animations disabled.
pub fn without_animation<R>(f: impl FnOnce() -> R) -> R {
    with_transaction(Transaction::disabling_animations(), f)
}
