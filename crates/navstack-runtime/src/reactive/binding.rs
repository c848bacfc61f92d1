#![forbid(unsafe_code)]

//! Transaction-aware read/write handles to shared state.
//!
//! A [`UiBinding<T>`] pairs a source of truth (an [`Observable`] or a
//! projection of another binding) with a [`Transaction`] describing how
//! writes through this handle should be presented.
//!
//! # Usage
//!
//! ```ignore
//! use navstack_runtime::reactive::{Observable, UiBinding};
//! use navstack_runtime::Transaction;
//!
//! let count = Observable::new(0);
//! let binding = UiBinding::from_observable(&count)
//!     .with_transaction(Transaction::disabling_animations());
//!
//! let _token = binding.observe(|value, tx| {
//!     assert!(tx.disables_animations);
//!     println!("count = {value}");
//! });
//! binding.set(3);
//! assert_eq!(count.get(), 3);
//! ```
//!
//! # Invariants
//!
//! 1. `get()` always reads the source; bindings never cache.
//! 2. Observers run with the write's transaction installed as ambient: the
//!    binding's own transaction when non-empty, otherwise whatever was ambient
//!    at the call site.
//! 3. A projection (`map`) writes through to its parent binding, so observers
//!    of either side see every change.
//!
//! # Failure Modes
//!
//! - Transform panic: propagates to the caller of `get()`/`set()`.

use std::fmt;
use std::rc::Rc;

use super::observable::{Observable, Subscription};
use super::token::ObservationToken;
use crate::transaction::{Animation, Transaction, with_transaction};

/// Storage a [`UiBinding`] reads from and writes to.
pub trait BindingSource<T> {
    fn get(&self) -> T;
    fn set(&self, value: T);
    fn subscribe(&self, callback: Box<dyn Fn(&T)>) -> Subscription;
}

impl<T: Clone + PartialEq + 'static> BindingSource<T> for Observable<T> {
    fn get(&self) -> T {
        Observable::get(self)
    }

    fn set(&self, value: T) {
        Observable::set(self, value);
    }

    fn subscribe(&self, callback: Box<dyn Fn(&T)>) -> Subscription {
        Observable::subscribe(self, move |value| callback(value))
    }
}

struct Projection<S, T> {
    parent: UiBinding<S>,
    to: Rc<dyn Fn(&S) -> T>,
    from: Rc<dyn Fn(T) -> S>,
}

impl<S: 'static, T: 'static> BindingSource<T> for Projection<S, T> {
    fn get(&self) -> T {
        (self.to)(&self.parent.get())
    }

    fn set(&self, value: T) {
        self.parent.source.set((self.from)(value));
    }

    fn subscribe(&self, callback: Box<dyn Fn(&T)>) -> Subscription {
        let to = Rc::clone(&self.to);
        self.parent
            .source
            .subscribe(Box::new(move |value| callback(&to(value))))
    }
}

/// Read/write handle to a source of truth plus a presentation transaction.
///
/// Cloning shares the source; the transaction is per-handle.
pub struct UiBinding<T> {
    source: Rc<dyn BindingSource<T>>,
    transaction: Transaction,
}

impl<T> Clone for UiBinding<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            transaction: self.transaction.clone(),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for UiBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiBinding")
            .field("value", &self.get())
            .field("transaction", &self.transaction)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> UiBinding<T> {
    /// A binding over a fresh observable holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::from_observable(&Observable::new(value))
    }

    /// A binding sharing `observable`.
    #[must_use]
    pub fn from_observable(observable: &Observable<T>) -> Self {
        Self::from_source(Rc::new(observable.clone()))
    }
}

impl<T: 'static> UiBinding<T> {
    /// A binding over an arbitrary source.
    #[must_use]
    pub fn from_source(source: Rc<dyn BindingSource<T>>) -> Self {
        Self {
            source,
            transaction: Transaction::default(),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.source.get()
    }

    /// Write `value`, notifying observers under this write's transaction.
    pub fn set(&self, value: T) {
        let transaction = self.write_transaction();
        with_transaction(transaction, || self.source.set(value));
    }

    /// Read-modify-write.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// The transaction attached to this handle.
    #[must_use]
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// The same source with a different transaction.
    #[must_use]
    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.transaction = transaction;
        self
    }

    /// The same source, animating writes with `animation`.
    #[must_use]
    pub fn animation(self, animation: Animation) -> Self {
        self.with_transaction(Transaction::animated(animation))
    }

    /// A two-way projection of this binding.
    ///
    /// Reads apply `to`; writes apply `from` and go through to this binding's
    /// source. The projection inherits this binding's transaction.
    #[must_use]
    pub fn map<U: 'static>(
        &self,
        to: impl Fn(&T) -> U + 'static,
        from: impl Fn(U) -> T + 'static,
    ) -> UiBinding<U> {
        UiBinding {
            source: Rc::new(Projection {
                parent: self.clone(),
                to: Rc::new(to),
                from: Rc::new(from),
            }),
            transaction: self.transaction.clone(),
        }
    }

    /// Run `callback` after every change. Dropping the subscription stops it.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.source.subscribe(Box::new(callback))
    }

    /// Run `callback` with each new value and the transaction it was written
    /// under. The returned token cancels the observation.
    pub fn observe(&self, callback: impl Fn(&T, &Transaction) + 'static) -> ObservationToken {
        let subscription = self.subscribe(move |value| callback(value, &Transaction::current()));
        ObservationToken::from_subscription(subscription)
    }

    fn write_transaction(&self) -> Transaction {
        if self.transaction.is_empty() {
            Transaction::current()
        } else {
            self.transaction.clone()
        }
    }
}
