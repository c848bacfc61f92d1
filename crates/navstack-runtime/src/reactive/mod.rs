#![forbid(unsafe_code)]

//! Reactive state for navstack.
//!
//! - [`Observable`]: a shared, version-tracked value with change notification.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`UiBinding`]: read/write handle to a source plus a [`Transaction`].
//! - [`ObservationToken`]: shared, idempotently cancellable observation handle.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Subscribers are stored as `Weak` function pointers and cleaned up lazily
//! during notification. `UiBinding<T>` wraps any [`BindingSource`] and installs
//! its transaction as ambient while a write notifies observers.
//!
//! [`Transaction`]: crate::Transaction

pub mod binding;
pub mod observable;
pub mod token;

pub use binding::{BindingSource, UiBinding};
pub use observable::{Observable, Subscription};
pub use token::ObservationToken;
