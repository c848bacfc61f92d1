#![forbid(unsafe_code)]

//! Single-threaded runtime pieces for navstack.
//!
//! This crate provides:
//! - [`reactive`]: observables, [`UiBinding`] handles and [`ObservationToken`]s
//! - [`Transaction`] for animation context and [`MainQueue`] for deferred work
//! - [`control`]: two-way binding of a UI control property with reentrancy
//!   suppression

pub mod control;
pub mod reactive;
pub mod scheduler;
pub mod transaction;

pub use control::{
    ActionId, ActionTargets, BindingTokens, Control, ControlEvents, ObservedProperty,
    ObserverId, Property, SettingGuard, bind, unbind,
};
pub use reactive::{BindingSource, Observable, ObservationToken, Subscription, UiBinding};
pub use scheduler::MainQueue;
pub use transaction::{Animation, Transaction, with_transaction, without_animation};
