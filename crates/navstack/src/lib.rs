#![forbid(unsafe_code)]

//! Declarative navigation for imperative screen stacks.
//!
//! Application state owns a [`NavigationPath`] (or a `Vec<T>` of one
//! destination type) behind a [`UiBinding`]. A [`NavigationStackController`]
//! observes it and drives a [`HostStack`] with the cheapest matching push,
//! pop, jump or rebuild. Pops the host performs on its own flow back into the
//! path.
//!
//! ```ignore
//! use navstack::prelude::*;
//!
//! let host = Rc::new(RefCell::new(ScreenStack::new()));
//! let path = UiBinding::new(NavigationPath::new());
//! let stack = NavigationStackController::builder(host, path.clone())
//!     .root(Screen::home())
//!     .destination(|article: &Article| Screen::article(article))
//!     .build();
//!
//! path.update(|p| p.append(Article { id: 7 }));
//! ```
//!
//! The `stack` feature (default) pulls in the synchronizer; without it only
//! the path model and the reactive runtime are exported.

pub use navstack_core as core;
pub use navstack_runtime as runtime;
#[cfg(feature = "stack")]
pub use navstack_stack as stack;

pub use navstack_core::{
    AnyDestination, CodableNavigationPath, DecodeError, Destination, DestinationType, Diagnostic,
    DiagnosticSink, EncodeError, NavigationPath, PathElement, RecordingSink, ScreenId,
    StackScreen, TracingSink,
};
pub use navstack_runtime::{
    Animation, Control, ControlEvents, MainQueue, Observable, ObservationToken, Property,
    Transaction, UiBinding, bind, unbind, with_transaction, without_animation,
};
#[cfg(feature = "stack")]
pub use navstack_stack::{
    ConfigError, HostStack, NavigationContext, NavigationStackController, PathDelegate,
    ScreenStack, StackConfig, StackDelegate,
};

/// Common imports.
pub mod prelude {
    pub use std::cell::RefCell;
    pub use std::rc::Rc;

    pub use crate::{
        Destination, NavigationPath, Observable, ObservationToken, StackScreen, Transaction,
        UiBinding, with_transaction, without_animation,
    };

    #[cfg(feature = "stack")]
    pub use crate::{
        HostStack, NavigationContext, NavigationStackController, ScreenStack, StackConfig,
        StackDelegate,
    };
}
