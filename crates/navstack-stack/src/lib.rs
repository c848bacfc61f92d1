#![forbid(unsafe_code)]

//! Navigation stack synchronization for navstack.
//!
//! This crate provides:
//! - [`HostStack`], the imperative host contract, and [`ScreenStack`], an
//!   in-memory host
//! - [`StackDelegate`] and the reconciling [`PathDelegate`] proxy
//! - [`DestinationRegistry`] for destination factories
//! - [`NavigationStackController`], which keeps a host in step with a path
//! - [`NavigationContext`] for screens to push and register destinations
//! - [`StackConfig`] policy knobs

pub mod config;
pub mod context;
pub mod controller;
pub mod delegate;
pub mod host;
pub mod registry;
pub mod typed;

pub use config::{ConfigError, StackConfig};
pub use context::NavigationContext;
pub use controller::{NavigationStackController, StackBuilder};
pub use delegate::{
    InterfaceOrientation, InterfaceOrientations, PathDelegate, StackDelegate, StackOperation,
};
pub use host::{DelegateHandle, HostStack, ScreenStack, StackOp};
pub use registry::{DestinationEntry, DestinationRegistry, Resolution};
pub use typed::typed_path;
