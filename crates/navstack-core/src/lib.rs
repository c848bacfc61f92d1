#![forbid(unsafe_code)]

//! Core data model for navstack.
//!
//! - [`Destination`] / [`AnyDestination`]: typed values with explicit tags.
//! - [`PathElement`] / [`ElementId`]: path entries and their stable identity.
//! - [`NavigationPath`] / [`CodableNavigationPath`]: heterogeneous paths and
//!   their persisted form.
//! - [`Difference`]: ordered insert/remove diff used by the synchronizer.
//! - [`ScreenId`] / [`ScreenTable`]: screen identity and per-screen side data.
//! - [`Diagnostic`] / [`DiagnosticSink`]: non-fatal error reporting.

pub mod destination;
pub mod diagnostics;
pub mod difference;
pub mod element;
pub mod error;
pub mod path;
pub mod screen;
pub mod storage;

pub use destination::{AnyDestination, Destination, DestinationType, decode};
pub use diagnostics::{
    Diagnostic, DiagnosticSink, RecordingSink, SharedSink, TracingSink, default_sink,
};
pub use difference::{Change, Difference};
pub use element::{ElementId, EncodedElement, PathElement};
pub use error::{DecodeError, EncodeError};
pub use path::{CodableNavigationPath, NavigationPath};
pub use screen::{ScreenId, StackScreen};
pub use storage::ScreenTable;
