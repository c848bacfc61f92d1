#![forbid(unsafe_code)]

//! Test harness for navstack.
//!
//! - [`fixture`]: [`TestScreen`], [`StackFixture`] and a recording delegate.
//! - [`switch`]: [`TestSwitch`], a minimal bindable control.
//! - [`logs`]: capture of `tracing` output for assertions.

pub mod fixture;
pub mod logs;
pub mod switch;

pub use fixture::{RecordingDelegate, ShowEvent, StackFixture, TestHost, TestScreen};
pub use logs::{CapturedEvent, LogCapture, capture_logs};
pub use switch::TestSwitch;
