#![forbid(unsafe_code)]

//! Screen identity.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique screen IDs.
static SCREEN_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a screen instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScreenId(u64);

impl ScreenId {
    /// Allocate a new unique screen ID.
    #[must_use]
    pub fn next() -> Self {
        Self(SCREEN_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// A screen handle as seen by the navigation layer.
///
/// Hosts decide what a screen is; the navigation layer only needs a cheap
/// clone and an identity that stays fixed for the screen's lifetime.
pub trait StackScreen: Clone + 'static {
    fn screen_id(&self) -> ScreenId;
}
