#![forbid(unsafe_code)]

//! Host delegate contract and the path-reconciling proxy.
//!
//! A host reports transitions to one [`StackDelegate`]. The controller
//! installs a [`PathDelegate`] there; it forwards every call to the
//! application's own delegate (held weakly) and, on `did_show`, reconciles the
//! path with what the host is actually displaying.

use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

use bitflags::bitflags;
use navstack_runtime::Animation;

bitflags! {
    /// Interface orientations a screen supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InterfaceOrientations: u8 {
        const PORTRAIT = 1 << 0;
        const PORTRAIT_UPSIDE_DOWN = 1 << 1;
        const LANDSCAPE_LEFT = 1 << 2;
        const LANDSCAPE_RIGHT = 1 << 3;
        const LANDSCAPE = Self::LANDSCAPE_LEFT.bits() | Self::LANDSCAPE_RIGHT.bits();
        const ALL_BUT_UPSIDE_DOWN = Self::PORTRAIT.bits() | Self::LANDSCAPE.bits();
        const ALL = Self::ALL_BUT_UPSIDE_DOWN.bits() | Self::PORTRAIT_UPSIDE_DOWN.bits();
    }
}

impl Default for InterfaceOrientations {
    fn default() -> Self {
        Self::ALL_BUT_UPSIDE_DOWN
    }
}

/// A single interface orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InterfaceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Direction of a host transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackOperation {
    Push,
    Pop,
}

/// Receives host stack notifications.
///
/// Every method has a default, so delegates implement only what they need.
/// Query methods return `None` for "no opinion".
pub trait StackDelegate<S> {
    fn will_show(&self, _screen: &S, _animated: bool) {}

    fn did_show(&self, _screen: &S, _animated: bool) {}

    fn supported_orientations(&self) -> Option<InterfaceOrientations> {
        None
    }

    fn preferred_orientation(&self) -> Option<InterfaceOrientation> {
        None
    }

    /// Custom animation for the transition from `from` to `to`.
    fn transition_for(&self, _operation: StackOperation, _from: &S, _to: &S) -> Option<Animation> {
        None
    }

    /// Whether the transition may be driven interactively.
    fn interactive_transition(&self, _operation: StackOperation) -> Option<bool> {
        None
    }
}

/// Hook the proxy calls after the host shows a screen.
pub(crate) trait ShowReconciler {
    fn screen_did_show(&self);
}

/// Delegate the controller installs on its host.
pub struct PathDelegate<S> {
    base: RefCell<Option<Weak<dyn StackDelegate<S>>>>,
    reconciler: Weak<dyn ShowReconciler>,
}

impl<S> fmt::Debug for PathDelegate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathDelegate")
            .field("has_base", &self.base.borrow().is_some())
            .field("attached", &(self.reconciler.strong_count() > 0))
            .finish()
    }
}

impl<S> PathDelegate<S> {
    pub(crate) fn new(reconciler: Weak<dyn ShowReconciler>) -> Self {
        Self {
            base: RefCell::new(None),
            reconciler,
        }
    }

    /// Replace the application delegate calls are forwarded to.
    pub fn set_base(&self, base: Option<Weak<dyn StackDelegate<S>>>) {
        *self.base.borrow_mut() = base;
    }

    #[must_use]
    pub fn has_base(&self) -> bool {
        self.base
            .borrow()
            .as_ref()
            .is_some_and(|base| base.strong_count() > 0)
    }

    fn forward<R>(&self, call: impl FnOnce(&dyn StackDelegate<S>) -> R) -> Option<R> {
        let base = self.base.borrow().as_ref().and_then(Weak::upgrade)?;
        Some(call(base.as_ref()))
    }
}

impl<S> StackDelegate<S> for PathDelegate<S> {
    fn will_show(&self, screen: &S, animated: bool) {
        self.forward(|base| base.will_show(screen, animated));
    }

    fn did_show(&self, screen: &S, animated: bool) {
        if let Some(reconciler) = self.reconciler.upgrade() {
            reconciler.screen_did_show();
        }
        self.forward(|base| base.did_show(screen, animated));
    }

    fn supported_orientations(&self) -> Option<InterfaceOrientations> {
        Some(
            self.forward(|base| base.supported_orientations())
                .flatten()
                .unwrap_or_default(),
        )
    }

    fn preferred_orientation(&self) -> Option<InterfaceOrientation> {
        Some(
            self.forward(|base| base.preferred_orientation())
                .flatten()
                .unwrap_or_default(),
        )
    }

    fn transition_for(&self, operation: StackOperation, from: &S, to: &S) -> Option<Animation> {
        self.forward(|base| base.transition_for(operation, from, to))
            .flatten()
    }

    fn interactive_transition(&self, operation: StackOperation) -> Option<bool> {
        self.forward(|base| base.interactive_transition(operation))
            .flatten()
    }
}
