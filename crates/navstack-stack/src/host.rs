#![forbid(unsafe_code)]

//! Imperative stack hosts.
//!
//! [`HostStack`] is the contract a platform navigation stack offers: an
//! ordered list of screens, single-step push and pop, jumps, and whole-stack
//! replacement, each with an animation flag. [`ScreenStack`] is an in-memory
//! host that records every operation it receives, which makes it the host of
//! choice for tests and headless use.
//!
//! # Invariants
//!
//! - Screen order is root first, top last.
//! - `pop`, `pop_to` and `pop_to_root` never remove the bottom screen.
//! - Delegate notifications (`will_show`, `did_show`) are posted to the
//!   [`MainQueue`] and delivered on a later turn, never while the host is
//!   mutably borrowed by its caller.
//!
//! # Failure Modes
//!
//! - `pop()` with one screen or fewer returns `None` and changes nothing.
//! - `pop_to(index)` past the top returns an empty list.

use std::fmt;
use std::rc::Weak;

use navstack_core::{ScreenId, StackScreen};
use navstack_runtime::MainQueue;

use crate::delegate::StackDelegate;

/// Weak handle a host keeps to its delegate.
pub type DelegateHandle<S> = Weak<dyn StackDelegate<S>>;

/// An imperative, stack-based screen container.
pub trait HostStack: 'static {
    type Screen: StackScreen;

    /// Screens from root to top.
    fn screens(&self) -> &[Self::Screen];

    fn push(&mut self, screen: Self::Screen, animated: bool);

    /// Remove the top screen. Returns it, unless only the root is left.
    fn pop(&mut self, animated: bool) -> Option<Self::Screen>;

    /// Remove every screen above `index`; returns them bottom-up.
    fn pop_to(&mut self, index: usize, animated: bool) -> Vec<Self::Screen>;

    /// Remove every screen above the root; returns them bottom-up.
    fn pop_to_root(&mut self, animated: bool) -> Vec<Self::Screen>;

    /// Replace the whole stack.
    fn set_screens(&mut self, screens: Vec<Self::Screen>, animated: bool);

    fn set_delegate(&mut self, delegate: Option<DelegateHandle<Self::Screen>>);
}

/// One call received by a [`ScreenStack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackOp {
    Push { screen: ScreenId, animated: bool },
    Pop { animated: bool },
    PopTo { index: usize, animated: bool },
    PopToRoot { animated: bool },
    SetScreens { screens: Vec<ScreenId>, animated: bool },
    /// A user-driven back gesture.
    InteractivePop,
}

impl StackOp {
    /// Whether the operation was requested with animation.
    #[must_use]
    pub fn animated(&self) -> bool {
        match self {
            Self::Push { animated, .. }
            | Self::Pop { animated }
            | Self::PopTo { animated, .. }
            | Self::PopToRoot { animated }
            | Self::SetScreens { animated, .. } => *animated,
            Self::InteractivePop => true,
        }
    }
}

/// In-memory [`HostStack`].
pub struct ScreenStack<S: StackScreen> {
    screens: Vec<S>,
    delegate: Option<DelegateHandle<S>>,
    ops: Vec<StackOp>,
}

impl<S: StackScreen> Default for ScreenStack<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StackScreen> fmt::Debug for ScreenStack<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenStack")
            .field("screens", &self.screen_ids())
            .field("ops", &self.ops)
            .field("has_delegate", &self.delegate.is_some())
            .finish()
    }
}

impl<S: StackScreen> ScreenStack<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            screens: Vec::new(),
            delegate: None,
            ops: Vec::new(),
        }
    }

    /// Ids of the screens, root first.
    #[must_use]
    pub fn screen_ids(&self) -> Vec<ScreenId> {
        self.screens.iter().map(StackScreen::screen_id).collect()
    }

    #[must_use]
    pub fn top(&self) -> Option<&S> {
        self.screens.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.screens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Operations received so far, oldest first.
    #[must_use]
    pub fn ops(&self) -> &[StackOp] {
        &self.ops
    }

    /// Drain the operation log.
    pub fn take_ops(&mut self) -> Vec<StackOp> {
        std::mem::take(&mut self.ops)
    }

    /// Simulate a back gesture: pop the top screen as the user would.
    ///
    /// Returns the popped screen, or `None` at the root.
    pub fn interactive_pop(&mut self) -> Option<S> {
        if self.screens.len() <= 1 {
            return None;
        }
        let popped = self.screens.pop();
        self.ops.push(StackOp::InteractivePop);
        tracing::debug!(target: "navstack", depth = self.screens.len(), "interactive pop");
        self.announce_top(true);
        popped
    }

    fn announce_top(&self, animated: bool) {
        let (Some(delegate), Some(top)) = (self.delegate.clone(), self.top().cloned()) else {
            return;
        };
        MainQueue::spawn(move || {
            if let Some(delegate) = delegate.upgrade() {
                delegate.will_show(&top, animated);
                delegate.did_show(&top, animated);
            }
        });
    }
}

impl<S: StackScreen> HostStack for ScreenStack<S> {
    type Screen = S;

    fn screens(&self) -> &[S] {
        &self.screens
    }

    fn push(&mut self, screen: S, animated: bool) {
        self.ops.push(StackOp::Push {
            screen: screen.screen_id(),
            animated,
        });
        self.screens.push(screen);
        self.announce_top(animated);
    }

    fn pop(&mut self, animated: bool) -> Option<S> {
        if self.screens.len() <= 1 {
            return None;
        }
        self.ops.push(StackOp::Pop { animated });
        let popped = self.screens.pop();
        self.announce_top(animated);
        popped
    }

    fn pop_to(&mut self, index: usize, animated: bool) -> Vec<S> {
        if index + 1 >= self.screens.len() {
            return Vec::new();
        }
        self.ops.push(StackOp::PopTo { index, animated });
        let popped = self.screens.split_off(index + 1);
        self.announce_top(animated);
        popped
    }

    fn pop_to_root(&mut self, animated: bool) -> Vec<S> {
        self.ops.push(StackOp::PopToRoot { animated });
        let popped = if self.screens.len() > 1 {
            self.screens.split_off(1)
        } else {
            Vec::new()
        };
        self.announce_top(animated);
        popped
    }

    fn set_screens(&mut self, screens: Vec<S>, animated: bool) {
        self.ops.push(StackOp::SetScreens {
            screens: screens.iter().map(StackScreen::screen_id).collect(),
            animated,
        });
        self.screens = screens;
        self.announce_top(animated);
    }

    fn set_delegate(&mut self, delegate: Option<DelegateHandle<S>>) {
        self.delegate = delegate;
    }
}
