#![forbid(unsafe_code)]

//! Declarative path to imperative stack synchronization.
//!
//! A [`NavigationStackController`] observes a path binding and keeps a
//! [`HostStack`] in step with it. Each change is diffed by element identity
//! against the identities of the screens currently on the host, and turned
//! into the single cheapest host operation that reaches the new path:
//!
//! | Difference | Operation |
//! |------------|-----------|
//! | none, host empty, root known | `set_screens([root])` |
//! | none | nothing |
//! | one insertion at the new top | `push` |
//! | one removal just above the new top | `pop` |
//! | only removals, path now empty | `pop_to_root` |
//! | only removals, one run ending at the top | `pop_to` |
//! | anything else | rebuild with `set_screens` |
//!
//! The rebuild keeps the longest run of screens whose identities already
//! match, reuses any other live screen with a matching identity, and builds
//! the rest through the destination registry.
//!
//! In the other direction, the controller's [`PathDelegate`] notices pops the
//! host performed on its own and writes the shortened path back.
//!
//! # Invariants
//!
//! 1. Every operation is animated unless the transaction of the change
//!    disables animations.
//! 2. A path write made while a pass is running (resolution rewrites,
//!    dropped elements) never nests: the pass runs again once it finishes.
//! 3. The host is borrowed only for the duration of a host call. If it is
//!    already borrowed, the pass moves to the next [`MainQueue`] turn.
//! 4. The screen-to-element table only holds screens currently on the host.
//!
//! # Failure Modes
//!
//! - Element with no registered destination: dropped from the path during a
//!   rebuild (encoded elements are left for display time), with a
//!   [`Diagnostic::MissingDestination`].
//! - Encoded element that fails to decode: it and everything after it are
//!   removed, with a [`Diagnostic::DecodeFailed`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use navstack_core::{
    Destination, DestinationType, Diagnostic, Difference, ElementId, NavigationPath, PathElement,
    ScreenTable, SharedSink, StackScreen, default_sink,
};
use navstack_runtime::{
    MainQueue, ObservationToken, SettingGuard, Transaction, UiBinding, without_animation,
};

use crate::config::StackConfig;
use crate::context::{ContextTarget, NavigationContext};
use crate::delegate::{PathDelegate, ShowReconciler, StackDelegate};
use crate::host::HostStack;
use crate::registry::{DestinationEntry, DestinationRegistry, Resolution};
use crate::typed::typed_path;

enum PathSource {
    Path(UiBinding<NavigationPath>),
    Typed(Box<dyn FnOnce(SharedSink) -> UiBinding<NavigationPath>>),
}

/// Builder for a [`NavigationStackController`].
pub struct StackBuilder<H: HostStack> {
    host: Rc<RefCell<H>>,
    source: PathSource,
    root: Option<H::Screen>,
    config: StackConfig,
    sink: SharedSink,
    registry: DestinationRegistry<H::Screen>,
}

impl<H: HostStack> StackBuilder<H> {
    /// Bottom screen of the stack. It never carries a path element.
    ///
    /// Without a root the first path element is the bottom screen, and an
    /// empty path leaves the host empty.
    #[must_use]
    pub fn root(mut self, root: H::Screen) -> Self {
        self.root = Some(root);
        self
    }

    #[must_use]
    pub fn config(mut self, config: StackConfig) -> Self {
        self.config = config;
        self
    }

    /// Where diagnostics go. Defaults to [`TracingSink`](navstack_core::TracingSink).
    #[must_use]
    pub fn diagnostics(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Register the screen factory for `T`.
    #[must_use]
    pub fn destination<T: Destination>(mut self, factory: impl Fn(&T) -> H::Screen + 'static) -> Self {
        self.registry.register(factory);
        self
    }

    /// Install the controller on the host and run the first pass.
    pub fn build(self) -> NavigationStackController<H> {
        let path = match self.source {
            PathSource::Path(path) => path,
            PathSource::Typed(project) => project(Rc::clone(&self.sink)),
        };
        let inner = Rc::new_cyclic(|weak: &Weak<StackInner<H>>| {
            let reconciler: Weak<dyn ShowReconciler> = weak.clone();
            StackInner {
                host: self.host,
                path,
                root: self.root,
                registry: RefCell::new(self.registry),
                elements: RefCell::new(ScreenTable::new()),
                config: self.config,
                sink: self.sink,
                syncing: Rc::new(Cell::new(false)),
                pending: Cell::new(false),
                deferred: Cell::new(false),
                transaction: RefCell::new(Transaction::default()),
                proxy: Rc::new(PathDelegate::new(reconciler)),
                weak_self: weak.clone(),
                observation: RefCell::new(None),
            }
        });
        inner.attach();
        NavigationStackController { inner }
    }
}

/// Keeps a [`HostStack`] synchronized with a path binding.
pub struct NavigationStackController<H: HostStack> {
    inner: Rc<StackInner<H>>,
}

impl<H: HostStack> fmt::Debug for NavigationStackController<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationStackController")
            .field("path", &self.inner.path.get())
            .field("registry", &*self.inner.registry.borrow())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<H: HostStack> NavigationStackController<H> {
    /// A controller driven by a heterogeneous path.
    pub fn builder(host: Rc<RefCell<H>>, path: UiBinding<NavigationPath>) -> StackBuilder<H> {
        Self::with_source(host, PathSource::Path(path))
    }

    /// A controller driven by a path of `T` values.
    ///
    /// Elements of other types pushed onto the path are reported as
    /// [`Diagnostic::PathTypeMismatch`] and dropped.
    pub fn typed<T: Destination>(host: Rc<RefCell<H>>, values: UiBinding<Vec<T>>) -> StackBuilder<H> {
        let project = Box::new(move |sink: SharedSink| typed_path(&values, sink));
        Self::with_source(host, PathSource::Typed(project))
    }

    fn with_source(host: Rc<RefCell<H>>, source: PathSource) -> StackBuilder<H> {
        StackBuilder {
            host,
            source,
            root: None,
            config: StackConfig::default(),
            sink: default_sink(),
            registry: DestinationRegistry::new(),
        }
    }

    /// The path binding the controller observes.
    #[must_use]
    pub fn path(&self) -> &UiBinding<NavigationPath> {
        &self.inner.path
    }

    #[must_use]
    pub fn host(&self) -> &Rc<RefCell<H>> {
        &self.inner.host
    }

    #[must_use]
    pub fn config(&self) -> &StackConfig {
        &self.inner.config
    }

    /// The delegate installed on the host.
    #[must_use]
    pub fn delegate(&self) -> &Rc<PathDelegate<H::Screen>> {
        &self.inner.proxy
    }

    /// Forward host notifications to `delegate` as well. The delegate is
    /// held weakly.
    pub fn set_delegate(&self, delegate: Option<Weak<dyn StackDelegate<H::Screen>>>) {
        self.inner.proxy.set_base(delegate);
    }

    /// A handle screens can use to push and register destinations.
    #[must_use]
    pub fn context(&self) -> NavigationContext<H::Screen> {
        let target: Weak<dyn ContextTarget<H::Screen>> = self.inner.weak_self.clone();
        NavigationContext::attached(target, Rc::clone(&self.inner.sink))
    }

    /// Register the screen factory for `T`, replacing any previous one.
    ///
    /// If the path is waiting on elements of `T`, synchronization runs again.
    pub fn register<T: Destination>(&self, factory: impl Fn(&T) -> H::Screen + 'static) {
        self.inner.register_entry(DestinationEntry::new(factory));
    }

    #[must_use]
    pub fn is_registered(&self, destination: &DestinationType) -> bool {
        self.inner.registry.borrow().contains(destination)
    }

    /// Path elements of the screens currently on the host, root to top.
    ///
    /// # Panics
    ///
    /// Panics if the host is mutably borrowed.
    #[must_use]
    pub fn live_path(&self) -> NavigationPath {
        let screens = self.inner.host.borrow().screens().to_vec();
        NavigationPath::from_elements(self.inner.live_projection(&screens).into_iter().flatten().collect())
    }

    /// Remove `screen` and everything above it.
    ///
    /// Returns `false` if the screen is not on the stack or is the bottom
    /// screen.
    pub fn dismiss(&self, screen: &H::Screen) -> bool {
        let Ok(host) = self.inner.host.try_borrow() else {
            tracing::debug!(target: "navstack", "host busy, dismiss ignored");
            return false;
        };
        let screens = host.screens().to_vec();
        drop(host);
        let Some(position) = screens
            .iter()
            .position(|live| live.screen_id() == screen.screen_id())
        else {
            return false;
        };
        if position == 0 {
            return false;
        }
        let below: Vec<PathElement> = self
            .inner
            .live_projection(&screens[..position])
            .into_iter()
            .flatten()
            .collect();
        tracing::debug!(target: "navstack", position, depth = below.len(), "dismiss");
        self.inner.path.set(NavigationPath::from_elements(below));
        true
    }
}

struct StackInner<H: HostStack> {
    host: Rc<RefCell<H>>,
    path: UiBinding<NavigationPath>,
    root: Option<H::Screen>,
    registry: RefCell<DestinationRegistry<H::Screen>>,
    elements: RefCell<ScreenTable<PathElement>>,
    config: StackConfig,
    sink: SharedSink,
    syncing: Rc<Cell<bool>>,
    pending: Cell<bool>,
    deferred: Cell<bool>,
    transaction: RefCell<Transaction>,
    proxy: Rc<PathDelegate<H::Screen>>,
    weak_self: Weak<StackInner<H>>,
    observation: RefCell<Option<ObservationToken>>,
}

impl<H: HostStack> StackInner<H> {
    fn attach(&self) {
        let delegate: Rc<dyn StackDelegate<H::Screen>> = self.proxy.clone();
        {
            let mut host = self.host.borrow_mut();
            host.set_delegate(Some(Rc::downgrade(&delegate)));
            if host.screens().is_empty()
                && let Some(root) = &self.root
            {
                host.set_screens(vec![root.clone()], false);
            }
        }

        let weak = self.weak_self.clone();
        let token = self.path.observe(move |_, transaction| {
            if let Some(inner) = weak.upgrade() {
                inner.request_sync(transaction.clone());
            }
        });
        *self.observation.borrow_mut() = Some(token);
        self.request_sync(Transaction::current());
    }

    fn request_sync(&self, transaction: Transaction) {
        *self.transaction.borrow_mut() = transaction;
        if self.syncing.get() {
            self.pending.set(true);
            return;
        }
        let _syncing = SettingGuard::raise(&self.syncing);
        loop {
            self.pending.set(false);
            let transaction = self.transaction.borrow().clone();
            if !self.sync_once(&transaction) || !self.pending.get() {
                break;
            }
            tracing::trace!(target: "navstack", "path changed during pass, running again");
        }
    }

    fn defer(&self) {
        if self.deferred.replace(true) {
            return;
        }
        tracing::debug!(target: "navstack", "host busy, deferring synchronization");
        let weak = self.weak_self.clone();
        MainQueue::spawn(move || {
            if let Some(inner) = weak.upgrade() {
                inner.deferred.set(false);
                let transaction = inner.transaction.borrow().clone();
                inner.request_sync(transaction);
            }
        });
    }

    /// Run `f` on the host, then prune the element table.
    ///
    /// Defers and returns `None` if the host is busy.
    fn with_host<R>(&self, f: impl FnOnce(&mut H) -> R) -> Option<R> {
        let Ok(mut host) = self.host.try_borrow_mut() else {
            self.defer();
            return None;
        };
        let result = f(&mut host);
        let live: Vec<_> = host.screens().iter().map(StackScreen::screen_id).collect();
        drop(host);
        self.elements.borrow_mut().retain_live(live);
        Some(result)
    }

    fn live_projection(&self, screens: &[H::Screen]) -> Vec<Option<PathElement>> {
        let table = self.elements.borrow();
        screens
            .iter()
            .map(|screen| table.get(screen.screen_id()).cloned())
            .collect()
    }

    /// Resolve `element`, which sits at `index` in the current path.
    fn resolve(&self, index: usize, element: &PathElement) -> Resolution<H::Screen> {
        // Factories may register destinations; the registry borrow ends here.
        let entry = self.registry.borrow().entry(&element.destination_type());
        match entry {
            Some(entry) => entry.resolve(index, element, &self.path, &*self.sink),
            None => Resolution::Missing,
        }
    }

    /// One synchronization pass. Returns `false` if it was deferred.
    fn sync_once(&self, transaction: &Transaction) -> bool {
        let Ok(host) = self.host.try_borrow() else {
            self.defer();
            return false;
        };
        let screens = host.screens().to_vec();
        drop(host);

        let desired = self.path.get();
        let tagged = self.live_projection(&screens);
        // Host index of each identified screen, in live-projection order.
        let host_indices: Vec<usize> = tagged
            .iter()
            .enumerate()
            .filter_map(|(index, element)| element.as_ref().map(|_| index))
            .collect();
        let live_ids: Vec<&ElementId> = tagged.iter().flatten().map(PathElement::id).collect();
        let desired_ids: Vec<&ElementId> = desired.elements().iter().map(PathElement::id).collect();
        let diff = Difference::between(&live_ids, &desired_ids);
        let animated = transaction.animates();

        if diff.is_empty() {
            if screens.is_empty()
                && let Some(root) = &self.root
            {
                let animated = self.config.animate_root_recovery;
                tracing::debug!(target: "navstack", op = "set_root", animated, "stack empty, restoring root");
                return self
                    .with_host(|host| host.set_screens(vec![root.clone()], animated))
                    .is_some();
            }
            tracing::trace!(target: "navstack", depth = desired.len(), "stack in sync");
            return true;
        }

        let removals = diff.removals();
        let insertions = diff.insertions();

        if removals.is_empty() && insertions.len() == 1 && insertions[0] + 1 == desired.len() {
            match self.resolve(insertions[0], &desired.elements()[insertions[0]]) {
                Resolution::Screen { screen, element } => {
                    tracing::debug!(target: "navstack", op = "push", depth = desired.len(), animated, "stack push");
                    self.elements
                        .borrow_mut()
                        .insert(screen.screen_id(), element);
                    return self.with_host(|host| host.push(screen, animated)).is_some();
                }
                Resolution::Failed => return true,
                Resolution::Missing => {}
            }
        } else if insertions.is_empty() {
            let first = removals[0];
            let last = removals[removals.len() - 1];
            let reaches_top = last + 1 == live_ids.len();
            // Without a root the bottom screen is tagged, and the host never
            // pops it; emptying the path then goes through a rebuild.
            let bottom_tagged = tagged.first().is_some_and(Option::is_some);

            if removals.len() == 1
                && first == desired.len()
                && host_indices[first] > 0
                && host_indices[first] + 1 == screens.len()
            {
                tracing::debug!(target: "navstack", op = "pop", depth = desired.len(), animated, "stack pop");
                return self.with_host(|host| host.pop(animated)).is_some();
            }
            if desired.is_empty() && !bottom_tagged {
                tracing::debug!(target: "navstack", op = "pop_to_root", popped = removals.len(), animated, "stack pop to root");
                return self.with_host(|host| host.pop_to_root(animated)).is_some();
            }
            if diff.removals_are_contiguous()
                && first == desired.len()
                && reaches_top
                && let Some(index) = host_indices[first].checked_sub(1)
            {
                tracing::debug!(target: "navstack", op = "pop_to", index, popped = removals.len(), animated, "stack pop to index");
                return self.with_host(|host| host.pop_to(index, animated)).is_some();
            }
        }

        self.rebuild(&screens, &tagged, &desired, animated)
    }

    fn rebuild(
        &self,
        screens: &[H::Screen],
        tagged: &[Option<PathElement>],
        desired: &NavigationPath,
        animated: bool,
    ) -> bool {
        let wanted = desired.elements();
        let mut stack = Vec::with_capacity(wanted.len() + 1);
        let mut used = vec![false; screens.len()];
        let mut matched = 0;

        for (index, screen) in screens.iter().enumerate() {
            match &tagged[index] {
                None => {}
                Some(element) if wanted.get(matched).is_some_and(|w| w.id() == element.id()) => {
                    matched += 1;
                }
                Some(_) => break,
            }
            used[index] = true;
            stack.push(screen.clone());
        }
        let kept = stack.len();

        let mut realized = Vec::new();
        let mut dropped = Vec::new();
        for (offset, element) in wanted[matched..].iter().enumerate() {
            let index = matched + offset;
            let reusable = (0..screens.len()).find(|&i| {
                !used[i] && tagged[i].as_ref().is_some_and(|live| live.id() == element.id())
            });
            if let Some(i) = reusable {
                used[i] = true;
                stack.push(screens[i].clone());
                if element.is_pending()
                    && let Some(live) = &tagged[i]
                {
                    realized.push((index, live.clone()));
                }
                continue;
            }

            match self.resolve(index, element) {
                Resolution::Screen { screen, element } => {
                    self.elements
                        .borrow_mut()
                        .insert(screen.screen_id(), element);
                    stack.push(screen);
                }
                Resolution::Missing
                    if element.is_encoded() && !self.config.prune_encoded_without_destination =>
                {
                    tracing::trace!(target: "navstack", index, "encoded element left for display time");
                }
                Resolution::Missing => {
                    self.sink.report(Diagnostic::MissingDestination {
                        index,
                        destination: element.destination_type(),
                    });
                    dropped.push(index);
                }
                Resolution::Failed => break,
            }
        }

        tracing::debug!(
            target: "navstack",
            op = "rebuild",
            kept,
            depth = stack.len(),
            dropped = dropped.len(),
            animated,
            "stack rebuild"
        );
        if self
            .with_host(|host| host.set_screens(stack, animated))
            .is_none()
        {
            return false;
        }

        if !realized.is_empty() || !dropped.is_empty() {
            self.path.update(|path| {
                for (index, element) in realized {
                    path.replace(index, element);
                }
                path.remove_indices(&dropped);
            });
        }
        true
    }

    fn reconcile_external_pop(&self) {
        let Ok(host) = self.host.try_borrow() else {
            return;
        };
        let screens = host.screens().to_vec();
        drop(host);
        let mut live: Vec<PathElement> =
            self.live_projection(&screens).into_iter().flatten().collect();
        let path = self.path.get();
        let eager = path.eager_count();
        if eager > live.len() {
            tracing::debug!(
                target: "navstack",
                path = eager,
                live = live.len(),
                "host popped on its own, updating path"
            );
            // Elements pushed since the gesture are still pending; keep them.
            live.extend(path.elements().iter().filter(|e| e.is_pending()).cloned());
            without_animation(|| self.path.set(NavigationPath::from_elements(live)));
        }
        let ids: Vec<_> = screens.iter().map(StackScreen::screen_id).collect();
        self.elements.borrow_mut().retain_live(ids);
    }
}

impl<H: HostStack> ShowReconciler for StackInner<H> {
    fn screen_did_show(&self) {
        let path = self.path.get();
        if let Some((index, element)) = path.first_pending() {
            let destination = element.destination_type();
            if !self.registry.borrow().contains(&destination) {
                self.sink
                    .report(Diagnostic::MissingDestination { index, destination });
                self.path.update(|path| path.truncate(index));
            }
            return;
        }
        if !self.config.reconcile_external_pops {
            return;
        }
        let weak = self.weak_self.clone();
        MainQueue::spawn(move || {
            if let Some(inner) = weak.upgrade() {
                inner.reconcile_external_pop();
            }
        });
    }
}

impl<H: HostStack> ContextTarget<H::Screen> for StackInner<H> {
    fn push_element(&self, element: PathElement) {
        tracing::trace!(target: "navstack", destination = %element.destination_type(), "push from context");
        self.path.update(|path| path.push_element(element));
    }

    fn register_entry(&self, entry: DestinationEntry<H::Screen>) {
        let destination = entry.destination_type().clone();
        self.registry.borrow_mut().insert(entry);
        let waiting = self
            .path
            .get()
            .elements()
            .iter()
            .any(|element| element.is_pending() && element.destination_type() == destination);
        if waiting {
            tracing::debug!(target: "navstack", %destination, "late registration, resynchronizing");
            self.request_sync(Transaction::current());
        }
    }
}
