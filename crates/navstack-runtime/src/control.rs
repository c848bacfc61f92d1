#![forbid(unsafe_code)]

//! Two-way bindings between a [`UiBinding`] and a control property.
//!
//! A control exposes observable properties ([`ObservedProperty`]) and a set of
//! action targets fired by user interaction ([`ActionTargets`]). [`bind`]
//! connects one property to a binding in both directions:
//!
//! - user interaction (`event`) writes the property value into the binding;
//! - binding changes are applied to the control through the `set` closure;
//! - property changes made by the control itself are written back to the
//!   binding.
//!
//! # Invariants
//!
//! 1. While `set` runs, the property observer is suppressed, so applying a
//!    value never writes it back into the binding. The suppression flag is
//!    restored on every exit path, including unwinding.
//! 2. At most one binding per property: binding again cancels the previous
//!    token first.
//! 3. Every callback holds the control weakly; once the control is dropped
//!    they do nothing.
//! 4. Cancelling the token removes the action, invalidates the property
//!    observer and stops observing the binding. Cancel is idempotent.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use bitflags::bitflags;

use crate::reactive::{ObservationToken, UiBinding};
use crate::transaction::Transaction;

bitflags! {
    /// User-interaction events a control can fire.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlEvents: u32 {
        const VALUE_CHANGED = 1 << 0;
        const TOUCH_UP_INSIDE = 1 << 1;
        const EDITING_CHANGED = 1 << 2;
        const EDITING_DID_END = 1 << 3;
        const PRIMARY_ACTION_TRIGGERED = 1 << 4;
        const ALL_EVENTS = u32::MAX;
    }
}

/// Handle returned by [`ActionTargets::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(u64);

type Action = Rc<dyn Fn()>;

/// Event listeners registered on a control.
#[derive(Default)]
pub struct ActionTargets {
    next_id: Cell<u64>,
    actions: RefCell<Vec<(ActionId, ControlEvents, Action)>>,
}

impl ActionTargets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` whenever any of `events` is sent.
    pub fn add(&self, events: ControlEvents, action: impl Fn() + 'static) -> ActionId {
        let id = ActionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.actions
            .borrow_mut()
            .push((id, events, Rc::new(action)));
        id
    }

    /// Returns `true` if the action was registered.
    pub fn remove(&self, id: ActionId) -> bool {
        let mut actions = self.actions.borrow_mut();
        let before = actions.len();
        actions.retain(|(action_id, _, _)| *action_id != id);
        actions.len() != before
    }

    /// Fire every action listening to any of `events`.
    pub fn send(&self, events: ControlEvents) {
        let matching: Vec<Action> = self
            .actions
            .borrow()
            .iter()
            .filter(|(_, listen, _)| listen.intersects(events))
            .map(|(_, _, action)| Rc::clone(action))
            .collect();
        for action in matching {
            action();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.borrow().is_empty()
    }
}

impl fmt::Debug for ActionTargets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTargets")
            .field("len", &self.len())
            .finish()
    }
}

/// Handle returned by [`ObservedProperty::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type PropertyObserver<T> = Rc<dyn Fn(&T)>;

/// A control property whose changes can be observed.
pub struct ObservedProperty<T> {
    value: RefCell<T>,
    next_id: Cell<u64>,
    observers: RefCell<Vec<(ObserverId, PropertyObserver<T>)>>,
}

impl<T: Clone + PartialEq + 'static> ObservedProperty<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            next_id: Cell::new(0),
            observers: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Store `value` and notify observers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value.clone();
        }
        let observers: Vec<PropertyObserver<T>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in observers {
            observer(&value);
        }
    }

    pub fn observe(&self, observer: impl Fn(&T) + 'static) -> ObserverId {
        let id = ObserverId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.observers.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    /// Stop notifying `id`. Returns `true` if it was registered.
    pub fn invalidate(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservedProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedProperty")
            .field("value", &*self.value.borrow())
            .finish_non_exhaustive()
    }
}

/// Names one observable property of control type `C`.
pub struct Property<C, T> {
    pub name: &'static str,
    pub cell: fn(&C) -> &ObservedProperty<T>,
}

impl<C, T> Clone for Property<C, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, T> Copy for Property<C, T> {}

impl<C, T> fmt::Debug for Property<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.name).finish()
    }
}

impl<C, T> Property<C, T> {
    pub const fn new(name: &'static str, cell: fn(&C) -> &ObservedProperty<T>) -> Self {
        Self { name, cell }
    }

    pub fn of<'c>(&self, control: &'c C) -> &'c ObservedProperty<T> {
        (self.cell)(control)
    }
}

/// Active binding tokens of one control, keyed by property name.
///
/// Dropped with the control, which cancels any token nobody else holds.
#[derive(Default)]
pub struct BindingTokens {
    tokens: RefCell<AHashMap<&'static str, ObservationToken>>,
}

impl BindingTokens {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, name: &'static str, token: ObservationToken) {
        let previous = self.tokens.borrow_mut().insert(name, token);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    fn cancel(&self, name: &str) -> bool {
        let token = self.tokens.borrow_mut().remove(name);
        match token {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tokens.borrow().contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.borrow().is_empty()
    }
}

impl fmt::Debug for BindingTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens = self.tokens.borrow();
        let mut names: Vec<&&str> = tokens.keys().collect();
        names.sort();
        f.debug_struct("BindingTokens")
            .field("properties", &names)
            .finish()
    }
}

/// A UI control that can take part in [`bind`].
pub trait Control: 'static {
    fn actions(&self) -> &ActionTargets;
    fn bindings(&self) -> &BindingTokens;
}

/// Raises a shared flag for its lifetime and restores the previous state.
#[derive(Debug)]
pub struct SettingGuard {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl SettingGuard {
    #[must_use]
    pub fn raise(flag: &Rc<Cell<bool>>) -> Self {
        let previous = flag.replace(true);
        Self {
            flag: Rc::clone(flag),
            previous,
        }
    }
}

impl Drop for SettingGuard {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// Bind `property` of `control` to `binding`.
///
/// `set` applies a binding value to the control; it runs once immediately
/// with the current value. The returned token is also kept by the control
/// under the property's name.
pub fn bind<C, T>(
    control: &Rc<C>,
    binding: &UiBinding<T>,
    property: Property<C, T>,
    event: ControlEvents,
    set: impl Fn(&C, &T, &Transaction) + 'static,
) -> ObservationToken
where
    C: Control,
    T: Clone + PartialEq + 'static,
{
    unbind(control.as_ref(), property);

    let weak: Weak<C> = Rc::downgrade(control);
    let setting = Rc::new(Cell::new(false));

    let action_id = {
        let weak = Weak::clone(&weak);
        let binding = binding.clone();
        control.actions().add(event, move || {
            if let Some(control) = weak.upgrade() {
                binding.set(property.of(&control).get());
            }
        })
    };

    let apply: Rc<dyn Fn(&T, &Transaction)> = {
        let weak = Weak::clone(&weak);
        let setting = Rc::clone(&setting);
        let own = binding.transaction().clone();
        Rc::new(move |value: &T, incoming: &Transaction| {
            let Some(control) = weak.upgrade() else {
                return;
            };
            let transaction = if incoming.is_empty() { &own } else { incoming };
            let _guard = SettingGuard::raise(&setting);
            set(&control, value, transaction);
        })
    };

    apply(&binding.get(), &Transaction::current());
    let source_token = {
        let apply = Rc::clone(&apply);
        binding.observe(move |value, transaction| apply(value, transaction))
    };

    let observer_id = {
        let binding = binding.clone();
        let setting = Rc::clone(&setting);
        property.of(control).observe(move |value| {
            if !setting.get() {
                binding.set(value.clone());
            }
        })
    };

    let token = ObservationToken::new(move || {
        if let Some(control) = weak.upgrade() {
            control.actions().remove(action_id);
            property.of(&control).invalidate(observer_id);
        }
        source_token.cancel();
    });
    control.bindings().insert(property.name, token.clone());
    tracing::trace!(target: "navstack", property = property.name, "bound control property");
    token
}

/// Cancel the binding of `property`, if any. Returns `true` if one existed.
pub fn unbind<C: Control, T>(control: &C, property: Property<C, T>) -> bool {
    control.bindings().cancel(property.name)
}
