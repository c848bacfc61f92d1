#![forbid(unsafe_code)]

//! A two-state control for exercising [`bind`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use navstack_runtime::{
    ActionTargets, BindingTokens, Control, ControlEvents, ObservationToken, ObservedProperty,
    Property, Transaction, UiBinding, bind, unbind,
};

/// On/off control with an observable `is_on` property.
///
/// Every value the binding applies is recorded together with its
/// transaction, so tests can check both what was set and how.
pub struct TestSwitch {
    actions: ActionTargets,
    bindings: BindingTokens,
    is_on: ObservedProperty<bool>,
    applied: RefCell<Vec<(bool, Transaction)>>,
}

impl TestSwitch {
    pub const IS_ON: Property<TestSwitch, bool> = Property::new("is_on", TestSwitch::is_on_cell);

    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            actions: ActionTargets::new(),
            bindings: BindingTokens::new(),
            is_on: ObservedProperty::new(false),
            applied: RefCell::new(Vec::new()),
        })
    }

    fn is_on_cell(&self) -> &ObservedProperty<bool> {
        &self.is_on
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.is_on.get()
    }

    /// Flip the switch as a user tap would.
    pub fn tap(&self) {
        self.is_on.set(!self.is_on.get());
        self.actions.send(ControlEvents::VALUE_CHANGED);
    }

    /// Change the state without a control event, as an animation completion
    /// or accessibility action would.
    pub fn set_silently(&self, on: bool) {
        self.is_on.set(on);
    }

    /// Values applied by the binding, oldest first.
    #[must_use]
    pub fn applied(&self) -> Vec<(bool, Transaction)> {
        self.applied.borrow().clone()
    }

    /// Bind `is_on` to `source`.
    pub fn bind(self: &Rc<Self>, source: &UiBinding<bool>) -> ObservationToken {
        bind(
            self,
            source,
            Self::IS_ON,
            ControlEvents::VALUE_CHANGED,
            |switch: &Self, on: &bool, transaction: &Transaction| {
                switch
                    .applied
                    .borrow_mut()
                    .push((*on, transaction.clone()));
                switch.is_on.set(*on);
            },
        )
    }

    /// Cancel the `is_on` binding, if any.
    pub fn unbind(&self) -> bool {
        unbind(self, Self::IS_ON)
    }
}

impl fmt::Debug for TestSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSwitch")
            .field("is_on", &self.is_on.get())
            .field("bound", &self.bindings.contains(Self::IS_ON.name))
            .finish()
    }
}

impl Control for TestSwitch {
    fn actions(&self) -> &ActionTargets {
        &self.actions
    }

    fn bindings(&self) -> &BindingTokens {
        &self.bindings
    }
}
