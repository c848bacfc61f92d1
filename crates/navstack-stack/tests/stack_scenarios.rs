//! End-to-end synchronizer scenarios against the in-memory host.

use std::cell::RefCell;
use std::rc::Rc;

use navstack_core::{
    Destination, DestinationType, Diagnostic, EncodedElement, NavigationPath, PathElement, RecordingSink, ScreenId,
    StackScreen,
};
use navstack_runtime::{MainQueue, Observable, Transaction, UiBinding, with_transaction};
use navstack_stack::{HostStack, NavigationStackController, ScreenStack, StackConfig, StackOp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
struct Page {
    id: ScreenId,
    label: String,
}

impl Page {
    fn new(label: impl Into<String>) -> Self {
        Self {
            id: ScreenId::next(),
            label: label.into(),
        }
    }
}

impl StackScreen for Page {
    fn screen_id(&self) -> ScreenId {
        self.id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Item(char);

impl Destination for Item {
    const TAG: &'static str = "item";
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Unregistered(u8);

impl Destination for Unregistered {
    const TAG: &'static str = "unregistered";
}

type Host = Rc<RefCell<ScreenStack<Page>>>;

struct Fixture {
    host: Host,
    source: Observable<NavigationPath>,
    sink: Rc<RecordingSink>,
    controller: NavigationStackController<ScreenStack<Page>>,
}

impl Fixture {
    fn new(initial: NavigationPath) -> Self {
        Self::with_config(initial, StackConfig::default())
    }

    fn with_config(initial: NavigationPath, config: StackConfig) -> Self {
        Self::build(initial, config, Some(Page::new("root")))
    }

    fn without_root(initial: NavigationPath) -> Self {
        Self::build(initial, StackConfig::default(), None)
    }

    fn build(initial: NavigationPath, config: StackConfig, root: Option<Page>) -> Self {
        MainQueue::clear();
        let host: Host = Rc::new(RefCell::new(ScreenStack::new()));
        let source = Observable::new(initial);
        let sink = Rc::new(RecordingSink::new());
        let mut builder =
            NavigationStackController::builder(Rc::clone(&host), UiBinding::from_observable(&source))
                .config(config)
                .diagnostics(sink.clone())
                .destination(|item: &Item| Page::new(item.0.to_string()));
        if let Some(root) = root {
            builder = builder.root(root);
        }
        let controller = builder.build();
        MainQueue::run_until_idle();
        host.borrow_mut().take_ops();
        Self {
            host,
            source,
            sink,
            controller,
        }
    }

    fn labels(&self) -> Vec<String> {
        self.host
            .borrow()
            .screens()
            .iter()
            .map(|page| page.label.clone())
            .collect()
    }

    fn live_path(&self) -> NavigationPath {
        self.controller.live_path()
    }

    fn ops(&self) -> Vec<StackOp> {
        self.host.borrow_mut().take_ops()
    }

    fn set(&self, items: &str) {
        self.source.set(items_path(items));
        MainQueue::run_until_idle();
    }
}

fn items_path(items: &str) -> NavigationPath {
    NavigationPath::from_values(items.chars().map(Item))
}

#[test]
fn initial_path_is_built_on_top_of_root() {
    let fx = Fixture::new(items_path("ab"));
    assert_eq!(fx.labels(), vec!["root", "a", "b"]);
    assert!(fx.sink.is_empty());
}

#[test]
fn append_is_a_single_push() {
    let fx = Fixture::new(items_path("ab"));
    fx.set("abc");
    let ops = fx.ops();
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], StackOp::Push { animated: true, .. }));
    assert_eq!(fx.labels(), vec!["root", "a", "b", "c"]);
}

#[test]
fn truncating_one_is_a_single_pop() {
    let fx = Fixture::new(items_path("abc"));
    fx.set("ab");
    assert_eq!(fx.ops(), vec![StackOp::Pop { animated: true }]);
    assert_eq!(fx.labels(), vec!["root", "a", "b"]);
}

#[test]
fn truncating_several_jumps_once() {
    let fx = Fixture::new(items_path("abc"));
    fx.set("a");
    assert_eq!(
        fx.ops(),
        vec![StackOp::PopTo {
            index: 1,
            animated: true
        }]
    );
    assert_eq!(fx.labels(), vec!["root", "a"]);
}

#[test]
fn clearing_pops_to_root() {
    let fx = Fixture::new(items_path("abc"));
    fx.set("");
    assert_eq!(fx.ops(), vec![StackOp::PopToRoot { animated: true }]);
    assert_eq!(fx.labels(), vec!["root"]);
    assert!(fx.controller.live_path().is_empty());
}

#[test]
fn same_identities_do_nothing() {
    let fx = Fixture::new(items_path("ab"));
    fx.set("ab");
    assert!(fx.ops().is_empty());
}

#[test]
fn disabled_animation_transaction_is_honored() {
    let fx = Fixture::new(items_path("a"));
    with_transaction(Transaction::disabling_animations(), || {
        fx.source.set(items_path("ab"));
    });
    let ops = fx.ops();
    assert!(matches!(ops[0], StackOp::Push { animated: false, .. }));

    with_transaction(Transaction::disabling_animations(), || {
        fx.source.set(items_path("a"));
    });
    assert_eq!(fx.ops(), vec![StackOp::Pop { animated: false }]);
}

#[test]
fn reorder_rebuilds_and_reuses_screens() {
    let fx = Fixture::new(items_path("abc"));
    let before: Vec<ScreenId> = fx.host.borrow().screen_ids();
    fx.set("acb");
    let ops = fx.ops();
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], StackOp::SetScreens { .. }));
    assert_eq!(fx.labels(), vec!["root", "a", "c", "b"]);
    let after: Vec<ScreenId> = fx.host.borrow().screen_ids();
    assert_eq!(after, vec![before[0], before[1], before[3], before[2]]);
}

#[test]
fn unregistered_element_is_dropped_on_rebuild() {
    let fx = Fixture::new(NavigationPath::new());
    let mut path = items_path("a");
    path.append(Unregistered(7));
    fx.source.set(path);
    MainQueue::run_until_idle();

    assert_eq!(fx.labels(), vec!["root", "a"]);
    assert_eq!(fx.source.get(), items_path("a"));
    let diagnostics = fx.sink.take();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0],
        Diagnostic::MissingDestination {
            index: 1,
            destination: DestinationType::of::<Unregistered>(),
        }
    );
}

#[test]
fn dropped_indices_are_absolute() {
    let fx = Fixture::new(items_path("ab"));
    let mut path = items_path("ab");
    path.append(Unregistered(1));
    path.append(Item('c'));
    path.append(Unregistered(2));
    fx.source.set(path);
    MainQueue::run_until_idle();

    assert_eq!(fx.source.get(), items_path("abc"));
    let indices: Vec<_> = fx.sink.take().iter().filter_map(Diagnostic::index).collect();
    assert_eq!(indices, vec![2, 4]);
    assert_eq!(fx.labels(), vec!["root", "a", "b", "c"]);
}

#[test]
fn decode_failure_truncates_restored_path() {
    let mut restored = NavigationPath::new();
    restored.push_element(PathElement::encoded(EncodedElement::new("item", "\"a\"")));
    restored.push_element(PathElement::encoded(EncodedElement::new("item", "42")));
    restored.push_element(PathElement::encoded(EncodedElement::new("item", "\"c\"")));

    let fx = Fixture::new(restored);
    assert_eq!(fx.labels(), vec!["root", "a"]);
    let path = fx.source.get();
    assert_eq!(path.len(), 1);
    assert!(path.elements()[0].is_eager());

    let diagnostics = fx.sink.take();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), "decode_failed");
    assert_eq!(diagnostics[0].index(), Some(1));
}

#[test]
fn codable_round_trip_restores_stack() {
    let fx = Fixture::new(items_path("xyz"));
    let json = fx
        .controller
        .path()
        .get()
        .codable()
        .unwrap()
        .to_json()
        .unwrap();

    let restored = Fixture::new(NavigationPath::from_json(&json).unwrap());
    assert_eq!(restored.labels(), vec!["root", "x", "y", "z"]);
    assert!(restored
        .source
        .get()
        .elements()
        .iter()
        .all(PathElement::is_eager));
}

#[test]
fn unknown_encoded_element_is_truncated_at_display() {
    let mut restored = items_path("a");
    restored.push_element(PathElement::encoded(EncodedElement::new("unregistered", "1")));
    let fx = Fixture::new(restored);

    assert_eq!(fx.labels(), vec!["root", "a"]);
    assert_eq!(fx.source.get(), items_path("a"));
    let diagnostics = fx.sink.take();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), "missing_destination");
    assert_eq!(diagnostics[0].index(), Some(1));
}

#[test]
fn pruning_policy_drops_unknown_encoded_immediately() {
    let mut restored = items_path("a");
    restored.push_element(PathElement::encoded(EncodedElement::new("unregistered", "1")));
    let config = StackConfig {
        prune_encoded_without_destination: true,
        ..StackConfig::default()
    };
    let fx = Fixture::with_config(restored, config);
    assert_eq!(fx.source.get(), items_path("a"));
    assert_eq!(fx.sink.len(), 1);
}

#[test]
fn interactive_pop_writes_back() {
    let fx = Fixture::new(items_path("abc"));
    assert!(fx.host.borrow_mut().interactive_pop().is_some());
    MainQueue::run_until_idle();

    assert_eq!(fx.source.get(), items_path("ab"));
    assert_eq!(fx.ops(), vec![StackOp::InteractivePop]);
}

#[test]
fn lazy_push_survives_back_gesture() {
    let fx = Fixture::new(items_path("abc"));
    assert!(fx.host.borrow_mut().interactive_pop().is_some());
    // Delivers `did_show`, which queues the write-back for the next turn.
    MainQueue::run_turn();
    {
        // Busy host: the pushed element stays lazy until the write-back.
        let _busy = fx.host.borrow_mut();
        fx.controller.context().push(Item('d'));
    }
    assert!(fx.source.get().first_pending().is_some());
    MainQueue::run_until_idle();

    assert_eq!(fx.source.get(), items_path("abd"));
    assert_eq!(fx.labels(), vec!["root", "a", "b", "d"]);
}

#[test]
fn duplicate_value_push_is_realized_and_popped() {
    let fx = Fixture::new(items_path("a"));
    fx.controller.context().push(Item('a'));
    MainQueue::run_until_idle();

    let path = fx.source.get();
    assert_eq!(path, items_path("aa"));
    assert_eq!(path.eager_count(), 2);
    assert_eq!(fx.labels(), vec!["root", "a", "a"]);

    assert!(fx.host.borrow_mut().interactive_pop().is_some());
    MainQueue::run_until_idle();
    assert_eq!(fx.source.get(), items_path("a"));
    assert_eq!(fx.labels(), vec!["root", "a"]);
}

#[test]
fn duplicate_values_in_initial_path() {
    let fx = Fixture::new(items_path("aba"));
    assert_eq!(fx.labels(), vec!["root", "a", "b", "a"]);
    fx.set("abaa");
    assert!(matches!(fx.ops()[..], [StackOp::Push { .. }]));
    fx.set("ab");
    assert_eq!(fx.labels(), vec!["root", "a", "b"]);
    assert_eq!(fx.live_path(), items_path("ab"));
}

#[test]
fn external_pop_reconciliation_can_be_disabled() {
    let config = StackConfig {
        reconcile_external_pops: false,
        ..StackConfig::default()
    };
    let fx = Fixture::with_config(items_path("ab"), config);
    fx.host.borrow_mut().interactive_pop();
    MainQueue::run_until_idle();
    assert_eq!(fx.source.get(), items_path("ab"));
}

#[test]
fn emptied_host_recovers_root() {
    let fx = Fixture::new(items_path("a"));
    fx.host.borrow_mut().set_screens(Vec::new(), false);
    fx.ops();

    fx.set("");
    assert_eq!(
        fx.ops(),
        vec![StackOp::SetScreens {
            screens: vec![fx.host.borrow().screen_ids()[0]],
            animated: true
        }]
    );
    assert_eq!(fx.labels(), vec!["root"]);
}

#[test]
fn rootless_stack_empties_with_path() {
    let fx = Fixture::without_root(items_path("ab"));
    assert_eq!(fx.labels(), vec!["a", "b"]);

    fx.set("");
    assert!(fx.labels().is_empty());
    assert!(fx.live_path().is_empty());
    assert_eq!(
        fx.ops(),
        vec![StackOp::SetScreens {
            screens: Vec::new(),
            animated: true
        }]
    );

    fx.set("a");
    assert_eq!(fx.labels(), vec!["a"]);
    fx.set("");
    assert!(fx.labels().is_empty());
    assert!(fx.source.get().is_empty());
}

#[test]
fn rootless_stack_pops_above_bottom() {
    let fx = Fixture::without_root(items_path("abc"));
    fx.set("ab");
    assert_eq!(fx.ops(), vec![StackOp::Pop { animated: true }]);
    fx.set("a");
    assert_eq!(fx.ops(), vec![StackOp::Pop { animated: true }]);
    assert_eq!(fx.labels(), vec!["a"]);
}

#[test]
fn busy_host_defers_to_next_turn() {
    let fx = Fixture::new(items_path("a"));
    {
        let _busy = fx.host.borrow_mut();
        fx.source.set(items_path("ab"));
    }
    assert_eq!(fx.labels(), vec!["root", "a"]);
    MainQueue::run_until_idle();
    assert_eq!(fx.labels(), vec!["root", "a", "b"]);
}

#[test]
fn dismiss_pops_screen_and_above() {
    let fx = Fixture::new(items_path("abcd"));
    let b = fx.host.borrow().screens()[2].clone();
    assert!(fx.controller.dismiss(&b));
    MainQueue::run_until_idle();

    assert_eq!(fx.source.get(), items_path("a"));
    assert_eq!(fx.labels(), vec!["root", "a"]);
    assert_eq!(
        fx.ops(),
        vec![StackOp::PopTo {
            index: 1,
            animated: true
        }]
    );

    let root = fx.host.borrow().screens()[0].clone();
    assert!(!fx.controller.dismiss(&root));
    assert!(!fx.controller.dismiss(&Page::new("stranger")));
}

#[test]
fn late_registration_resolves_waiting_elements() {
    MainQueue::clear();
    let host: Host = Rc::new(RefCell::new(ScreenStack::new()));
    let mut restored = NavigationPath::new();
    restored.push_element(PathElement::encoded(EncodedElement::new("item", "\"q\"")));
    let source = Observable::new(restored);
    let sink = Rc::new(RecordingSink::new());
    let controller =
        NavigationStackController::builder(Rc::clone(&host), UiBinding::from_observable(&source))
            .root(Page::new("root"))
            .diagnostics(sink.clone())
            .build();

    controller.register(|item: &Item| Page::new(item.0.to_string()));
    MainQueue::run_until_idle();

    let labels: Vec<String> = host.borrow().screens().iter().map(|p| p.label.clone()).collect();
    assert_eq!(labels, vec!["root", "q"]);
    assert!(sink.is_empty());
    assert!(source.get().elements()[0].is_eager());
}

#[test]
fn context_push_realizes_lazy_element() {
    let fx = Fixture::new(items_path("a"));
    let context = fx.controller.context();
    context.push(Item('z'));
    MainQueue::run_until_idle();

    assert_eq!(fx.labels(), vec!["root", "a", "z"]);
    let path = fx.source.get();
    assert!(path.elements().iter().all(PathElement::is_eager));
    assert_eq!(fx.ops().len(), 1);
}

#[test]
fn context_after_controller_drop_reports_misuse() {
    MainQueue::clear();
    let host: Host = Rc::new(RefCell::new(ScreenStack::new()));
    let sink = Rc::new(RecordingSink::new());
    let context = NavigationStackController::builder(host, UiBinding::new(NavigationPath::new()))
        .diagnostics(sink.clone())
        .build()
        .context();
    context.push(Item('a'));
    assert_eq!(sink.entries()[0].kind(), "push_outside_stack");
}

#[test]
fn typed_path_drives_stack() {
    MainQueue::clear();
    let host: Host = Rc::new(RefCell::new(ScreenStack::new()));
    let values = UiBinding::new(vec![Item('a')]);
    let sink = Rc::new(RecordingSink::new());
    let controller = NavigationStackController::typed(Rc::clone(&host), values.clone())
        .root(Page::new("root"))
        .diagnostics(sink.clone())
        .destination(|item: &Item| Page::new(item.0.to_string()))
        .build();
    MainQueue::run_until_idle();

    values.update(|v| v.push(Item('b')));
    assert_eq!(host.borrow().len(), 3);

    controller.context().push(Unregistered(1));
    assert_eq!(values.get(), vec![Item('a'), Item('b')]);
    assert_eq!(sink.entries()[0].kind(), "path_type_mismatch");

    host.borrow_mut().interactive_pop();
    MainQueue::run_until_idle();
    assert_eq!(values.get(), vec![Item('a')]);
}
