#![forbid(unsafe_code)]

//! Ready-made stacks for scenario tests.
//!
//! [`StackFixture`] wires an in-memory [`ScreenStack`] of [`TestScreen`]s to a
//! [`NavigationStackController`] driven by an observable path, with a
//! [`RecordingSink`] collecting diagnostics.
//!
//! ```ignore
//! let fx = StackFixture::build(NavigationPath::new(), |b| {
//!     b.destination(|step: &Step| TestScreen::titled(step.0.to_string()))
//! });
//! fx.set_path(NavigationPath::from_values([Step(1)]));
//! assert_titles!(fx, ["root", "1"]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use navstack_core::{NavigationPath, RecordingSink, ScreenId, StackScreen};
use navstack_runtime::{MainQueue, Observable, UiBinding};
use navstack_stack::{
    HostStack, InterfaceOrientation, InterfaceOrientations, NavigationStackController,
    ScreenStack, StackBuilder, StackDelegate, StackOp,
};

/// A screen identified by a fresh [`ScreenId`] and labeled with a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestScreen {
    id: ScreenId,
    title: String,
}

impl TestScreen {
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: ScreenId::next(),
            title: title.into(),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl StackScreen for TestScreen {
    fn screen_id(&self) -> ScreenId {
        self.id
    }
}

pub type TestHost = ScreenStack<TestScreen>;

/// A controller over a [`TestHost`], plus handles to everything around it.
pub struct StackFixture {
    pub host: Rc<RefCell<TestHost>>,
    pub source: Observable<NavigationPath>,
    pub sink: Rc<RecordingSink>,
    pub controller: NavigationStackController<TestHost>,
}

impl StackFixture {
    /// Build a stack with root screen `"root"`, customized by `configure`.
    ///
    /// The main queue is cleared first and drained after the first pass; the
    /// operation log starts empty.
    pub fn build(
        initial: NavigationPath,
        configure: impl FnOnce(StackBuilder<TestHost>) -> StackBuilder<TestHost>,
    ) -> Self {
        MainQueue::clear();
        let host = Rc::new(RefCell::new(ScreenStack::new()));
        let source = Observable::new(initial);
        let sink = Rc::new(RecordingSink::new());
        let builder =
            NavigationStackController::builder(Rc::clone(&host), UiBinding::from_observable(&source))
                .root(TestScreen::titled("root"))
                .diagnostics(sink.clone());
        let controller = configure(builder).build();
        MainQueue::run_until_idle();
        host.borrow_mut().take_ops();
        Self {
            host,
            source,
            sink,
            controller,
        }
    }

    /// Replace the path and let every queued task run.
    pub fn set_path(&self, path: NavigationPath) {
        self.source.set(path);
        MainQueue::run_until_idle();
    }

    /// Titles of the host's screens, root first.
    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.host
            .borrow()
            .screens()
            .iter()
            .map(|screen| screen.title().to_owned())
            .collect()
    }

    pub fn take_ops(&self) -> Vec<StackOp> {
        self.host.borrow_mut().take_ops()
    }

    /// Screen at host index `index`.
    #[must_use]
    pub fn screen(&self, index: usize) -> Option<TestScreen> {
        self.host.borrow().screens().get(index).cloned()
    }

    /// Simulate a back gesture and let the write-back run.
    pub fn swipe_back(&self) -> Option<TestScreen> {
        let popped = self.host.borrow_mut().interactive_pop();
        MainQueue::run_until_idle();
        popped
    }
}

/// One delegate callback seen by a [`RecordingDelegate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowEvent {
    WillShow { title: String, animated: bool },
    DidShow { title: String, animated: bool },
}

/// Delegate that logs show notifications and reports fixed orientations.
#[derive(Debug, Default)]
pub struct RecordingDelegate {
    events: RefCell<Vec<ShowEvent>>,
    orientations: Option<InterfaceOrientations>,
}

impl RecordingDelegate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_orientations(orientations: InterfaceOrientations) -> Self {
        Self {
            events: RefCell::default(),
            orientations: Some(orientations),
        }
    }

    #[must_use]
    pub fn events(&self) -> Vec<ShowEvent> {
        self.events.borrow().clone()
    }
}

impl StackDelegate<TestScreen> for RecordingDelegate {
    fn will_show(&self, screen: &TestScreen, animated: bool) {
        self.events.borrow_mut().push(ShowEvent::WillShow {
            title: screen.title().to_owned(),
            animated,
        });
    }

    fn did_show(&self, screen: &TestScreen, animated: bool) {
        self.events.borrow_mut().push(ShowEvent::DidShow {
            title: screen.title().to_owned(),
            animated,
        });
    }

    fn supported_orientations(&self) -> Option<InterfaceOrientations> {
        self.orientations
    }

    fn preferred_orientation(&self) -> Option<InterfaceOrientation> {
        self.orientations
            .filter(|o| o.contains(InterfaceOrientations::LANDSCAPE_LEFT))
            .map(|_| InterfaceOrientation::LandscapeLeft)
    }
}

/// Assert the titles of a [`StackFixture`]'s screens, root first.
#[macro_export]
macro_rules! assert_titles {
    ($fixture:expr, [$($title:expr),* $(,)?]) => {{
        let expected: ::std::vec::Vec<::std::string::String> =
            ::std::vec![$(::std::string::String::from($title)),*];
        assert_eq!($fixture.titles(), expected, "host screen titles");
    }};
}
