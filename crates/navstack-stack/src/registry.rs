#![forbid(unsafe_code)]

//! Destination registry: destination type tag to screen factory.
//!
//! Resolving an element builds its screen and, for lazy or encoded elements,
//! rewrites the element in the path to its eager form so later diffs see a
//! settled entry with the same identity.
//!
//! # Invariants
//!
//! - One factory per tag; registering again replaces it.
//! - Resolution never changes an element's identity.
//! - The rewrite lands on the resolved element's own index. Equal values
//!   share an identity, so an earlier duplicate is left untouched.
//! - A decode failure removes the failed element and every element after it.
//!
//! # Failure Modes
//!
//! - The element is no longer in the path when it is rewritten: debug builds
//!   assert, release builds build the screen without rewriting.

use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use navstack_core::{
    AnyDestination, DecodeError, Destination, DestinationType, Diagnostic, DiagnosticSink,
    EncodedElement, NavigationPath, PathElement, decode,
};
use navstack_runtime::UiBinding;

type Factory<S> = dyn Fn(&AnyDestination) -> Option<S>;
type Decoder = fn(&EncodedElement) -> Result<AnyDestination, DecodeError>;

fn decode_any<T: Destination>(encoded: &EncodedElement) -> Result<AnyDestination, DecodeError> {
    decode::<T>(encoded).map(AnyDestination::new)
}

/// Outcome of resolving one path element.
pub enum Resolution<S> {
    /// A screen was built; `element` is the eager form now stored in the path.
    Screen { screen: S, element: PathElement },
    /// No destination is registered for the element's type.
    Missing,
    /// The element failed to decode and the path was truncated.
    Failed,
}

impl<S> fmt::Debug for Resolution<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Screen { element, .. } => f.debug_tuple("Screen").field(element).finish(),
            Self::Missing => f.write_str("Missing"),
            Self::Failed => f.write_str("Failed"),
        }
    }
}

/// Factory and decoder for one destination type.
pub struct DestinationEntry<S> {
    destination: DestinationType,
    factory: Rc<Factory<S>>,
    decoder: Decoder,
}

impl<S> Clone for DestinationEntry<S> {
    fn clone(&self) -> Self {
        Self {
            destination: self.destination.clone(),
            factory: Rc::clone(&self.factory),
            decoder: self.decoder,
        }
    }
}

impl<S> fmt::Debug for DestinationEntry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DestinationEntry")
            .field(&self.destination)
            .finish()
    }
}

impl<S: 'static> DestinationEntry<S> {
    /// Entry building screens for `T` with `factory`.
    pub fn new<T: Destination>(factory: impl Fn(&T) -> S + 'static) -> Self {
        Self {
            destination: DestinationType::of::<T>(),
            factory: Rc::new(move |value: &AnyDestination| value.downcast_ref::<T>().map(&factory)),
            decoder: decode_any::<T>,
        }
    }

    #[must_use]
    pub fn destination_type(&self) -> &DestinationType {
        &self.destination
    }

    /// Build the screen for `element`, found at `index` in `path`, rewriting
    /// it to eager there.
    ///
    /// Decode failures are reported to `sink`.
    pub fn resolve(
        &self,
        index: usize,
        element: &PathElement,
        path: &UiBinding<NavigationPath>,
        sink: &dyn DiagnosticSink,
    ) -> Resolution<S> {
        let eager = match element {
            PathElement::Eager { value, .. } => {
                return self.build(value, element.clone());
            }
            PathElement::Lazy { value, .. } => element.realize(value.clone()),
            PathElement::Encoded { payload, .. } => match (self.decoder)(payload) {
                Ok(value) => element.realize(value),
                Err(err) => {
                    let index = path.get().locate(index, element.id());
                    let Some(index) = index else {
                        debug_assert!(false, "decoded element is not in the path");
                        return Resolution::Failed;
                    };
                    tracing::debug!(
                        target: "navstack",
                        index,
                        destination = %self.destination,
                        "decode failed, truncating path"
                    );
                    sink.report(Diagnostic::DecodeFailed {
                        index,
                        destination: err.destination().clone(),
                        reason: err.to_string(),
                    });
                    path.update(|path| path.truncate(index));
                    return Resolution::Failed;
                }
            },
        };

        let current = path.get();
        match current.locate(index, element.id()) {
            Some(index) => path.update(|path| {
                path.replace(index, eager.clone());
            }),
            None => debug_assert!(false, "resolved element is not in the path"),
        }
        match eager.value() {
            Some(value) => self.build(value, eager.clone()),
            None => Resolution::Missing,
        }
    }

    fn build(&self, value: &AnyDestination, element: PathElement) -> Resolution<S> {
        match (self.factory)(value) {
            Some(screen) => Resolution::Screen { screen, element },
            None => Resolution::Missing,
        }
    }
}

/// Per-controller map of destination factories.
pub struct DestinationRegistry<S> {
    entries: AHashMap<DestinationType, DestinationEntry<S>>,
}

impl<S> Default for DestinationRegistry<S> {
    fn default() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }
}

impl<S> fmt::Debug for DestinationRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.entries.keys().map(DestinationType::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("DestinationRegistry")
            .field("destinations", &tags)
            .finish()
    }
}

impl<S: 'static> DestinationRegistry<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` for `T`, replacing any previous one.
    pub fn register<T: Destination>(&mut self, factory: impl Fn(&T) -> S + 'static) {
        self.insert(DestinationEntry::new(factory));
    }

    /// Register a prepared entry, replacing any previous one for its type.
    pub fn insert(&mut self, entry: DestinationEntry<S>) {
        self.entries.insert(entry.destination.clone(), entry);
    }

    #[must_use]
    pub fn contains(&self, destination: &DestinationType) -> bool {
        self.entries.contains_key(destination)
    }

    /// A clone of the entry for `destination`.
    ///
    /// Callers that keep the registry behind a `RefCell` should clone the
    /// entry out and release the borrow before resolving: factories may
    /// register destinations themselves.
    #[must_use]
    pub fn entry(&self, destination: &DestinationType) -> Option<DestinationEntry<S>> {
        self.entries.get(destination).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navstack_core::RecordingSink;
    use navstack_runtime::Observable;
    use serde::{Deserialize, Serialize};
    use std::cell::Cell;

    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    struct Topic(u32);

    impl Destination for Topic {
        const TAG: &'static str = "topic";
    }

    fn registry(calls: &Rc<Cell<usize>>) -> DestinationRegistry<String> {
        let calls = Rc::clone(calls);
        let mut registry = DestinationRegistry::new();
        registry.register(move |topic: &Topic| {
            calls.set(calls.get() + 1);
            format!("topic {}", topic.0)
        });
        registry
    }

    fn resolve<S: 'static>(
        registry: &DestinationRegistry<S>,
        index: usize,
        element: &PathElement,
        path: &UiBinding<NavigationPath>,
        sink: &dyn DiagnosticSink,
    ) -> Resolution<S> {
        registry
            .entry(&element.destination_type())
            .map_or(Resolution::Missing, |entry| {
                entry.resolve(index, element, path, sink)
            })
    }

    fn screen(resolution: Resolution<String>) -> Option<String> {
        match resolution {
            Resolution::Screen { screen, .. } => Some(screen),
            _ => None,
        }
    }

    #[test]
    fn eager_calls_factory_every_time() {
        let calls = Rc::new(Cell::new(0));
        let registry = registry(&calls);
        let source = Observable::new(NavigationPath::from_values([Topic(1)]));
        let path = UiBinding::from_observable(&source);
        let sink = RecordingSink::new();
        let element = path.get().elements()[0].clone();

        assert_eq!(
            screen(resolve(&registry, 0, &element, &path, &sink)).as_deref(),
            Some("topic 1")
        );
        resolve(&registry, 0, &element, &path, &sink);
        assert_eq!(calls.get(), 2);
        assert_eq!(source.version(), 0, "eager elements are not rewritten");
    }

    #[test]
    fn lazy_is_rewritten_in_place() {
        let calls = Rc::new(Cell::new(0));
        let registry = registry(&calls);
        let mut start = NavigationPath::from_values([Topic(1)]);
        start.push_element(PathElement::lazy(Topic(2)));
        start.append(Topic(3));
        let path = UiBinding::new(start);
        let lazy = path.get().elements()[1].clone();

        let resolution = resolve(&registry, 1, &lazy, &path, &RecordingSink::new());
        assert_eq!(screen(resolution).as_deref(), Some("topic 2"));

        let after = path.get();
        assert_eq!(after.len(), 3);
        assert!(after.elements()[1].is_eager());
        assert_eq!(after.elements()[1].id(), lazy.id());
    }

    #[test]
    fn duplicate_value_rewrites_the_resolved_slot() {
        let calls = Rc::new(Cell::new(0));
        let registry = registry(&calls);
        let mut start = NavigationPath::from_values([Topic(1)]);
        start.push_element(PathElement::lazy(Topic(1)));
        let path = UiBinding::new(start);
        let lazy = path.get().elements()[1].clone();

        let resolution = resolve(&registry, 1, &lazy, &path, &RecordingSink::new());
        assert_eq!(screen(resolution).as_deref(), Some("topic 1"));
        let after = path.get();
        assert_eq!(after.len(), 2);
        assert_eq!(after.eager_count(), 2);
        assert!(after.first_pending().is_none());
    }

    #[test]
    fn encoded_decodes_and_keeps_identity() {
        let calls = Rc::new(Cell::new(0));
        let registry = registry(&calls);
        let path = UiBinding::new(NavigationPath::from_codable(
            NavigationPath::from_values([Topic(5)]).codable().unwrap(),
        ));
        let encoded = path.get().elements()[0].clone();

        let resolution = resolve(&registry, 0, &encoded, &path, &RecordingSink::new());
        assert_eq!(screen(resolution).as_deref(), Some("topic 5"));
        let after = path.get();
        assert!(after.elements()[0].is_eager());
        assert_eq!(after.elements()[0].id(), encoded.id());
    }

    #[test]
    fn decode_failure_truncates_and_reports() {
        let calls = Rc::new(Cell::new(0));
        let registry = registry(&calls);
        let mut start = NavigationPath::from_values([Topic(1)]);
        start.push_element(PathElement::encoded(EncodedElement::new("topic", "\"nope\"")));
        start.append(Topic(3));
        let path = UiBinding::new(start);
        let bad = path.get().elements()[1].clone();
        let sink = RecordingSink::new();

        assert!(matches!(
            resolve(&registry, 1, &bad, &path, &sink),
            Resolution::Failed
        ));
        assert_eq!(path.get().len(), 1);
        assert_eq!(calls.get(), 0);
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].index(), Some(1));
    }

    #[test]
    fn unknown_tag_is_missing() {
        let calls = Rc::new(Cell::new(0));
        let registry = registry(&calls);
        let element = PathElement::encoded(EncodedElement::new("other", "1"));
        let path = UiBinding::new(NavigationPath::from_elements(vec![element.clone()]));
        assert!(matches!(
            resolve(&registry, 0, &element, &path, &RecordingSink::new()),
            Resolution::Missing
        ));
        assert_eq!(path.get().len(), 1);
    }

    #[test]
    fn register_replaces() {
        let mut registry = DestinationRegistry::new();
        registry.register(|_: &Topic| "first");
        registry.register(|_: &Topic| "second");
        assert_eq!(registry.len(), 1);
        let path = UiBinding::new(NavigationPath::from_values([Topic(0)]));
        let element = path.get().elements()[0].clone();
        match resolve(&registry, 0, &element, &path, &RecordingSink::new()) {
            Resolution::Screen { screen, .. } => assert_eq!(screen, "second"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
