#![forbid(unsafe_code)]

//! Destination values and their explicit type tags.
//!
//! A destination is any hashable, serializable value an application pushes
//! onto a navigation path. Dispatch never relies on reflection: every
//! destination type declares a stable string [`Destination::TAG`], which is
//! both the registry key and the tag written into encoded payloads.
//!
//! # Invariants
//!
//! 1. Two [`AnyDestination`] values are equal only when they wrap the same
//!    concrete type and the wrapped values compare equal.
//! 2. Equal values hash equally, regardless of which handle wraps them.
//! 3. `AnyDestination::encode` always tags the payload with the value's
//!    own `TAG`.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::element::EncodedElement;
use crate::error::{DecodeError, EncodeError};

/// A value that can be placed on a navigation path.
///
/// # Example
///
/// ```
/// use navstack_core::Destination;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// struct Profile {
///     user_id: u64,
/// }
///
/// impl Destination for Profile {
///     const TAG: &'static str = "profile";
/// }
/// ```
pub trait Destination:
    Clone + Eq + Hash + fmt::Debug + Serialize + DeserializeOwned + 'static
{
    /// Stable, unique tag for this destination type.
    ///
    /// Changing the tag invalidates any previously encoded paths.
    const TAG: &'static str;
}

/// Explicit type tag of a destination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestinationType(Cow<'static, str>);

impl DestinationType {
    /// Tag of the destination type `T`.
    #[must_use]
    pub fn of<T: Destination>() -> Self {
        Self(Cow::Borrowed(T::TAG))
    }

    /// Tag read from an encoded payload.
    #[must_use]
    pub fn from_tag(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

trait DynDestination {
    fn as_any(&self) -> &dyn Any;
    fn destination_type(&self) -> DestinationType;
    fn dyn_eq(&self, other: &dyn DynDestination) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn dyn_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    fn encode_payload(&self) -> Result<String, serde_json::Error>;
}

impl<T: Destination> DynDestination for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn destination_type(&self) -> DestinationType {
        DestinationType::of::<T>()
    }

    fn dyn_eq(&self, other: &dyn DynDestination) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn dyn_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }

    fn encode_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Type-erased, cheaply clonable destination value.
#[derive(Clone)]
pub struct AnyDestination(Rc<dyn DynDestination>);

impl AnyDestination {
    /// Wrap a concrete destination value.
    #[must_use]
    pub fn new<T: Destination>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Tag of the wrapped value's type.
    #[must_use]
    pub fn destination_type(&self) -> DestinationType {
        self.0.destination_type()
    }

    /// Whether the wrapped value is a `T`.
    #[must_use]
    pub fn is<T: Destination>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Borrow the wrapped value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Destination>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Serialize the wrapped value into a tagged payload.
    pub fn encode(&self) -> Result<EncodedElement, EncodeError> {
        let destination = self.destination_type();
        match self.0.encode_payload() {
            Ok(payload) => Ok(EncodedElement::new(destination.as_str(), payload)),
            Err(err) => Err(EncodeError {
                destination,
                message: err.to_string(),
            }),
        }
    }
}

impl PartialEq for AnyDestination {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.dyn_eq(&*other.0)
    }
}

impl Eq for AnyDestination {}

impl Hash for AnyDestination {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.destination_type().hash(state);
        self.0.dyn_hash(state);
    }
}

impl fmt::Debug for AnyDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.dyn_fmt(f)
    }
}

/// Decode a tagged payload as `T`.
///
/// # Errors
///
/// - [`DecodeError::TypeMismatch`] if the payload is tagged for another type.
/// - [`DecodeError::Malformed`] if the JSON does not parse as `T`.
pub fn decode<T: Destination>(encoded: &EncodedElement) -> Result<T, DecodeError> {
    let found = encoded.destination_type();
    if found.as_str() != T::TAG {
        return Err(DecodeError::TypeMismatch {
            expected: DestinationType::of::<T>(),
            found,
        });
    }
    serde_json::from_str(&encoded.payload).map_err(|err| DecodeError::Malformed {
        destination: found,
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::hash_map::DefaultHasher;

    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    struct Article(u32);

    impl Destination for Article {
        const TAG: &'static str = "article";
    }

    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    struct Author(u32);

    impl Destination for Author {
        const TAG: &'static str = "author";
    }

    fn hash_of(value: &AnyDestination) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equal_values_compare_and_hash_equal() {
        let a = AnyDestination::new(Article(1));
        let b = AnyDestination::new(Article(1));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn different_types_never_compare_equal() {
        let a = AnyDestination::new(Article(1));
        let b = AnyDestination::new(Author(1));
        assert_ne!(a, b);
    }

    #[test]
    fn downcast_recovers_value() {
        let a = AnyDestination::new(Article(7));
        assert!(a.is::<Article>());
        assert!(!a.is::<Author>());
        assert_eq!(a.downcast_ref::<Article>(), Some(&Article(7)));
        assert_eq!(a.destination_type(), DestinationType::of::<Article>());
    }

    #[test]
    fn encode_then_decode() {
        let encoded = AnyDestination::new(Article(42)).encode().unwrap();
        assert_eq!(encoded.tag, "article");
        assert_eq!(decode::<Article>(&encoded).unwrap(), Article(42));
    }

    #[test]
    fn decode_rejects_foreign_tag() {
        let encoded = AnyDestination::new(Author(3)).encode().unwrap();
        let err = decode::<Article>(&encoded).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { .. }));
    }

    #[test]
    fn decode_rejects_garbage() {
        let encoded = EncodedElement::new("article", "{not json");
        let err = decode::<Article>(&encoded).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn debug_shows_inner_value() {
        let a = AnyDestination::new(Article(5));
        assert_eq!(format!("{a:?}"), "Article(5)");
    }
}
