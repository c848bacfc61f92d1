#![forbid(unsafe_code)]

//! Path elements in eager, lazy, or encoded form.
//!
//! A [`PathElement`] is one entry of a navigation path. It starts life in one
//! of three forms and is realized into the eager form when a screen is built
//! for it:
//!
//! | Form | Holds | Produced by |
//! |------|-------|-------------|
//! | `Eager` | value | application writes, resolution |
//! | `Lazy` | value | `push` from a screen |
//! | `Encoded` | tagged JSON | restoring a persisted path |
//!
//! # Invariants
//!
//! 1. Every element carries an [`ElementId`] fixed at construction.
//! 2. [`PathElement::realize`] keeps the id, so diffing treats the eager and
//!    lazy forms of an entry as the same entry.
//! 3. `PartialEq` on `PathElement` is structural (form + id); diffing must use
//!    [`PathElement::id`] instead.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::destination::{AnyDestination, Destination, DestinationType};
use crate::error::EncodeError;

/// A destination value in serialized form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedElement {
    /// Destination type tag (see [`Destination::TAG`]).
    #[serde(rename = "type")]
    pub tag: String,
    /// JSON text of the value.
    pub payload: String,
}

impl EncodedElement {
    #[must_use]
    pub fn new(tag: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            payload: payload.into(),
        }
    }

    #[must_use]
    pub fn destination_type(&self) -> DestinationType {
        DestinationType::from_tag(self.tag.clone())
    }
}

/// Stable identity of a path element.
///
/// Value-backed elements are identified by their value; encoded elements by
/// their tagged payload. The id survives realization, so an element restored
/// from disk keeps its encoded identity after it is decoded.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ElementId(IdRepr);

#[derive(Clone, PartialEq, Eq, Hash)]
enum IdRepr {
    Value(AnyDestination),
    Encoded(Rc<EncodedElement>),
}

impl ElementId {
    #[must_use]
    pub fn of_value(value: &AnyDestination) -> Self {
        Self(IdRepr::Value(value.clone()))
    }

    #[must_use]
    pub fn of_encoded(encoded: &Rc<EncodedElement>) -> Self {
        Self(IdRepr::Encoded(Rc::clone(encoded)))
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            IdRepr::Value(value) => write!(f, "ElementId({value:?})"),
            IdRepr::Encoded(encoded) => {
                write!(f, "ElementId({}:{})", encoded.tag, encoded.payload)
            }
        }
    }
}

/// One entry of a navigation path.
#[derive(Clone, PartialEq, Eq)]
pub enum PathElement {
    /// A fully materialized destination value.
    Eager { value: AnyDestination, id: ElementId },
    /// A value pushed at runtime but not yet realized into a screen.
    Lazy { value: AnyDestination, id: ElementId },
    /// A value restored in serialized form, not yet decoded.
    Encoded {
        payload: Rc<EncodedElement>,
        id: ElementId,
    },
}

impl PathElement {
    /// An eager element for `value`.
    #[must_use]
    pub fn eager<T: Destination>(value: T) -> Self {
        Self::from_any(AnyDestination::new(value))
    }

    /// A lazy element for `value`.
    #[must_use]
    pub fn lazy<T: Destination>(value: T) -> Self {
        let value = AnyDestination::new(value);
        let id = ElementId::of_value(&value);
        Self::Lazy { value, id }
    }

    /// An eager element for an already type-erased value.
    #[must_use]
    pub fn from_any(value: AnyDestination) -> Self {
        let id = ElementId::of_value(&value);
        Self::Eager { value, id }
    }

    /// An encoded element awaiting decoding.
    #[must_use]
    pub fn encoded(payload: EncodedElement) -> Self {
        let payload = Rc::new(payload);
        let id = ElementId::of_encoded(&payload);
        Self::Encoded { payload, id }
    }

    #[must_use]
    pub fn id(&self) -> &ElementId {
        match self {
            Self::Eager { id, .. } | Self::Lazy { id, .. } | Self::Encoded { id, .. } => id,
        }
    }

    #[must_use]
    pub fn destination_type(&self) -> DestinationType {
        match self {
            Self::Eager { value, .. } | Self::Lazy { value, .. } => value.destination_type(),
            Self::Encoded { payload, .. } => payload.destination_type(),
        }
    }

    /// The value, unless the element is still encoded.
    #[must_use]
    pub fn value(&self) -> Option<&AnyDestination> {
        match self {
            Self::Eager { value, .. } | Self::Lazy { value, .. } => Some(value),
            Self::Encoded { .. } => None,
        }
    }

    #[must_use]
    pub fn is_eager(&self) -> bool {
        matches!(self, Self::Eager { .. })
    }

    /// Whether the element still needs realizing (lazy or encoded).
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.is_eager()
    }

    #[must_use]
    pub fn is_encoded(&self) -> bool {
        matches!(self, Self::Encoded { .. })
    }

    /// The eager form of this element holding `value`, keeping this element's id.
    #[must_use]
    pub fn realize(&self, value: AnyDestination) -> Self {
        Self::Eager {
            value,
            id: self.id().clone(),
        }
    }

    /// The eager form of this element if its value is already known.
    #[must_use]
    pub fn to_eager(&self) -> Option<Self> {
        self.value().map(|value| self.realize(value.clone()))
    }

    /// Serialize the element, reusing the payload of encoded elements.
    pub fn encode(&self) -> Result<EncodedElement, EncodeError> {
        match self {
            Self::Eager { value, .. } | Self::Lazy { value, .. } => value.encode(),
            Self::Encoded { payload, .. } => Ok((**payload).clone()),
        }
    }
}

impl fmt::Debug for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager { value, .. } => f.debug_tuple("Eager").field(value).finish(),
            Self::Lazy { value, .. } => f.debug_tuple("Lazy").field(value).finish(),
            Self::Encoded { payload, .. } => f
                .debug_tuple("Encoded")
                .field(&payload.tag)
                .field(&payload.payload)
                .finish(),
        }
    }
}
