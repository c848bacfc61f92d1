#![forbid(unsafe_code)]

//! Heterogeneous navigation paths and their persisted form.
//!
//! [`NavigationPath`] holds any mix of eager, lazy and encoded elements. It
//! can be written out as a [`CodableNavigationPath`] and restored later; the
//! restored elements stay encoded until a registered destination decodes them.
//!
//! # Example
//!
//! ```
//! use navstack_core::{Destination, NavigationPath};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
//! struct Detail(u32);
//!
//! impl Destination for Detail {
//!     const TAG: &'static str = "detail";
//! }
//!
//! let mut path = NavigationPath::new();
//! path.append(Detail(1));
//! path.append(Detail(2));
//!
//! let json = path.codable().unwrap().to_json().unwrap();
//! let restored = NavigationPath::from_json(&json).unwrap();
//! assert_eq!(restored.len(), 2);
//! assert!(restored.elements().iter().all(|e| e.is_encoded()));
//! ```

use serde::{Deserialize, Serialize};

use crate::destination::Destination;
use crate::element::{ElementId, EncodedElement, PathElement};
use crate::error::EncodeError;

/// Ordered sequence of path elements, root to top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationPath {
    elements: Vec<PathElement>,
}

impl NavigationPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }

    /// A path of eager elements built from `values`.
    pub fn from_values<T: Destination>(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            elements: values.into_iter().map(PathElement::eager).collect(),
        }
    }

    #[must_use]
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    #[must_use]
    pub fn into_elements(self) -> Vec<PathElement> {
        self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append `value` as an eager element.
    pub fn append<T: Destination>(&mut self, value: T) {
        self.elements.push(PathElement::eager(value));
    }

    pub fn push_element(&mut self, element: PathElement) {
        self.elements.push(element);
    }

    /// Remove up to `k` elements from the top.
    pub fn remove_last(&mut self, k: usize) {
        let len = self.elements.len().saturating_sub(k);
        self.elements.truncate(len);
    }

    pub fn truncate(&mut self, len: usize) {
        self.elements.truncate(len);
    }

    /// Remove the elements at `indices`. Out-of-range indices are ignored.
    pub fn remove_indices(&mut self, indices: &[usize]) {
        let mut index = 0;
        self.elements.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });
    }

    /// Replace the element at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, element: PathElement) -> Option<PathElement> {
        self.elements
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, element))
    }

    /// Index of the element with identity `id`.
    #[must_use]
    pub fn position(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|element| element.id() == id)
    }

    /// Index of the element with identity `id`, expected at `index`.
    ///
    /// Identities are value-based, so equal values share one. When `index`
    /// no longer holds `id`, the first pending element with that identity is
    /// taken instead; eager duplicates are never chosen as a fallback.
    #[must_use]
    pub fn locate(&self, index: usize, id: &ElementId) -> Option<usize> {
        match self.elements.get(index) {
            Some(element) if element.id() == id => Some(index),
            _ => self
                .elements
                .iter()
                .position(|element| element.is_pending() && element.id() == id),
        }
    }

    /// First element that is still lazy or encoded.
    #[must_use]
    pub fn first_pending(&self) -> Option<(usize, &PathElement)> {
        self.elements
            .iter()
            .enumerate()
            .find(|(_, element)| element.is_pending())
    }

    /// Number of eager elements.
    #[must_use]
    pub fn eager_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_eager()).count()
    }

    /// Serializable form of the whole path.
    ///
    /// # Errors
    ///
    /// Returns the first element that fails to serialize.
    pub fn codable(&self) -> Result<CodableNavigationPath, EncodeError> {
        let entries = self
            .elements
            .iter()
            .map(PathElement::encode)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CodableNavigationPath { entries })
    }

    /// Restore a path; every element comes back encoded.
    #[must_use]
    pub fn from_codable(codable: CodableNavigationPath) -> Self {
        Self {
            elements: codable
                .entries
                .into_iter()
                .map(PathElement::encoded)
                .collect(),
        }
    }

    /// Restore a path from the JSON produced by [`CodableNavigationPath::to_json`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        CodableNavigationPath::from_json(json).map(Self::from_codable)
    }
}

impl From<Vec<PathElement>> for NavigationPath {
    fn from(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }
}

impl From<NavigationPath> for Vec<PathElement> {
    fn from(path: NavigationPath) -> Self {
        path.elements
    }
}

/// Persisted form of a [`NavigationPath`]: an ordered list of tagged payloads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodableNavigationPath {
    entries: Vec<EncodedElement>,
}

impl CodableNavigationPath {
    #[must_use]
    pub fn entries(&self) -> &[EncodedElement] {
        &self.entries
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
