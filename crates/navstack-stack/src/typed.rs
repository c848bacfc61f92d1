#![forbid(unsafe_code)]

//! Single-type paths.
//!
//! A `UiBinding<Vec<T>>` is a path whose elements are all `T`. The controller
//! works on a [`NavigationPath`] projection of it: every value reads back as an
//! eager element, and writes unwrap the elements again. Elements of another
//! type cannot be stored in a `Vec<T>`; they are reported and dropped.

use navstack_core::{
    Destination, DestinationType, Diagnostic, DiagnosticSink, NavigationPath, PathElement,
    SharedSink, decode,
};
use navstack_runtime::UiBinding;

/// Project `values` to a [`NavigationPath`] binding.
pub fn typed_path<T: Destination>(
    values: &UiBinding<Vec<T>>,
    sink: SharedSink,
) -> UiBinding<NavigationPath> {
    values.map(
        |values: &Vec<T>| NavigationPath::from_values(values.iter().cloned()),
        move |path: NavigationPath| unwrap_values::<T>(&path, sink.as_ref()),
    )
}

fn unwrap_values<T: Destination>(
    path: &NavigationPath,
    sink: &dyn DiagnosticSink,
) -> Vec<T> {
    let expected = DestinationType::of::<T>();
    let mut values = Vec::with_capacity(path.len());
    for (index, element) in path.elements().iter().enumerate() {
        let value = match element {
            PathElement::Eager { value, .. } | PathElement::Lazy { value, .. } => {
                value.downcast_ref::<T>().cloned()
            }
            PathElement::Encoded { payload, .. } => decode::<T>(payload).ok(),
        };
        match value {
            Some(value) => values.push(value),
            None => sink.report(Diagnostic::PathTypeMismatch {
                index,
                expected: expected.clone(),
                found: element.destination_type(),
            }),
        }
    }
    values
}
