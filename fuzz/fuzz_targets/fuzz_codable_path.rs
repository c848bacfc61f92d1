#![no_main]

use libfuzzer_sys::fuzz_target;
use navstack_core::{Destination, NavigationPath, PathElement, decode};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Page {
    id: u32,
    title: String,
}

impl Destination for Page {
    const TAG: &'static str = "page";
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(path) = NavigationPath::from_json(text) else {
        return;
    };
    assert!(path.elements().iter().all(PathElement::is_encoded));

    // Decoding never panics, whatever the payload.
    for element in path.elements() {
        if let PathElement::Encoded { payload, .. } = element {
            let _ = decode::<Page>(payload);
        }
    }

    // Encoded elements re-encode unchanged.
    let codable = path.codable().expect("encoded elements always encode");
    let again = NavigationPath::from_codable(codable);
    assert_eq!(again, path);
});
