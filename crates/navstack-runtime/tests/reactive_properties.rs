//! Property tests for observables and bindings.

use std::cell::RefCell;
use std::rc::Rc;

use navstack_runtime::{Observable, UiBinding};
use proptest::prelude::*;

proptest! {
    #[test]
    fn version_counts_effective_changes(writes in prop::collection::vec(0u8..4, 0..32)) {
        let obs = Observable::new(0u8);
        let mut expected = 0u64;
        let mut current = 0u8;
        for w in &writes {
            if *w != current {
                expected += 1;
                current = *w;
            }
            obs.set(*w);
        }
        prop_assert_eq!(obs.version(), expected);
        prop_assert_eq!(obs.get(), current);
    }

    #[test]
    fn observers_see_last_write(writes in prop::collection::vec(any::<i16>(), 1..16)) {
        let binding = UiBinding::new(0i16);
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        let _token = binding.observe(move |v, _| *s.borrow_mut() = Some(*v));
        for w in &writes {
            binding.set(*w);
        }
        let last = *writes.last().unwrap();
        prop_assert_eq!(binding.get(), last);
        if writes.iter().any(|w| *w != 0) {
            prop_assert_eq!(*seen.borrow(), Some(last));
        }
    }

    #[test]
    fn projection_round_trips(values in prop::collection::vec(any::<u32>(), 0..8)) {
        let parent = UiBinding::new(Vec::<u32>::new());
        let doubled = parent.map(
            |v: &Vec<u32>| v.iter().map(|x| u64::from(*x) * 2).collect::<Vec<u64>>(),
            |v: Vec<u64>| v.into_iter().map(|x| (x / 2) as u32).collect(),
        );
        doubled.set(values.iter().map(|x| u64::from(*x) * 2).collect());
        prop_assert_eq!(parent.get(), values);
    }
}
