#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use navstack_core::Difference;

#[derive(Arbitrary, Debug)]
struct Input {
    old: Vec<u8>,
    new: Vec<u8>,
}

fuzz_target!(|input: Input| {
    if input.old.len() > 256 || input.new.len() > 256 {
        return;
    }
    let diff = Difference::between(&input.old, &input.new);

    // What survives on each side is the same common subsequence.
    let kept_old: Vec<u8> = input
        .old
        .iter()
        .enumerate()
        .filter(|(i, _)| !diff.removals().contains(i))
        .map(|(_, v)| *v)
        .collect();
    let kept_new: Vec<u8> = input
        .new
        .iter()
        .enumerate()
        .filter(|(i, _)| !diff.insertions().contains(i))
        .map(|(_, v)| *v)
        .collect();
    assert_eq!(kept_old, kept_new);
    assert_eq!(diff.is_empty(), input.old == input.new);
    assert!(diff.removals().windows(2).all(|w| w[0] < w[1]));
    assert!(diff.insertions().windows(2).all(|w| w[0] < w[1]));
});
