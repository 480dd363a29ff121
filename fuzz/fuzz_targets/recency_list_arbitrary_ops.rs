#![no_main]

use libfuzzer_sys::fuzz_target;
use callkit::ds::{NodeId, RecencyList};

// Fuzz arbitrary operation sequences on RecencyList
//
// Mirrors push_mru, pop_lru, touch, remove and clear against a Vec model
// ordered least recent first, checking order and link invariants after
// every step.
fuzz_target!(|data: &[u8]| {
    let mut list: RecencyList<u8> = RecencyList::new();
    let mut model: Vec<(NodeId, u8)> = Vec::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 5;
        let value = pair[1];

        match op {
            0 => {
                // push_mru
                let id = list.push_mru(value);
                model.push((id, value));
                assert_eq!(list.mru(), Some(&value));
            },
            1 => {
                // pop_lru
                let popped = list.pop_lru();
                let expected = (!model.is_empty()).then(|| model.remove(0).1);
                assert_eq!(popped, expected);
            },
            2 => {
                // touch
                if !model.is_empty() {
                    let at = usize::from(value) % model.len();
                    let entry = model.remove(at);
                    assert!(list.touch(entry.0));
                    model.push(entry);
                }
            },
            3 => {
                // remove
                if !model.is_empty() {
                    let at = usize::from(value) % model.len();
                    let (id, expected) = model.remove(at);
                    assert_eq!(list.remove(id), Some(expected));
                    assert!(!list.contains(id));
                }
            },
            _ => {
                // clear
                if value % 8 == 0 {
                    list.clear();
                    model.clear();
                }
            },
        }

        assert_eq!(list.len(), model.len());
        assert!(list.iter().eq(model.iter().map(|(_, v)| v)));
        assert!(list.check_invariants().is_ok());
    }
});
