#![no_main]

use libfuzzer_sys::fuzz_target;
use callkit::cache::BoundedCache;

// Fuzz arbitrary operation sequences on BoundedCache
//
// The first byte picks the bound (0 = unbounded). Remaining byte pairs drive
// insert, get, peek, remove and clear against a Vec model kept in recency
// order; eviction must always drop the model's least recent key.
fuzz_target!(|data: &[u8]| {
    let Some((&bound, ops)) = data.split_first() else {
        return;
    };
    let max_size = usize::from(bound % 9);
    let mut cache: BoundedCache<u8, u16> = BoundedCache::new(max_size);
    let mut model: Vec<(u8, u16)> = Vec::new();

    for pair in ops.chunks_exact(2) {
        let op = pair[0] % 5;
        let key = pair[1] % 32;

        match op {
            0 => {
                // insert
                let value = u16::from(pair[0]) << 8 | u16::from(key);
                let previous = cache.insert(key, value);
                match model.iter().position(|&(k, _)| k == key) {
                    Some(at) => {
                        let (_, old) = model.remove(at);
                        assert_eq!(previous, Some(old));
                        if max_size == 0 {
                            model.insert(at, (key, value));
                        } else {
                            model.push((key, value));
                        }
                    },
                    None => {
                        assert_eq!(previous, None);
                        model.push((key, value));
                        if max_size > 0 && model.len() > max_size {
                            model.remove(0);
                        }
                    },
                }
            },
            1 => {
                // get
                let got = cache.get(&key).copied();
                let at = model.iter().position(|&(k, _)| k == key);
                assert_eq!(got, at.map(|i| model[i].1));
                if let (Some(at), true) = (at, max_size > 0) {
                    let entry = model.remove(at);
                    model.push(entry);
                }
            },
            2 => {
                // peek (never reorders)
                let expected = model.iter().find(|&&(k, _)| k == key).map(|&(_, v)| v);
                assert_eq!(cache.peek(&key).copied(), expected);
            },
            3 => {
                // remove
                let expected = model
                    .iter()
                    .position(|&(k, _)| k == key)
                    .map(|at| model.remove(at).1);
                assert_eq!(cache.remove(&key), expected);
            },
            _ => {
                // clear
                if key == 0 {
                    cache.clear();
                    model.clear();
                }
            },
        }

        assert_eq!(cache.len(), model.len());
        assert!(cache.keys().eq(model.iter().map(|(k, _)| k)));
        assert!(cache.check_invariants().is_ok());
    }
});
