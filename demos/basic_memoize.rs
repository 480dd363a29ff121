//! Bounded memoization, sync and async.
//!
//! Run with: cargo run --example basic_memoize

use std::cell::Cell;
use std::rc::Rc;

use callkit::prelude::*;
use futures::executor::block_on;
use futures::future;

fn main() {
    println!("=== Memoize ===\n");

    // Example 1: LRU-bounded memo
    println!("1. memoize with max_size 2");
    let computed = Rc::new(Cell::new(0));
    let counter = Rc::clone(&computed);
    let square = memoize(
        move |n: u64| {
            counter.set(counter.get() + 1);
            n * n
        },
        MemoizeOptions::default().max_size(2),
    );
    square.call(2);
    square.call(3);
    square.call(2); // hit, refreshes 2
    square.call(4); // evicts 3
    println!("   computations: {}", computed.get());
    println!("   cached 3? {}", square.cache().lock().contains(&3));
    assert_eq!(computed.get(), 3);
    assert!(!square.cache().lock().contains(&3));
    println!();

    // Example 2: custom key resolver
    println!("2. memoize_with keyed on the user id only");
    let greet = memoize_with(
        |(id, _request): (u32, u32)| format!("hello user {id}"),
        |args: &(u32, u32)| args.0,
        MemoizeOptions::default(),
    );
    println!("   {}", greet.call((7, 1)));
    println!("   {}", greet.call((7, 2)));
    assert_eq!(greet.cache().lock().len(), 1);
    println!();

    // Example 3: async memo shares one in-flight computation
    println!("3. memoize_async");
    let fetch = memoize_async(
        |id: u32| future::ready(if id == 0 { Err("no such user") } else { Ok(id * 100) }),
        MemoizeOptions::default(),
    );
    let first = fetch.call(5);
    let second = fetch.call(5);
    println!("   same handle? {}", first.ptr_eq(&second));
    println!("   result: {:?}", block_on(first));
    assert!(second.ptr_eq(&fetch.call(5)));

    let failed = fetch.call(0);
    println!("   failure: {:?}", block_on(failed));
    println!("   failure cached? {}", fetch.cache().lock().contains(&0));
    assert!(!fetch.cache().lock().contains(&0));
    println!();

    // Example 4: once
    println!("4. once");
    let init = once(|name: &'static str| format!("initialized by {name}"));
    println!("   {}", init.call("first"));
    println!("   {}", init.call("second"));
    assert_eq!(init.call("third"), "initialized by first");
}
