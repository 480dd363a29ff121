//! Debounce and throttle on a virtual clock.
//!
//! Run with: cargo run --example basic_debounce

use std::cell::RefCell;
use std::rc::Rc;

use callkit::prelude::*;

fn main() {
    println!("=== Debounce and Throttle ===\n");

    let sched = Rc::new(ManualScheduler::new());

    // Example 1: trailing debounce collapses a typing burst
    println!("1. Debounced autosave (wait 300ms)");
    let saved = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&saved);
    let save = debounce(
        move |draft: &'static str| sink.borrow_mut().push(draft),
        300,
        DebounceOptions::default(),
        Rc::clone(&sched),
    );
    for draft in ["h", "he", "hel", "hello"] {
        save.call(draft);
        sched.advance(100);
    }
    sched.advance(300);
    println!("   saved: {:?}", saved.borrow());
    assert_eq!(*saved.borrow(), vec!["hello"]);
    println!();

    // Example 2: max_wait forces progress during a long burst
    println!("2. Debounce with max_wait (wait 100ms, max_wait 30ms)");
    let ticks = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&ticks);
    let clock = Rc::clone(&sched);
    let start = sched.now();
    let report = debounce(
        move |i: u32| sink.borrow_mut().push((i, clock.now() - start)),
        100,
        DebounceOptions::default().max_wait(30),
        Rc::clone(&sched),
    );
    for i in 0..10 {
        report.call(i);
        sched.advance(10);
    }
    sched.run_all();
    println!("   (arg, ms) invocations: {:?}", ticks.borrow());
    assert_eq!(*ticks.borrow(), vec![(3, 30), (6, 60), (9, 90)]);
    println!();

    // Example 3: throttle keeps the leading and last call of a window
    println!("3. Throttled scroll handler (wait 100ms)");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let on_scroll = throttle(
        move |offset: u32| sink.borrow_mut().push(offset),
        100,
        ThrottleOptions::default(),
        Rc::clone(&sched),
    );
    for offset in [0, 10, 20, 30, 40] {
        on_scroll.call(offset);
        sched.advance(10);
    }
    sched.run_all();
    println!("   handled offsets: {:?}", seen.borrow());
    assert_eq!(*seen.borrow(), vec![0, 40]);
    println!();

    // Example 4: cancel drops the pending invocation
    println!("4. Cancel");
    save.call("discarded");
    println!("   pending before cancel: {}", save.pending());
    save.cancel();
    sched.run_all();
    println!("   pending after cancel: {}", save.pending());
    assert_eq!(saved.borrow().len(), 1);
}
