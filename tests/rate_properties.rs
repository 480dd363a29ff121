// ==============================================
// RATE CONTROLLER PROPERTIES (integration)
// ==============================================
//
// End-to-end behavior of debounce and throttle driven by a virtual-time
// scheduler: burst collapsing, the max-wait ceiling, cancellation, and
// several controllers sharing one scheduler.

use std::cell::RefCell;
use std::rc::Rc;

use callkit::prelude::*;
use proptest::prelude::*;

type Log = Rc<RefCell<Vec<(usize, u64)>>>;

fn recorder(sched: &Rc<ManualScheduler>) -> (Log, impl Fn(usize) -> usize + 'static) {
    let log: Log = Rc::default();
    let sink = Rc::clone(&log);
    let clock = Rc::clone(sched);
    (log, move |i: usize| {
        sink.borrow_mut().push((i, clock.now()));
        i
    })
}

/// Replays `gaps` as call times: call `i` happens `gaps[i]` after call `i - 1`.
fn call_times(gaps: &[u64]) -> Vec<u64> {
    gaps.iter()
        .scan(0u64, |t, gap| {
            *t += gap;
            Some(*t)
        })
        .collect()
}

// ==============================================
// Scenarios
// ==============================================

#[test]
fn debounce_typing_burst_saves_once() {
    let sched = Rc::new(ManualScheduler::new());
    let (log, f) = recorder(&sched);
    let d = debounce(f, 100, DebounceOptions::default(), Rc::clone(&sched));

    for (i, at) in [0u64, 30, 60, 90].into_iter().enumerate() {
        sched.advance_to(at);
        d.call(i);
    }
    sched.run_all();
    assert_eq!(*log.borrow(), vec![(3, 190)]);
}

#[test]
fn throttle_burst_invokes_twice() {
    let sched = Rc::new(ManualScheduler::new());
    let (log, f) = recorder(&sched);
    let t = throttle(f, 100, ThrottleOptions::default(), Rc::clone(&sched));

    for (i, at) in [0u64, 10, 20, 30, 40].into_iter().enumerate() {
        sched.advance_to(at);
        t.call(i);
    }
    sched.run_all();
    assert_eq!(*log.borrow(), vec![(0, 0), (4, 100)]);
}

#[test]
fn max_wait_bounds_gap_between_invocations() {
    let sched = Rc::new(ManualScheduler::new());
    let (log, f) = recorder(&sched);
    let d = debounce(
        f,
        50,
        DebounceOptions::default().max_wait(100),
        Rc::clone(&sched),
    );
    for i in 0..50 {
        d.call(i);
        sched.advance(20);
    }
    sched.run_all();

    let log = log.borrow();
    assert!(log[0].1 <= 100);
    for pair in log.windows(2) {
        assert!(pair[1].1 - pair[0].1 <= 100, "{:?}", *log);
    }
    assert_eq!(log.last().map(|&(i, _)| i), Some(49));
}

#[test]
fn max_wait_shorter_than_wait_paces_a_steady_stream() {
    let sched = Rc::new(ManualScheduler::new());
    let (log, f) = recorder(&sched);
    let d = debounce(
        f,
        100,
        DebounceOptions::default().max_wait(30),
        Rc::clone(&sched),
    );
    for i in 0..20 {
        d.call(i);
        sched.advance(10);
    }
    sched.run_all();

    assert_eq!(
        *log.borrow(),
        vec![
            (3, 30),
            (6, 60),
            (9, 90),
            (12, 120),
            (15, 150),
            (18, 180),
            (19, 280),
        ]
    );
}

#[test]
fn cancel_before_expiry_means_no_invocation() {
    let sched = Rc::new(ManualScheduler::new());
    let (log, f) = recorder(&sched);
    let d = debounce(f, 100, DebounceOptions::default(), Rc::clone(&sched));
    d.call(1);
    sched.advance(99);
    d.cancel();
    sched.run_all();
    assert!(log.borrow().is_empty());
    assert!(!d.pending());
}

#[test]
fn many_controllers_share_one_scheduler() {
    let sched = Rc::new(ManualScheduler::new());
    let (log_a, fa) = recorder(&sched);
    let (log_b, fb) = recorder(&sched);
    let a = debounce(fa, 30, DebounceOptions::default(), Rc::clone(&sched));
    let b = throttle(fb, 30, ThrottleOptions::default(), Rc::clone(&sched));

    a.call(1);
    b.call(1);
    sched.advance(10);
    a.call(2);
    b.call(2);
    sched.run_all();

    assert_eq!(*log_a.borrow(), vec![(2, 40)]);
    assert_eq!(*log_b.borrow(), vec![(1, 0), (2, 30)]);
}

// ==============================================
// Properties
// ==============================================

proptest! {
    /// Trailing-only debounce invokes once per burst, with the burst's last
    /// arguments, exactly `wait` after that last call.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn trailing_debounce_matches_burst_model(
        wait in 1u64..80,
        gaps in prop::collection::vec(0u64..120, 1..40),
    ) {
        let sched = Rc::new(ManualScheduler::new());
        let (log, f) = recorder(&sched);
        let d = debounce(f, wait, DebounceOptions::default(), Rc::clone(&sched));

        let times = call_times(&gaps);
        for (i, &at) in times.iter().enumerate() {
            sched.advance_to(at);
            d.call(i);
        }
        sched.run_all();

        let mut expected = Vec::new();
        for (i, &at) in times.iter().enumerate() {
            let ends_burst = times.get(i + 1).is_none_or(|&next| next - at >= wait);
            if ends_burst {
                expected.push((i, at + wait));
            }
        }
        prop_assert_eq!(&*log.borrow(), &expected);
    }

    /// With calls arriving faster than `wait`, invocations are never further
    /// apart than `max_wait`, and the last call is always delivered.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn max_wait_ceiling_holds_under_continuous_calls(
        (wait, period) in (2u64..60).prop_flat_map(|wait| (Just(wait), 1..wait)),
        extra in 0u64..120,
        calls in 5usize..80,
    ) {
        let max_wait = wait + period + extra;
        let sched = Rc::new(ManualScheduler::new());
        let (log, f) = recorder(&sched);
        let d = debounce(
            f,
            wait,
            DebounceOptions::default().max_wait(max_wait),
            Rc::clone(&sched),
        );
        for i in 0..calls {
            d.call(i);
            sched.advance(period);
        }
        sched.run_all();

        let log = log.borrow();
        prop_assert!(!log.is_empty());
        prop_assert!(log[0].1 <= max_wait);
        for pair in log.windows(2) {
            prop_assert!(pair[0].0 < pair[1].0);
            prop_assert!(pair[1].1 - pair[0].1 <= max_wait);
        }
        prop_assert_eq!(log.last().map(|&(i, _)| i), Some(calls - 1));
    }

    /// A ceiling below `wait` still paces a steady stream: while calls keep
    /// coming, invocations are at most `max_wait + 2 * period` apart, and
    /// the last call lands no later than `wait` after it was made.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn short_max_wait_paces_continuous_calls(
        (wait, max_wait, period) in (2u64..100)
            .prop_flat_map(|wait| (Just(wait), 1..wait, 1..wait)),
        calls in 5usize..80,
    ) {
        let sched = Rc::new(ManualScheduler::new());
        let (log, f) = recorder(&sched);
        let d = debounce(
            f,
            wait,
            DebounceOptions::default().max_wait(max_wait),
            Rc::clone(&sched),
        );
        for i in 0..calls {
            d.call(i);
            sched.advance(period);
        }
        sched.run_all();

        let last_call_at = (calls as u64 - 1) * period;
        let bound = max_wait + 2 * period;
        let log = log.borrow();
        prop_assert!(!log.is_empty());

        let mut previous = 0u64;
        for &(_, at) in log.iter().filter(|&&(_, at)| at <= last_call_at) {
            prop_assert!(at - previous <= bound, "gap before {} in {:?}", at, *log);
            previous = at;
        }
        for pair in log.windows(2) {
            prop_assert!(pair[0].0 < pair[1].0);
        }
        let &(last_arg, last_at) = log.last().unwrap();
        prop_assert_eq!(last_arg, calls - 1);
        prop_assert!(last_at <= last_call_at + wait);
        prop_assert!(!d.pending());
    }

    /// Throttled invocations deliver calls in order, start on the leading
    /// edge, and end with the last call.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn throttle_delivers_leading_and_last_in_order(
        wait in 1u64..80,
        gaps in prop::collection::vec(0u64..200, 1..40),
    ) {
        let sched = Rc::new(ManualScheduler::new());
        let (log, f) = recorder(&sched);
        let t = throttle(f, wait, ThrottleOptions::default(), Rc::clone(&sched));

        let times = call_times(&gaps);
        for (i, &at) in times.iter().enumerate() {
            sched.advance_to(at);
            t.call(i);
        }
        sched.run_all();

        let log = log.borrow();
        prop_assert_eq!(log.first().copied(), Some((0, times[0])));
        prop_assert_eq!(log.last().map(|&(i, _)| i), Some(times.len() - 1));
        for pair in log.windows(2) {
            prop_assert!(pair[0].0 < pair[1].0);
            prop_assert!(pair[0].1 <= pair[1].1);
        }
        prop_assert!(!t.pending());
    }
}
