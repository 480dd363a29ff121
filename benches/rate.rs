use std::rc::Rc;

use callkit::options::{DebounceOptions, ThrottleOptions};
use callkit::rate::{debounce, throttle};
use callkit::time::ManualScheduler;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

const CALLS: usize = 4096;

fn jittered_gaps(max_gap: u64, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..CALLS).map(|_| rng.random_range(0..=max_gap)).collect()
}

fn bench_debounce_bursts(c: &mut Criterion) {
    let gaps = jittered_gaps(40, 42);
    c.bench_function("debounce_bursts", |b| {
        b.iter_batched(
            || {
                let sched = Rc::new(ManualScheduler::new());
                let d = debounce(|n: u64| n, 25, DebounceOptions::default(), Rc::clone(&sched));
                (sched, d)
            },
            |(sched, d)| {
                for (i, &gap) in gaps.iter().enumerate() {
                    black_box(d.call(black_box(i as u64)));
                    sched.advance(gap);
                }
                sched.run_all();
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_debounce_max_wait(c: &mut Criterion) {
    let gaps = jittered_gaps(10, 7);
    c.bench_function("debounce_max_wait", |b| {
        b.iter_batched(
            || {
                let sched = Rc::new(ManualScheduler::new());
                let d = debounce(
                    |n: u64| n,
                    50,
                    DebounceOptions::default().max_wait(100),
                    Rc::clone(&sched),
                );
                (sched, d)
            },
            |(sched, d)| {
                for (i, &gap) in gaps.iter().enumerate() {
                    black_box(d.call(black_box(i as u64)));
                    sched.advance(gap);
                }
                sched.run_all();
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_throttle_steady(c: &mut Criterion) {
    c.bench_function("throttle_steady", |b| {
        b.iter_batched(
            || {
                let sched = Rc::new(ManualScheduler::new());
                let t = throttle(|n: u64| n, 16, ThrottleOptions::default(), Rc::clone(&sched));
                (sched, t)
            },
            |(sched, t)| {
                for i in 0..CALLS as u64 {
                    black_box(t.call(black_box(i)));
                    sched.advance(1);
                }
                sched.run_all();
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_debounce_bursts,
    bench_debounce_max_wait,
    bench_throttle_steady
);
criterion_main!(benches);
