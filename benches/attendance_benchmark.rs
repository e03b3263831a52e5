use chrono::{Duration, Local, TimeZone};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use swipe_tracker::models::{InOut, SwipeEvent};
use swipe_tracker::services::attendance::{build_status, normalize, reconstruct};

/// A noisy day of alternating swipes, shuffled into portal order.
fn swipe_fixture(count: usize) -> Vec<SwipeEvent> {
    let start = Local.with_ymd_and_hms(2024, 5, 6, 6, 0, 0).unwrap();
    let mut events: Vec<SwipeEvent> = (0..count)
        .map(|i| {
            let direction = if i % 2 == 0 { InOut::In } else { InOut::Out };
            SwipeEvent::new(start + Duration::seconds(i as i64 * 7), direction)
        })
        .collect();

    // Deterministic interleave so the sort has real work to do
    let (evens, odds): (Vec<_>, Vec<_>) = events
        .drain(..)
        .enumerate()
        .partition(|(i, _)| i % 2 == 0);
    odds.into_iter()
        .rev()
        .chain(evens)
        .map(|(_, e)| e)
        .collect()
}

fn benchmark_attendance(c: &mut Criterion) {
    let events = swipe_fixture(5_000);
    let sorted = normalize(events.clone());
    let now = Local.with_ymd_and_hms(2024, 5, 6, 17, 0, 0).unwrap();

    let mut group = c.benchmark_group("attendance");

    group.bench_function("normalize", |b| {
        b.iter(|| normalize(black_box(events.clone())))
    });

    group.bench_function("reconstruct", |b| b.iter(|| reconstruct(black_box(&sorted))));

    group.bench_function("build_status", |b| {
        b.iter(|| build_status(black_box(events.clone()), "18:30", now))
    });

    group.finish();
}

criterion_group!(benches, benchmark_attendance);
criterion_main!(benches);
