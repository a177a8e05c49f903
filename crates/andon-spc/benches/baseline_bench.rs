//! Criterion benchmarks for andon-spc.
//!
//! - record 1K observations into a 24h tracker
//! - recompute control limits over a full 24h window (1440 observations)
//! - roll a full window forward by one hour
//! - hysteresis step over 1K raw states

use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};

use andon_core::AndonState;
use andon_spc::{BaselineTracker, HysteresisMachine};

fn full_window() -> BaselineTracker {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut tracker = BaselineTracker::new(Duration::hours(24));
    for i in 0..1440 {
        tracker.record(start + Duration::minutes(i), 0.1 + (i % 13) as f64 * 0.001);
    }
    tracker
}

fn bench_record(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    c.bench_function("baseline_record_1k", |b| {
        b.iter(|| {
            let mut tracker = BaselineTracker::new(Duration::hours(24));
            for i in 0..1000 {
                tracker.record(start + Duration::minutes(i), 0.12);
            }
            tracker
        })
    });
}

fn bench_recompute(c: &mut Criterion) {
    let tracker = full_window();
    let at = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
    c.bench_function("baseline_recompute_24h", |b| {
        b.iter(|| tracker.recompute_control_limits(at))
    });
}

fn bench_roll(c: &mut Criterion) {
    let tracker = full_window();
    let at = Utc.with_ymd_and_hms(2026, 1, 2, 1, 0, 0).unwrap();
    c.bench_function("baseline_roll_one_hour", |b| {
        b.iter(|| {
            let mut t = tracker.clone();
            t.roll(at)
        })
    });
}

fn bench_hysteresis(c: &mut Criterion) {
    let raws: Vec<AndonState> = (0..1000)
        .map(|i| match i % 5 {
            0 => AndonState::Stop,
            1 | 2 => AndonState::Attention,
            _ => AndonState::Normal,
        })
        .collect();
    c.bench_function("hysteresis_step_1k", |b| {
        b.iter(|| {
            let mut machine = HysteresisMachine::new(3);
            for raw in &raws {
                machine.step(*raw);
            }
            machine.state()
        })
    });
}

criterion_group!(benches, bench_record, bench_recompute, bench_roll, bench_hysteresis);
criterion_main!(benches);
