use andon_core::config::AlertThresholds;
use andon_core::AndonState;
use andon_spc::{BaselineTracker, Classifier};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 8, 0, 0).unwrap()
}

fn classifier() -> Classifier {
    Classifier::new(AlertThresholds::default(), 30)
}

// ── Constant rate at the sample threshold ──────────────────────────────────

#[test]
fn thirty_constant_observations_classify_normal() {
    let mut tracker = BaselineTracker::new(Duration::hours(24));
    for i in 0..30 {
        tracker.record(t0() + Duration::minutes(i), 0.25);
    }
    let now = t0() + Duration::minutes(30);
    tracker.roll(now);
    let metrics = tracker.recompute_control_limits(now);

    assert_eq!(metrics.sample_size, 30);
    assert!((metrics.mean - 0.25).abs() < 1e-12);
    assert_eq!(classifier().classify("checkout", 0.25, &metrics).state, AndonState::Normal);
}

#[test]
fn below_minimum_sample_is_unknown_for_any_rate() {
    let mut tracker = BaselineTracker::new(Duration::hours(24));
    for i in 0..29 {
        tracker.record(t0() + Duration::minutes(i), 0.25);
    }
    let metrics = tracker.recompute_control_limits(t0() + Duration::minutes(29));
    assert_eq!(metrics.sample_size, 29);
    for rate in [0.0, 0.25, 0.99, 1.0] {
        assert_eq!(classifier().classify("checkout", rate, &metrics).state, AndonState::Unknown);
    }
}

// ── Concrete sigma scenario (μ=100, σ=10) ──────────────────────────────────

#[test]
fn mean_100_sd_10_scenario() {
    // 90 and 110 alternating: population mean 100, sd 10.
    let mut tracker = BaselineTracker::new(Duration::hours(24));
    for i in 0..40 {
        let value = if i % 2 == 0 { 90.0 } else { 110.0 };
        tracker.record(t0() + Duration::minutes(i), value);
    }
    let metrics = tracker.recompute_control_limits(t0() + Duration::hours(1));
    assert!((metrics.mean - 100.0).abs() < 1e-9);
    assert!((metrics.standard_deviation - 10.0).abs() < 1e-9);
    assert!((metrics.upper_control_limit - 130.0).abs() < 1e-9);
    assert!((metrics.upper_warning_limit - 120.0).abs() < 1e-9);

    let c = classifier();
    assert_eq!(c.classify("pricing", 121.0, &metrics).state, AndonState::Attention);
    assert_eq!(c.classify("pricing", 131.0, &metrics).state, AndonState::Stop);
    assert_eq!(c.classify("pricing", 115.0, &metrics).state, AndonState::Normal);
}

// ── Window eviction round trip ─────────────────────────────────────────────

#[test]
fn evicted_observation_no_longer_influences_mean() {
    let mut tracker = BaselineTracker::new(Duration::hours(24));
    tracker.record(t0(), 0.9);
    for i in 0..30 {
        tracker.record(t0() + Duration::hours(2) + Duration::minutes(i), 0.1);
    }
    let before = tracker.recompute_control_limits(t0() + Duration::hours(3));
    assert!(before.mean > 0.1);

    let later = t0() + Duration::hours(25);
    let evicted = tracker.roll(later);
    assert_eq!(evicted, 1);
    let after = tracker.recompute_control_limits(later);
    assert_eq!(after.sample_size, 30);
    assert!((after.mean - 0.1).abs() < 1e-12);
}

#[test]
fn eviction_below_minimum_returns_to_unknown() {
    let mut tracker = BaselineTracker::new(Duration::hours(1));
    for i in 0..40 {
        tracker.record(t0() + Duration::seconds(i * 30), 0.2);
    }
    let live = tracker.recompute_control_limits(t0() + Duration::minutes(30));
    assert_eq!(classifier().classify("payment", 0.2, &live).state, AndonState::Normal);

    let later = t0() + Duration::hours(3);
    tracker.roll(later);
    let metrics = tracker.recompute_control_limits(later);
    assert_eq!(metrics.sample_size, 0);
    assert_eq!(classifier().classify("payment", 0.2, &metrics).state, AndonState::Unknown);
}

#[test]
fn recompute_is_idempotent() {
    let mut tracker = BaselineTracker::new(Duration::hours(24));
    for i in 0..50 {
        tracker.record(t0() + Duration::minutes(i), (i % 7) as f64 / 10.0);
    }
    let at = t0() + Duration::hours(1);
    assert_eq!(tracker.recompute_control_limits(at), tracker.recompute_control_limits(at));
}
