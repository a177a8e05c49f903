//! Per-stage rolling baseline over the lookback horizon.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use andon_core::constants::TREND_WINDOW;
use andon_core::StatisticalMetrics;

use super::{HourBucket, RunningStats};

/// One rate observation fed into the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub at: DateTime<Utc>,
    pub value: f64,
}

/// Rolling baseline of one stage.
///
/// Memory is bounded by the number of hour buckets in the lookback plus
/// `TREND_WINDOW` recent observations. Eviction removes whole buckets, so the
/// remaining aggregate is exact.
#[derive(Debug, Clone)]
pub struct BaselineTracker {
    lookback: Duration,
    buckets: BTreeMap<i64, HourBucket>,
    recent: VecDeque<Observation>,
    latest: Option<DateTime<Utc>>,
}

impl BaselineTracker {
    pub fn new(lookback: Duration) -> Self {
        Self {
            lookback,
            buckets: BTreeMap::new(),
            recent: VecDeque::with_capacity(TREND_WINDOW),
            latest: None,
        }
    }

    /// Add one observation to the bucket of its timestamp. Non-finite values are ignored.
    pub fn record(&mut self, at: DateTime<Utc>, value: f64) {
        if !value.is_finite() {
            tracing::debug!(%at, value, "ignoring non-finite baseline observation");
            return;
        }
        let index = HourBucket::index_of(at);
        self.buckets
            .entry(index)
            .or_insert_with(|| HourBucket::new(index))
            .stats
            .push(value);

        self.recent.push_back(Observation { at, value });
        while self.recent.len() > TREND_WINDOW {
            self.recent.pop_front();
        }
        self.latest = Some(self.latest.map_or(at, |l| l.max(at)));
    }

    /// Evict every bucket starting before `max(now, latest) - lookback`.
    /// Returns the number of observations removed.
    pub fn roll(&mut self, now: DateTime<Utc>) -> u64 {
        let horizon = self.latest.map_or(now, |l| l.max(now));
        let cutoff = horizon
            .checked_sub_signed(self.lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut evicted = 0;
        while let Some(entry) = self.buckets.first_entry() {
            if !entry.get().expired(cutoff) {
                break;
            }
            evicted += entry.remove().stats.count();
        }

        if let Some(first) = self.buckets.values().next() {
            let oldest = first.start();
            self.recent.retain(|o| o.at >= oldest);
        } else {
            self.recent.clear();
        }
        evicted
    }

    /// Number of observations in the active window.
    pub fn sample_size(&self) -> usize {
        self.buckets
            .values()
            .map(|b| b.stats.count() as usize)
            .sum()
    }

    /// Merged moments of every live bucket.
    pub fn window_stats(&self) -> RunningStats {
        self.buckets
            .values()
            .fold(RunningStats::new(), |mut acc, b| {
                acc.merge(&b.stats);
                acc
            })
    }

    /// Control limits of the current window. Pure: repeated calls agree.
    pub fn recompute_control_limits(&self, at: DateTime<Utc>) -> StatisticalMetrics {
        let stats = self.window_stats();
        if stats.is_empty() {
            return StatisticalMetrics::empty(at);
        }
        StatisticalMetrics::from_moments(
            stats.mean(),
            stats.std_dev(),
            stats.count() as usize,
            at,
        )
    }

    /// Most recent observations in arrival order, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &Observation> {
        self.recent.iter()
    }

    pub fn recent_values(&self) -> Vec<f64> {
        self.recent.iter().map(|o| o.value).collect()
    }

    pub fn latest_observation(&self) -> Option<DateTime<Utc>> {
        self.latest
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_tracker_reports_zero_sample() {
        let tracker = BaselineTracker::new(Duration::hours(24));
        let metrics = tracker.recompute_control_limits(t0());
        assert_eq!(metrics.sample_size, 0);
        assert_eq!(metrics.mean, 0.0);
    }

    #[test]
    fn buckets_span_hours() {
        let mut tracker = BaselineTracker::new(Duration::hours(24));
        for minute in 0..180 {
            tracker.record(t0() + Duration::minutes(minute), 0.1);
        }
        assert_eq!(tracker.bucket_count(), 3);
        assert_eq!(tracker.sample_size(), 180);
    }

    #[test]
    fn roll_uses_latest_observation_as_horizon() {
        let mut tracker = BaselineTracker::new(Duration::hours(2));
        tracker.record(t0(), 0.9);
        tracker.record(t0() + Duration::hours(3), 0.1);
        // `now` lags the latest observation; the horizon still moves forward.
        let evicted = tracker.roll(t0() + Duration::hours(1));
        assert_eq!(evicted, 1);
        assert_eq!(tracker.sample_size(), 1);
        assert!((tracker.window_stats().mean() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn lookback_beyond_the_calendar_keeps_everything() {
        let mut tracker = BaselineTracker::new(Duration::days(1_000_000_000));
        tracker.record(t0(), 0.3);
        tracker.record(t0() + Duration::hours(500), 0.5);
        assert_eq!(tracker.roll(t0() + Duration::hours(900)), 0);
        assert_eq!(tracker.sample_size(), 2);
    }

    #[test]
    fn recent_is_bounded() {
        let mut tracker = BaselineTracker::new(Duration::hours(24));
        for i in 0..(TREND_WINDOW as i64 + 5) {
            tracker.record(t0() + Duration::minutes(i), i as f64);
        }
        assert_eq!(tracker.recent().count(), TREND_WINDOW);
        assert_eq!(tracker.recent_values()[0], 5.0);
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let mut tracker = BaselineTracker::new(Duration::hours(24));
        tracker.record(t0(), f64::NAN);
        tracker.record(t0(), f64::INFINITY);
        assert_eq!(tracker.sample_size(), 0);
        assert!(tracker.latest_observation().is_none());
    }
}
