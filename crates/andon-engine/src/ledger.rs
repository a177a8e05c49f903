//! Funnel ledger: hourly counters behind a stage's `FunnelMetrics`.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};

use andon_core::constants::BUCKET_SECS;
use andon_core::models::FunnelMetrics;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct HourCounters {
    arrivals: u64,
    conversions: u64,
    dropoffs: u64,
    value: f64,
    dwell_secs: f64,
    dwell_count: u64,
}

/// Windowed funnel counters of one stage.
///
/// Arrivals are remembered per session so the time spent in the stage can be
/// measured when the session converts or drops off. Both the counters and the
/// arrival map are evicted with the lookback window.
#[derive(Debug, Clone)]
pub struct FunnelLedger {
    lookback: Duration,
    hours: BTreeMap<i64, HourCounters>,
    entered: HashMap<String, DateTime<Utc>>,
    latest: Option<DateTime<Utc>>,
}

impl FunnelLedger {
    pub fn new(lookback: Duration) -> Self {
        Self {
            lookback,
            hours: BTreeMap::new(),
            entered: HashMap::new(),
            latest: None,
        }
    }

    pub fn record_arrival(&mut self, session_id: &str, at: DateTime<Utc>) {
        self.hour(at).arrivals += 1;
        self.entered
            .entry(session_id.to_string())
            .and_modify(|first| *first = (*first).min(at))
            .or_insert(at);
    }

    pub fn record_conversion(&mut self, session_id: &str, at: DateTime<Utc>) {
        let dwell = self.leave(session_id, at);
        let hour = self.hour(at);
        hour.conversions += 1;
        if let Some(secs) = dwell {
            hour.dwell_secs += secs;
            hour.dwell_count += 1;
        }
    }

    pub fn record_dropoff(&mut self, session_id: &str, at: DateTime<Utc>, value: f64) {
        let dwell = self.leave(session_id, at);
        let hour = self.hour(at);
        hour.dropoffs += 1;
        hour.value += value;
        if let Some(secs) = dwell {
            hour.dwell_secs += secs;
            hour.dwell_count += 1;
        }
    }

    /// Evict hours and remembered arrivals older than `max(now, latest) - lookback`.
    pub fn roll(&mut self, now: DateTime<Utc>) {
        let horizon = self.latest.map_or(now, |l| l.max(now));
        let cutoff = horizon
            .checked_sub_signed(self.lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let cutoff_hour = cutoff.timestamp().div_euclid(BUCKET_SECS);
        // Same rule as the baseline: an hour goes once its start precedes the cutoff.
        let first_kept = if cutoff.timestamp().rem_euclid(BUCKET_SECS) == 0 {
            cutoff_hour
        } else {
            cutoff_hour + 1
        };
        self.hours = self.hours.split_off(&first_kept);
        self.entered.retain(|_, at| *at >= cutoff);
    }

    pub fn metrics(&self, stage: &str) -> FunnelMetrics {
        let total = self
            .hours
            .values()
            .fold(HourCounters::default(), |mut acc, h| {
                acc.arrivals += h.arrivals;
                acc.conversions += h.conversions;
                acc.dropoffs += h.dropoffs;
                acc.value += h.value;
                acc.dwell_secs += h.dwell_secs;
                acc.dwell_count += h.dwell_count;
                acc
            });
        let outcomes = total.conversions + total.dropoffs;
        FunnelMetrics {
            stage: stage.to_string(),
            arrivals: total.arrivals,
            conversions: total.conversions,
            dropoffs: total.dropoffs,
            conversion_rate: if outcomes == 0 {
                0.0
            } else {
                total.conversions as f64 / outcomes as f64
            },
            time_spent: if total.dwell_count == 0 {
                0.0
            } else {
                total.dwell_secs / total.dwell_count as f64
            },
            value: total.value,
        }
    }

    /// Sessions that arrived and have not converted or dropped off yet.
    pub fn in_stage(&self) -> usize {
        self.entered.len()
    }

    fn hour(&mut self, at: DateTime<Utc>) -> &mut HourCounters {
        self.latest = Some(self.latest.map_or(at, |l| l.max(at)));
        self.hours
            .entry(at.timestamp().div_euclid(BUCKET_SECS))
            .or_default()
    }

    fn leave(&mut self, session_id: &str, at: DateTime<Utc>) -> Option<f64> {
        let entered = self.entered.remove(session_id)?;
        let secs = (at - entered).num_milliseconds() as f64 / 1000.0;
        (secs >= 0.0).then_some(secs)
    }
}
