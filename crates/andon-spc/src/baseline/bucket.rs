//! Hour-aligned buckets of the rolling baseline.

use chrono::{DateTime, Duration, TimeZone, Utc};

use andon_core::constants::BUCKET_SECS;

use super::RunningStats;

/// Observations whose timestamps fall in one `BUCKET_SECS` wide slot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HourBucket {
    pub index: i64,
    pub stats: RunningStats,
}

impl HourBucket {
    pub fn new(index: i64) -> Self {
        Self {
            index,
            stats: RunningStats::new(),
        }
    }

    /// Bucket slot of a timestamp. Floors for pre-epoch instants as well.
    pub fn index_of(at: DateTime<Utc>) -> i64 {
        at.timestamp().div_euclid(BUCKET_SECS)
    }

    pub fn start(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.index * BUCKET_SECS, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start() + Duration::seconds(BUCKET_SECS)
    }

    /// A bucket expires once its start falls before `cutoff`.
    pub fn expired(&self, cutoff: DateTime<Utc>) -> bool {
        self.start() < cutoff
    }
}
