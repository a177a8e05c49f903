//! Outcome sampler: turns session outcomes into per-subgroup dropoff-rate observations.
//!
//! Outcomes are bucketed by event timestamp into `subgroup_secs` wide subgroups. A
//! subgroup is sealed once its end is at least `clock_skew_tolerance` behind the tick
//! instant; until then late and out-of-order events still land in their own subgroup.
//! Outcomes for an already sealed subgroup are folded into the oldest open one.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};

use andon_core::config::SampleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Conversion,
    Dropoff,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counts {
    conversions: u32,
    dropoffs: u32,
}

impl Counts {
    fn total(&self) -> u32 {
        self.conversions + self.dropoffs
    }
}

/// One sealed subgroup with enough outcomes to count as an observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SealedSubgroup {
    pub start: DateTime<Utc>,
    pub conversions: u32,
    pub dropoffs: u32,
}

impl SealedSubgroup {
    /// `dropoffs / (conversions + dropoffs)`.
    pub fn dropoff_rate(&self) -> f64 {
        let total = self.conversions + self.dropoffs;
        if total == 0 {
            return 0.0;
        }
        f64::from(self.dropoffs) / f64::from(total)
    }
}

#[derive(Debug, Clone)]
pub struct OutcomeSampler {
    width_secs: i64,
    min_events: u32,
    tolerance: Duration,
    open: BTreeMap<i64, Counts>,
    /// Highest subgroup index already sealed.
    sealed_through: Option<i64>,
}

impl OutcomeSampler {
    pub fn new(config: &SampleConfig) -> Self {
        Self {
            width_secs: i64::from(config.subgroup_secs.max(1)),
            min_events: config.min_subgroup_events,
            tolerance: Duration::seconds(i64::from(config.clock_skew_tolerance_secs)),
            open: BTreeMap::new(),
            sealed_through: None,
        }
    }

    /// Record one outcome. Returns `true` when it arrived after its subgroup was sealed.
    pub fn record(&mut self, at: DateTime<Utc>, outcome: Outcome) -> bool {
        let index = at.timestamp().div_euclid(self.width_secs);
        let (slot, late) = match self.sealed_through {
            Some(sealed) if index <= sealed => {
                let oldest_open = self.open.keys().next().copied().unwrap_or(sealed + 1);
                (oldest_open, true)
            }
            _ => (index, false),
        };

        let counts = self.open.entry(slot).or_default();
        match outcome {
            Outcome::Conversion => counts.conversions += 1,
            Outcome::Dropoff => counts.dropoffs += 1,
        }
        late
    }

    /// Seal every subgroup whose end is at or before `now - tolerance`, oldest first.
    /// Subgroups below the minimum outcome count are sealed without an observation.
    pub fn seal(&mut self, now: DateTime<Utc>) -> Vec<SealedSubgroup> {
        let cutoff = (now - self.tolerance).timestamp();
        // Highest index whose end (index + 1) * width is <= cutoff.
        let last_closed = cutoff.div_euclid(self.width_secs) - 1;

        let mut sealed = Vec::new();
        while let Some(entry) = self.open.first_entry() {
            if *entry.key() > last_closed {
                break;
            }
            let index = *entry.key();
            let counts = entry.remove();
            if counts.total() >= self.min_events.max(1) {
                sealed.push(SealedSubgroup {
                    start: self.start_of(index),
                    conversions: counts.conversions,
                    dropoffs: counts.dropoffs,
                });
            }
        }

        self.sealed_through = Some(self.sealed_through.map_or(last_closed, |s| s.max(last_closed)));
        sealed
    }

    /// Outcomes waiting in open subgroups.
    pub fn pending(&self) -> u32 {
        self.open.values().map(Counts::total).sum()
    }

    fn start_of(&self, index: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(index * self.width_secs, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
