use andon_core::config::AlertThresholds;
use andon_core::{AndonState, StatisticalMetrics};
use andon_spc::{BaselineTracker, Classifier, HysteresisMachine, RunningStats};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

fn arb_raw() -> impl Strategy<Value = AndonState> {
    prop_oneof![
        Just(AndonState::Normal),
        Just(AndonState::Attention),
        Just(AndonState::Stop),
        Just(AndonState::Unknown),
    ]
}

// ── Bucket merge matches a single pass ─────────────────────────────────────

proptest! {
    #[test]
    fn bucketed_moments_match_single_pass(
        values in prop::collection::vec(0.0f64..1.0, 1..300),
        spacing_secs in 1i64..600,
    ) {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut tracker = BaselineTracker::new(Duration::hours(240));
        for (i, v) in values.iter().enumerate() {
            tracker.record(start + Duration::seconds(i as i64 * spacing_secs), *v);
        }
        let single: RunningStats = values.iter().copied().collect();
        let merged = tracker.window_stats();

        prop_assert_eq!(merged.count(), single.count());
        prop_assert!((merged.mean() - single.mean()).abs() < 1e-9);
        prop_assert!((merged.variance() - single.variance()).abs() < 1e-9);
    }
}

// ── Nothing older than the lookback survives a roll ────────────────────────

proptest! {
    #[test]
    fn roll_evicts_everything_past_lookback(
        offsets in prop::collection::vec(0i64..(72 * 3600), 1..200),
        lookback_hours in 1i64..48,
    ) {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let lookback = Duration::hours(lookback_hours);
        let mut tracker = BaselineTracker::new(lookback);
        for off in &offsets {
            tracker.record(start + Duration::seconds(*off), 0.5);
        }
        let latest = start + Duration::seconds(*offsets.iter().max().unwrap());
        tracker.roll(latest);

        let survivors = offsets
            .iter()
            .filter(|off| start + Duration::seconds(**off) >= latest - lookback)
            .count();
        prop_assert!(tracker.sample_size() <= survivors);
        prop_assert!(tracker.sample_size() >= 1);
    }
}

// ── Small samples never classify as ATTENTION or STOP ──────────────────────

proptest! {
    #[test]
    fn undersized_sample_is_always_unknown(
        n in 0usize..30,
        mean in 0.0f64..1.0,
        sd in 0.0f64..0.5,
        rate in 0.0f64..1.0,
    ) {
        let metrics = StatisticalMetrics::from_moments(mean, sd, n, Utc::now());
        let result = Classifier::new(AlertThresholds::default(), 30).classify("s", rate, &metrics);
        prop_assert_eq!(result.state, AndonState::Unknown);
    }
}

// ── Hysteresis invariants ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn every_transition_changes_state(
        raws in prop::collection::vec(arb_raw(), 1..200),
        k in 1u32..6,
    ) {
        let mut machine = HysteresisMachine::new(k);
        for raw in raws {
            let before = machine.state();
            match machine.step(raw) {
                Some(t) => {
                    prop_assert_eq!(t.from, before);
                    prop_assert_ne!(t.from, t.to);
                    prop_assert_eq!(machine.state(), t.to);
                }
                None => prop_assert_eq!(machine.state(), before),
            }
            if raw == AndonState::Unknown {
                prop_assert_eq!(machine.state(), AndonState::Unknown);
            }
        }
    }

    #[test]
    fn escalation_always_takes_effect(
        raws in prop::collection::vec(arb_raw(), 1..200),
        k in 1u32..6,
    ) {
        let mut machine = HysteresisMachine::new(k);
        for raw in raws {
            let before = machine.state();
            machine.step(raw);
            if let (Some(cur), Some(new)) = (before.escalation_level(), raw.escalation_level()) {
                if new > cur {
                    prop_assert_eq!(machine.state(), raw);
                }
            }
        }
    }
}
