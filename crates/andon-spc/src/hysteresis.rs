//! Anti-flap state machine over raw classifications.
//!
//! Escalation along NORMAL < ATTENTION < STOP is immediate. A lower raw state must
//! hold for `k` consecutive ticks before the stabilized state follows; the machine
//! then lands on the most severe raw state seen during that streak. UNKNOWN is an
//! override: it is entered at once and left only after `k` consecutive known ticks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use andon_core::AndonState;

/// A change of the stabilized state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: AndonState,
    pub to: AndonState,
}

impl Transition {
    /// Moving down the escalation ladder (STOP → ATTENTION, anything → NORMAL from above).
    pub fn is_downgrade(&self) -> bool {
        match (self.from.escalation_level(), self.to.escalation_level()) {
            (Some(from), Some(to)) => to < from,
            _ => false,
        }
    }
}

/// In-progress confirmation of a lower state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDowngrade {
    pub target: AndonState,
    pub ticks: u32,
}

#[derive(Debug, Clone)]
pub struct HysteresisMachine {
    k: u32,
    current: AndonState,
    pending: Option<PendingDowngrade>,
    last_evaluated: Option<DateTime<Utc>>,
}

impl HysteresisMachine {
    /// Starts in UNKNOWN. A `k` of 0 behaves like 1.
    pub fn new(k: u32) -> Self {
        Self {
            k: k.max(1),
            current: AndonState::Unknown,
            pending: None,
            last_evaluated: None,
        }
    }

    pub fn state(&self) -> AndonState {
        self.current
    }

    pub fn pending(&self) -> Option<PendingDowngrade> {
        self.pending
    }

    pub fn last_evaluated(&self) -> Option<DateTime<Utc>> {
        self.last_evaluated
    }

    /// Apply one evaluation tick. A tick at or before the last evaluated instant is a
    /// no-op, which makes retried ticks safe.
    pub fn observe(&mut self, now: DateTime<Utc>, raw: AndonState) -> Option<Transition> {
        if self.last_evaluated.is_some_and(|last| now <= last) {
            return None;
        }
        self.last_evaluated = Some(now);
        self.step(raw)
    }

    /// Apply one raw state without the tick-time guard.
    pub fn step(&mut self, raw: AndonState) -> Option<Transition> {
        let from = self.current;

        if raw == AndonState::Unknown {
            self.pending = None;
            return self.move_to(from, AndonState::Unknown);
        }

        let (Some(current_level), Some(raw_level)) =
            (from.escalation_level(), raw.escalation_level())
        else {
            // Leaving UNKNOWN: confirm like any other downgrade.
            return self.confirm(from, raw);
        };

        if raw_level > current_level {
            self.pending = None;
            self.move_to(from, raw)
        } else if raw_level == current_level {
            self.pending = None;
            None
        } else {
            self.confirm(from, raw)
        }
    }

    fn confirm(&mut self, from: AndonState, raw: AndonState) -> Option<Transition> {
        let next = match self.pending {
            Some(p) => PendingDowngrade {
                target: more_severe(p.target, raw),
                ticks: p.ticks + 1,
            },
            None => PendingDowngrade {
                target: raw,
                ticks: 1,
            },
        };
        if next.ticks >= self.k {
            self.pending = None;
            self.move_to(from, next.target)
        } else {
            self.pending = Some(next);
            None
        }
    }

    fn move_to(&mut self, from: AndonState, to: AndonState) -> Option<Transition> {
        if from == to {
            return None;
        }
        self.current = to;
        Some(Transition { from, to })
    }
}

fn more_severe(a: AndonState, b: AndonState) -> AndonState {
    if b.escalation_level() > a.escalation_level() {
        b
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AndonState::*;

    fn machine_in(state: AndonState, k: u32) -> HysteresisMachine {
        let mut m = HysteresisMachine::new(k);
        for _ in 0..k {
            m.step(state);
        }
        assert_eq!(m.state(), state);
        m
    }

    #[test]
    fn starts_unknown() {
        assert_eq!(HysteresisMachine::new(3).state(), Unknown);
    }

    #[test]
    fn leaving_unknown_needs_k_known_ticks() {
        let mut m = HysteresisMachine::new(3);
        assert_eq!(m.step(Normal), None);
        assert_eq!(m.step(Normal), None);
        assert_eq!(
            m.step(Normal),
            Some(Transition {
                from: Unknown,
                to: Normal
            })
        );
    }

    #[test]
    fn leaving_unknown_adopts_worst_of_streak() {
        let mut m = HysteresisMachine::new(3);
        m.step(Normal);
        m.step(Stop);
        let t = m.step(Normal);
        assert_eq!(t.map(|t| t.to), Some(Stop));
    }

    #[test]
    fn escalation_is_immediate() {
        let mut m = machine_in(Normal, 3);
        assert_eq!(m.step(Attention).map(|t| t.to), Some(Attention));
        assert_eq!(m.step(Stop).map(|t| t.to), Some(Stop));
    }

    #[test]
    fn stop_downgrades_after_k_normal_ticks() {
        let mut m = machine_in(Normal, 3);
        m.step(Stop);
        assert_eq!(m.step(Normal), None);
        assert_eq!(m.step(Normal), None);
        let t = m.step(Normal);
        assert_eq!(t, Some(Transition { from: Stop, to: Normal }));
        assert!(t.is_some_and(|t| t.is_downgrade()));
    }

    #[test]
    fn downgrade_lands_on_worst_raw_state_of_streak() {
        let mut m = machine_in(Normal, 3);
        m.step(Stop);
        m.step(Normal);
        m.step(Attention);
        assert_eq!(m.step(Normal).map(|t| t.to), Some(Attention));
    }

    #[test]
    fn equal_raw_state_resets_the_streak() {
        let mut m = machine_in(Normal, 3);
        m.step(Stop);
        m.step(Normal);
        m.step(Normal);
        assert_eq!(m.step(Stop), None);
        assert_eq!(m.step(Normal), None);
        assert_eq!(m.step(Normal), None);
        assert_eq!(m.state(), Stop);
        assert!(m.step(Normal).is_some());
    }

    #[test]
    fn unknown_overrides_immediately() {
        let mut m = machine_in(Normal, 3);
        m.step(Stop);
        assert_eq!(m.step(Unknown), Some(Transition { from: Stop, to: Unknown }));
        assert_eq!(m.step(Unknown), None);
    }

    #[test]
    fn stale_tick_is_ignored() {
        let mut m = HysteresisMachine::new(1);
        let now = Utc::now();
        assert!(m.observe(now, Normal).is_some());
        assert_eq!(m.observe(now, Stop), None);
        assert_eq!(m.state(), Normal);
        assert!(m.observe(now + chrono::Duration::seconds(1), Stop).is_some());
    }
}
