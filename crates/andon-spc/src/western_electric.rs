//! Western Electric rule 2: two of the last three points beyond the warning sigma.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use andon_core::constants::{
    RULE_WESTERN_ELECTRIC, WESTERN_ELECTRIC_BREACHES, WESTERN_ELECTRIC_WINDOW,
};
use andon_core::AndonState;

use crate::Classification;

/// Sliding window of sigma levels for one stage.
///
/// A point is pushed once per distinct observation timestamp, so reclassifying the
/// same observation on consecutive ticks does not count twice.
#[derive(Debug, Clone)]
pub struct WesternElectricRule2 {
    attention_sigma: f64,
    window: VecDeque<f64>,
    last_point: Option<DateTime<Utc>>,
}

impl WesternElectricRule2 {
    pub fn new(attention_sigma: f64) -> Self {
        Self {
            attention_sigma,
            window: VecDeque::with_capacity(WESTERN_ELECTRIC_WINDOW),
            last_point: None,
        }
    }

    /// Record the sigma level of the observation made at `observed_at`.
    pub fn observe(&mut self, observed_at: DateTime<Utc>, sigma_level: f64) {
        if self.last_point.is_some_and(|last| observed_at <= last) {
            return;
        }
        self.last_point = Some(observed_at);
        self.window.push_back(sigma_level);
        while self.window.len() > WESTERN_ELECTRIC_WINDOW {
            self.window.pop_front();
        }
    }

    /// True once the window is full and enough of it breaches.
    pub fn breached(&self) -> bool {
        self.window.len() == WESTERN_ELECTRIC_WINDOW
            && self
                .window
                .iter()
                .filter(|s| **s >= self.attention_sigma)
                .count()
                >= WESTERN_ELECTRIC_BREACHES
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.last_point = None;
    }

    /// Feed a classification through the rule. UNKNOWN breaks the run of points.
    pub fn apply(
        &mut self,
        observed_at: DateTime<Utc>,
        mut classification: Classification,
    ) -> Classification {
        if classification.state == AndonState::Unknown {
            self.reset();
            return classification;
        }
        self.observe(observed_at, classification.sigma_level);
        if classification.state == AndonState::Normal && self.breached() {
            tracing::debug!(
                stage = %classification.stage,
                "western electric rule 2 triggered: 2 of 3 points beyond attention sigma"
            );
            classification.state = AndonState::Attention;
            classification.rule = Some(RULE_WESTERN_ELECTRIC);
        }
        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn point(stage: &str, state: AndonState, sigma: f64) -> Classification {
        Classification {
            stage: stage.to_string(),
            state,
            sigma_level: sigma,
            rule: None,
        }
    }

    #[test]
    fn two_of_three_breaches_raise_attention() {
        let mut rule = WesternElectricRule2::new(2.0);
        let t = Utc::now();
        rule.apply(t, point("s", AndonState::Attention, 2.2));
        rule.apply(t + Duration::minutes(1), point("s", AndonState::Attention, 2.5));
        let third = rule.apply(t + Duration::minutes(2), point("s", AndonState::Normal, 1.0));
        assert_eq!(third.state, AndonState::Attention);
        assert_eq!(third.rule, Some(RULE_WESTERN_ELECTRIC));
    }

    #[test]
    fn repeated_observation_is_counted_once() {
        let mut rule = WesternElectricRule2::new(2.0);
        let t = Utc::now();
        rule.apply(t, point("s", AndonState::Attention, 2.2));
        rule.apply(t, point("s", AndonState::Attention, 2.2));
        let next = rule.apply(t + Duration::minutes(1), point("s", AndonState::Normal, 0.5));
        assert_eq!(next.state, AndonState::Normal);
    }

    #[test]
    fn unknown_clears_the_window() {
        let mut rule = WesternElectricRule2::new(2.0);
        let t = Utc::now();
        rule.apply(t, point("s", AndonState::Attention, 2.2));
        rule.apply(t + Duration::minutes(1), point("s", AndonState::Attention, 2.4));
        rule.apply(t + Duration::minutes(2), point("s", AndonState::Unknown, 0.0));
        let after = rule.apply(t + Duration::minutes(3), point("s", AndonState::Normal, 0.1));
        assert_eq!(after.state, AndonState::Normal);
        assert!(!rule.breached());
    }
}
