//! Andon states (TPS Jidoka signal colours).

use serde::{Deserialize, Serialize};

/// Process health signal for one funnel stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AndonState {
    /// Green: within control limits.
    Normal,
    /// Yellow: beyond the warning limit, monitoring.
    Attention,
    /// Red: beyond the control limit, immediate action required.
    Stop,
    /// Gray: too few observations to judge.
    #[default]
    Unknown,
}

impl AndonState {
    /// Dashboard severity: STOP > ATTENTION > UNKNOWN > NORMAL.
    pub fn severity(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Unknown => 1,
            Self::Attention => 2,
            Self::Stop => 3,
        }
    }

    /// Position on the escalation ladder NORMAL < ATTENTION < STOP.
    /// `None` for UNKNOWN, which sits outside the ladder.
    pub fn escalation_level(self) -> Option<u8> {
        match self {
            Self::Normal => Some(0),
            Self::Attention => Some(1),
            Self::Stop => Some(2),
            Self::Unknown => None,
        }
    }

    /// Most severe state of an iterator, NORMAL when empty.
    pub fn worst<I: IntoIterator<Item = AndonState>>(states: I) -> AndonState {
        states
            .into_iter()
            .max_by_key(|s| s.severity())
            .unwrap_or(AndonState::Normal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Attention => "attention",
            Self::Stop => "stop",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for AndonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}
