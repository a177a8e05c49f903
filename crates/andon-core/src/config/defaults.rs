// Single source of truth for all default values.

// --- Thresholds ---
pub const DEFAULT_ATTENTION_SIGMA: f64 = 2.0;
pub const DEFAULT_STOP_SIGMA: f64 = 3.0;
pub const DEFAULT_WESTERN_ELECTRIC: bool = false;

// --- Sampling ---
pub const DEFAULT_MIN_SAMPLE_SIZE: usize = 30;
pub const DEFAULT_LOOKBACK_HOURS: u32 = 24;
pub const DEFAULT_SUBGROUP_SECS: u32 = 60;
pub const DEFAULT_MIN_SUBGROUP_EVENTS: u32 = 1;
pub const DEFAULT_CLOCK_SKEW_TOLERANCE_SECS: u32 = 120;
pub const DEFAULT_MAX_FUTURE_SKEW_SECS: u32 = 300;

// --- Hysteresis ---
pub const DEFAULT_HYSTERESIS_K: u32 = 3;

// --- Actions ---
pub const DEFAULT_ON_CALL_TARGET: &str = "on-call-engineer";
pub const DEFAULT_ESCALATION_TARGET: &str = "revenue-team";
pub const DEFAULT_ATTENTION_TARGET: &str = "growth-team";
pub const DEFAULT_INVESTIGATION_TARGET: &str = "analytics-team";
pub const DEFAULT_STOP_INVESTIGATION_TARGET: &str = "data-team";

// --- Engine ---
pub const DEFAULT_ENABLED: bool = true;
pub const DEFAULT_WRITER_WAIT_MS: u64 = 250;
pub const DEFAULT_RECENT_ALERTS_PER_STAGE: usize = 5;
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 60;

/// Funnel used when no stage list is configured.
pub const DEFAULT_STAGES: [&str; 5] = ["landing", "pricing", "checkout", "payment", "confirmation"];
