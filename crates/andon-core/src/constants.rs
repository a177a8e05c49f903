/// Andon monitor version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sigma multiplier for the upper/lower control limits.
pub const CONTROL_LIMIT_SIGMA: f64 = 3.0;

/// Sigma multiplier for the upper/lower warning limits.
pub const WARNING_LIMIT_SIGMA: f64 = 2.0;

/// Upper bound on `sample.lookback_hours`: one hundred leap years.
pub const MAX_LOOKBACK_HOURS: u32 = 24 * 366 * 100;

/// Width of one baseline bucket in seconds.
pub const BUCKET_SECS: i64 = 3600;

/// Western Electric rule 2 looks at this many most recent points.
pub const WESTERN_ELECTRIC_WINDOW: usize = 3;

/// Western Electric rule 2 fires when at least this many of the window breach.
pub const WESTERN_ELECTRIC_BREACHES: usize = 2;

/// Number of most recent rate observations used for trend estimation.
pub const TREND_WINDOW: usize = 12;

/// Rule labels used on alert counters.
pub const RULE_SIGMA: &str = "sigma";
pub const RULE_WESTERN_ELECTRIC: &str = "weco";
