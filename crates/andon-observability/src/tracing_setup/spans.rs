//! Span definitions for ingestion, evaluation ticks, and per-stage evaluation.

/// Span around one `submit` call.
#[macro_export]
macro_rules! ingest_span {
    ($stage:expr, $kind:expr) => {
        tracing::debug_span!("andon.ingest", stage = %$stage, kind = %$kind)
    };
}

/// Span around one evaluation tick across every stage.
#[macro_export]
macro_rules! tick_span {
    ($generation:expr, $now:expr) => {
        tracing::info_span!("andon.tick", generation = $generation, now = %$now)
    };
}

/// Span around the evaluation of a single stage inside a tick.
#[macro_export]
macro_rules! stage_eval_span {
    ($stage:expr) => {
        tracing::debug_span!("andon.stage_eval", stage = %$stage)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const INGEST: &str = "andon.ingest";
    pub const TICK: &str = "andon.tick";
    pub const STAGE_EVAL: &str = "andon.stage_eval";
}
