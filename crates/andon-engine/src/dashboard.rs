//! Dashboard Aggregator: folds published stage views into an `AndonDashboard`.

use chrono::{DateTime, Utc};

use andon_alerts::AlertManager;
use andon_core::models::{DashboardSummary, StageStatus};
use andon_core::{AndonDashboard, AndonState};

use crate::generation::EngineGeneration;

/// Build a dashboard from the generation's published views. Takes no writer locks.
///
/// Each stage is consistent with itself as of its last publish. Stages are not read at
/// one common instant: a stage event in flight may already show as a conversion on the
/// previous stage but not yet as an arrival on its own.
///
/// The overall status is the most severe stabilized stage state
/// (STOP > ATTENTION > UNKNOWN > NORMAL).
pub fn aggregate(
    generation: &EngineGeneration,
    alerts: &AlertManager,
    now: DateTime<Utc>,
) -> AndonDashboard {
    let limit = generation.config.recent_alerts_per_stage;
    let views = generation.views();

    let stages: Vec<StageStatus> = views
        .iter()
        .map(|view| StageStatus {
            name: view.name.clone(),
            status: view.state,
            metrics: view.funnel.clone(),
            capability: view.capability.clone(),
            alerts: alerts.recent(&view.name, limit),
        })
        .collect();

    let first_arrivals = views.first().map_or(0, |v| v.funnel.arrivals);
    let last_arrivals = views.last().map_or(0, |v| v.funnel.arrivals);
    let summary = DashboardSummary {
        total_sessions: first_arrivals,
        total_dropoffs: views.iter().map(|v| v.funnel.dropoffs).sum(),
        overall_conversion_rate: if first_arrivals == 0 {
            0.0
        } else {
            last_arrivals as f64 / first_arrivals as f64
        },
        potential_revenue_lost: views.iter().map(|v| v.funnel.value).sum(),
        last_updated: now,
    };

    AndonDashboard {
        overall_status: AndonState::worst(stages.iter().map(|s| s.status)),
        generation: generation.id,
        stages,
        summary,
    }
}
