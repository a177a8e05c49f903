//! Event Normalizer: the single validation gate in front of stage statistics.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use andon_core::models::{DropoffEvent, FunnelStageEvent};
use andon_core::{IngestEvent, MonitoringConfig, ValidationError};

/// A validated event, resolved to stage positions.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedEvent {
    /// A session reached `stage`.
    Arrival {
        stage: usize,
        session_id: String,
        at: DateTime<Utc>,
    },
    /// A session left the funnel from `stage`.
    Dropoff {
        stage: usize,
        session_id: String,
        at: DateTime<Utc>,
        value: f64,
    },
}

impl NormalizedEvent {
    pub fn stage(&self) -> usize {
        match self {
            Self::Arrival { stage, .. } | Self::Dropoff { stage, .. } => *stage,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Arrival { at, .. } | Self::Dropoff { at, .. } => *at,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Self::Arrival { session_id, .. } | Self::Dropoff { session_id, .. } => session_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventNormalizer {
    stages: HashMap<String, usize>,
    max_future_skew: Duration,
}

impl EventNormalizer {
    pub fn from_config(config: &MonitoringConfig) -> Self {
        Self {
            stages: config
                .stages
                .iter()
                .enumerate()
                .map(|(i, s)| (s.clone(), i))
                .collect(),
            max_future_skew: Duration::seconds(i64::from(config.sample.max_future_skew_secs)),
        }
    }

    /// Parse a JSON payload into an event. Dropoffs are recognised by `fromStage` or
    /// `dropoffType`; anything else is read as a stage event.
    pub fn parse_json(payload: &str) -> Result<IngestEvent, ValidationError> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| ValidationError::new("payload", e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| ValidationError::new("payload", "expected a JSON object"))?;

        let is_dropoff = object.contains_key("fromStage") || object.contains_key("dropoffType");
        let parsed = if is_dropoff {
            serde_json::from_value::<DropoffEvent>(value).map(IngestEvent::Dropoff)
        } else {
            serde_json::from_value::<FunnelStageEvent>(value).map(IngestEvent::Stage)
        };
        parsed.map_err(|e| decode_error(&e))
    }

    /// Validate an event against the configured funnel at `now`.
    pub fn normalize(
        &self,
        event: &IngestEvent,
        now: DateTime<Utc>,
    ) -> Result<NormalizedEvent, ValidationError> {
        if event.session_id().trim().is_empty() {
            return Err(ValidationError::missing("sessionId"));
        }
        let at = event.timestamp();
        if at > now + self.max_future_skew {
            return Err(ValidationError::new(
                "timestamp",
                format!(
                    "{at} is more than {}s ahead of {now}",
                    self.max_future_skew.num_seconds()
                ),
            ));
        }

        match event {
            IngestEvent::Stage(e) => Ok(NormalizedEvent::Arrival {
                stage: self.resolve("stage", &e.stage)?,
                session_id: e.session_id.clone(),
                at,
            }),
            IngestEvent::Dropoff(e) => {
                let stage = self.resolve("fromStage", &e.from_stage)?;
                if let Some(to) = &e.to_stage {
                    self.resolve("toStage", to)?;
                }
                let value = match e.value {
                    Some(v) if !v.is_finite() || v < 0.0 => {
                        return Err(ValidationError::new(
                            "value",
                            "must be a finite non-negative number",
                        ))
                    }
                    Some(v) => v,
                    None => 0.0,
                };
                Ok(NormalizedEvent::Dropoff {
                    stage,
                    session_id: e.session_id.clone(),
                    at,
                    value,
                })
            }
        }
    }

    fn resolve(&self, field: &str, stage: &str) -> Result<usize, ValidationError> {
        if stage.trim().is_empty() {
            return Err(ValidationError::missing(field));
        }
        self.stages
            .get(stage)
            .copied()
            .ok_or_else(|| ValidationError::new(field, format!("unknown stage '{stage}'")))
    }
}

fn decode_error(err: &serde_json::Error) -> ValidationError {
    let message = err.to_string();
    if let Some(rest) = message.strip_prefix("missing field `") {
        if let Some(end) = rest.find('`') {
            return ValidationError::missing(&rest[..end]);
        }
    }
    ValidationError::new("payload", message)
}
