//! Score encoding
//!
//! This module wraps engine results into versioned envelopes for the score
//! sink. Every envelope carries producer metadata and a fresh record id.

use crate::assessment::{AssessmentSummary, TaskId, TaskScore};
use crate::error::EngineError;
use crate::tracer::TraceOutcome;
use crate::types::DifficultyTier;
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current envelope schema version
pub const RECORD_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// A result handed to the score sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreRecord {
    Trace {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item_id: Option<String>,
        tier: DifficultyTier,
        outcome: TraceOutcome,
    },
    TaskScore {
        task: TaskId,
        score: TaskScore,
    },
    Assessment {
        summary: AssessmentSummary,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEnvelope {
    pub schema_version: String,
    pub producer: Producer,
    pub record_id: String,
    pub computed_at_utc: String,
    pub record: ScoreRecord,
}

/// Encoder for score envelopes
pub struct ScoreEncoder {
    instance_id: String,
}

impl Default for ScoreEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(&self, record: ScoreRecord) -> Result<ScoreEnvelope, EngineError> {
        if let ScoreRecord::Trace {
            outcome: TraceOutcome::Aborted { progress },
            ..
        } = &record
        {
            if !progress.is_finite() {
                return Err(EngineError::EncodingError(format!(
                    "trace progress is not finite: {progress}"
                )));
            }
        }

        Ok(ScoreEnvelope {
            schema_version: RECORD_SCHEMA_VERSION.to_string(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            record_id: Uuid::new_v4().to_string(),
            computed_at_utc: Utc::now().to_rfc3339(),
            record,
        })
    }

    /// Encode to a pretty JSON string
    pub fn encode_to_json(&self, record: ScoreRecord) -> Result<String, EngineError> {
        let envelope = self.encode(record)?;
        serde_json::to_string_pretty(&envelope).map_err(EngineError::JsonError)
    }
}
