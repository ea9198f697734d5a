//! Payload encoding
//!
//! This module wraps a vitality state in a self-describing JSON envelope with
//! producer metadata and data coverage, for consumers outside the process.

use crate::error::ComputeError;
use crate::types::{Factor, VitalityState};
use crate::{PRODUCER_NAME, VITALITY_VERSION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current payload schema version
pub const PAYLOAD_SCHEMA_VERSION: &str = "vitality.state.v1";

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Which factors had data for the computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub factors_present: usize,
    pub factors_total: usize,
    /// Factor names without data
    pub missing: Vec<String>,
}

impl Coverage {
    /// Derive coverage from the factor breakdown of a state
    pub fn from_state(state: &VitalityState) -> Self {
        let missing: Vec<String> = Factor::ALL
            .iter()
            .filter(|factor| {
                !state
                    .pillars
                    .iter()
                    .any(|(_, pillar)| pillar.factors.contains_key(factor.as_str()))
            })
            .map(|factor| factor.as_str().to_string())
            .collect();

        Self {
            factors_present: Factor::ALL.len() - missing.len(),
            factors_total: Factor::ALL.len(),
            missing,
        }
    }

    /// Fraction of factors with data (0-1)
    pub fn ratio(&self) -> f64 {
        if self.factors_total == 0 {
            return 0.0;
        }
        self.factors_present as f64 / self.factors_total as f64
    }
}

/// Envelope around one vitality state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalityPayload {
    pub schema_version: String,
    pub producer: Producer,
    pub computed_at_utc: DateTime<Utc>,
    pub coverage: Coverage,
    pub state: VitalityState,
}

/// Encoder for producing vitality payloads
pub struct VitalityEncoder {
    instance_id: String,
}

impl Default for VitalityEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl VitalityEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap a state in a payload
    pub fn encode(&self, state: &VitalityState) -> VitalityPayload {
        VitalityPayload {
            schema_version: PAYLOAD_SCHEMA_VERSION.to_string(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: VITALITY_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: state.timestamp,
            coverage: Coverage::from_state(state),
            state: state.clone(),
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(&self, state: &VitalityState) -> Result<String, ComputeError> {
        let payload = self.encode(state);
        serde_json::to_string_pretty(&payload).map_err(ComputeError::JsonError)
    }
}
