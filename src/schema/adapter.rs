//! Snapshot decoding for batch and streaming input
//!
//! Accepts either a JSON array of snapshots or newline-delimited JSON with
//! one snapshot per line.

use crate::error::ComputeError;
use crate::schema::snapshot::{validate_snapshot, ValidationError};
use crate::types::HealthSignalSnapshot;

/// Adapter for decoding and checking snapshot documents
pub struct SnapshotAdapter;

impl SnapshotAdapter {
    /// Parse a JSON string containing an array of snapshots
    pub fn parse_array(json: &str) -> Result<Vec<HealthSignalSnapshot>, ComputeError> {
        let snapshots: Vec<HealthSignalSnapshot> = serde_json::from_str(json)?;
        Ok(snapshots)
    }

    /// Parse NDJSON (newline-delimited JSON) containing snapshots
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<HealthSignalSnapshot>, ComputeError> {
        let mut snapshots = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let snapshot = Self::parse_line(trimmed).map_err(|e| {
                ComputeError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
            })?;
            snapshots.push(snapshot);
        }
        Ok(snapshots)
    }

    /// Parse a single snapshot document
    pub fn parse_line(line: &str) -> Result<HealthSignalSnapshot, ComputeError> {
        Ok(serde_json::from_str(line)?)
    }

    /// Validate snapshots, returning only those with problems
    pub fn validate_snapshots(snapshots: &[HealthSignalSnapshot]) -> Vec<ValidationResult> {
        snapshots
            .iter()
            .enumerate()
            .map(|(index, snapshot)| ValidationResult {
                index,
                errors: validate_snapshot(snapshot),
            })
            .filter(|r| !r.errors.is_empty())
            .collect()
    }
}

/// Problems found in one snapshot
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub errors: Vec<ValidationError>,
}
