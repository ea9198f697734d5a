//! Synheart Vitality - On-device vitality scoring for personal health signals
//!
//! Vitality reduces a snapshot of heterogeneous health signals into a single,
//! explainable vitality state through a deterministic pipeline: factor
//! normalization → pillar scoring → aggregation → state classification →
//! insight generation.
//!
//! ## Pillars
//!
//! - **Recovery**: sleep, heart-rate variability, stress
//! - **Resilience**: movement, mind-body practice
//! - **Fuel**: nutrition, mood, social connection

pub mod aggregator;
pub mod classifier;
pub mod encoder;
pub mod error;
pub mod insights;
pub mod normalizer;
pub mod pillars;
pub mod pipeline;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use encoder::{VitalityEncoder, VitalityPayload};
pub use error::ComputeError;
pub use pipeline::{
    calculate_vitality_state, calculate_vitality_state_at, snapshot_to_vitality_json,
    VitalityProcessor,
};
pub use types::{HealthSignalSnapshot, Pillar, VitalityLevel, VitalityState};

// Schema exports
pub use schema::{SnapshotAdapter, SNAPSHOT_SCHEMA_VERSION};

/// Vitality version embedded in all payloads
pub const VITALITY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for payloads
pub const PRODUCER_NAME: &str = "synheart-vitality";
