//! vitality.snapshot.v1 input schema
//!
//! This module decodes health-signal snapshots from JSON and NDJSON and
//! performs advisory range checks on their fields.

mod adapter;
mod snapshot;

pub use adapter::*;
pub use snapshot::*;
