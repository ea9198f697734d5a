//! Overall score aggregation
//!
//! The overall score is a fixed-weight linear combination of the three pillar
//! scores. Pillars always report a defined score, so no renormalization happens
//! at this level.

use crate::types::{Pillar, PillarScores};

const _: () = assert!(
    Pillar::Recovery.weight_pct() + Pillar::Resilience.weight_pct() + Pillar::Fuel.weight_pct()
        == 100
);

/// Combine pillar scores into the overall 0-100 score
pub fn aggregate(pillars: &PillarScores) -> f64 {
    let overall: f64 = Pillar::ALL
        .into_iter()
        .map(|pillar| pillars.get(pillar).score * pillar.weight())
        .sum();

    overall.clamp(0.0, 100.0)
}

/// Round an overall score to the integer shown to users
pub fn round_score(overall: f64) -> u8 {
    // Clamped to 0-100 first, so the cast cannot truncate
    overall.clamp(0.0, 100.0).round() as u8
}
