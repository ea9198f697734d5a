//! Pillar calculation
//!
//! Each pillar is a fixed, ordered table of weighted factors. Factors without
//! data are dropped and the remaining weights renormalized, so untracked
//! signals neither penalize nor inflate a pillar.

use std::collections::BTreeMap;

use crate::normalizer::Normalizer;
use crate::types::{Factor, FactorScore, HealthSignalSnapshot, Pillar, PillarScore, PillarScores};

/// Score reported for a pillar with no factor data at all
pub const NEUTRAL_PILLAR_SCORE: f64 = 50.0;

/// Factor weight within its pillar, in percent
#[derive(Debug, Clone, Copy)]
pub struct FactorWeight {
    pub factor: Factor,
    pub weight_pct: u32,
}

impl FactorWeight {
    const fn new(factor: Factor, weight_pct: u32) -> Self {
        Self { factor, weight_pct }
    }

    pub fn weight(&self) -> f64 {
        f64::from(self.weight_pct) / 100.0
    }
}

pub const RECOVERY_FACTORS: [FactorWeight; 3] = [
    FactorWeight::new(Factor::Sleep, 40),
    FactorWeight::new(Factor::Hrv, 35),
    FactorWeight::new(Factor::RecoveryIndicators, 25),
];

pub const RESILIENCE_FACTORS: [FactorWeight; 2] = [
    FactorWeight::new(Factor::Activity, 60),
    FactorWeight::new(Factor::MindBody, 40),
];

pub const FUEL_FACTORS: [FactorWeight; 3] = [
    FactorWeight::new(Factor::Nutrition, 40),
    FactorWeight::new(Factor::Emotional, 30),
    FactorWeight::new(Factor::Social, 30),
];

const fn total_pct(table: &[FactorWeight]) -> u32 {
    let mut total = 0;
    let mut i = 0;
    while i < table.len() {
        total += table[i].weight_pct;
        i += 1;
    }
    total
}

const _: () = assert!(total_pct(&RECOVERY_FACTORS) == 100);
const _: () = assert!(total_pct(&RESILIENCE_FACTORS) == 100);
const _: () = assert!(total_pct(&FUEL_FACTORS) == 100);

/// Factor table for a pillar
pub fn factor_table(pillar: Pillar) -> &'static [FactorWeight] {
    match pillar {
        Pillar::Recovery => &RECOVERY_FACTORS,
        Pillar::Resilience => &RESILIENCE_FACTORS,
        Pillar::Fuel => &FUEL_FACTORS,
    }
}

/// Pillar calculator for turning a snapshot into pillar scores
pub struct PillarCalculator;

impl PillarCalculator {
    /// Compute all three pillars
    pub fn calculate(snapshot: &HealthSignalSnapshot) -> PillarScores {
        PillarScores {
            recovery: Self::calculate_pillar(Pillar::Recovery, snapshot),
            resilience: Self::calculate_pillar(Pillar::Resilience, snapshot),
            fuel: Self::calculate_pillar(Pillar::Fuel, snapshot),
        }
    }

    /// Compute one pillar as the renormalized weighted mean of its present factors
    pub fn calculate_pillar(pillar: Pillar, snapshot: &HealthSignalSnapshot) -> PillarScore {
        let mut factors = BTreeMap::new();
        let mut total = 0.0;
        let mut weight_sum = 0.0;

        for entry in factor_table(pillar) {
            let Some(score) = Normalizer::score(entry.factor, snapshot) else {
                tracing::trace!(
                    pillar = pillar.as_str(),
                    factor = entry.factor.as_str(),
                    "no data, factor skipped"
                );
                continue;
            };

            let weight = entry.weight();
            total += score * weight;
            weight_sum += weight;

            factors.insert(
                entry.factor.as_str().to_string(),
                FactorScore {
                    score,
                    weight,
                    label: entry.factor.label().to_string(),
                },
            );
        }

        let score = if weight_sum > 0.0 {
            (total / weight_sum).clamp(0.0, 100.0)
        } else {
            NEUTRAL_PILLAR_SCORE
        };

        PillarScore {
            score,
            factors,
            weight: pillar.weight(),
        }
    }
}
