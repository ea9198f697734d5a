//! State classification
//!
//! Maps the overall score onto three ordered, non-overlapping bands:
//! - `recovering`: [0, 60)
//! - `balanced`: [60, 80)
//! - `primed`: [80, 100]
//!
//! A score on a boundary belongs to the higher band, and the last band's
//! upper bound is inclusive so that 100 always resolves.

use crate::types::{OverallState, VitalityLevel};

/// Half-open score interval for one state
#[derive(Debug, Clone, Copy)]
pub struct StateBand {
    pub level: VitalityLevel,
    pub low: u32,
    pub high: u32,
}

/// Bands in ascending order
pub const STATE_BANDS: [StateBand; 3] = [
    StateBand {
        level: VitalityLevel::Recovering,
        low: 0,
        high: 60,
    },
    StateBand {
        level: VitalityLevel::Balanced,
        low: 60,
        high: 80,
    },
    StateBand {
        level: VitalityLevel::Primed,
        low: 80,
        high: 100,
    },
];

const fn bands_cover_score_range(bands: &[StateBand]) -> bool {
    if bands.is_empty() || bands[0].low != 0 || bands[bands.len() - 1].high != 100 {
        return false;
    }
    let mut i = 1;
    while i < bands.len() {
        if bands[i].low != bands[i - 1].high || bands[i].low >= bands[i].high {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(bands_cover_score_range(&STATE_BANDS));

/// State for a snapshot with no usable signal in any pillar.
///
/// The neutral overall score of 50 falls in the lowest band, so the
/// no-data case is resolved explicitly instead of through the bands.
pub const NO_DATA_LEVEL: VitalityLevel = VitalityLevel::Balanced;

/// Classify an overall score. Out-of-range scores are clamped first.
pub fn classify(score: f64) -> VitalityLevel {
    let score = if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    };
    let last = STATE_BANDS.len() - 1;

    for (i, band) in STATE_BANDS.iter().enumerate() {
        let low = f64::from(band.low);
        let high = f64::from(band.high);
        let below_high = if i == last {
            score <= high
        } else {
            score < high
        };
        if score >= low && below_high {
            return band.level;
        }
    }

    // Unreachable while the bands cover 0-100
    STATE_BANDS[last].level
}

/// Fixed presentation metadata for a state
pub fn overall_state(level: VitalityLevel) -> OverallState {
    let (color, gradient, message, focus): (&str, [&str; 2], &str, &str) = match level {
        VitalityLevel::Recovering => (
            "#F59E0B",
            ["#F59E0B", "#EF4444"],
            "Your body is asking for rest. Recovery is where strength is rebuilt.",
            "Prioritize sleep, gentle movement, and stress relief today.",
        ),
        VitalityLevel::Balanced => (
            "#10B981",
            ["#10B981", "#3B82F6"],
            "You're in a steady rhythm. Keep nurturing the habits that got you here.",
            "Maintain consistency and add one small upgrade to your routine.",
        ),
        VitalityLevel::Primed => (
            "#8B5CF6",
            ["#8B5CF6", "#EC4899"],
            "You're primed and full of energy. This is a great day to stretch yourself.",
            "Channel your energy into a challenging goal or a demanding workout.",
        ),
    };

    OverallState {
        name: level,
        color: color.to_string(),
        gradient: gradient.iter().map(|s| s.to_string()).collect(),
        message: message.to_string(),
        focus: focus.to_string(),
    }
}
