//! Factor normalization
//!
//! This module converts raw snapshot signals into 0-100 factor scores.
//! - One curve per factor
//! - Outputs always clamped to 0-100
//! - Missing sub-records are reported as `None`, never scored with defaults

use crate::types::{
    ActivitySignal, Factor, HealthSignalSnapshot, HrvSignal, NutritionSignal, PracticeSignal,
    SleepSignal, SocialSignal,
};

/// Neutral score used as the starting point of the base-50 curves
const BASE_SCORE: f64 = 50.0;

/// Daily step target for full step credit
const STEP_TARGET: f64 = 10_000.0;
/// Daily active-minute target for full active-minute credit
const ACTIVE_MINUTES_TARGET: f64 = 30.0;

/// RMSSD (ms) that maps to a full HRV score
const RMSSD_FULL_SCORE_MS: f64 = 50.0;

/// Normalizer for converting snapshot sub-records to factor scores
pub struct Normalizer;

impl Normalizer {
    /// Score one factor, or `None` when the snapshot has no data for it
    pub fn score(factor: Factor, snapshot: &HealthSignalSnapshot) -> Option<f64> {
        match factor {
            Factor::Sleep => snapshot.sleep.as_ref().map(normalize_sleep),
            Factor::Hrv => snapshot.hrv.as_ref().and_then(normalize_hrv),
            Factor::RecoveryIndicators => snapshot.stress.map(normalize_stress),
            Factor::Activity => snapshot.activity.as_ref().map(normalize_activity),
            Factor::MindBody => {
                if snapshot.mindfulness.is_none() && snapshot.breathing.is_none() {
                    None
                } else {
                    Some(normalize_mind_body(
                        snapshot.mindfulness.as_ref(),
                        snapshot.breathing.as_ref(),
                    ))
                }
            }
            Factor::Nutrition => snapshot.nutrition.as_ref().map(normalize_nutrition),
            Factor::Emotional => snapshot.mood.map(normalize_mood),
            Factor::Social => snapshot.social.as_ref().map(normalize_social),
        }
    }
}

/// Clamp to the 0-100 score range; NaN collapses to 0
fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else if value == f64::INFINITY {
        100.0
    } else {
        0.0
    }
}

/// Sleep: base 50, duration band bonus, up to 25 from quality
pub fn normalize_sleep(sleep: &SleepSignal) -> f64 {
    let hours = sleep.duration / 60.0;

    let duration_bonus = if (7.0..=9.0).contains(&hours) {
        25.0
    } else if (6.0..=10.0).contains(&hours) {
        15.0
    } else if (5.0..=11.0).contains(&hours) {
        5.0
    } else {
        0.0
    };

    let quality_bonus = sleep
        .quality
        .filter(|q| q.is_finite())
        .map(|q| q.clamp(0.0, 100.0) / 100.0 * 25.0)
        .unwrap_or(0.0);

    clamp_score(BASE_SCORE + duration_bonus + quality_bonus)
}

/// HRV: readiness when reported, otherwise RMSSD against a 50 ms reference.
///
/// Returns `None` when the record carries neither value.
pub fn normalize_hrv(hrv: &HrvSignal) -> Option<f64> {
    match (hrv.readiness, hrv.rmssd) {
        (Some(readiness), _) => Some(clamp_score(readiness)),
        (None, Some(rmssd)) => Some(clamp_score(rmssd / RMSSD_FULL_SCORE_MS * 100.0)),
        (None, None) => None,
    }
}

/// Activity: up to 40 points from steps and up to 60 from active minutes
pub fn normalize_activity(activity: &ActivitySignal) -> f64 {
    let steps_points = clamp_score(activity.steps / STEP_TARGET * 40.0).min(40.0);
    let minutes_points =
        clamp_score(activity.active_minutes / ACTIVE_MINUTES_TARGET * 60.0).min(60.0);

    clamp_score(steps_points + minutes_points)
}

/// Mind-body: 50 per practice with at least one session, renormalized over
/// the practices that are tracked at all
pub fn normalize_mind_body(
    mindfulness: Option<&PracticeSignal>,
    breathing: Option<&PracticeSignal>,
) -> f64 {
    let tracked: Vec<&PracticeSignal> = [mindfulness, breathing].into_iter().flatten().collect();
    if tracked.is_empty() {
        return 0.0;
    }

    let earned: f64 = tracked
        .iter()
        .filter(|p| p.sessions >= 1.0)
        .map(|_| 50.0)
        .sum();

    // Two practices at 50 each make up the full 100
    clamp_score(earned / tracked.len() as f64 * 2.0)
}

/// Nutrition: base 50, +25 for two or more meals, +25 for eight or more glasses of water
pub fn normalize_nutrition(nutrition: &NutritionSignal) -> f64 {
    let mut score = BASE_SCORE;
    if nutrition.meals_logged >= 2.0 {
        score += 25.0;
    }
    if nutrition.water_intake >= 8.0 {
        score += 25.0;
    }
    clamp_score(score)
}

/// Emotional: mood on a 1-5 scale mapped to percent, neutral for an unusable entry
pub fn normalize_mood(mood: f64) -> f64 {
    if mood.is_finite() {
        clamp_score(mood / 5.0 * 100.0)
    } else {
        BASE_SCORE
    }
}

/// Social: pre-computed wellness score, else interaction and contact thresholds
pub fn normalize_social(social: &SocialSignal) -> f64 {
    if let Some(score) = social.social_wellness_score {
        return clamp_score(score);
    }

    let mut score = 0.0;
    if social.interactions >= 3.0 {
        score += 50.0;
    }
    if social.unique_contacts >= 2.0 {
        score += 50.0;
    }
    clamp_score(score)
}

/// Recovery indicators: inverse of stress on a 0-10 scale
pub fn normalize_stress(stress: f64) -> f64 {
    clamp_score(100.0 - stress / 10.0 * 100.0)
}
