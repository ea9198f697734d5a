//! Core types for the Synheart Vitality pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: the raw health-signal snapshot, per-factor and per-pillar scores,
//! and the final vitality state with its insights.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Snapshot (input)
// ============================================================================

/// Sleep for the most recent night
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSignal {
    /// Total sleep duration (minutes); missing earns no duration bonus
    #[serde(default)]
    pub duration: f64,
    /// Self-reported or device sleep quality (0-100 %)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
}

/// Heart-rate variability reading
///
/// A vendor readiness percentage takes precedence over raw RMSSD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrvSignal {
    /// Pre-computed readiness (0-100 %)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<f64>,
    /// Root mean square of successive differences (ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rmssd: Option<f64>,
}

/// Daily movement totals
///
/// Count fields are plain JSON numbers; the normalizers clamp negative or
/// non-finite counts instead of rejecting the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySignal {
    #[serde(default)]
    pub steps: f64,
    #[serde(default)]
    pub active_minutes: f64,
}

/// Logged sessions for a single mind-body practice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSignal {
    #[serde(default)]
    pub sessions: f64,
}

/// Daily nutrition log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionSignal {
    #[serde(default)]
    pub meals_logged: f64,
    /// Glasses of water
    #[serde(default)]
    pub water_intake: f64,
}

/// Social interaction summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialSignal {
    /// Pre-computed wellness score (0-100); overrides the interaction counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_wellness_score: Option<f64>,
    #[serde(default)]
    pub interactions: f64,
    #[serde(default)]
    pub unique_contacts: f64,
}

/// One immutable bundle of raw health signals
///
/// Presence of a sub-record is the only signal that a factor has data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSignalSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<SleepSignal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hrv: Option<HrvSignal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivitySignal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mindfulness: Option<PracticeSignal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breathing: Option<PracticeSignal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionSignal>,
    /// Mood on a 1-5 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<SocialSignal>,
    /// Perceived stress on a 0-10 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<f64>,
}

impl HealthSignalSnapshot {
    /// True when no sub-record is present
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ============================================================================
// Pillars and factors
// ============================================================================

/// Top-level vitality dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    Recovery,
    Resilience,
    Fuel,
}

impl Pillar {
    /// All pillars in aggregation order
    pub const ALL: [Pillar; 3] = [Pillar::Recovery, Pillar::Resilience, Pillar::Fuel];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pillar::Recovery => "recovery",
            Pillar::Resilience => "resilience",
            Pillar::Fuel => "fuel",
        }
    }

    /// Contribution to the overall score, in percent
    pub const fn weight_pct(&self) -> u32 {
        match self {
            Pillar::Recovery => 40,
            Pillar::Resilience => 35,
            Pillar::Fuel => 25,
        }
    }

    /// Contribution to the overall score (0-1)
    pub fn weight(&self) -> f64 {
        f64::from(self.weight_pct()) / 100.0
    }
}

/// Individually normalizable raw signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Factor {
    Sleep,
    Hrv,
    RecoveryIndicators,
    Activity,
    MindBody,
    Nutrition,
    Emotional,
    Social,
}

impl Factor {
    pub const ALL: [Factor; 8] = [
        Factor::Sleep,
        Factor::Hrv,
        Factor::RecoveryIndicators,
        Factor::Activity,
        Factor::MindBody,
        Factor::Nutrition,
        Factor::Emotional,
        Factor::Social,
    ];

    /// Key used in pillar factor maps
    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Sleep => "sleep",
            Factor::Hrv => "hrv",
            Factor::RecoveryIndicators => "recoveryIndicators",
            Factor::Activity => "activity",
            Factor::MindBody => "mindBody",
            Factor::Nutrition => "nutrition",
            Factor::Emotional => "emotional",
            Factor::Social => "social",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Factor::Sleep => "Sleep",
            Factor::Hrv => "Heart Rate Variability",
            Factor::RecoveryIndicators => "Stress Recovery",
            Factor::Activity => "Movement",
            Factor::MindBody => "Mind-Body Practice",
            Factor::Nutrition => "Nutrition",
            Factor::Emotional => "Emotional Balance",
            Factor::Social => "Social Connection",
        }
    }
}

/// Normalized score for one factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    /// 0-100
    pub score: f64,
    /// Nominal weight within its pillar (0-1)
    pub weight: f64,
    pub label: String,
}

/// Weighted combination of the factors present for one pillar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    /// 0-100
    pub score: f64,
    /// Breakdown of the factors that had data, keyed by factor name
    pub factors: BTreeMap<String, FactorScore>,
    /// Contribution to the overall score (0-1)
    pub weight: f64,
}

/// The three pillar scores of one computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarScores {
    pub recovery: PillarScore,
    pub resilience: PillarScore,
    pub fuel: PillarScore,
}

impl PillarScores {
    pub fn get(&self, pillar: Pillar) -> &PillarScore {
        match pillar {
            Pillar::Recovery => &self.recovery,
            Pillar::Resilience => &self.resilience,
            Pillar::Fuel => &self.fuel,
        }
    }

    /// True when at least one factor in any pillar had data
    pub fn has_data(&self) -> bool {
        self.iter().any(|(_, pillar)| !pillar.factors.is_empty())
    }

    /// Pillars with their scores, in aggregation order
    pub fn iter(&self) -> impl Iterator<Item = (Pillar, &PillarScore)> {
        Pillar::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

// ============================================================================
// Vitality state (output)
// ============================================================================

/// Categorical vitality state, ordered from lowest to highest band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalityLevel {
    Recovering,
    Balanced,
    Primed,
}

impl VitalityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalityLevel::Recovering => "recovering",
            VitalityLevel::Balanced => "balanced",
            VitalityLevel::Primed => "primed",
        }
    }
}

/// Classified state plus its fixed presentation metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallState {
    pub name: VitalityLevel,
    /// Hex color for the indicator
    pub color: String,
    /// Gradient stops, hex colors
    pub gradient: Vec<String>,
    pub message: String,
    pub focus: String,
}

/// A pillar scoring below the attention threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarAttention {
    pub name: Pillar,
    pub score: f64,
    pub suggestions: Vec<String>,
}

/// User-facing explanation of a vitality state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub primary: String,
    pub focus: String,
    pub recommendations: Vec<String>,
    pub pillars_needing_attention: Vec<PillarAttention>,
}

/// Complete result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalityState {
    pub overall: OverallState,
    /// Rounded overall score (0-100)
    pub score: u8,
    /// Unrounded overall score
    pub overall_score: f64,
    pub pillars: PillarScores,
    pub insights: Insights,
    pub timestamp: DateTime<Utc>,
}
