//! Pipeline orchestration
//!
//! This module provides the public API for Synheart Vitality.
//! It runs the full reduction from a health-signal snapshot to a vitality state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::aggregator::{aggregate, round_score};
use crate::classifier::{classify, overall_state, NO_DATA_LEVEL};
use crate::encoder::VitalityEncoder;
use crate::error::ComputeError;
use crate::insights::InsightGenerator;
use crate::pillars::PillarCalculator;
use crate::types::{HealthSignalSnapshot, VitalityState};

/// Compute the vitality state for a snapshot, stamped with the current time.
///
/// # Example
/// ```
/// use synheart_vitality::{calculate_vitality_state, HealthSignalSnapshot, VitalityLevel};
///
/// let state = calculate_vitality_state(&HealthSignalSnapshot::default());
/// assert_eq!(state.score, 50);
/// assert_eq!(state.overall.name, VitalityLevel::Balanced);
/// ```
pub fn calculate_vitality_state(snapshot: &HealthSignalSnapshot) -> VitalityState {
    calculate_vitality_state_at(snapshot, Utc::now())
}

/// Compute the vitality state for a snapshot with a caller-supplied timestamp.
///
/// Pipeline stages:
/// 1. Normalizer - Raw signals to factor scores
/// 2. PillarCalculator - Renormalized weighted mean per pillar
/// 3. Aggregator - Fixed-weight overall score
/// 4. Classifier - Score band to state
/// 5. InsightGenerator - State and pillars to user-facing text
pub fn calculate_vitality_state_at(
    snapshot: &HealthSignalSnapshot,
    timestamp: DateTime<Utc>,
) -> VitalityState {
    // Stages 1-2: Normalize factors and combine them per pillar
    let pillars = PillarCalculator::calculate(snapshot);

    // Stage 3: Aggregate
    let overall_score = aggregate(&pillars);
    let score = round_score(overall_score);

    // Stage 4: Classify on the displayed score so score and state agree.
    // Without any factor data the state is neutral rather than banded.
    let level = if pillars.has_data() {
        classify(f64::from(score))
    } else {
        NO_DATA_LEVEL
    };
    let overall = overall_state(level);

    // Stage 5: Insights
    let insights = InsightGenerator::generate(&overall, &pillars);

    tracing::debug!(
        recovery = pillars.recovery.score,
        resilience = pillars.resilience.score,
        fuel = pillars.fuel.score,
        overall = overall_score,
        state = level.as_str(),
        attention = insights.pillars_needing_attention.len(),
        "vitality state computed"
    );

    VitalityState {
        overall,
        score,
        overall_score,
        pillars,
        insights,
        timestamp,
    }
}

/// Convert a snapshot JSON document into a vitality state JSON document.
///
/// # Example
/// ```
/// let json = synheart_vitality::snapshot_to_vitality_json(r#"{"mood": 5}"#.to_string())?;
/// assert!(json.contains("\"fuel\""));
/// # Ok::<(), synheart_vitality::ComputeError>(())
/// ```
pub fn snapshot_to_vitality_json(snapshot_json: String) -> Result<String, ComputeError> {
    let snapshot: HealthSignalSnapshot = serde_json::from_str(&snapshot_json)?;
    let state = calculate_vitality_state(&snapshot);
    serde_json::to_string(&state).map_err(|e| ComputeError::EncodingError(e.to_string()))
}

/// Position of a computation in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Latest-snapshot-wins processor for callers that recompute on an event stream.
///
/// Each computation takes a ticket up front; a result is only kept if no newer
/// ticket has been issued since. The processor can be shared across threads.
pub struct VitalityProcessor {
    encoder: VitalityEncoder,
    issued: AtomicU64,
    latest: Mutex<Option<(Ticket, VitalityState)>>,
}

impl Default for VitalityProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl VitalityProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self::with_encoder(VitalityEncoder::new())
    }

    /// Create a processor that encodes with a specific encoder
    pub fn with_encoder(encoder: VitalityEncoder) -> Self {
        Self {
            encoder,
            issued: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// Issue a ticket for a new computation, superseding all earlier tickets
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no ticket newer than `ticket` has been issued
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Keep `state` as the latest result unless `ticket` has been superseded.
    ///
    /// Returns whether the state was kept.
    pub fn publish(&self, ticket: Ticket, state: VitalityState) -> bool {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                "discarding result superseded by a newer snapshot"
            );
            return false;
        }
        if matches!(&*latest, Some((held, _)) if *held >= ticket) {
            return false;
        }

        *latest = Some((ticket, state));
        true
    }

    /// Compute and publish in one step.
    ///
    /// Returns the state if it is still the latest when computation finishes.
    pub fn process(&self, snapshot: &HealthSignalSnapshot) -> Option<VitalityState> {
        let ticket = self.begin();
        let state = calculate_vitality_state(snapshot);
        if self.publish(ticket, state.clone()) {
            Some(state)
        } else {
            None
        }
    }

    /// Process a snapshot JSON document and return the encoded payload
    pub fn process_json(&self, snapshot_json: &str) -> Result<Option<String>, ComputeError> {
        let snapshot: HealthSignalSnapshot = serde_json::from_str(snapshot_json)?;
        match self.process(&snapshot) {
            Some(state) => self.encoder.encode_to_json(&state).map(Some),
            None => Ok(None),
        }
    }

    /// Most recently published state
    pub fn latest(&self) -> Option<VitalityState> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(_, state)| state.clone())
    }

    /// Most recently published state as an encoded payload
    pub fn latest_json(&self) -> Result<Option<String>, ComputeError> {
        match self.latest() {
            Some(state) => self.encoder.encode_to_json(&state).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize_activity;
    use crate::types::{
        ActivitySignal, HrvSignal, NutritionSignal, Pillar, PracticeSignal, SleepSignal,
        SocialSignal, VitalityLevel,
    };
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::option::of;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn sample_snapshot() -> HealthSignalSnapshot {
        HealthSignalSnapshot {
            sleep: Some(SleepSignal {
                duration: 480.0,
                quality: Some(90.0),
            }),
            hrv: Some(HrvSignal {
                readiness: Some(85.0),
                rmssd: None,
            }),
            activity: Some(ActivitySignal {
                steps: 11_000.0,
                active_minutes: 40.0,
            }),
            nutrition: Some(NutritionSignal {
                meals_logged: 3.0,
                water_intake: 9.0,
            }),
            mood: Some(5.0),
            social: Some(SocialSignal {
                social_wellness_score: Some(88.0),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_reference_snapshot_is_primed() {
        let state = calculate_vitality_state(&sample_snapshot());

        // (97.5 * 0.40 + 85 * 0.35) / 0.75
        assert!((state.pillars.recovery.score - 91.666_666).abs() < 1e-3);
        assert!((state.pillars.resilience.score - 100.0).abs() < 1e-9);
        // 100 * 0.4 + 100 * 0.3 + 88 * 0.3
        assert!((state.pillars.fuel.score - 96.4).abs() < 1e-9);
        assert_eq!(state.score, 96);
        assert_eq!(state.overall.name, VitalityLevel::Primed);
        assert!(state.insights.pillars_needing_attention.is_empty());
    }

    #[test]
    fn test_empty_snapshot_is_balanced() {
        let state = calculate_vitality_state(&HealthSignalSnapshot::default());

        assert_eq!(state.pillars.recovery.score, 50.0);
        assert_eq!(state.pillars.resilience.score, 50.0);
        assert_eq!(state.pillars.fuel.score, 50.0);
        assert!((state.overall_score - 50.0).abs() < 1e-9);
        assert_eq!(state.score, 50);
        assert_eq!(state.overall.name, VitalityLevel::Balanced);

        assert_eq!(state.insights.primary, state.overall.message);

        // Neutral pillars sit below the attention threshold
        assert_eq!(state.insights.pillars_needing_attention.len(), 3);
    }

    #[test]
    fn test_records_without_values_are_balanced() {
        let snapshot = HealthSignalSnapshot {
            hrv: Some(HrvSignal::default()),
            ..Default::default()
        };
        assert!(!snapshot.is_empty());

        let state = calculate_vitality_state(&snapshot);
        assert_eq!(state.score, 50);
        assert_eq!(state.overall.name, VitalityLevel::Balanced);
    }

    #[test]
    fn test_neutral_data_still_uses_bands() {
        // Mood 2.5 scores exactly 50, the same as a pillar with no data
        let snapshot = HealthSignalSnapshot {
            mood: Some(2.5),
            ..Default::default()
        };

        let state = calculate_vitality_state(&snapshot);
        assert_eq!(state.score, 50);
        assert_eq!(state.overall.name, VitalityLevel::Recovering);
    }

    #[test]
    fn test_empty_json_object_is_balanced() {
        let output = snapshot_to_vitality_json("{}".to_string()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["score"], 50);
        assert_eq!(value["overall"]["name"], "balanced");
    }

    #[test]
    fn test_negative_steps_are_clamped_not_rejected() {
        let json = r#"{
            "activity": {"steps": -500, "activeMinutes": 15},
            "mood": 5
        }"#;

        let output = snapshot_to_vitality_json(json.to_string()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        // Steps clamp to 0; 15 active minutes earn 30
        assert_eq!(value["pillars"]["resilience"]["factors"]["activity"]["score"], 30.0);
        // The rest of the snapshot is still scored
        assert_eq!(value["pillars"]["fuel"]["factors"]["emotional"]["score"], 100.0);
    }

    #[test]
    fn test_float_counts_and_partial_sleep_are_accepted() {
        let json = r#"{
            "activity": {"steps": 8000.0, "activeMinutes": 30},
            "mindfulness": {"sessions": 1.0},
            "sleep": {"quality": 80}
        }"#;

        let output = snapshot_to_vitality_json(json.to_string()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        let factor = |pillar: &str, name: &str| {
            value["pillars"][pillar]["factors"][name]["score"]
                .as_f64()
                .unwrap()
        };
        // 8000 / 10000 * 40 + 60
        assert!((factor("resilience", "activity") - 92.0).abs() < 1e-9);
        assert_eq!(factor("resilience", "mindBody"), 100.0);
        // No duration bonus; 80% quality adds 20
        assert!((factor("recovery", "sleep") - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent_with_fixed_timestamp() {
        let snapshot = sample_snapshot();
        let first = calculate_vitality_state_at(&snapshot, fixed_time());
        let second = calculate_vitality_state_at(&snapshot, fixed_time());
        assert_eq!(first, second);
    }

    #[test]
    fn test_low_signals_are_recovering() {
        let snapshot = HealthSignalSnapshot {
            sleep: Some(SleepSignal {
                duration: 240.0,
                quality: Some(10.0),
            }),
            hrv: Some(HrvSignal {
                readiness: None,
                rmssd: Some(15.0),
            }),
            stress: Some(9.0),
            activity: Some(ActivitySignal {
                steps: 1_000.0,
                active_minutes: 0.0,
            }),
            mood: Some(1.0),
            ..Default::default()
        };

        let state = calculate_vitality_state(&snapshot);

        assert_eq!(state.overall.name, VitalityLevel::Recovering);
        assert_eq!(state.insights.primary, state.overall.message);
        let flagged: Vec<Pillar> = state
            .insights
            .pillars_needing_attention
            .iter()
            .map(|a| a.name)
            .collect();
        assert!(flagged.contains(&Pillar::Recovery));
        assert!(flagged.contains(&Pillar::Resilience));
    }

    #[test]
    fn test_snapshot_to_vitality_json() {
        let json = r#"{
            "sleep": {"duration": 480, "quality": 90},
            "hrv": {"readiness": 85},
            "activity": {"steps": 11000, "activeMinutes": 40},
            "nutrition": {"mealsLogged": 3, "waterIntake": 9},
            "mood": 5,
            "social": {"socialWellnessScore": 88}
        }"#;

        let output = snapshot_to_vitality_json(json.to_string()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["overall"]["name"], "primed");
        assert_eq!(value["score"], 96);
        assert_eq!(value["pillars"]["resilience"]["score"], 100.0);
        assert_eq!(value["pillars"]["fuel"]["factors"]["social"]["score"], 88.0);
        assert!(value["insights"]["pillarsNeedingAttention"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let result = snapshot_to_vitality_json("not valid json".to_string());
        assert!(matches!(result, Err(ComputeError::JsonError(_))));
    }

    #[test]
    fn test_processor_discards_superseded_results() {
        let processor = VitalityProcessor::new();

        let stale = processor.begin();
        let fresh = processor.begin();

        let state = calculate_vitality_state(&HealthSignalSnapshot::default());
        assert!(!processor.publish(stale, state.clone()));
        assert!(processor.latest().is_none());

        assert!(processor.publish(fresh, state.clone()));
        assert_eq!(processor.latest(), Some(state));
    }

    #[test]
    fn test_processor_keeps_latest() {
        let processor = VitalityProcessor::new();

        processor.process(&HealthSignalSnapshot::default()).unwrap();
        let state = processor.process(&sample_snapshot()).unwrap();

        assert_eq!(processor.latest().unwrap().score, state.score);
        assert_eq!(state.overall.name, VitalityLevel::Primed);

        let payload = processor.latest_json().unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["state"]["score"], 96);
    }

    #[test]
    fn test_processor_shared_across_threads() {
        let processor = Arc::new(VitalityProcessor::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let processor = Arc::clone(&processor);
                std::thread::spawn(move || {
                    let snapshot = HealthSignalSnapshot {
                        mood: Some(f64::from(i % 5 + 1)),
                        ..Default::default()
                    };
                    let _ = processor.process(&snapshot);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // A ticket issued after all workers finished always wins
        let last = processor.begin();
        let state = calculate_vitality_state(&HealthSignalSnapshot::default());
        assert!(processor.publish(last, state));
        assert_eq!(processor.latest().unwrap().score, 50);
    }

    fn snapshot_strategy() -> impl Strategy<Value = HealthSignalSnapshot> {
        (
            of((-100.0f64..1000.0, of(-50.0f64..150.0))),
            of((of(-20.0f64..150.0), of(-10.0f64..200.0))),
            of((-1_000.0f64..40_000.0, -10.0f64..300.0)),
            of((-2.0f64..10.0, -5.0f64..20.0)),
            of(-2.0f64..8.0),
            of((of(-20.0f64..150.0), -2.0f64..10.0, -2.0f64..10.0)),
            of(-5.0f64..15.0),
            (of(-1.0f64..5.0), of(-1.0f64..5.0)),
        )
            .prop_map(
                |(sleep, hrv, activity, nutrition, mood, social, stress, practices)| {
                    HealthSignalSnapshot {
                        sleep: sleep.map(|(duration, quality)| SleepSignal { duration, quality }),
                        hrv: hrv.map(|(readiness, rmssd)| HrvSignal { readiness, rmssd }),
                        activity: activity.map(|(steps, active_minutes)| ActivitySignal {
                            steps,
                            active_minutes,
                        }),
                        mindfulness: practices.0.map(|sessions| PracticeSignal { sessions }),
                        breathing: practices.1.map(|sessions| PracticeSignal { sessions }),
                        nutrition: nutrition.map(|(meals_logged, water_intake)| NutritionSignal {
                            meals_logged,
                            water_intake,
                        }),
                        mood,
                        social: social.map(|(score, interactions, unique_contacts)| SocialSignal {
                            social_wellness_score: score,
                            interactions,
                            unique_contacts,
                        }),
                        stress,
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn prop_scores_stay_in_range(snapshot in snapshot_strategy()) {
            let state = calculate_vitality_state_at(&snapshot, fixed_time());

            prop_assert!((0.0..=100.0).contains(&state.overall_score));
            prop_assert!(state.score <= 100);
            for (_, pillar) in state.pillars.iter() {
                prop_assert!((0.0..=100.0).contains(&pillar.score));
                for factor in pillar.factors.values() {
                    prop_assert!((0.0..=100.0).contains(&factor.score));
                    prop_assert!((0.0..=1.0).contains(&factor.weight));
                }
            }
        }

        #[test]
        fn prop_overall_is_fixed_weight_combination(snapshot in snapshot_strategy()) {
            let state = calculate_vitality_state_at(&snapshot, fixed_time());
            let expected = 0.40 * state.pillars.recovery.score
                + 0.35 * state.pillars.resilience.score
                + 0.25 * state.pillars.fuel.score;

            prop_assert!((state.overall_score - expected).abs() < 1e-9);
            prop_assert!((f64::from(state.score) - expected).abs() <= 0.5 + 1e-9);
        }

        #[test]
        fn prop_state_matches_displayed_score(snapshot in snapshot_strategy()) {
            let state = calculate_vitality_state_at(&snapshot, fixed_time());
            let expected = if state.pillars.has_data() {
                classify(f64::from(state.score))
            } else {
                NO_DATA_LEVEL
            };
            prop_assert_eq!(state.overall.name, expected);
        }

        #[test]
        fn prop_pipeline_is_idempotent(snapshot in snapshot_strategy()) {
            let first = calculate_vitality_state_at(&snapshot, fixed_time());
            let second = calculate_vitality_state_at(&snapshot, fixed_time());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_more_steps_never_lower_activity(
            low in -1_000.0f64..20_000.0,
            extra in 0.0f64..20_000.0,
            minutes in 0.0f64..120.0,
        ) {
            let base = ActivitySignal { steps: low, active_minutes: minutes };
            let more = ActivitySignal { steps: low + extra, active_minutes: minutes };
            prop_assert!(normalize_activity(&more) >= normalize_activity(&base));
        }
    }
}
