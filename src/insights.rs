//! Insight generation
//!
//! Turns a classified state and its pillar scores into user-facing text. All
//! text comes from fixed tables keyed by state and pillar.

use crate::types::{Insights, OverallState, Pillar, PillarAttention, PillarScores, VitalityLevel};

/// Pillars scoring strictly below this are flagged for attention
pub const ATTENTION_THRESHOLD: f64 = 60.0;

/// Improvement suggestions for a pillar
pub fn pillar_suggestions(pillar: Pillar) -> &'static [&'static str] {
    match pillar {
        Pillar::Recovery => &[
            "Aim for 7-9 hours of sleep tonight",
            "Wind down with a screen-free hour before bed",
            "Try a short breathing exercise to lower stress",
        ],
        Pillar::Resilience => &[
            "Take a 20-minute walk to build daily movement",
            "Add a 5-minute mindfulness session",
            "Break up long periods of sitting with light stretching",
        ],
        Pillar::Fuel => &[
            "Log at least two balanced meals today",
            "Drink 8 glasses of water",
            "Reach out to a friend or family member",
        ],
    }
}

/// Recommended actions for a state
pub fn state_recommendations(level: VitalityLevel) -> &'static [&'static str] {
    match level {
        VitalityLevel::Recovering => &[
            "Choose restorative activities like yoga or an easy walk",
            "Go to bed 30 minutes earlier than usual",
            "Keep today's commitments light where you can",
        ],
        VitalityLevel::Balanced => &[
            "Keep your current sleep and activity routine",
            "Try a moderate workout to build momentum",
            "Schedule time to connect with someone you care about",
        ],
        VitalityLevel::Primed => &[
            "Tackle your most demanding workout or project today",
            "Set a stretch goal while your energy is high",
            "Share your energy by helping someone else",
        ],
    }
}

/// Insight generator for producing explainable output
pub struct InsightGenerator;

impl InsightGenerator {
    /// Build insights for a classified state
    pub fn generate(state: &OverallState, pillars: &PillarScores) -> Insights {
        let mut pillars_needing_attention: Vec<PillarAttention> = pillars
            .iter()
            .filter(|(_, score)| score.score < ATTENTION_THRESHOLD)
            .map(|(pillar, score)| PillarAttention {
                name: pillar,
                score: score.score,
                suggestions: to_strings(pillar_suggestions(pillar)),
            })
            .collect();

        // Lowest first; stable sort keeps pillar order on ties
        pillars_needing_attention.sort_by(|a, b| a.score.total_cmp(&b.score));

        Insights {
            primary: state.message.clone(),
            focus: state.focus.clone(),
            recommendations: to_strings(state_recommendations(state.name)),
            pillars_needing_attention,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::overall_state;
    use crate::types::PillarScore;
    use std::collections::BTreeMap;

    fn scores(recovery: f64, resilience: f64, fuel: f64) -> PillarScores {
        let pillar = |score: f64, weight: f64| PillarScore {
            score,
            factors: BTreeMap::new(),
            weight,
        };
        PillarScores {
            recovery: pillar(recovery, 0.40),
            resilience: pillar(resilience, 0.35),
            fuel: pillar(fuel, 0.25),
        }
    }

    #[test]
    fn test_primary_and_focus_come_from_state() {
        let state = overall_state(VitalityLevel::Balanced);
        let insights = InsightGenerator::generate(&state, &scores(70.0, 70.0, 70.0));

        assert_eq!(insights.primary, state.message);
        assert_eq!(insights.focus, state.focus);
        assert_eq!(
            insights.recommendations,
            to_strings(state_recommendations(VitalityLevel::Balanced))
        );
        assert!(insights.pillars_needing_attention.is_empty());
    }

    #[test]
    fn test_attention_threshold_is_strict() {
        let state = overall_state(VitalityLevel::Balanced);
        let insights = InsightGenerator::generate(&state, &scores(59.0, 60.0, 80.0));

        assert_eq!(insights.pillars_needing_attention.len(), 1);
        let flagged = &insights.pillars_needing_attention[0];
        assert_eq!(flagged.name, Pillar::Recovery);
        assert_eq!(flagged.score, 59.0);
        assert_eq!(flagged.suggestions, to_strings(pillar_suggestions(Pillar::Recovery)));
    }

    #[test]
    fn test_attention_ranked_lowest_first() {
        let state = overall_state(VitalityLevel::Recovering);
        let insights = InsightGenerator::generate(&state, &scores(45.0, 20.0, 45.0));

        let names: Vec<Pillar> = insights
            .pillars_needing_attention
            .iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec![Pillar::Resilience, Pillar::Recovery, Pillar::Fuel]);
    }

    #[test]
    fn test_tables_have_entries() {
        for pillar in Pillar::ALL {
            assert_eq!(pillar_suggestions(pillar).len(), 3);
        }
        for level in [
            VitalityLevel::Recovering,
            VitalityLevel::Balanced,
            VitalityLevel::Primed,
        ] {
            assert_eq!(state_recommendations(level).len(), 3);
        }
    }
}
