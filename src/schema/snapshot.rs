//! Range checks for health-signal snapshots
//!
//! Validation is advisory: the pipeline scores any snapshot and clamps
//! out-of-range values, but callers can use these checks to surface suspect
//! input before it reaches users.

use crate::types::HealthSignalSnapshot;

/// Snapshot schema identifier
pub const SNAPSHOT_SCHEMA_VERSION: &str = "vitality.snapshot.v1";

/// Accepted range for one numeric field
struct FieldRange {
    field: &'static str,
    min: f64,
    max: f64,
}

const SLEEP_DURATION: FieldRange = FieldRange {
    field: "sleep.duration",
    min: 0.0,
    max: 1440.0,
};
const SLEEP_QUALITY: FieldRange = FieldRange {
    field: "sleep.quality",
    min: 0.0,
    max: 100.0,
};
const HRV_READINESS: FieldRange = FieldRange {
    field: "hrv.readiness",
    min: 0.0,
    max: 100.0,
};
const HRV_RMSSD: FieldRange = FieldRange {
    field: "hrv.rmssd",
    min: 0.0,
    max: 500.0,
};
const STEPS: FieldRange = FieldRange {
    field: "activity.steps",
    min: 0.0,
    max: 200_000.0,
};
const MINDFULNESS_SESSIONS: FieldRange = FieldRange {
    field: "mindfulness.sessions",
    min: 0.0,
    max: 100.0,
};
const BREATHING_SESSIONS: FieldRange = FieldRange {
    field: "breathing.sessions",
    min: 0.0,
    max: 100.0,
};
const MEALS_LOGGED: FieldRange = FieldRange {
    field: "nutrition.mealsLogged",
    min: 0.0,
    max: 20.0,
};
const INTERACTIONS: FieldRange = FieldRange {
    field: "social.interactions",
    min: 0.0,
    max: 1000.0,
};
const UNIQUE_CONTACTS: FieldRange = FieldRange {
    field: "social.uniqueContacts",
    min: 0.0,
    max: 1000.0,
};
const ACTIVE_MINUTES: FieldRange = FieldRange {
    field: "activity.activeMinutes",
    min: 0.0,
    max: 1440.0,
};
const WATER_INTAKE: FieldRange = FieldRange {
    field: "nutrition.waterIntake",
    min: 0.0,
    max: 100.0,
};
const MOOD: FieldRange = FieldRange {
    field: "mood",
    min: 1.0,
    max: 5.0,
};
const SOCIAL_WELLNESS: FieldRange = FieldRange {
    field: "social.socialWellnessScore",
    min: 0.0,
    max: 100.0,
};
const STRESS: FieldRange = FieldRange {
    field: "stress",
    min: 0.0,
    max: 10.0,
};

impl FieldRange {
    fn check(&self, value: f64, errors: &mut Vec<ValidationError>) {
        if !value.is_finite() || value < self.min || value > self.max {
            errors.push(ValidationError::OutOfRange {
                field: self.field.to_string(),
                value,
                min: self.min,
                max: self.max,
            });
        }
    }
}

/// Validation errors for snapshots
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} = {value} is outside the expected range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("hrv record carries neither readiness nor rmssd")]
    EmptyHrvRecord,
}

/// Check every present field of a snapshot; returns all problems found
pub fn validate_snapshot(snapshot: &HealthSignalSnapshot) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(sleep) = &snapshot.sleep {
        SLEEP_DURATION.check(sleep.duration, &mut errors);
        if let Some(quality) = sleep.quality {
            SLEEP_QUALITY.check(quality, &mut errors);
        }
    }

    if let Some(hrv) = &snapshot.hrv {
        if hrv.readiness.is_none() && hrv.rmssd.is_none() {
            errors.push(ValidationError::EmptyHrvRecord);
        }
        if let Some(readiness) = hrv.readiness {
            HRV_READINESS.check(readiness, &mut errors);
        }
        if let Some(rmssd) = hrv.rmssd {
            HRV_RMSSD.check(rmssd, &mut errors);
        }
    }

    if let Some(activity) = &snapshot.activity {
        STEPS.check(activity.steps, &mut errors);
        ACTIVE_MINUTES.check(activity.active_minutes, &mut errors);
    }

    if let Some(mindfulness) = &snapshot.mindfulness {
        MINDFULNESS_SESSIONS.check(mindfulness.sessions, &mut errors);
    }
    if let Some(breathing) = &snapshot.breathing {
        BREATHING_SESSIONS.check(breathing.sessions, &mut errors);
    }

    if let Some(nutrition) = &snapshot.nutrition {
        MEALS_LOGGED.check(nutrition.meals_logged, &mut errors);
        WATER_INTAKE.check(nutrition.water_intake, &mut errors);
    }

    if let Some(mood) = snapshot.mood {
        MOOD.check(mood, &mut errors);
    }

    if let Some(social) = &snapshot.social {
        if let Some(score) = social.social_wellness_score {
            SOCIAL_WELLNESS.check(score, &mut errors);
        }
        INTERACTIONS.check(social.interactions, &mut errors);
        UNIQUE_CONTACTS.check(social.unique_contacts, &mut errors);
    }

    if let Some(stress) = snapshot.stress {
        STRESS.check(stress, &mut errors);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivitySignal, HrvSignal, PracticeSignal, SleepSignal};

    #[test]
    fn test_empty_snapshot_is_valid() {
        assert!(validate_snapshot(&HealthSignalSnapshot::default()).is_empty());
    }

    #[test]
    fn test_out_of_range_fields() {
        let snapshot = HealthSignalSnapshot {
            sleep: Some(SleepSignal {
                duration: 480.0,
                quality: Some(140.0),
            }),
            mood: Some(0.0),
            stress: Some(4.0),
            ..Default::default()
        };

        let errors = validate_snapshot(&snapshot);

        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            ValidationError::OutOfRange { field, .. } if field == "sleep.quality"
        ));
        assert!(matches!(
            &errors[1],
            ValidationError::OutOfRange { field, .. } if field == "mood"
        ));
    }

    #[test]
    fn test_negative_counts_are_reported() {
        let snapshot = HealthSignalSnapshot {
            activity: Some(ActivitySignal {
                steps: -500.0,
                active_minutes: 20.0,
            }),
            breathing: Some(PracticeSignal { sessions: -1.0 }),
            ..Default::default()
        };

        let errors = validate_snapshot(&snapshot);

        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            ValidationError::OutOfRange { field, value, .. }
                if field == "activity.steps" && *value == -500.0
        ));
        assert!(matches!(
            &errors[1],
            ValidationError::OutOfRange { field, .. } if field == "breathing.sessions"
        ));
    }

    #[test]
    fn test_empty_hrv_record() {
        let snapshot = HealthSignalSnapshot {
            hrv: Some(HrvSignal::default()),
            ..Default::default()
        };

        assert_eq!(
            validate_snapshot(&snapshot),
            vec![ValidationError::EmptyHrvRecord]
        );
    }

    #[test]
    fn test_error_message() {
        let err = ValidationError::OutOfRange {
            field: "stress".to_string(),
            value: 12.0,
            min: 0.0,
            max: 10.0,
        };
        assert_eq!(
            err.to_string(),
            "stress = 12 is outside the expected range [0, 10]"
        );
    }
}
