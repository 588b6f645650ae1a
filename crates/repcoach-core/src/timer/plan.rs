use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Calories credited per completed rep. A flat estimate, not a model.
const CALORIES_PER_REP: f64 = 0.5;

/// A workout as requested by whoever starts a session.
///
/// The rep interval is not part of the request; it comes from settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutRequest {
    pub workout_name: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub break_secs: u32,
}

/// Immutable workout plan with its derived durations.
///
/// Only constructible through [`WorkoutPlan::new`], so every plan in
/// circulation has `sets`, `reps` and `rep_interval_secs` of at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkoutPlan {
    workout_name: String,
    sets: u32,
    reps: u32,
    rep_interval_secs: u32,
    break_secs: u32,
    set_duration_secs: u64,
    cycle_duration_secs: u64,
    total_duration_secs: u64,
}

/// Totals reported when a workout completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub total_reps: u64,
    pub calories: u64,
}

impl WorkoutPlan {
    pub fn new(
        workout_name: impl Into<String>,
        sets: u32,
        reps: u32,
        rep_interval_secs: u32,
        break_secs: u32,
    ) -> Result<Self, ValidationError> {
        for (field, value) in [
            ("sets", sets),
            ("reps", reps),
            ("rep_interval_secs", rep_interval_secs),
        ] {
            if value < 1 {
                return Err(ValidationError::NonPositive { field, value });
            }
        }

        // u32 * u32 always fits in u64.
        let set_duration_secs = u64::from(reps) * u64::from(rep_interval_secs);
        let cycle_duration_secs = set_duration_secs + u64::from(break_secs);
        let total_duration_secs = u64::from(sets)
            .checked_mul(set_duration_secs)
            .and_then(|work| {
                u64::from(sets - 1)
                    .checked_mul(u64::from(break_secs))
                    .and_then(|rest| work.checked_add(rest))
            })
            .ok_or(ValidationError::DurationOverflow)?;

        Ok(Self {
            workout_name: workout_name.into(),
            sets,
            reps,
            rep_interval_secs,
            break_secs,
            set_duration_secs,
            cycle_duration_secs,
            total_duration_secs,
        })
    }

    /// Build a plan from a request plus the rep interval read from settings.
    pub fn from_request(
        request: &WorkoutRequest,
        rep_interval_secs: u32,
    ) -> Result<Self, ValidationError> {
        Self::new(
            request.workout_name.clone(),
            request.sets,
            request.reps,
            rep_interval_secs,
            request.break_secs,
        )
    }

    pub fn workout_name(&self) -> &str {
        &self.workout_name
    }

    pub fn sets(&self) -> u32 {
        self.sets
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn rep_interval_secs(&self) -> u32 {
        self.rep_interval_secs
    }

    pub fn break_secs(&self) -> u32 {
        self.break_secs
    }

    /// `reps * rep_interval_secs`
    pub fn set_duration_secs(&self) -> u64 {
        self.set_duration_secs
    }

    /// One set plus its trailing break.
    pub fn cycle_duration_secs(&self) -> u64 {
        self.cycle_duration_secs
    }

    /// All sets plus the breaks between them. The last set has no break.
    pub fn total_duration_secs(&self) -> u64 {
        self.total_duration_secs
    }

    pub fn total_reps(&self) -> u64 {
        u64::from(self.sets) * u64::from(self.reps)
    }

    pub fn summary(&self) -> WorkoutSummary {
        let total_reps = self.total_reps();
        WorkoutSummary {
            total_reps,
            calories: (total_reps as f64 * CALORIES_PER_REP).round() as u64,
        }
    }
}
