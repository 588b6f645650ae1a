use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cues::CueId;
use crate::timer::{ClockState, PhaseSnapshot, WorkoutSummary};

/// Every state change in a workout session produces an Event.
/// Views render from them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        workout_name: String,
        sets: u32,
        reps: u32,
        rep_interval_secs: u32,
        break_secs: u32,
        total_duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        session_id: Uuid,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        session_id: Uuid,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// User left before completion. Navigation should leave the workout screen.
    SessionCancelled {
        session_id: Uuid,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    MilestoneReached {
        session_id: Uuid,
        cue: CueId,
        elapsed_secs: u64,
        text: String,
        at: DateTime<Utc>,
    },
    /// Fired exactly once, on the tick that reaches the total duration.
    WorkoutCompleted {
        session_id: Uuid,
        summary: WorkoutSummary,
        quote: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        session_id: Uuid,
        state: ClockState,
        snapshot: PhaseSnapshot,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn session_id(&self) -> Uuid {
        match self {
            Event::SessionStarted { session_id, .. }
            | Event::SessionPaused { session_id, .. }
            | Event::SessionResumed { session_id, .. }
            | Event::SessionCancelled { session_id, .. }
            | Event::MilestoneReached { session_id, .. }
            | Event::WorkoutCompleted { session_id, .. }
            | Event::StateSnapshot { session_id, .. } => *session_id,
        }
    }
}
