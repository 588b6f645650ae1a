mod engine;
mod phase;
mod plan;

pub use engine::{ClockAction, ClockState, SessionClock, TickOutcome};
pub use phase::{derive, Phase, PhaseSnapshot};
pub use plan::{WorkoutPlan, WorkoutRequest, WorkoutSummary};
