//! Session clock implementation.
//!
//! The clock is a tick-driven state machine. It does not use internal
//! threads or read the wall clock - the caller is responsible for calling
//! `tick()` once per second while the session should advance.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Cancelled
//!            |
//!            +-> Complete
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut clock = SessionClock::new(&plan);
//! clock.start()?;
//! // Once per second:
//! if let TickOutcome::Completed { .. } = clock.tick() { /* fire once */ }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::plan::WorkoutPlan;
use crate::error::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockState {
    Idle,
    Running,
    Paused,
    /// Elapsed time reached the plan total. Terminal.
    Complete,
    /// Stopped by the user before completion. Terminal.
    Cancelled,
}

impl ClockState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ClockState::Complete | ClockState::Cancelled)
    }
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClockState::Idle => "idle",
            ClockState::Running => "running",
            ClockState::Paused => "paused",
            ClockState::Complete => "complete",
            ClockState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Commands accepted by the clock, used to report rejected transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockAction {
    Start,
    Pause,
    Resume,
    Cancel,
}

impl fmt::Display for ClockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClockAction::Start => "start",
            ClockAction::Pause => "pause",
            ClockAction::Resume => "resume",
            ClockAction::Cancel => "cancel",
        };
        f.write_str(s)
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock was not running; the tick was discarded, not queued.
    Ignored,
    Advanced { elapsed_secs: u64 },
    /// Reached the total on this tick. Returned exactly once per session.
    Completed { elapsed_secs: u64 },
}

/// Single-writer elapsed-seconds counter for one workout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClock {
    state: ClockState,
    elapsed_secs: u64,
    total_secs: u64,
}

impl SessionClock {
    /// Create an idle clock for the given plan.
    pub fn new(plan: &WorkoutPlan) -> Self {
        Self {
            state: ClockState::Idle,
            elapsed_secs: 0,
            total_secs: plan.total_duration_secs(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn is_paused(&self) -> bool {
        self.state == ClockState::Paused
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed_secs >= self.total_secs
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ClockState::Idle => {
                self.elapsed_secs = 0;
                self.state = ClockState::Running;
                tracing::debug!(total_secs = self.total_secs, "clock started");
                Ok(())
            }
            from => Err(self.reject(ClockAction::Start, from)),
        }
    }

    pub fn pause(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ClockState::Running => {
                self.state = ClockState::Paused;
                tracing::debug!(elapsed_secs = self.elapsed_secs, "clock paused");
                Ok(())
            }
            from => Err(self.reject(ClockAction::Pause, from)),
        }
    }

    pub fn resume(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ClockState::Paused => {
                self.state = ClockState::Running;
                tracing::debug!(elapsed_secs = self.elapsed_secs, "clock resumed");
                Ok(())
            }
            from => Err(self.reject(ClockAction::Resume, from)),
        }
    }

    /// Stop the session for good.
    ///
    /// Returns `Ok(true)` when this call cancelled the session, and
    /// `Ok(false)` when the session had already completed or been
    /// cancelled (a no-op).
    pub fn cancel(&mut self) -> Result<bool, TransitionError> {
        match self.state {
            ClockState::Running | ClockState::Paused => {
                self.state = ClockState::Cancelled;
                tracing::debug!(elapsed_secs = self.elapsed_secs, "clock cancelled");
                Ok(true)
            }
            ClockState::Complete | ClockState::Cancelled => Ok(false),
            from @ ClockState::Idle => Err(self.reject(ClockAction::Cancel, from)),
        }
    }

    /// Advance by one second. Call from the single periodic tick source.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != ClockState::Running {
            return TickOutcome::Ignored;
        }

        self.elapsed_secs = (self.elapsed_secs + 1).min(self.total_secs);
        if self.elapsed_secs == self.total_secs {
            self.state = ClockState::Complete;
            tracing::debug!(elapsed_secs = self.elapsed_secs, "clock complete");
            TickOutcome::Completed {
                elapsed_secs: self.elapsed_secs,
            }
        } else {
            TickOutcome::Advanced {
                elapsed_secs: self.elapsed_secs,
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reject(&self, action: ClockAction, from: ClockState) -> TransitionError {
        tracing::debug!(%action, %from, "rejected clock transition");
        TransitionError { action, from }
    }
}
