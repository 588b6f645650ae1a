//! Elapsed-time to phase derivation.
//!
//! [`derive`] is the only place that turns the elapsed counter into set, rep
//! and break state. It is pure: no clock reads, no randomness, so the same
//! `(elapsed, plan)` pair always yields the same snapshot.

use serde::{Deserialize, Serialize};

use super::plan::WorkoutPlan;

/// Which part of a cycle the workout is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Reps,
    Break,
    Done,
}

/// Everything a view needs to render one tick of a workout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseSnapshot {
    pub elapsed_secs: u64,
    /// Zero-based; `sets - 1` once complete.
    pub current_set_index: u32,
    pub completed_reps_in_set: u32,
    pub is_in_break: bool,
    pub break_secs_remaining: u64,
    /// 0.0 ..= 1.0 within the current rep block or break.
    pub phase_fill: f64,
    /// 0.0 ..= 1.0 across the whole workout.
    pub overall_fill: f64,
    pub time_remaining_secs: u64,
    pub is_complete: bool,
}

impl PhaseSnapshot {
    pub fn phase(&self) -> Phase {
        if self.is_complete {
            Phase::Done
        } else if self.is_in_break {
            Phase::Break
        } else {
            Phase::Reps
        }
    }

    /// 1-based rep currently being performed, capped at `reps`.
    pub fn current_rep(&self, reps: u32) -> u32 {
        match self.phase() {
            Phase::Reps => (self.completed_reps_in_set + 1).min(reps),
            Phase::Break | Phase::Done => reps,
        }
    }
}

/// Derive the phase snapshot for `elapsed_secs` seconds into `plan`.
///
/// Values past the plan's total are clamped to the total.
pub fn derive(elapsed_secs: u64, plan: &WorkoutPlan) -> PhaseSnapshot {
    let total = plan.total_duration_secs();
    let elapsed = elapsed_secs.min(total);
    let overall_fill = if total > 0 {
        elapsed as f64 / total as f64
    } else {
        0.0
    };
    let time_remaining_secs = total - elapsed;

    if elapsed >= total {
        return PhaseSnapshot {
            elapsed_secs: elapsed,
            current_set_index: plan.sets() - 1,
            completed_reps_in_set: plan.reps(),
            is_in_break: false,
            break_secs_remaining: 0,
            phase_fill: 1.0,
            overall_fill,
            time_remaining_secs,
            is_complete: true,
        };
    }

    // The last set has no trailing break, so it must not spill into a
    // cycle index of its own.
    let cycle = plan.cycle_duration_secs();
    let cycle_index = (elapsed / cycle).min(u64::from(plan.sets() - 1));
    let time_in_cycle = elapsed - cycle_index * cycle;
    let set_duration = plan.set_duration_secs();

    let mut snapshot = PhaseSnapshot {
        elapsed_secs: elapsed,
        current_set_index: cycle_index as u32,
        completed_reps_in_set: 0,
        is_in_break: false,
        break_secs_remaining: 0,
        phase_fill: 0.0,
        overall_fill,
        time_remaining_secs,
        is_complete: false,
    };

    if time_in_cycle < set_duration {
        snapshot.completed_reps_in_set =
            (time_in_cycle / u64::from(plan.rep_interval_secs())) as u32;
        snapshot.phase_fill = time_in_cycle as f64 / set_duration as f64;
    } else {
        // Unreachable with a zero break: time_in_cycle < cycle == set_duration.
        let break_secs = u64::from(plan.break_secs());
        let break_elapsed = time_in_cycle - set_duration;
        snapshot.completed_reps_in_set = plan.reps();
        snapshot.is_in_break = true;
        snapshot.break_secs_remaining = break_secs.saturating_sub(break_elapsed);
        snapshot.phase_fill = break_elapsed as f64 / break_secs as f64;
    }

    snapshot
}
