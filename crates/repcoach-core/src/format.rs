//! Countdown and counter text for workout views.

use crate::timer::PhaseSnapshot;

/// `MM:SS`, or `HH:MM:SS` once the value reaches an hour.
pub fn format_clock(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// `"<completed>/<reps>"` for the rep ring.
pub fn rep_counter(snapshot: &PhaseSnapshot, reps: u32) -> String {
    format!("{}/{}", snapshot.completed_reps_in_set, reps)
}
