//! Milestone cue windows and one-shot cue tracking.
//!
//! Every window is a pure function of the elapsed counter, so cues never
//! drift from the session clock. No per-cue timers exist.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// How long each milestone cue stays active, in seconds.
pub const MILESTONE_WINDOW_SECS: u64 = 3;

/// Start-cue window used when settings do not provide one.
pub const DEFAULT_START_DELAY_SECS: u64 = 5;

/// Ordered by when each cue becomes active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueId {
    Start,
    Quarter,
    Half,
    ThreeQuarter,
    Complete,
}

impl CueId {
    pub const ALL: [CueId; 5] = [
        CueId::Start,
        CueId::Quarter,
        CueId::Half,
        CueId::ThreeQuarter,
        CueId::Complete,
    ];
}

/// Cue activation windows for one workout, computed once at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneWindows {
    pub total_secs: u64,
    pub start_delay_secs: u64,
    pub quarter_secs: u64,
    pub half_secs: u64,
    pub three_quarter_secs: u64,
}

impl MilestoneWindows {
    pub fn new(total_secs: u64, start_delay_secs: u64) -> Self {
        Self {
            total_secs,
            start_delay_secs,
            quarter_secs: fraction_floor(total_secs, 1, 4),
            half_secs: fraction_floor(total_secs, 1, 2),
            three_quarter_secs: fraction_floor(total_secs, 3, 4),
        }
    }

    /// Elapsed second at which `cue` first becomes active.
    pub fn point(&self, cue: CueId) -> u64 {
        match cue {
            CueId::Start => 0,
            CueId::Quarter => self.quarter_secs,
            CueId::Half => self.half_secs,
            CueId::ThreeQuarter => self.three_quarter_secs,
            CueId::Complete => self.total_secs,
        }
    }

    pub fn is_active(&self, cue: CueId, elapsed_secs: u64) -> bool {
        match cue {
            CueId::Start => elapsed_secs <= self.start_delay_secs,
            CueId::Complete => elapsed_secs >= self.total_secs,
            milestone => {
                let from = self.point(milestone);
                elapsed_secs >= from && elapsed_secs < from.saturating_add(MILESTONE_WINDOW_SECS)
            }
        }
    }

    /// The trainer portrait replaces the countdown while a quarter, half or
    /// three-quarter window is open.
    pub fn shows_trainer(&self, elapsed_secs: u64) -> bool {
        [CueId::Quarter, CueId::Half, CueId::ThreeQuarter]
            .into_iter()
            .any(|cue| self.is_active(cue, elapsed_secs))
    }

    /// All cues active at `elapsed_secs`. Windows are independent and may
    /// overlap on short workouts.
    pub fn active_at(&self, elapsed_secs: u64) -> Vec<CueId> {
        CueId::ALL
            .into_iter()
            .filter(|&cue| self.is_active(cue, elapsed_secs))
            .collect()
    }
}

/// Turns "window active" into "fire once" for a single session.
///
/// Completion is not tracked here; the session clock reports it exactly once.
#[derive(Debug, Clone)]
pub struct CueTracker {
    windows: MilestoneWindows,
    fired: BTreeSet<CueId>,
}

impl CueTracker {
    pub fn new(windows: MilestoneWindows) -> Self {
        Self {
            windows,
            fired: BTreeSet::new(),
        }
    }

    pub fn windows(&self) -> &MilestoneWindows {
        &self.windows
    }

    pub fn has_fired(&self, cue: CueId) -> bool {
        self.fired.contains(&cue)
    }

    /// Record a new elapsed value and return the cues that fire now, in
    /// activation order.
    pub fn observe(&mut self, elapsed_secs: u64) -> Vec<CueId> {
        let newly: Vec<CueId> = CueId::ALL
            .into_iter()
            .filter(|&cue| cue != CueId::Complete)
            .filter(|cue| !self.fired.contains(cue))
            .filter(|&cue| self.windows.is_active(cue, elapsed_secs))
            .collect();
        self.fired.extend(newly.iter().copied());
        newly
    }
}

fn fraction_floor(value: u64, numerator: u64, denominator: u64) -> u64 {
    (u128::from(value) * u128::from(numerator) / u128::from(denominator)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_points_floor() {
        let w = MilestoneWindows::new(121, 5);
        assert_eq!(w.quarter_secs, 30);
        assert_eq!(w.half_secs, 60);
        assert_eq!(w.three_quarter_secs, 90);
    }

    #[test]
    fn milestone_window_is_three_seconds() {
        let w = MilestoneWindows::new(120, 5);
        assert!(!w.is_active(CueId::Quarter, 29));
        assert!(w.is_active(CueId::Quarter, 30));
        assert!(w.is_active(CueId::Quarter, 32));
        assert!(!w.is_active(CueId::Quarter, 33));
    }

    #[test]
    fn start_window_includes_delay_boundary() {
        let w = MilestoneWindows::new(120, 5);
        assert!(w.is_active(CueId::Start, 0));
        assert!(w.is_active(CueId::Start, 5));
        assert!(!w.is_active(CueId::Start, 6));
    }

    #[test]
    fn trainer_shows_only_in_quarter_windows() {
        let w = MilestoneWindows::new(120, 5);
        assert!(!w.shows_trainer(0));
        assert!(!w.shows_trainer(29));
        assert!(w.shows_trainer(30));
        assert!(w.shows_trainer(62));
        assert!(!w.shows_trainer(63));
        assert!(w.shows_trainer(92));
        assert!(!w.shows_trainer(120));
    }

    #[test]
    fn short_workout_windows_overlap() {
        let w = MilestoneWindows::new(4, 5);
        assert_eq!(
            w.active_at(2),
            vec![CueId::Start, CueId::Quarter, CueId::Half]
        );
        assert_eq!(
            w.active_at(4),
            vec![CueId::Start, CueId::Half, CueId::ThreeQuarter, CueId::Complete]
        );
    }

    #[test]
    fn tracker_fires_each_cue_once_in_order() {
        let mut t = CueTracker::new(MilestoneWindows::new(120, 5));
        let mut fired = Vec::new();
        for e in 0..=120 {
            for cue in t.observe(e) {
                fired.push((e, cue));
            }
        }
        assert_eq!(
            fired,
            vec![
                (0, CueId::Start),
                (30, CueId::Quarter),
                (60, CueId::Half),
                (90, CueId::ThreeQuarter),
            ]
        );
    }

    #[test]
    fn tracker_does_not_refire_on_repeated_observation() {
        let mut t = CueTracker::new(MilestoneWindows::new(120, 5));
        assert_eq!(t.observe(0), vec![CueId::Start]);
        assert!(t.observe(0).is_empty());
        assert!(t.observe(3).is_empty());
        assert!(t.has_fired(CueId::Start));
        assert!(!t.has_fired(CueId::Half));
    }

    #[test]
    fn tracker_fires_overlapping_cues_together() {
        let mut t = CueTracker::new(MilestoneWindows::new(2, 5));
        assert_eq!(t.observe(0), vec![CueId::Start, CueId::Quarter]);
        assert_eq!(t.observe(1), vec![CueId::Half, CueId::ThreeQuarter]);
        assert!(t.observe(2).is_empty());
    }
}
