//! A running workout: clock, phase derivation and cue detection behind one
//! tick handler.
//!
//! `on_tick()` is the only path that advances time. Every call that changes
//! state pushes [`Event`]s into an outbox the caller drains with
//! [`WorkoutSession::drain_events`], and notifies the collaborators directly.

use chrono::Utc;
use uuid::Uuid;

use crate::coach::{self, Quote};
use crate::collaborators::{AwakeGuard, Collaborators, CuePlayer, SessionObserver};
use crate::cues::{CueId, CueTracker, MilestoneWindows};
use crate::error::{CoreError, TransitionError};
use crate::events::Event;
use crate::storage::Settings;
use crate::timer::{
    derive, ClockState, PhaseSnapshot, SessionClock, TickOutcome, WorkoutPlan, WorkoutRequest,
    WorkoutSummary,
};

pub struct WorkoutSession {
    id: Uuid,
    plan: WorkoutPlan,
    settings: Settings,
    clock: SessionClock,
    cues: CueTracker,
    observer: Box<dyn SessionObserver>,
    player: Box<dyn CuePlayer>,
    awake: AwakeGuard,
    outbox: Vec<Event>,
    summary: Option<WorkoutSummary>,
}

impl WorkoutSession {
    /// Validate the request and start a session.
    ///
    /// The rep interval comes from `settings`, read once here.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed plan; the clock never
    /// starts in that case.
    pub fn start(
        request: &WorkoutRequest,
        settings: Settings,
        collaborators: Collaborators,
    ) -> Result<Self, CoreError> {
        let plan = WorkoutPlan::from_request(request, settings.rep_interval_secs)?;
        Self::start_plan(plan, settings, collaborators)
    }

    /// Start a session for an already-validated plan.
    pub fn start_plan(
        plan: WorkoutPlan,
        settings: Settings,
        collaborators: Collaborators,
    ) -> Result<Self, CoreError> {
        let mut clock = SessionClock::new(&plan);
        clock.start()?;

        let windows = MilestoneWindows::new(
            plan.total_duration_secs(),
            u64::from(settings.start_delay_secs),
        );
        let Collaborators {
            observer,
            player,
            keep_awake,
        } = collaborators;

        let mut session = Self {
            id: Uuid::new_v4(),
            plan,
            settings,
            clock,
            cues: CueTracker::new(windows),
            observer,
            player,
            awake: AwakeGuard::acquire(keep_awake),
            outbox: Vec::new(),
            summary: None,
        };

        tracing::info!(
            session_id = %session.id,
            workout = session.plan.workout_name(),
            total_secs = session.plan.total_duration_secs(),
            "workout started"
        );
        session.outbox.push(Event::SessionStarted {
            session_id: session.id,
            workout_name: session.plan.workout_name().to_string(),
            sets: session.plan.sets(),
            reps: session.plan.reps(),
            rep_interval_secs: session.plan.rep_interval_secs(),
            break_secs: session.plan.break_secs(),
            total_duration_secs: session.plan.total_duration_secs(),
            at: Utc::now(),
        });
        session.fire_cues(0);
        Ok(session)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.clock.elapsed_secs()
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Completed or cancelled. No further ticks will be processed.
    pub fn is_finished(&self) -> bool {
        self.clock.state().is_terminal()
    }

    pub fn is_keeping_awake(&self) -> bool {
        self.awake.is_held()
    }

    /// Present once the workout has completed.
    pub fn summary(&self) -> Option<WorkoutSummary> {
        self.summary
    }

    pub fn windows(&self) -> &MilestoneWindows {
        self.cues.windows()
    }

    pub fn snapshot(&self) -> PhaseSnapshot {
        derive(self.clock.elapsed_secs(), &self.plan)
    }

    /// Cues whose windows are open right now, for re-rendering.
    pub fn active_cues(&self) -> Vec<CueId> {
        self.cues.windows().active_at(self.clock.elapsed_secs())
    }

    /// Portrait of the configured trainer while a milestone window is open.
    pub fn trainer_portrait(&self) -> Option<&'static str> {
        self.cues
            .windows()
            .shows_trainer(self.clock.elapsed_secs())
            .then(|| self.settings.trainer.portrait())
    }

    pub fn state_event(&self) -> Event {
        Event::StateSnapshot {
            session_id: self.id,
            state: self.clock.state(),
            snapshot: self.snapshot(),
            at: Utc::now(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Handle one tick from the periodic source.
    ///
    /// Returns `None` when the tick was discarded (paused or finished).
    pub fn on_tick(&mut self) -> Option<PhaseSnapshot> {
        let (elapsed_secs, completed) = match self.clock.tick() {
            TickOutcome::Ignored => return None,
            TickOutcome::Advanced { elapsed_secs } => (elapsed_secs, false),
            TickOutcome::Completed { elapsed_secs } => (elapsed_secs, true),
        };

        let snapshot = derive(elapsed_secs, &self.plan);
        self.observer.on_tick(&snapshot);
        self.fire_cues(elapsed_secs);
        if completed {
            self.complete();
        }
        Some(snapshot)
    }

    pub fn pause(&mut self) -> Result<(), TransitionError> {
        self.clock.pause()?;
        self.outbox.push(Event::SessionPaused {
            session_id: self.id,
            elapsed_secs: self.clock.elapsed_secs(),
            at: Utc::now(),
        });
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TransitionError> {
        self.clock.resume()?;
        self.outbox.push(Event::SessionResumed {
            session_id: self.id,
            elapsed_secs: self.clock.elapsed_secs(),
            at: Utc::now(),
        });
        Ok(())
    }

    /// Flip between running and paused.
    pub fn toggle_pause(&mut self) -> Result<(), TransitionError> {
        if self.clock.is_paused() {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Cancel the session. A no-op once completed or already cancelled.
    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        if !self.clock.cancel()? {
            return Ok(());
        }

        let elapsed_secs = self.clock.elapsed_secs();
        tracing::info!(session_id = %self.id, elapsed_secs, "workout cancelled");
        self.player.stop();
        self.awake.release();
        self.observer.on_cancel();
        self.outbox.push(Event::SessionCancelled {
            session_id: self.id,
            elapsed_secs,
            at: Utc::now(),
        });
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn fire_cues(&mut self, elapsed_secs: u64) {
        for cue in self.cues.observe(elapsed_secs) {
            let Some(quote) = coach::milestone_quote(cue, self.settings.trainer) else {
                continue;
            };
            tracing::debug!(session_id = %self.id, ?cue, elapsed_secs, "cue fired");
            self.observer.on_milestone(cue, &quote);
            self.play(&quote);
            self.outbox.push(Event::MilestoneReached {
                session_id: self.id,
                cue,
                elapsed_secs,
                text: quote.text,
                at: Utc::now(),
            });
        }
    }

    fn complete(&mut self) {
        let summary = self.plan.summary();
        let quote = coach::completion_quote(self.settings.trainer, &mut rand::thread_rng());
        self.summary = Some(summary);

        tracing::info!(
            session_id = %self.id,
            total_reps = summary.total_reps,
            calories = summary.calories,
            "workout completed"
        );
        self.observer.on_complete(&summary, &quote);
        self.play(&quote);
        self.awake.release();
        self.outbox.push(Event::WorkoutCompleted {
            session_id: self.id,
            summary,
            quote: quote.text,
            at: Utc::now(),
        });
    }

    fn play(&mut self, quote: &Quote) {
        if !self.settings.sounds_enabled {
            return;
        }
        if let Err(e) = self.player.play(&quote.audio) {
            tracing::warn!(asset = %quote.audio, error = %e, "cue audio failed");
        }
    }
}

impl std::fmt::Debug for WorkoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkoutSession")
            .field("id", &self.id)
            .field("plan", &self.plan)
            .field("clock", &self.clock)
            .field("awake", &self.awake)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::KeepAwake;
    use crate::error::PlaybackError;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Note {
        Milestone(CueId),
        Complete(WorkoutSummary),
        Cancel,
        Played(String),
        Awake(bool),
    }

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<Note>>>);

    impl Log {
        fn push(&self, note: Note) {
            self.0.lock().unwrap().push(note);
        }
        fn notes(&self) -> Vec<Note> {
            self.0.lock().unwrap().clone()
        }
        fn count(&self, pred: impl Fn(&Note) -> bool) -> usize {
            self.notes().iter().filter(|n| pred(n)).count()
        }
    }

    impl SessionObserver for Log {
        fn on_milestone(&mut self, cue: CueId, _quote: &Quote) {
            self.push(Note::Milestone(cue));
        }
        fn on_complete(&mut self, summary: &WorkoutSummary, _quote: &Quote) {
            self.push(Note::Complete(*summary));
        }
        fn on_cancel(&mut self) {
            self.push(Note::Cancel);
        }
    }

    struct LogPlayer {
        log: Log,
        fail: bool,
    }

    impl CuePlayer for LogPlayer {
        fn play(&mut self, asset: &str) -> Result<(), PlaybackError> {
            if self.fail {
                return Err(PlaybackError::DeviceUnavailable("muted".into()));
            }
            self.log.push(Note::Played(asset.to_string()));
            Ok(())
        }
    }

    impl KeepAwake for Log {
        fn activate(&mut self) {
            self.push(Note::Awake(true));
        }
        fn deactivate(&mut self) {
            self.push(Note::Awake(false));
        }
    }

    fn request(sets: u32, reps: u32, break_secs: u32) -> WorkoutRequest {
        WorkoutRequest {
            workout_name: "Test Workout".into(),
            sets,
            reps,
            break_secs,
        }
    }

    fn collaborators(log: &Log, failing_audio: bool) -> Collaborators {
        Collaborators {
            observer: Box::new(log.clone()),
            player: Box::new(LogPlayer {
                log: log.clone(),
                fail: failing_audio,
            }),
            keep_awake: Box::new(log.clone()),
        }
    }

    fn start(req: WorkoutRequest, log: &Log) -> WorkoutSession {
        WorkoutSession::start(&req, Settings::default(), collaborators(log, false)).unwrap()
    }

    #[test]
    fn malformed_plan_never_starts() {
        let log = Log::default();
        let err = WorkoutSession::start(&request(0, 10, 5), Settings::default(), collaborators(&log, false))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(log.notes().is_empty());
    }

    #[test]
    fn start_fires_start_cue_and_acquires_wake_lock() {
        let log = Log::default();
        let mut s = start(request(3, 15, 15), &log);
        assert_eq!(s.state(), ClockState::Running);
        assert!(s.is_keeping_awake());
        assert_eq!(
            log.notes(),
            vec![
                Note::Awake(true),
                Note::Milestone(CueId::Start),
                Note::Played("give_me_everything_1.mp3".into()),
            ]
        );
        let events = s.drain_events();
        assert!(matches!(events[0], Event::SessionStarted { total_duration_secs: 120, .. }));
        assert!(matches!(events[1], Event::MilestoneReached { cue: CueId::Start, .. }));
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn full_run_fires_every_cue_once_and_completes_once() {
        let log = Log::default();
        let mut s = start(request(3, 15, 15), &log);
        let mut ticks = 0;
        while !s.is_finished() {
            s.on_tick();
            ticks += 1;
        }
        assert_eq!(ticks, 120);
        for _ in 0..10 {
            assert!(s.on_tick().is_none());
        }

        let milestones: Vec<Note> = log
            .notes()
            .into_iter()
            .filter(|n| matches!(n, Note::Milestone(_)))
            .collect();
        assert_eq!(
            milestones,
            vec![
                Note::Milestone(CueId::Start),
                Note::Milestone(CueId::Quarter),
                Note::Milestone(CueId::Half),
                Note::Milestone(CueId::ThreeQuarter),
            ]
        );
        assert_eq!(log.count(|n| matches!(n, Note::Complete(_))), 1);
        assert!(log.notes().contains(&Note::Complete(WorkoutSummary {
            total_reps: 45,
            calories: 23
        })));
        assert_eq!(s.summary().map(|x| x.total_reps), Some(45));
        assert!(!s.is_keeping_awake());
        assert_eq!(log.notes().last(), Some(&Note::Awake(false)));
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let log = Log::default();
        let mut s = start(request(3, 15, 15), &log);
        for _ in 0..10 {
            s.on_tick();
        }
        s.pause().unwrap();
        for _ in 0..30 {
            assert!(s.on_tick().is_none());
        }
        assert_eq!(s.elapsed_secs(), 10);
        s.resume().unwrap();
        assert_eq!(s.on_tick().map(|snap| snap.elapsed_secs), Some(11));
    }

    #[test]
    fn toggle_pause_flips_state() {
        let log = Log::default();
        let mut s = start(request(1, 5, 0), &log);
        s.toggle_pause().unwrap();
        assert!(s.is_paused());
        s.toggle_pause().unwrap();
        assert!(!s.is_paused());
    }

    #[test]
    fn cancel_while_paused_terminates_without_ticking() {
        let log = Log::default();
        let mut s = start(request(3, 15, 15), &log);
        s.on_tick();
        s.pause().unwrap();
        s.on_tick();
        s.cancel().unwrap();

        assert_eq!(s.state(), ClockState::Cancelled);
        assert_eq!(s.elapsed_secs(), 1);
        assert!(s.on_tick().is_none());
        assert!(!s.is_keeping_awake());
        assert_eq!(log.count(|n| *n == Note::Cancel), 1);
        assert!(s
            .drain_events()
            .iter()
            .any(|e| matches!(e, Event::SessionCancelled { elapsed_secs: 1, .. })));
    }

    #[test]
    fn cancel_after_completion_is_noop() {
        let log = Log::default();
        let mut s = start(request(1, 1, 0), &log);
        s.on_tick();
        assert!(s.is_finished());
        s.drain_events();
        s.cancel().unwrap();
        assert_eq!(s.state(), ClockState::Complete);
        assert_eq!(log.count(|n| *n == Note::Cancel), 0);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn audio_failure_does_not_affect_timing() {
        let log = Log::default();
        let mut s =
            WorkoutSession::start(&request(1, 3, 0), Settings::default(), collaborators(&log, true))
                .unwrap();
        while !s.is_finished() {
            s.on_tick();
        }
        assert_eq!(s.elapsed_secs(), 6);
        assert_eq!(log.count(|n| matches!(n, Note::Played(_))), 0);
        assert_eq!(log.count(|n| matches!(n, Note::Complete(_))), 1);
    }

    #[test]
    fn sounds_disabled_skips_playback_but_still_notifies() {
        let log = Log::default();
        let settings = Settings {
            sounds_enabled: false,
            ..Settings::default()
        };
        let mut s = WorkoutSession::start(&request(1, 2, 0), settings, collaborators(&log, false))
            .unwrap();
        while !s.is_finished() {
            s.on_tick();
        }
        assert_eq!(log.count(|n| matches!(n, Note::Played(_))), 0);
        assert!(log.count(|n| matches!(n, Note::Milestone(_))) >= 1);
    }

    #[test]
    fn dropping_a_running_session_releases_wake_lock() {
        let log = Log::default();
        let s = start(request(3, 15, 15), &log);
        drop(s);
        assert_eq!(log.notes().last(), Some(&Note::Awake(false)));
    }

    #[test]
    fn trainer_portrait_shows_during_milestone_windows() {
        let log = Log::default();
        let settings = Settings {
            trainer: crate::coach::Trainer::Lina,
            ..Settings::default()
        };
        let mut s = WorkoutSession::start(&request(3, 15, 15), settings, collaborators(&log, false))
            .unwrap();
        assert_eq!(s.trainer_portrait(), None);
        let mut shown = Vec::new();
        while !s.is_finished() {
            s.on_tick();
            if s.trainer_portrait().is_some() {
                shown.push(s.elapsed_secs());
            }
        }
        assert_eq!(shown, vec![30, 31, 32, 60, 61, 62, 90, 91, 92]);
        assert_eq!(s.trainer_portrait(), None);
    }

    #[test]
    fn active_cues_follow_elapsed() {
        let log = Log::default();
        let mut s = start(request(3, 15, 15), &log);
        assert_eq!(s.active_cues(), vec![CueId::Start]);
        for _ in 0..30 {
            s.on_tick();
        }
        assert_eq!(s.active_cues(), vec![CueId::Quarter]);
    }

    #[test]
    fn rep_interval_comes_from_settings() {
        let log = Log::default();
        let settings = Settings {
            rep_interval_secs: 3,
            ..Settings::default()
        };
        let s = WorkoutSession::start(&request(2, 10, 20), settings, collaborators(&log, false))
            .unwrap();
        assert_eq!(s.plan().total_duration_secs(), 2 * 30 + 20);
    }
}
