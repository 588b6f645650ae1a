//! Seams to the world outside the workout core.
//!
//! Rendering, navigation, audio and the display wake lock all live behind
//! these traits. The session only ever calls into them; none of them can
//! stop or corrupt the clock.

use crate::coach::Quote;
use crate::cues::CueId;
use crate::error::PlaybackError;
use crate::timer::{PhaseSnapshot, WorkoutSummary};

/// Receives one-shot session notifications.
pub trait SessionObserver: Send {
    /// Called after every tick that advanced the clock.
    fn on_tick(&mut self, _snapshot: &PhaseSnapshot) {}

    fn on_milestone(&mut self, cue: CueId, quote: &Quote);

    fn on_complete(&mut self, summary: &WorkoutSummary, quote: &Quote);

    /// The user cancelled; leave the workout screen.
    fn on_cancel(&mut self);
}

/// Plays cue audio. Fire-and-forget: a new request may replace a sound
/// that is still playing.
pub trait CuePlayer: Send {
    fn play(&mut self, asset: &str) -> Result<(), PlaybackError>;

    fn stop(&mut self) {}
}

/// Keeps the display awake while a workout runs.
pub trait KeepAwake: Send {
    fn activate(&mut self);
    fn deactivate(&mut self);
}

/// Observer that ignores everything.
#[derive(Debug, Default)]
pub struct NullObserver;

impl SessionObserver for NullObserver {
    fn on_milestone(&mut self, _cue: CueId, _quote: &Quote) {}
    fn on_complete(&mut self, _summary: &WorkoutSummary, _quote: &Quote) {}
    fn on_cancel(&mut self) {}
}

/// Player for environments without audio.
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl CuePlayer for SilentPlayer {
    fn play(&mut self, asset: &str) -> Result<(), PlaybackError> {
        tracing::trace!(asset, "silent player skipped cue audio");
        Ok(())
    }
}

/// Wake lock for environments without a display to keep on.
#[derive(Debug, Default)]
pub struct NoopKeepAwake;

impl KeepAwake for NoopKeepAwake {
    fn activate(&mut self) {}
    fn deactivate(&mut self) {}
}

/// Holds the wake lock for as long as it lives.
///
/// Released on `Drop`, so cancel, completion, navigation away and unwinding
/// all let the display sleep again.
pub struct AwakeGuard {
    inner: Option<Box<dyn KeepAwake>>,
}

impl AwakeGuard {
    pub fn acquire(mut keep_awake: Box<dyn KeepAwake>) -> Self {
        keep_awake.activate();
        tracing::debug!("keep-awake acquired");
        Self {
            inner: Some(keep_awake),
        }
    }

    pub fn is_held(&self) -> bool {
        self.inner.is_some()
    }

    /// Release early. Idempotent.
    pub fn release(&mut self) {
        if let Some(mut keep_awake) = self.inner.take() {
            keep_awake.deactivate();
            tracing::debug!("keep-awake released");
        }
    }
}

impl Drop for AwakeGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for AwakeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwakeGuard")
            .field("held", &self.is_held())
            .finish()
    }
}

/// The full set of collaborators handed to a session.
pub struct Collaborators {
    pub observer: Box<dyn SessionObserver>,
    pub player: Box<dyn CuePlayer>,
    pub keep_awake: Box<dyn KeepAwake>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            observer: Box::new(NullObserver),
            player: Box::new(SilentPlayer),
            keep_awake: Box::new(NoopKeepAwake),
        }
    }
}
