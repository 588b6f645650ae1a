//! # repcoach Core Library
//!
//! This library provides the core logic for the repcoach guided workout
//! timer. Everything a workout view shows is derived from one elapsed-seconds
//! counter; the CLI binary and any GUI are thin layers over the same core.
//!
//! ## Architecture
//!
//! - **Session Clock**: a tick-driven state machine; the caller invokes
//!   `tick()` once per second
//! - **Phase Derivation**: a pure function from elapsed seconds and plan to
//!   set, rep and break state
//! - **Cues**: milestone windows over the same counter, fired once each
//! - **Storage**: TOML-backed settings with a key-value view
//!
//! ## Key Components
//!
//! - [`SessionClock`]: core clock state machine
//! - [`derive`]: phase derivation
//! - [`WorkoutSession`]: clock, derivation and cues behind one tick handler
//! - [`runner::run_session`]: async driver owning the periodic tick source
//! - [`Settings`]: per-session configuration

pub mod coach;
pub mod collaborators;
pub mod cues;
pub mod error;
pub mod events;
pub mod format;
pub mod runner;
pub mod session;
pub mod storage;
pub mod timer;

pub use coach::{Quote, Trainer};
pub use collaborators::{AwakeGuard, Collaborators, CuePlayer, KeepAwake, SessionObserver};
pub use cues::{CueId, CueTracker, MilestoneWindows};
pub use error::{ConfigError, CoreError, PlaybackError, TransitionError, ValidationError};
pub use events::Event;
pub use runner::{run_session, Command, SessionOutcome};
pub use session::WorkoutSession;
pub use storage::{KeyValueStore, MemoryStore, Settings};
pub use timer::{
    derive, ClockState, Phase, PhaseSnapshot, SessionClock, TickOutcome, WorkoutPlan,
    WorkoutRequest, WorkoutSummary,
};
