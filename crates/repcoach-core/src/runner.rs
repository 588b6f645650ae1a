//! Async tick driver for a [`WorkoutSession`].
//!
//! One task owns the session, the single periodic tick source and the
//! command channel. Commands are applied between ticks, so the session has
//! exactly one writer. On pause or cancel the interval is dropped before
//! the loop polls again: a tick can never land after either returns.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::events::Event;
use crate::session::WorkoutSession;
use crate::timer::WorkoutSummary;

/// Period of the workout clock.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Serialized user commands for a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    TogglePause,
    Cancel,
}

/// How a driven session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed(WorkoutSummary),
    Cancelled { elapsed_secs: u64 },
}

/// Drive `session` until it completes or is cancelled.
///
/// `on_event` receives every event the session emits, in order. If the
/// command channel closes, a running session keeps going to completion and a
/// paused one is cancelled, since nothing is left to resume it.
pub async fn run_session<F>(
    session: &mut WorkoutSession,
    mut commands: mpsc::Receiver<Command>,
    period: Duration,
    mut on_event: F,
) -> SessionOutcome
where
    F: FnMut(Event),
{
    let mut ticker = (!session.is_finished() && !session.is_paused()).then(|| new_ticker(period));
    let mut commands_open = true;
    flush(session, &mut on_event);

    while !session.is_finished() {
        tokio::select! {
            biased;

            cmd = commands.recv(), if commands_open => match cmd {
                Some(cmd) => apply(session, cmd, &mut ticker, period),
                None => {
                    commands_open = false;
                    if session.is_paused() {
                        tracing::debug!("command channel closed while paused, cancelling");
                        apply(session, Command::Cancel, &mut ticker, period);
                    } else {
                        tracing::debug!("command channel closed, running to completion");
                    }
                }
            },
            _ = next_tick(&mut ticker) => {
                session.on_tick();
            }
        }
        flush(session, &mut on_event);
    }

    match session.summary() {
        Some(summary) => SessionOutcome::Completed(summary),
        None => SessionOutcome::Cancelled {
            elapsed_secs: session.elapsed_secs(),
        },
    }
}

fn apply(
    session: &mut WorkoutSession,
    cmd: Command,
    ticker: &mut Option<Interval>,
    period: Duration,
) {
    let (result, resumes) = match cmd {
        Command::Pause => (session.pause(), false),
        Command::Resume => (session.resume(), true),
        Command::TogglePause if session.is_paused() => (session.resume(), true),
        Command::TogglePause => (session.pause(), false),
        Command::Cancel => (session.cancel(), false),
    };

    match result {
        // Pause and cancel unregister the tick source before returning. A
        // resumed clock gets a fresh interval, so its next tick is a full
        // period away.
        Ok(()) => *ticker = resumes.then(|| new_ticker(period)),
        Err(e) => tracing::debug!(error = %e, ?cmd, "ignored command"),
    }
}

fn new_ticker(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn flush<F: FnMut(Event)>(session: &mut WorkoutSession, on_event: &mut F) {
    for event in session.drain_events() {
        on_event(event);
    }
}
