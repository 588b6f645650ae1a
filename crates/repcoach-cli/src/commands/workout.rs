use std::io::{IsTerminal, Write};

use clap::{Args, Subcommand};
use repcoach_core::collaborators::{NoopKeepAwake, NullObserver};
use repcoach_core::format::{format_clock, rep_counter};
use repcoach_core::runner::TICK_PERIOD;
use repcoach_core::{
    derive, run_session, Collaborators, Command, CueId, CuePlayer, Event, MilestoneWindows,
    PhaseSnapshot, PlaybackError, Quote, SessionObserver, SessionOutcome, Settings, WorkoutPlan,
    WorkoutRequest, WorkoutSession, WorkoutSummary,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Workout name shown in the session
    #[arg(long, default_value = "Workout")]
    name: String,
    /// Number of sets
    #[arg(long)]
    sets: u32,
    /// Reps per set
    #[arg(long)]
    reps: u32,
    /// Rest between sets, in seconds
    #[arg(long, default_value = "0")]
    break_secs: u32,
    /// Seconds per rep (overrides the configured repIntervalSec)
    #[arg(long)]
    rep_interval: Option<u32>,
}

impl PlanArgs {
    fn request(&self) -> WorkoutRequest {
        WorkoutRequest {
            workout_name: self.name.clone(),
            sets: self.sets,
            reps: self.reps,
            break_secs: self.break_secs,
        }
    }

    fn settings(&self) -> Settings {
        let mut settings = Settings::load_or_default();
        if let Some(secs) = self.rep_interval {
            settings.rep_interval_secs = secs;
        }
        settings
    }
}

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Run a live session. Enter p, r or q to pause, resume or quit
    Run {
        #[command(flatten)]
        plan: PlanArgs,
        /// Print events as JSON lines instead of a status line per tick
        #[arg(long)]
        json: bool,
    },
    /// Print derived durations and milestone points as JSON
    Plan {
        #[command(flatten)]
        plan: PlanArgs,
    },
    /// Print the phase snapshot at an elapsed second as JSON
    Snapshot {
        #[command(flatten)]
        plan: PlanArgs,
        /// Elapsed seconds since the workout started
        #[arg(long)]
        elapsed: u64,
    },
}

pub fn run(action: WorkoutAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WorkoutAction::Run { plan, json } => run_live(&plan, json),
        WorkoutAction::Plan { plan: args } => {
            let settings = args.settings();
            let plan = WorkoutPlan::from_request(&args.request(), settings.rep_interval_secs)?;
            let windows = MilestoneWindows::new(
                plan.total_duration_secs(),
                u64::from(settings.start_delay_secs),
            );
            let out = serde_json::json!({
                "plan": plan,
                "milestones": windows,
                "summary": plan.summary(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
        WorkoutAction::Snapshot {
            plan: args,
            elapsed,
        } => {
            let settings = args.settings();
            let plan = WorkoutPlan::from_request(&args.request(), settings.rep_interval_secs)?;
            let snapshot = derive(elapsed, &plan);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
    }
}

fn run_live(args: &PlanArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let settings = args.settings();
    let plan = WorkoutPlan::from_request(&args.request(), settings.rep_interval_secs)?;
    let observer: Box<dyn SessionObserver> = if json {
        Box::new(NullObserver)
    } else {
        Box::new(ConsoleObserver::new(&plan))
    };
    let collaborators = Collaborators {
        observer,
        player: Box::new(TerminalBell),
        keep_awake: Box::new(NoopKeepAwake),
    };
    let mut session = WorkoutSession::start_plan(plan, settings, collaborators)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(async {
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(forward_stdin(tx));
        run_session(&mut session, rx, TICK_PERIOD, |event| print_event(&event, json)).await
    });
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_background();

    if let SessionOutcome::Cancelled { elapsed_secs } = outcome {
        tracing::info!(elapsed_secs, "session ended early");
    }
    Ok(())
}

async fn forward_stdin(tx: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let cmd = match line.trim() {
            "" => continue,
            "p" => Command::Pause,
            "r" => Command::Resume,
            "q" => Command::Cancel,
            other => {
                eprintln!("unknown input '{other}' (p = pause, r = resume, q = quit)");
                continue;
            }
        };
        if tx.send(cmd).await.is_err() {
            break;
        }
    }
}

fn print_event(event: &Event, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "could not encode event"),
        }
        return;
    }
    match event {
        Event::SessionStarted {
            workout_name,
            total_duration_secs,
            ..
        } => println!("{workout_name} ({})", format_clock(*total_duration_secs)),
        Event::SessionPaused { .. } => println!("paused (r to resume, q to quit)"),
        Event::SessionResumed { .. } => println!("resumed"),
        _ => {}
    }
}

/// Human-readable progress on stdout.
struct ConsoleObserver {
    sets: u32,
    reps: u32,
}

impl ConsoleObserver {
    fn new(plan: &WorkoutPlan) -> Self {
        Self {
            sets: plan.sets(),
            reps: plan.reps(),
        }
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_tick(&mut self, snapshot: &PhaseSnapshot) {
        let set = snapshot.current_set_index + 1;
        if snapshot.is_in_break {
            println!(
                "set {set}/{}  break  {} left",
                self.sets,
                format_clock(snapshot.break_secs_remaining)
            );
        } else {
            println!(
                "set {set}/{}  rep {}  {} left",
                self.sets,
                rep_counter(snapshot, self.reps),
                format_clock(snapshot.time_remaining_secs)
            );
        }
    }

    fn on_milestone(&mut self, cue: CueId, quote: &Quote) {
        tracing::debug!(?cue, "milestone");
        println!("  \"{}\"", quote.text);
    }

    fn on_complete(&mut self, summary: &WorkoutSummary, quote: &Quote) {
        println!("  \"{}\"", quote.text);
        println!(
            "Workout complete: {} reps, ~{} kcal",
            summary.total_reps, summary.calories
        );
    }

    fn on_cancel(&mut self) {
        println!("Workout cancelled");
    }
}

/// Rings the terminal bell for each cue. Silent when stderr is redirected.
struct TerminalBell;

impl CuePlayer for TerminalBell {
    fn play(&mut self, asset: &str) -> Result<(), PlaybackError> {
        let mut stderr = std::io::stderr();
        if !stderr.is_terminal() {
            return Ok(());
        }
        tracing::trace!(asset, "bell");
        stderr
            .write_all(b"\x07")
            .and_then(|()| stderr.flush())
            .map_err(|e| PlaybackError::DeviceUnavailable(e.to_string()))
    }
}
