use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::Subcommand;
use formacad_core::{
    Config, Database, Event, NotificationBackend, Permission, SessionConfig, SessionRecord,
    SessionType, StudyTimer, Technique, TimerEngine,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{print_json, today};

const ENGINE_KEY: &str = "timer_engine";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a new session, replacing any active one
    Start {
        /// What you are studying
        #[arg(default_value = "")]
        subject: String,
        /// Length in minutes (defaults to the technique's length)
        #[arg(long, short)]
        minutes: Option<u32>,
        /// focus | short-break | long-break
        #[arg(long = "type", short = 't', default_value = "focus")]
        session_type: SessionType,
        /// pomodoro | custom
        #[arg(long)]
        technique: Option<Technique>,
    },
    /// Start the interval the technique suggests next
    Next,
    /// Pause or resume the active session
    Pause,
    /// Cancel the active session without counting it
    Stop,
    /// End the current interval early
    Skip,
    /// Print current timer state as JSON
    Status,
    /// Run the countdown in the foreground.
    ///
    /// Reads commands from stdin: p (pause/resume), s (stop), k (skip), q (quit).
    Run,
}

/// Timer state as persisted between invocations.
#[derive(Serialize, Deserialize)]
struct StoredTimer {
    engine: TimerEngine,
    last_seen: DateTime<Utc>,
}

fn load_engine(db: &Database, config: &Config) -> (TimerEngine, DateTime<Utc>) {
    let now = Utc::now();
    let stored = db
        .kv_get(ENGINE_KEY)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str::<StoredTimer>(&json).ok());
    let (mut engine, last_seen) = match stored {
        Some(s) => (s.engine, s.last_seen),
        None => (TimerEngine::new(today()), now),
    };
    engine.set_durations(config.durations());
    (engine, last_seen)
}

/// Local date on which a countdown that was running at `last_seen` with
/// `time_left` seconds remaining reached zero.
fn completion_day(last_seen: DateTime<Utc>, time_left: u64) -> NaiveDate {
    let secs = i64::try_from(time_left).unwrap_or(i64::MAX);
    let finished = chrono::Duration::try_seconds(secs)
        .and_then(|d| last_seen.checked_add_signed(d))
        .unwrap_or(last_seen);
    finished.with_timezone(&Local).date_naive()
}

/// Advance the stored engine by the wall-clock time since `last_seen`.
///
/// A session that ran out while no command was running is credited to the
/// day it ended on. The engine is saved before the completion is recorded,
/// so a failing command can never replay it.
fn catch_up(
    timer: &mut StudyTimer<TerminalNotifier>,
    db: &Database,
    last_seen: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    let elapsed = (Utc::now() - last_seen).num_seconds().max(0) as u64;
    if timer.engine().is_running() && timer.time_left() <= elapsed {
        timer.set_day(completion_day(last_seen, timer.time_left()));
    }
    let completed = timer.advance(elapsed);
    let credited = timer.engine().day();
    timer.set_day(today());
    save_engine(db, timer.engine())?;

    if let Some(event) = completed {
        record_completion(db, &event, credited);
        print_json(&event)?;
    }
    Ok(())
}

fn save_engine(db: &Database, engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let stored = StoredTimer {
        engine: engine.clone(),
        last_seen: Utc::now(),
    };
    db.kv_set(ENGINE_KEY, &serde_json::to_string(&stored)?)?;
    Ok(())
}

/// Terminal notifications: a bell and a line on stderr.
struct TerminalNotifier;

impl NotificationBackend for TerminalNotifier {
    fn request_permission(&mut self) -> Result<Permission, Box<dyn std::error::Error>> {
        Ok(Permission::Granted)
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "\x07{title}: {body}")?;
        Ok(())
    }
}

fn record_completion(db: &Database, event: &Event, day: NaiveDate) {
    if let Some(record) = SessionRecord::from_event(event, day) {
        if let Err(e) = db.record_session(&record) {
            tracing::warn!(error = %e, "failed to record completed session");
        }
    }
}

fn study_timer(engine: TimerEngine, config: &Config) -> StudyTimer<TerminalNotifier> {
    let mut timer = StudyTimer::new(engine, TerminalNotifier);
    timer.set_notifications_enabled(config.notifications.enabled);
    timer.request_notification_permission();
    timer
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let (engine, last_seen) = load_engine(&db, &config);

    let mut timer = study_timer(engine, &config);
    catch_up(&mut timer, &db, last_seen)?;

    match action {
        TimerAction::Start {
            subject,
            minutes,
            session_type,
            technique,
        } => {
            let technique = technique.unwrap_or(config.timer.technique);
            let minutes = minutes.unwrap_or_else(|| {
                timer
                    .engine()
                    .durations()
                    .minutes_for(technique, session_type)
            });
            let event =
                timer.start_session(SessionConfig::new(subject, minutes, session_type, technique))?;
            print_json(&event)?;
        }
        TimerAction::Next => {
            let mut next = timer.engine().suggest_next();
            if next.session_type == SessionType::Focus && timer.engine().todays_stats().session_count == 0 {
                next.technique = config.timer.technique;
                next.duration = timer
                    .engine()
                    .durations()
                    .minutes_for(next.technique, SessionType::Focus);
            }
            let event = timer.start_session(next)?;
            print_json(&event)?;
        }
        TimerAction::Pause => print_or_snapshot(timer.pause_timer(), &timer)?,
        TimerAction::Stop => print_or_snapshot(timer.stop_timer(), &timer)?,
        TimerAction::Skip => print_or_snapshot(timer.skip_session(), &timer)?,
        TimerAction::Status => print_json(&timer.engine().snapshot())?,
        TimerAction::Run => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(run_foreground(&mut timer, &db));
            // A pending stdin read would otherwise block shutdown.
            runtime.shutdown_background();
            save_engine(&db, timer.engine())?;
            return result;
        }
    }

    save_engine(&db, timer.engine())?;
    Ok(())
}

fn print_or_snapshot(
    event: Option<Event>,
    timer: &StudyTimer<TerminalNotifier>,
) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => print_json(&event),
        None => print_json(&timer.engine().snapshot()),
    }
}

/// Drive the countdown from a single one-second interval.
///
/// Ticks and stdin commands are handled on the same task, so a control
/// always lands between two ticks.
async fn run_foreground(
    timer: &mut StudyTimer<TerminalNotifier>,
    db: &Database,
) -> Result<(), Box<dyn std::error::Error>> {
    if timer.session().is_none() {
        eprintln!("no active session; start one with `timer start`");
        return Ok(());
    }

    let mut ticks = tokio::time::interval(Duration::from_secs(1));
    ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately.
    ticks.tick().await;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                timer.set_day(today());
                if let Some(event) = timer.tick() {
                    record_completion(db, &event, timer.engine().day());
                    println!();
                    print_json(&event)?;
                    return Ok(());
                }
                if timer.engine().is_running() {
                    print!("\r{}  ", timer.format_time(timer.time_left()));
                    std::io::stdout().flush()?;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    // stdin closed; keep counting down.
                    stdin_open = false;
                    continue;
                };
                let event = match line.trim() {
                    "p" => timer.pause_timer(),
                    "s" => timer.stop_timer(),
                    "k" => timer.skip_session(),
                    "q" => return Ok(()),
                    other => {
                        eprintln!("unknown command '{other}' (p, s, k, q)");
                        None
                    }
                };
                if let Some(event) = event {
                    println!();
                    print_json(&event)?;
                }
                if timer.session().is_none() {
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}
