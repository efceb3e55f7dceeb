//! Timer engine implementation.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads or read the wall clock for its countdown: the caller invokes
//! `tick()` once per second (or `advance(n)` to catch up).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//! Running -> (completed | stopped | skipped) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(today);
//! engine.start_session(SessionConfig::new("Math", 25, SessionType::Focus, Technique::Pomodoro))?;
//! // Once per second:
//! if let Some(event) = engine.tick() { /* completed */ }
//! ```

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::session::{format_time, Durations, Session, SessionConfig, SessionType, Technique};
use super::stats::{DailyStats, StatsLedger};
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Data a host forwards to a floating timer indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingTimerView {
    pub time_left: u64,
    pub is_active: bool,
    pub technique: Technique,
}

/// Core timer engine.
///
/// Holds at most one [`Session`]. Starting another one discards the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    state: TimerState,
    session: Option<Session>,
    next_id: u64,
    /// Day completions are credited to.
    day: NaiveDate,
    ledger: StatsLedger,
    #[serde(default)]
    durations: Durations,
    /// Type and technique of the last naturally completed interval.
    #[serde(default)]
    last_completed: Option<(SessionType, Technique, String)>,
    /// Focus completions since the last long break.
    #[serde(default)]
    focus_since_long_break: u32,
}

impl TimerEngine {
    /// Create an idle engine that credits completions to `day`.
    pub fn new(day: NaiveDate) -> Self {
        Self::with_durations(day, Durations::default())
    }

    pub fn with_durations(day: NaiveDate, durations: Durations) -> Self {
        Self {
            state: TimerState::Idle,
            session: None,
            next_id: 1,
            day,
            ledger: StatsLedger::new(),
            durations,
            last_completed: None,
            focus_since_long_break: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    /// Seconds left in the active session, 0 when idle.
    pub fn time_left(&self) -> u64 {
        self.session.as_ref().map(|s| s.time_left).unwrap_or(0)
    }

    /// 0.0 .. 1.0 progress within the active session.
    pub fn progress(&self) -> f64 {
        self.session.as_ref().map(Session::progress).unwrap_or(0.0)
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn durations(&self) -> &Durations {
        &self.durations
    }

    pub fn todays_stats(&self) -> DailyStats {
        self.ledger.for_day(self.day)
    }

    pub fn stats_for(&self, day: NaiveDate) -> DailyStats {
        self.ledger.for_day(day)
    }

    pub fn ledger(&self) -> &StatsLedger {
        &self.ledger
    }

    pub fn floating_view(&self) -> FloatingTimerView {
        FloatingTimerView {
            time_left: self.time_left(),
            is_active: self.state != TimerState::Idle,
            technique: self
                .session
                .as_ref()
                .map(|s| s.technique)
                .unwrap_or_default(),
        }
    }

    /// The interval that should follow, according to the technique.
    ///
    /// After a focus session: a short break, or a long break every
    /// `long_break_interval` focus sessions. Otherwise: a focus session.
    pub fn suggest_next(&self) -> SessionConfig {
        let (last_type, technique, subject) = match &self.last_completed {
            Some((t, tech, subject)) => (Some(*t), *tech, subject.clone()),
            None => (None, Technique::default(), String::new()),
        };
        let next_type = match last_type {
            Some(SessionType::Focus) => {
                let interval = self.durations.long_break_interval.max(1);
                if self.focus_since_long_break >= interval {
                    SessionType::LongBreak
                } else {
                    SessionType::ShortBreak
                }
            }
            _ => SessionType::Focus,
        };
        SessionConfig::new(
            subject,
            self.durations.minutes_for(technique, next_type),
            next_type,
            technique,
        )
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let s = self.session.as_ref();
        Event::StateSnapshot {
            state: self.state,
            session_id: s.map(|s| s.id),
            subject: s.map(|s| s.subject.clone()),
            session_type: s.map(|s| s.session_type),
            technique: s.map(|s| s.technique),
            time_left: self.time_left(),
            formatted: format_time(self.time_left()),
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Move the credit day. Existing tallies are kept.
    pub fn set_day(&mut self, day: NaiveDate) {
        self.day = day;
    }

    pub fn set_durations(&mut self, durations: Durations) {
        self.durations = durations;
    }

    /// Start a new session, discarding any active one uncounted.
    pub fn start_session(&mut self, config: SessionConfig) -> Result<Event, ValidationError> {
        if config.duration == 0 {
            return Err(ValidationError::NonPositiveDuration(config.duration));
        }
        if let Some(prev) = self.session.take() {
            tracing::debug!(session_id = prev.id, "discarding active session");
        }

        let id = self.next_id;
        self.next_id += 1;
        let session = Session::from_config(id, config);
        let event = Event::SessionStarted {
            session_id: id,
            subject: session.subject.clone(),
            session_type: session.session_type,
            technique: session.technique,
            duration_secs: session.total_secs(),
            at: Utc::now(),
        };
        tracing::debug!(
            session_id = id,
            session_type = session.session_type.as_str(),
            duration = session.duration,
            "session started"
        );
        self.session = Some(session);
        self.state = TimerState::Running;
        Ok(event)
    }

    /// Toggle between running and paused.
    pub fn pause_timer(&mut self) -> Option<Event> {
        let session = self.session.as_ref()?;
        let (session_id, time_left) = (session.id, session.time_left);
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                Some(Event::TimerPaused {
                    session_id,
                    time_left,
                    at: Utc::now(),
                })
            }
            TimerState::Paused => {
                self.state = TimerState::Running;
                Some(Event::TimerResumed {
                    session_id,
                    time_left,
                    at: Utc::now(),
                })
            }
            TimerState::Idle => None,
        }
    }

    /// Cancel the active session without counting it.
    pub fn stop_timer(&mut self) -> Option<Event> {
        let session = self.clear()?;
        tracing::debug!(session_id = session.id, "session stopped");
        Some(Event::SessionStopped {
            session_id: session.id,
            time_left: session.time_left,
            at: Utc::now(),
        })
    }

    /// End the current interval early. Not counted as a completion.
    pub fn skip_session(&mut self) -> Option<Event> {
        let session = self.clear()?;
        tracing::debug!(session_id = session.id, "session skipped");
        Some(Event::SessionSkipped {
            session_id: session.id,
            session_type: session.session_type,
            time_left: session.time_left,
            at: Utc::now(),
        })
    }

    /// One-second tick. Returns `Some(Event::SessionCompleted)` when the
    /// countdown reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        self.advance(1)
    }

    /// Apply up to `seconds` ticks at once. Stops at completion.
    pub fn advance(&mut self, seconds: u64) -> Option<Event> {
        if self.state != TimerState::Running || seconds == 0 {
            return None;
        }
        let session = self.session.as_mut()?;
        session.time_left = session.time_left.saturating_sub(seconds);
        if session.time_left == 0 {
            return self.complete();
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn clear(&mut self) -> Option<Session> {
        let session = self.session.take()?;
        self.state = TimerState::Idle;
        Some(session)
    }

    fn complete(&mut self) -> Option<Event> {
        let session = self.clear()?;
        if session.session_type.is_focus() {
            self.ledger.record_focus(self.day, session.duration);
            self.focus_since_long_break += 1;
        } else if session.session_type == SessionType::LongBreak {
            self.focus_since_long_break = 0;
        }
        self.last_completed = Some((
            session.session_type,
            session.technique,
            session.subject.clone(),
        ));
        tracing::info!(
            session_id = session.id,
            session_type = session.session_type.as_str(),
            duration = session.duration,
            "session completed"
        );
        Some(Event::SessionCompleted {
            session_id: session.id,
            subject: session.subject,
            session_type: session.session_type,
            technique: session.technique,
            duration_min: session.duration,
            started_at: session.started_at,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn focus(minutes: u32) -> SessionConfig {
        SessionConfig::new("Algebra", minutes, SessionType::Focus, Technique::Pomodoro)
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::new(today());
        assert_eq!(engine.state(), TimerState::Idle);

        engine.start_session(focus(25)).unwrap();
        assert_eq!(engine.state(), TimerState::Running);
        assert_eq!(engine.time_left(), 25 * 60);

        assert!(matches!(engine.pause_timer(), Some(Event::TimerPaused { .. })));
        assert!(engine.is_paused());

        assert!(matches!(engine.pause_timer(), Some(Event::TimerResumed { .. })));
        assert!(engine.is_running());
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut engine = TimerEngine::new(today());
        let err = engine.start_session(focus(0)).unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveDuration(0));
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(engine.session().is_none());
    }

    #[test]
    fn controls_are_noops_when_idle() {
        let mut engine = TimerEngine::new(today());
        assert!(engine.pause_timer().is_none());
        assert!(engine.stop_timer().is_none());
        assert!(engine.skip_session().is_none());
        assert!(engine.tick().is_none());
    }

    #[test]
    fn paused_timer_ignores_ticks() {
        let mut engine = TimerEngine::new(today());
        engine.start_session(focus(1)).unwrap();
        engine.tick();
        engine.pause_timer();
        engine.advance(100);
        assert_eq!(engine.time_left(), 59);
    }

    #[test]
    fn tick_after_stop_does_not_decrement() {
        let mut engine = TimerEngine::new(today());
        engine.start_session(focus(1)).unwrap();
        engine.stop_timer();
        assert!(engine.tick().is_none());
        assert_eq!(engine.time_left(), 0);
        assert_eq!(engine.todays_stats(), DailyStats::default());
    }

    #[test]
    fn break_completion_is_not_counted() {
        let mut engine = TimerEngine::new(today());
        engine
            .start_session(SessionConfig::new(
                "",
                5,
                SessionType::ShortBreak,
                Technique::Pomodoro,
            ))
            .unwrap();
        let event = engine.advance(5 * 60).unwrap();
        assert!(event.is_completion());
        assert_eq!(engine.todays_stats(), DailyStats::default());
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn completion_credits_the_configured_day() {
        let mut engine = TimerEngine::new(today());
        let tomorrow = today().succ_opt().unwrap();
        engine.set_day(tomorrow);
        engine.start_session(focus(1)).unwrap();
        engine.advance(60);
        assert_eq!(engine.stats_for(today()), DailyStats::default());
        assert_eq!(engine.todays_stats().session_count, 1);
    }

    #[test]
    fn suggest_next_cycles_breaks() {
        let mut engine = TimerEngine::new(today());
        assert_eq!(engine.suggest_next().session_type, SessionType::Focus);

        for i in 1..=4 {
            engine.start_session(focus(25)).unwrap();
            engine.advance(25 * 60);
            let next = engine.suggest_next();
            if i < 4 {
                assert_eq!(next.session_type, SessionType::ShortBreak);
                assert_eq!(next.duration, 5);
            } else {
                assert_eq!(next.session_type, SessionType::LongBreak);
                assert_eq!(next.duration, 15);
            }
        }

        let long = engine.suggest_next();
        engine.start_session(long).unwrap();
        engine.advance(15 * 60);
        let next = engine.suggest_next();
        assert_eq!(next.session_type, SessionType::Focus);
        assert_eq!(next.subject, "Algebra");
        assert_eq!(next.duration, 25);
    }

    #[test]
    fn suggest_next_keeps_deep_work_technique() {
        let mut engine = TimerEngine::new(today());
        engine
            .start_session(SessionConfig::new(
                "Thesis",
                50,
                SessionType::Focus,
                Technique::Custom,
            ))
            .unwrap();
        engine.advance(50 * 60);
        let next = engine.suggest_next();
        assert_eq!(next.technique, Technique::Custom);
        assert_eq!(next.subject, "Thesis");
    }

    #[test]
    fn floating_view_reflects_activity() {
        let mut engine = TimerEngine::new(today());
        assert!(!engine.floating_view().is_active);
        engine
            .start_session(SessionConfig::new(
                "Chemistry",
                50,
                SessionType::Focus,
                Technique::Custom,
            ))
            .unwrap();
        let view = engine.floating_view();
        assert!(view.is_active);
        assert_eq!(view.time_left, 3000);
        assert_eq!(view.technique, Technique::Custom);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let mut engine = TimerEngine::new(today());
        engine.start_session(focus(2)).unwrap();
        engine.advance(55);
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                time_left,
                formatted,
                ..
            } => {
                assert_eq!(state, TimerState::Running);
                assert_eq!(time_left, 65);
                assert_eq!(formatted, "01:05");
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn engine_survives_json_roundtrip() {
        let mut engine = TimerEngine::new(today());
        engine.start_session(focus(25)).unwrap();
        engine.advance(10);
        let json = serde_json::to_string(&engine).unwrap();
        let restored: TimerEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.time_left(), 25 * 60 - 10);
        assert_eq!(restored.state(), TimerState::Running);
    }
}
