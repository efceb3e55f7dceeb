//! Timer control surface for host UIs.
//!
//! [`StudyTimer`] forwards every control to a [`TimerEngine`] and turns
//! completions into platform notifications when permission was granted.

use chrono::NaiveDate;

use super::engine::{FloatingTimerView, TimerEngine, TimerState};
use super::notify::{NotificationBackend, Permission};
use super::session::{format_time, Session, SessionConfig, SessionType};
use super::stats::DailyStats;
use crate::error::ValidationError;
use crate::events::Event;

pub struct StudyTimer<N: NotificationBackend> {
    engine: TimerEngine,
    notifier: N,
    permission: Permission,
    notifications_enabled: bool,
}

impl<N: NotificationBackend> StudyTimer<N> {
    pub fn new(engine: TimerEngine, notifier: N) -> Self {
        Self {
            engine,
            notifier,
            permission: Permission::Default,
            notifications_enabled: true,
        }
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn into_engine(self) -> TimerEngine {
        self.engine
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Restore a previously obtained permission without prompting.
    pub fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.notifications_enabled = enabled;
    }

    /// Prompt once. Later calls return the cached answer.
    ///
    /// A failing prompt counts as a denial.
    pub fn request_notification_permission(&mut self) -> Permission {
        if self.permission != Permission::Default {
            return self.permission;
        }
        self.permission = match self.notifier.request_permission() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "notification permission request failed");
                Permission::Denied
            }
        };
        tracing::debug!(permission = ?self.permission, "notification permission resolved");
        self.permission
    }

    // ── Controls ─────────────────────────────────────────────────────

    pub fn start_session(&mut self, config: SessionConfig) -> Result<Event, ValidationError> {
        self.engine.start_session(config)
    }

    pub fn pause_timer(&mut self) -> Option<Event> {
        self.engine.pause_timer()
    }

    pub fn stop_timer(&mut self) -> Option<Event> {
        self.engine.stop_timer()
    }

    pub fn skip_session(&mut self) -> Option<Event> {
        self.engine.skip_session()
    }

    pub fn tick(&mut self) -> Option<Event> {
        let event = self.engine.tick()?;
        self.on_completed(&event);
        Some(event)
    }

    pub fn advance(&mut self, seconds: u64) -> Option<Event> {
        let event = self.engine.advance(seconds)?;
        self.on_completed(&event);
        Some(event)
    }

    pub fn set_day(&mut self, day: NaiveDate) {
        self.engine.set_day(day);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn session(&self) -> Option<&Session> {
        self.engine.session()
    }

    pub fn time_left(&self) -> u64 {
        self.engine.time_left()
    }

    pub fn format_time(&self, seconds: u64) -> String {
        format_time(seconds)
    }

    pub fn todays_stats(&self) -> DailyStats {
        self.engine.todays_stats()
    }

    pub fn floating_view(&self) -> FloatingTimerView {
        self.engine.floating_view()
    }

    fn on_completed(&mut self, event: &Event) {
        let Event::SessionCompleted {
            subject,
            session_type,
            duration_min,
            ..
        } = event
        else {
            return;
        };
        if !self.notifications_enabled || self.permission != Permission::Granted {
            return;
        }
        let (title, body) = completion_message(*session_type, subject, *duration_min);
        if let Err(e) = self.notifier.notify(&title, &body) {
            tracing::warn!(error = %e, "failed to deliver completion notification");
        }
    }
}

fn completion_message(session_type: SessionType, subject: &str, minutes: u32) -> (String, String) {
    match session_type {
        SessionType::Focus => {
            let body = if subject.is_empty() {
                format!("{minutes} minutes of focus done. Time for a break.")
            } else {
                format!("{minutes} minutes of {subject} done. Time for a break.")
            };
            ("Focus session complete".to_string(), body)
        }
        SessionType::ShortBreak | SessionType::LongBreak => (
            format!("{} over", session_type.label()),
            "Ready for the next focus session?".to_string(),
        ),
    }
}
