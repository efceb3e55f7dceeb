use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{SessionType, Technique, TimerState};

/// Every timer state change produces an Event.
/// Hosts render them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: u64,
        subject: String,
        session_type: SessionType,
        technique: Technique,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        session_id: u64,
        time_left: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        session_id: u64,
        time_left: u64,
        at: DateTime<Utc>,
    },
    /// Session cancelled; nothing is counted.
    SessionStopped {
        session_id: u64,
        time_left: u64,
        at: DateTime<Utc>,
    },
    /// Interval ended early; nothing is counted.
    SessionSkipped {
        session_id: u64,
        session_type: SessionType,
        time_left: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero.
    SessionCompleted {
        session_id: u64,
        subject: String,
        session_type: SessionType,
        technique: Technique,
        duration_min: u32,
        started_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        session_id: Option<u64>,
        subject: Option<String>,
        session_type: Option<SessionType>,
        technique: Option<Technique>,
        time_left: u64,
        formatted: String,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::SessionCompleted { .. })
    }
}
