use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of interval a session represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn is_focus(self) -> bool {
        self == SessionType::Focus
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Focus => "focus",
            SessionType::ShortBreak => "short-break",
            SessionType::LongBreak => "long-break",
        }
    }

    /// Human-readable label used in notifications and the CLI.
    pub fn label(self) -> &'static str {
        match self {
            SessionType::Focus => "Focus",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }
}

impl std::str::FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(SessionType::Focus),
            "short-break" | "short_break" | "short" => Ok(SessionType::ShortBreak),
            "long-break" | "long_break" | "long" => Ok(SessionType::LongBreak),
            other => Err(format!("unknown session type: {other}")),
        }
    }
}

/// Named timing preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Technique {
    /// 25 minute focus intervals.
    #[default]
    Pomodoro,
    /// "Deep work": 50 minute focus intervals.
    Custom,
}

impl Technique {
    pub fn as_str(self) -> &'static str {
        match self {
            Technique::Pomodoro => "pomodoro",
            Technique::Custom => "custom",
        }
    }
}

impl std::str::FromStr for Technique {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pomodoro" => Ok(Technique::Pomodoro),
            "custom" | "deep-work" | "deep_work" => Ok(Technique::Custom),
            other => Err(format!("unknown technique: {other}")),
        }
    }
}

/// Interval lengths (minutes) for each technique and break type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub pomodoro_focus: u32,
    pub custom_focus: u32,
    pub short_break: u32,
    pub long_break: u32,
    /// A long break replaces the short one after every N-th focus session.
    pub long_break_interval: u32,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            pomodoro_focus: 25,
            custom_focus: 50,
            short_break: 5,
            long_break: 15,
            long_break_interval: 4,
        }
    }
}

impl Durations {
    /// Default length of an interval of `session_type` under `technique`.
    pub fn minutes_for(&self, technique: Technique, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Focus => match technique {
                Technique::Pomodoro => self.pomodoro_focus,
                Technique::Custom => self.custom_focus,
            },
            SessionType::ShortBreak => self.short_break,
            SessionType::LongBreak => self.long_break,
        }
    }
}

/// Input to [`TimerEngine::start_session`](super::TimerEngine::start_session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub subject: String,
    /// Planned length in minutes.
    pub duration: u32,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub technique: Technique,
}

impl SessionConfig {
    pub fn new(
        subject: impl Into<String>,
        duration: u32,
        session_type: SessionType,
        technique: Technique,
    ) -> Self {
        Self {
            subject: subject.into(),
            duration,
            session_type,
            technique,
        }
    }

    /// A focus session with the technique's default length.
    pub fn focus(subject: impl Into<String>, technique: Technique, durations: &Durations) -> Self {
        Self::new(
            subject,
            durations.minutes_for(technique, SessionType::Focus),
            SessionType::Focus,
            technique,
        )
    }
}

/// The single active interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Generation number, unique per engine.
    pub id: u64,
    pub subject: String,
    pub duration: u32,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub technique: Technique,
    /// Seconds remaining.
    pub time_left: u64,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn from_config(id: u64, config: SessionConfig) -> Self {
        Self {
            id,
            time_left: total_secs(config.duration),
            subject: config.subject,
            duration: config.duration,
            session_type: config.session_type,
            technique: config.technique,
            started_at: Utc::now(),
        }
    }

    pub fn total_secs(&self) -> u64 {
        total_secs(self.duration)
    }

    /// 0.0 .. 1.0 fraction of the interval already elapsed.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (total - self.time_left.min(total)) as f64 / total as f64
    }
}

fn total_secs(minutes: u32) -> u64 {
    u64::from(minutes) * 60
}

/// Render seconds as zero-padded `mm:ss`.
///
/// Minutes are not wrapped into hours, so an hour reads `60:00`.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_pads_both_fields() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(3599), "59:59");
    }

    #[test]
    fn format_time_does_not_wrap_hours() {
        assert_eq!(format_time(3600), "60:00");
        assert_eq!(format_time(50 * 60), "50:00");
    }

    #[test]
    fn technique_defaults() {
        let d = Durations::default();
        assert_eq!(d.minutes_for(Technique::Pomodoro, SessionType::Focus), 25);
        assert_eq!(d.minutes_for(Technique::Custom, SessionType::Focus), 50);
        assert_eq!(d.minutes_for(Technique::Custom, SessionType::ShortBreak), 5);
        assert_eq!(d.minutes_for(Technique::Pomodoro, SessionType::LongBreak), 15);
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut s = Session::from_config(
            1,
            SessionConfig::new("Math", 1, SessionType::Focus, Technique::Pomodoro),
        );
        assert_eq!(s.progress(), 0.0);
        s.time_left = 30;
        assert!((s.progress() - 0.5).abs() < f64::EPSILON);
        s.time_left = 0;
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn session_type_serializes_kebab_case() {
        let json = serde_json::to_string(&SessionType::ShortBreak).unwrap();
        assert_eq!(json, "\"short-break\"");
        let parsed: SessionType = "long-break".parse().unwrap();
        assert_eq!(parsed, SessionType::LongBreak);
    }

    #[test]
    fn session_config_uses_type_key() {
        let cfg = SessionConfig::new("History", 25, SessionType::Focus, Technique::Pomodoro);
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["type"], "focus");
        assert_eq!(json["technique"], "pomodoro");
    }
}
