mod controller;
mod engine;
mod notify;
mod session;
mod stats;

pub use controller::StudyTimer;
pub use engine::{FloatingTimerView, TimerEngine, TimerState};
pub use notify::{NotificationBackend, Permission};
pub use session::{format_time, Durations, Session, SessionConfig, SessionType, Technique};
pub use stats::{DailyStats, StatsLedger};
