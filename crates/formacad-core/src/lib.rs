//! # Formacad Core Library
//!
//! Runtime logic behind the Formacad study dashboard: the focus timer and
//! the ambient sound generator. Hosts (the CLI, or any UI) drive these
//! through small control surfaces and inject platform capabilities.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine holding at most one
//!   session; the caller invokes `tick()` once per second
//! - **Ambient Sound**: procedural noise synthesis looped through an
//!   injected [`AudioBackend`]
//! - **Storage**: SQLite session history and TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine and daily tallies
//! - [`StudyTimer`]: timer controls plus completion notifications
//! - [`AmbientPlayer`]: single-sound playback with master volume
//! - [`Database`]: session history persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod sound;
pub mod storage;
pub mod timer;

pub use error::{AudioError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use sound::{AmbientPlayer, AmbientSound, AudioBackend, MemoryAudioBackend, PlaybackState, SoundType};
pub use storage::{Config, Database, SessionRecord};
pub use timer::{
    format_time, DailyStats, Durations, FloatingTimerView, NotificationBackend, Permission, Session,
    SessionConfig, SessionType, StudyTimer, Technique, TimerEngine, TimerState,
};
