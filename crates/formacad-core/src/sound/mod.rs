mod backend;
mod catalog;
mod player;
pub mod synth;

pub use backend::{AudioBackend, MemoryAudioBackend, MemorySource, SourceId};
pub use catalog::{catalog, find, AmbientSound, SoundType};
pub use player::{AmbientPlayer, PlaybackState, DEFAULT_VOLUME};
