use clap::Subcommand;
use formacad_core::error::{AudioError, CoreError, ValidationError};
use formacad_core::sound::{catalog, find, synth};
use formacad_core::{AmbientPlayer, Config, MemoryAudioBackend};
use serde::Serialize;

use super::print_json;

#[derive(Subcommand)]
pub enum SoundAction {
    /// List the ambient sound catalog
    List,
    /// Synthesize a sound in memory and report its playback state
    Preview {
        /// Sound id (defaults to sound.default_sound)
        id: Option<String>,
        /// Volume 0.0-1.0 (defaults to sound.volume)
        #[arg(long)]
        volume: Option<f32>,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Serialize)]
struct Preview {
    state: formacad_core::PlaybackState,
    sample_rate: u32,
    samples: usize,
    peak: f32,
    rms: f32,
}

pub fn run(action: SoundAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SoundAction::List => print_json(&catalog()),
        SoundAction::Preview { id, volume, seed } => {
            let config = Config::load()?;
            let id = id.unwrap_or_else(|| config.sound.default_sound.clone());
            let sound = find(&id).ok_or_else(|| ValidationError::UnknownSound(id.clone()))?;

            let backend = MemoryAudioBackend::new(config.sound.sample_rate);
            let mut player = match seed {
                Some(seed) => AmbientPlayer::with_seed(backend, seed),
                None => AmbientPlayer::new(backend),
            };
            player.change_volume(volume.unwrap_or(config.sound.volume as f32));
            player.play_sound(sound);
            if let Some(err) = player.last_error() {
                return Err(CoreError::Audio(err.clone()).into());
            }

            let source = player
                .active_source()
                .and_then(|id| player.backend().source(id))
                .ok_or_else(|| {
                    CoreError::Audio(AudioError::SourceFailed(format!("{} has no source", sound.id)))
                })?;
            let preview = Preview {
                state: player.state(),
                sample_rate: player.backend().sample_rate(),
                samples: source.buffer.len(),
                peak: synth::peak(&source.buffer),
                rms: synth::rms(&source.buffer),
            };
            player.stop_sound();
            print_json(&preview)
        }
    }
}
