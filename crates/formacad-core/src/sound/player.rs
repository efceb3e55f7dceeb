//! Ambient sound playback.
//!
//! At most one sound plays at a time. The backend context is created lazily
//! on the first `play_sound` call, so hosts can construct the player before
//! any user gesture.

use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::Serialize;

use super::backend::{AudioBackend, SourceId};
use crate::error::AudioError;
use super::catalog::{catalog, AmbientSound};
use super::synth::synthesize;

pub const DEFAULT_VOLUME: f32 = 0.5;

/// Observable playback state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_sound: Option<AmbientSound>,
    pub volume: f32,
}

struct ActiveSound {
    source: SourceId,
    sound: AmbientSound,
}

pub struct AmbientPlayer<B: AudioBackend> {
    backend: B,
    rng: Mcg128Xsl64,
    active: Option<ActiveSound>,
    volume: f32,
    last_error: Option<AudioError>,
}

impl<B: AudioBackend> AmbientPlayer<B> {
    pub fn new(backend: B) -> Self {
        Self::with_rng(backend, Mcg128Xsl64::from_entropy())
    }

    /// Deterministic synthesis for reproducible output.
    pub fn with_seed(backend: B, seed: u64) -> Self {
        Self::with_rng(backend, Mcg128Xsl64::seed_from_u64(seed))
    }

    fn with_rng(backend: B, rng: Mcg128Xsl64) -> Self {
        Self {
            backend,
            rng,
            active: None,
            volume: DEFAULT_VOLUME,
            last_error: None,
        }
    }

    pub fn sounds(&self) -> &'static [AmbientSound] {
        catalog()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    pub fn current_sound(&self) -> Option<&AmbientSound> {
        self.active.as_ref().map(|a| &a.sound)
    }

    /// Backend handle of the playing source.
    pub fn active_source(&self) -> Option<SourceId> {
        self.active.as_ref().map(|a| a.source)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Why the most recent `play_sound` left the player silent, if it did.
    pub fn last_error(&self) -> Option<&AudioError> {
        self.last_error.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            is_playing: self.is_playing(),
            current_sound: self.current_sound().cloned(),
            volume: self.volume,
        }
    }

    /// Replace whatever is playing with `sound`.
    ///
    /// Backend failures are logged, kept in [`last_error`](Self::last_error)
    /// and leave the player stopped.
    pub fn play_sound(&mut self, sound: &AmbientSound) {
        self.stop_sound();

        match self.start(sound) {
            Ok(source) => {
                self.last_error = None;
                self.active = Some(ActiveSound {
                    source,
                    sound: sound.clone(),
                });
            }
            Err(e) => {
                tracing::warn!(sound = sound.id, error = %e, "cannot play ambient sound");
                self.last_error = Some(e);
            }
        }
    }

    fn start(&mut self, sound: &AmbientSound) -> Result<SourceId, AudioError> {
        let sample_rate = self.backend.create_context()?;
        if self.backend.is_suspended() {
            self.backend.resume()?;
        }

        let buffer = synthesize(sound.sound_type, sample_rate, &mut self.rng);
        let source = self.backend.start_loop(buffer, self.volume)?;
        tracing::debug!(sound = sound.id, sample_rate, "ambient sound started");
        Ok(source)
    }

    /// Disconnect the active source. Safe to call when nothing plays.
    pub fn stop_sound(&mut self) {
        if let Some(active) = self.active.take() {
            self.backend.disconnect(active.source);
            tracing::debug!(sound = active.sound.id, "ambient sound stopped");
        }
    }

    /// Stop `sound` if it is the one playing, otherwise switch to it.
    pub fn toggle_sound(&mut self, sound: &AmbientSound) {
        if self.current_sound().is_some_and(|s| s.id == sound.id) {
            self.stop_sound();
        } else {
            self.play_sound(sound);
        }
    }

    /// Set the master volume, clamped to `[0, 1]`. NaN is ignored.
    ///
    /// Applies to the playing source immediately and to later sounds.
    pub fn change_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(active) = &self.active {
            self.backend.set_gain(active.source, self.volume);
        }
    }

    /// Stop playback and release the backend context.
    pub fn close(&mut self) {
        self.stop_sound();
        if self.backend.has_context() {
            self.backend.close();
        }
    }
}

impl<B: AudioBackend> Drop for AmbientPlayer<B> {
    fn drop(&mut self) {
        self.close();
    }
}
