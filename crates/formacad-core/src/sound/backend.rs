//! Audio output capability.
//!
//! The player talks to the platform only through [`AudioBackend`], shaped
//! after a minimal audio graph: one context, looping buffer sources, each
//! wired through its own gain node.

use std::collections::HashMap;

use crate::error::AudioError;

/// Handle to a started source (and its gain node).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u64);

pub trait AudioBackend {
    /// Create the output context if it does not exist yet.
    /// Returns the output sample rate.
    fn create_context(&mut self) -> Result<u32, AudioError>;

    fn has_context(&self) -> bool;

    fn is_suspended(&self) -> bool;

    fn resume(&mut self) -> Result<(), AudioError>;

    /// Connect a looping source through a gain node to the output and start it.
    fn start_loop(&mut self, buffer: Vec<f32>, gain: f32) -> Result<SourceId, AudioError>;

    fn set_gain(&mut self, source: SourceId, gain: f32);

    /// Stop and release a source and its gain node. Unknown ids are ignored.
    fn disconnect(&mut self, source: SourceId);

    /// Release the context.
    fn close(&mut self);
}

/// A source as seen by [`MemoryAudioBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySource {
    pub buffer: Vec<f32>,
    pub gain: f32,
    pub looping: bool,
}

/// In-process audio graph.
///
/// Keeps every connected source in memory instead of sending it to a
/// device. Used by tests and by hosts that only need to inspect output.
#[derive(Debug, Default)]
pub struct MemoryAudioBackend {
    sample_rate: u32,
    context: bool,
    suspended: bool,
    next_id: u64,
    sources: HashMap<SourceId, MemorySource>,
    disconnected: Vec<SourceId>,
    contexts_created: usize,
    fail_context: Option<String>,
    fail_resume: Option<String>,
    start_suspended: bool,
}

impl MemoryAudioBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    /// Contexts are created suspended, as before a user gesture.
    pub fn starting_suspended(mut self) -> Self {
        self.start_suspended = true;
        self
    }

    pub fn fail_context_creation(&mut self, reason: impl Into<String>) {
        self.fail_context = Some(reason.into());
    }

    pub fn fail_resume(&mut self, reason: impl Into<String>) {
        self.fail_resume = Some(reason.into());
    }

    pub fn clear_failures(&mut self) {
        self.fail_context = None;
        self.fail_resume = None;
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn contexts_created(&self) -> usize {
        self.contexts_created
    }

    pub fn source(&self, id: SourceId) -> Option<&MemorySource> {
        self.sources.get(&id)
    }

    /// Sources currently connected to the output.
    pub fn active_sources(&self) -> usize {
        self.sources.len()
    }

    pub fn was_disconnected(&self, id: SourceId) -> bool {
        self.disconnected.contains(&id)
    }
}

impl AudioBackend for MemoryAudioBackend {
    fn create_context(&mut self) -> Result<u32, AudioError> {
        if let Some(reason) = &self.fail_context {
            return Err(AudioError::ContextUnavailable(reason.clone()));
        }
        if !self.context {
            self.context = true;
            self.suspended = self.start_suspended;
            self.contexts_created += 1;
        }
        Ok(self.sample_rate)
    }

    fn has_context(&self) -> bool {
        self.context
    }

    fn is_suspended(&self) -> bool {
        self.context && self.suspended
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if let Some(reason) = &self.fail_resume {
            return Err(AudioError::ResumeFailed(reason.clone()));
        }
        self.suspended = false;
        Ok(())
    }

    fn start_loop(&mut self, buffer: Vec<f32>, gain: f32) -> Result<SourceId, AudioError> {
        if !self.context {
            return Err(AudioError::SourceFailed("no audio context".into()));
        }
        self.next_id += 1;
        let id = SourceId(self.next_id);
        self.sources.insert(
            id,
            MemorySource {
                buffer,
                gain,
                looping: true,
            },
        );
        Ok(id)
    }

    fn set_gain(&mut self, source: SourceId, gain: f32) {
        if let Some(s) = self.sources.get_mut(&source) {
            s.gain = gain;
        }
    }

    fn disconnect(&mut self, source: SourceId) {
        if self.sources.remove(&source).is_some() {
            self.disconnected.push(source);
        }
    }

    fn close(&mut self) {
        let ids: Vec<SourceId> = self.sources.keys().copied().collect();
        for id in ids {
            self.disconnect(id);
        }
        self.context = false;
        self.suspended = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_need_a_context() {
        let mut backend = MemoryAudioBackend::new(8_000);
        assert!(backend.start_loop(vec![0.0; 4], 0.5).is_err());
        backend.create_context().unwrap();
        let id = backend.start_loop(vec![0.0; 4], 0.5).unwrap();
        assert_eq!(backend.source(id).map(|s| s.gain), Some(0.5));
    }

    #[test]
    fn context_is_created_once() {
        let mut backend = MemoryAudioBackend::new(8_000);
        backend.create_context().unwrap();
        backend.create_context().unwrap();
        assert_eq!(backend.contexts_created(), 1);
    }

    #[test]
    fn close_disconnects_everything() {
        let mut backend = MemoryAudioBackend::new(8_000);
        backend.create_context().unwrap();
        let a = backend.start_loop(vec![0.0; 4], 0.5).unwrap();
        backend.close();
        assert!(backend.was_disconnected(a));
        assert_eq!(backend.active_sources(), 0);
        assert!(!backend.has_context());
    }
}
