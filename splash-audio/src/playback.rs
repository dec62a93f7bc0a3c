//! Per-key playback - at most one live voice per key, plus the held set

use crate::bank::SoundBank;
use splash_library::{fold_key, LoadError};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Audio engine unavailable")]
    EngineUnavailable,
    #[error("Could not start sound: {0}")]
    Start(String),
}

/// A playable sound instance
pub trait Voice {
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn seek_to_start(&mut self);
    fn set_loop(&mut self, looping: bool);
    /// 0.0-1.0
    fn set_volume(&mut self, volume: f32);

    fn is_playing(&self) -> bool;
    fn is_looping(&self) -> bool;
    fn volume(&self) -> f32;
}

/// Provider of sound sources and voices
pub trait AudioBackend {
    type Source: Clone;
    type Voice: Voice;

    /// Load the sound at `path` into a reusable source
    fn load(&mut self, path: &Path) -> Result<Self::Source, LoadError>;

    /// Create a stopped voice for `source`
    fn create_voice(&mut self, source: &Self::Source) -> Result<Self::Voice, PlaybackError>;
}

/// Owns the current voice of every key and the set of held (looping) keys.
///
/// A key is held exactly when its voice is looping.
pub struct PlaybackManager<V> {
    voices: HashMap<char, V>,
    held: HashSet<char>,
}

impl<V: Voice> PlaybackManager<V> {
    pub fn new() -> Self {
        Self {
            voices: HashMap::new(),
            held: HashSet::new(),
        }
    }

    /// Start a fresh voice for `key`, stopping the previous one.
    ///
    /// Volume is `master_volume / 100`, applied only at start. Returns
    /// `None` when the key has no binding or no voice could be created.
    pub fn activate<B>(
        &mut self,
        bank: &SoundBank<B::Source>,
        backend: &mut B,
        key: char,
        looping: bool,
        master_volume: u8,
    ) -> Option<&V>
    where
        B: AudioBackend<Voice = V>,
    {
        let key = fold_key(key);
        let Some(source) = bank.resolve(key) else {
            debug!(%key, "no binding, ignoring activation");
            return None;
        };

        if let Some(previous) = self.voices.get_mut(&key) {
            if previous.is_playing() {
                previous.pause();
                previous.seek_to_start();
            }
        }

        let mut voice = match backend.create_voice(source) {
            Ok(voice) => voice,
            Err(e) => {
                warn!(%key, error = %e, "could not create voice");
                return None;
            }
        };

        voice.set_volume(f32::from(master_volume.min(100)) / 100.0);
        voice.set_loop(looping);
        if let Err(e) = voice.play() {
            warn!(%key, error = %e, "audio play failed");
        }

        if looping {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }

        self.voices.insert(key, voice);
        self.voices.get(&key)
    }

    /// Let a held key's sound finish its current cycle instead of looping.
    /// Returns false if the key was not held.
    pub fn release(&mut self, key: char) -> bool {
        let key = fold_key(key);
        if !self.held.remove(&key) {
            return false;
        }
        if let Some(voice) = self.voices.get_mut(&key) {
            if voice.is_looping() {
                voice.set_loop(false);
            }
        }
        debug!(%key, "released");
        true
    }

    /// Silence everything immediately and forget held keys
    pub fn stop_all(&mut self) {
        for voice in self.voices.values_mut() {
            voice.set_loop(false);
            voice.pause();
            voice.seek_to_start();
        }
        self.held.clear();
    }

    /// Stop everything and drop all voices
    pub fn clear(&mut self) {
        self.stop_all();
        self.voices.clear();
    }

    pub fn voice(&self, key: char) -> Option<&V> {
        self.voices.get(&fold_key(key))
    }

    pub fn is_held(&self, key: char) -> bool {
        self.held.contains(&fold_key(key))
    }

    pub fn held_keys(&self) -> &HashSet<char> {
        &self.held
    }

    /// Number of voices currently producing sound
    pub fn playing_count(&self) -> usize {
        self.voices.values().filter(|v| v.is_playing()).count()
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }
}

impl<V: Voice> Default for PlaybackManager<V> {
    fn default() -> Self {
        Self::new()
    }
}
