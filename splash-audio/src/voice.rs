//! Sample voice - one playing instance of a decoded sound (audio thread side)

use splash_library::LoadedSample;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Voice state visible from the UI thread
#[derive(Debug, Default)]
pub struct VoiceStatus {
    playing: AtomicBool,
}

impl VoiceStatus {
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Relaxed);
    }
}

/// Identifier shared by a voice and its UI-side handle
pub type VoiceId = u64;

/// A cursor over interleaved stereo samples
pub struct SampleVoice {
    id: VoiceId,
    /// Shared with every other voice of the same key
    sample: Arc<LoadedSample>,
    /// Current frame
    position: usize,
    volume: f32,
    looping: bool,
    playing: bool,
    status: Arc<VoiceStatus>,
}

impl SampleVoice {
    pub fn new(id: VoiceId, sample: Arc<LoadedSample>, status: Arc<VoiceStatus>) -> Self {
        Self {
            id,
            sample,
            position: 0,
            volume: 1.0,
            looping: false,
            playing: false,
            status,
        }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn frames(&self) -> usize {
        self.sample.frames()
    }

    pub fn play(&mut self) {
        // A finished one-shot restarts from the top
        if self.position >= self.frames() {
            self.position = 0;
        }
        self.playing = self.frames() > 0;
        self.status.set_playing(self.playing);
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.status.set_playing(false);
    }

    pub fn seek_to_start(&mut self) {
        self.position = 0;
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Add this voice into an interleaved stereo buffer
    pub fn mix_into(&mut self, output: &mut [f32]) {
        if !self.playing {
            return;
        }

        let frames = self.frames();
        let samples = &self.sample.samples;
        for frame in output.chunks_exact_mut(2) {
            if self.position >= frames {
                if self.looping {
                    self.position = 0;
                } else {
                    self.playing = false;
                    self.status.set_playing(false);
                    return;
                }
            }

            let idx = self.position * 2;
            frame[0] += samples[idx] * self.volume;
            frame[1] += samples[idx + 1] * self.volume;
            self.position += 1;
        }
    }
}
