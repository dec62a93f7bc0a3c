//! Audio engine - mixes every live key voice into the output stream

use crate::voice::{SampleVoice, VoiceId, VoiceStatus};
use crossbeam_channel::{bounded, Receiver, Sender};
use splash_library::LoadedSample;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Commands sent to the audio engine
#[derive(Debug, Clone)]
pub enum AudioCommand {
    /// Register a stopped voice. The sample is shared, not copied.
    Create {
        id: VoiceId,
        sample: Arc<LoadedSample>,
        status: Arc<VoiceStatus>,
    },
    Play(VoiceId),
    Pause(VoiceId),
    SeekToStart(VoiceId),
    SetLoop(VoiceId, bool),
    SetVolume(VoiceId, f32),
    /// Drop the voice entirely
    Release(VoiceId),
    StopAll,

    // System
    Shutdown,
}

/// Events sent from the audio engine
#[derive(Debug, Clone)]
pub enum AudioEvent {
    /// Output stream is running at this rate
    Ready { sample_rate: u32 },
    /// State update for UI rendering
    StateUpdate { active_voices: usize, peak: f32 },
    /// Error occurred
    Error(String),
}

/// Peak meter falloff per processed buffer
const PEAK_DECAY: f32 = 0.9;

/// Audio engine state (held in audio thread)
pub struct EngineState {
    voices: Vec<SampleVoice>,
    sample_rate: u32,
    peak: f32,
}

impl EngineState {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            voices: Vec::with_capacity(64),
            sample_rate,
            peak: 0.0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn voice_mut(&mut self, id: VoiceId) -> Option<&mut SampleVoice> {
        self.voices.iter_mut().find(|v| v.id() == id)
    }

    pub fn voice(&self, id: VoiceId) -> Option<&SampleVoice> {
        self.voices.iter().find(|v| v.id() == id)
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_playing()).count()
    }

    pub fn handle_command(&mut self, cmd: AudioCommand) {
        trace!(?cmd, "engine command");
        match cmd {
            AudioCommand::Create { id, sample, status } => {
                self.voices.push(SampleVoice::new(id, sample, status));
            }
            AudioCommand::Play(id) => {
                if let Some(v) = self.voice_mut(id) {
                    v.play();
                }
            }
            AudioCommand::Pause(id) => {
                if let Some(v) = self.voice_mut(id) {
                    v.pause();
                }
            }
            AudioCommand::SeekToStart(id) => {
                if let Some(v) = self.voice_mut(id) {
                    v.seek_to_start();
                }
            }
            AudioCommand::SetLoop(id, looping) => {
                if let Some(v) = self.voice_mut(id) {
                    v.set_loop(looping);
                }
            }
            AudioCommand::SetVolume(id, volume) => {
                if let Some(v) = self.voice_mut(id) {
                    v.set_volume(volume);
                }
            }
            AudioCommand::Release(id) => {
                self.voices.retain(|v| v.id() != id);
            }
            AudioCommand::StopAll => {
                for v in &mut self.voices {
                    v.set_loop(false);
                    v.pause();
                    v.seek_to_start();
                }
            }
            AudioCommand::Shutdown => {}
        }
    }

    /// Fill an interleaved stereo buffer
    pub fn process(&mut self, output: &mut [f32]) {
        output.fill(0.0);

        for voice in &mut self.voices {
            voice.mix_into(output);
        }

        let mut peak = self.peak * PEAK_DECAY;
        for sample in output.iter_mut() {
            *sample = soft_clip(*sample);
            peak = peak.max(sample.abs());
        }
        self.peak = peak;
    }

    /// Get current state for UI
    pub fn get_state(&self) -> AudioEvent {
        AudioEvent::StateUpdate {
            active_voices: self.active_voices(),
            peak: self.peak,
        }
    }
}

/// Soft clip threshold
const SOFT_CLIP_THRESHOLD: f32 = 0.75;
/// Soft clip ceiling
const SOFT_CLIP_CEILING: f32 = 0.89;

/// Gentle soft clipper for the mix bus.
///
/// Transparent below the threshold. Many keys sounding at once approach the
/// ceiling asymptotically instead of clipping hard.
#[inline(always)]
fn soft_clip(x: f32) -> f32 {
    let abs_x = x.abs();
    if abs_x <= SOFT_CLIP_THRESHOLD {
        return x;
    }

    let sign = x.signum();
    let knee_width = SOFT_CLIP_CEILING - SOFT_CLIP_THRESHOLD;
    let ratio = (abs_x - SOFT_CLIP_THRESHOLD) / knee_width;
    let compressed = SOFT_CLIP_THRESHOLD + knee_width * (1.0 - (-ratio * 3.0).exp());
    sign * compressed.min(SOFT_CLIP_CEILING)
}

/// Audio engine handle (used by UI thread)
pub struct AudioEngine {
    /// Send commands to audio thread
    pub command_tx: Sender<AudioCommand>,
    /// Receive events from audio thread
    pub event_rx: Receiver<AudioEvent>,
    /// Shutdown flag
    shutdown: Arc<AtomicBool>,
}

impl AudioEngine {
    /// Create channels for engine communication
    pub fn create_channels() -> (
        Sender<AudioCommand>,
        Receiver<AudioCommand>,
        Sender<AudioEvent>,
        Receiver<AudioEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(1024);
        let (evt_tx, evt_rx) = bounded(1024);
        (cmd_tx, cmd_rx, evt_tx, evt_rx)
    }

    /// Create a new engine handle
    pub fn new(command_tx: Sender<AudioCommand>, event_rx: Receiver<AudioEvent>) -> Self {
        Self {
            command_tx,
            event_rx,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag shared with the audio thread's command loop
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Send a command to the audio engine
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.command_tx.try_send(cmd);
    }

    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = self.command_tx.try_send(AudioCommand::Shutdown);
    }
}
