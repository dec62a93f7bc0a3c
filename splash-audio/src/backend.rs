//! Engine-backed voices: the UI-side handles for sounds mixed on the audio thread

use crate::engine::AudioCommand;
use crate::playback::{AudioBackend, PlaybackError, Voice};
use crate::voice::{VoiceId, VoiceStatus};
use crossbeam_channel::Sender;
use splash_library::{LoadError, LoadedSample, SampleLoader};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Decodes sounds and creates voices on the audio engine
pub struct EngineBackend {
    commands: Sender<AudioCommand>,
    loader: SampleLoader,
    next_id: VoiceId,
}

impl EngineBackend {
    /// `sample_rate` is the output stream rate; sounds are resampled to it
    pub fn new(commands: Sender<AudioCommand>, sample_rate: u32) -> Self {
        Self {
            commands,
            loader: SampleLoader::with_sample_rate(sample_rate),
            next_id: 1,
        }
    }
}

impl AudioBackend for EngineBackend {
    type Source = Arc<LoadedSample>;
    type Voice = EngineVoice;

    fn load(&mut self, path: &Path) -> Result<Arc<LoadedSample>, LoadError> {
        let sample = self.loader.load(path)?;
        debug!(name = %sample.name, secs = sample.duration_secs(), "sound loaded");
        Ok(Arc::new(sample))
    }

    fn create_voice(&mut self, source: &Arc<LoadedSample>) -> Result<EngineVoice, PlaybackError> {
        let id = self.next_id;
        self.next_id += 1;

        let status = Arc::new(VoiceStatus::default());
        self.commands
            .try_send(AudioCommand::Create {
                id,
                sample: source.clone(),
                status: status.clone(),
            })
            .map_err(|_| PlaybackError::EngineUnavailable)?;

        Ok(EngineVoice {
            id,
            commands: self.commands.clone(),
            status,
            looping: false,
            volume: 1.0,
        })
    }
}

/// Handle to one voice on the audio thread. Dropping it frees the voice.
pub struct EngineVoice {
    id: VoiceId,
    commands: Sender<AudioCommand>,
    status: Arc<VoiceStatus>,
    looping: bool,
    volume: f32,
}

impl EngineVoice {
    pub fn id(&self) -> VoiceId {
        self.id
    }

    fn send(&self, cmd: AudioCommand) -> bool {
        self.commands.try_send(cmd).is_ok()
    }
}

impl Voice for EngineVoice {
    fn play(&mut self) -> Result<(), PlaybackError> {
        if !self.send(AudioCommand::Play(self.id)) {
            return Err(PlaybackError::EngineUnavailable);
        }
        // The engine clears this when the sound ends
        self.status.set_playing(true);
        Ok(())
    }

    fn pause(&mut self) {
        self.send(AudioCommand::Pause(self.id));
        self.status.set_playing(false);
    }

    fn seek_to_start(&mut self) {
        self.send(AudioCommand::SeekToStart(self.id));
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
        self.send(AudioCommand::SetLoop(self.id, looping));
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.send(AudioCommand::SetVolume(self.id, self.volume));
    }

    fn is_playing(&self) -> bool {
        self.status.is_playing()
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}

impl Drop for EngineVoice {
    fn drop(&mut self) {
        self.send(AudioCommand::Release(self.id));
    }
}
