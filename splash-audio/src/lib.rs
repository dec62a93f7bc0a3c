//! Audio for Splash - key bindings, per-key playback and the mixing engine
//!
//! - Bank: key to sound source lookup
//! - Playback: one live voice per key, held (looping) keys
//! - Engine: audio-thread mixer fed by commands from the UI thread
//! - Backend: UI-side voice handles for the engine

mod backend;
mod bank;
mod engine;
mod playback;
mod voice;

pub use backend::{EngineBackend, EngineVoice};
pub use bank::{BankError, SoundBank};
pub use engine::{AudioCommand, AudioEngine, AudioEvent, EngineState};
pub use playback::{AudioBackend, PlaybackError, PlaybackManager, Voice};
pub use voice::{SampleVoice, VoiceId, VoiceStatus};
