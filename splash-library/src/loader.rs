//! Sound file validation and decoding

use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading a sound
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Please choose a valid audio file (e.g. MP3): {0}")]
    UnsupportedAsset(String),
    #[error("No audio track found in file")]
    NoAudioTrack,
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Audio file types accepted for key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Ogg,
    Flac,
    Aac,
}

impl AudioFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Some(Self::Mp3),
            "wav" | "wave" => Some(Self::Wav),
            "ogg" | "oga" => Some(Self::Ogg),
            "flac" => Some(Self::Flac),
            "m4a" | "aac" => Some(Self::Aac),
            _ => None,
        }
    }
}

/// Check that `path` names an audio file before trying to bind it
pub fn validate_asset(path: &Path) -> Result<AudioFormat, LoadError> {
    AudioFormat::from_path(path)
        .ok_or_else(|| LoadError::UnsupportedAsset(path.display().to_string()))
}

/// A decoded sound, ready for playback
#[derive(Debug, Clone)]
pub struct LoadedSample {
    /// Interleaved stereo samples (f32, normalized to -1.0 to 1.0)
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// File stem, for display
    pub name: String,
}

impl LoadedSample {
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Sound loader using Symphonia
pub struct SampleLoader {
    target_sample_rate: u32,
}

impl Default for SampleLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleLoader {
    /// Create a new loader with default 48kHz sample rate
    pub fn new() -> Self {
        Self::with_sample_rate(48000)
    }

    /// Create a new loader that resamples to the output device rate
    pub fn with_sample_rate(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// Validate, decode and resample a sound file
    pub fn load(&self, path: &Path) -> Result<LoadedSample, LoadError> {
        let format_kind = validate_asset(path)?;

        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(LoadError::NoAudioTrack)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let source_sample_rate = codec_params.sample_rate.unwrap_or(44100);
        let channels = codec_params
            .channels
            .map(|c| c.count())
            .unwrap_or(2);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut decoded_samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(_) => break,
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(_) => continue,
            };

            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;

            let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
            sample_buf.copy_interleaved_ref(decoded);
            decoded_samples.extend_from_slice(sample_buf.samples());
        }

        let stereo = to_stereo(&decoded_samples, channels);

        let (samples, sample_rate) = if source_sample_rate != self.target_sample_rate {
            (
                self.resample(&stereo, source_sample_rate)?,
                self.target_sample_rate,
            )
        } else {
            (stereo, source_sample_rate)
        };

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_string();

        debug!(
            path = %path.display(),
            format = ?format_kind,
            frames = samples.len() / 2,
            sample_rate,
            "sample decoded"
        );

        Ok(LoadedSample {
            samples,
            sample_rate,
            name,
        })
    }

    /// Resample interleaved stereo audio to the target rate
    fn resample(&self, samples: &[f32], source_rate: u32) -> Result<Vec<f32>, LoadError> {
        use rubato::{FftFixedInOut, Resampler};

        const CHANNELS: usize = 2;
        let frames = samples.len() / CHANNELS;

        let mut resampler = FftFixedInOut::<f32>::new(
            source_rate as usize,
            self.target_sample_rate as usize,
            1024,
            CHANNELS,
        )
        .map_err(|e| LoadError::Decode(e.to_string()))?;

        let deinterleaved: Vec<Vec<f32>> = (0..CHANNELS)
            .map(|ch| (0..frames).map(|f| samples[f * CHANNELS + ch]).collect())
            .collect();

        let chunk_size = resampler.input_frames_next();
        let mut output: Vec<Vec<f32>> = vec![Vec::new(); CHANNELS];

        let mut pos = 0;
        while pos + chunk_size <= frames {
            let input_refs: Vec<&[f32]> = deinterleaved
                .iter()
                .map(|ch| &ch[pos..pos + chunk_size])
                .collect();

            let resampled = resampler
                .process(&input_refs, None)
                .map_err(|e| LoadError::Decode(e.to_string()))?;

            for (ch, data) in resampled.into_iter().enumerate() {
                output[ch].extend(data);
            }

            pos += chunk_size;
        }

        // Zero-pad the tail and keep only its proportional share of output
        if pos < frames {
            let remaining = frames - pos;
            let padded: Vec<Vec<f32>> = deinterleaved
                .iter()
                .map(|ch| {
                    let mut v = ch[pos..].to_vec();
                    v.resize(chunk_size, 0.0);
                    v
                })
                .collect();

            let input_refs: Vec<&[f32]> = padded.iter().map(|v| v.as_slice()).collect();

            if let Ok(resampled) = resampler.process(&input_refs, None) {
                let output_frames =
                    (remaining * self.target_sample_rate as usize) / source_rate as usize;
                for (ch, data) in resampled.into_iter().enumerate() {
                    output[ch].extend(&data[..output_frames.min(data.len())]);
                }
            }
        }

        Ok(interleave(&output[0], &output[1]))
    }
}

/// Fold any channel layout down to interleaved stereo
fn to_stereo(samples: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().flat_map(|&s| [s, s]).collect(),
        2 => samples.to_vec(),
        n => samples
            .chunks_exact(n)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}

fn interleave(left: &[f32], right: &[f32]) -> Vec<f32> {
    left.iter()
        .zip(right)
        .flat_map(|(&l, &r)| [l, r])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_audio_format_detection() {
        assert_eq!(AudioFormat::from_path(Path::new("a.mp3")), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_path(Path::new("b.WAV")), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_path(Path::new("dir/c.ogg")), Some(AudioFormat::Ogg));
        assert_eq!(AudioFormat::from_path(Path::new("d.m4a")), Some(AudioFormat::Aac));
        assert_eq!(AudioFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(AudioFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_load_rejects_unsupported_before_io() {
        let loader = SampleLoader::new();
        let err = loader.load(&PathBuf::from("/nonexistent/cover.png")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedAsset(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let loader = SampleLoader::new();
        let err = loader.load(&PathBuf::from("/nonexistent/kick.wav")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_to_stereo() {
        assert_eq!(to_stereo(&[0.1, 0.2], 1), vec![0.1, 0.1, 0.2, 0.2]);
        assert_eq!(to_stereo(&[0.1, 0.2], 2), vec![0.1, 0.2]);
        assert_eq!(
            to_stereo(&[0.1, 0.2, 0.9, 0.3, 0.4, 0.9], 3),
            vec![0.1, 0.2, 0.3, 0.4]
        );
    }

    #[test]
    fn test_resample_changes_length() {
        let loader = SampleLoader::with_sample_rate(48000);
        let input = vec![0.0f32; 44100 * 2];
        let output = loader.resample(&input, 44100).unwrap();
        let frames = output.len() / 2;
        assert!(
            (47000..=48000).contains(&frames),
            "expected about one second, got {frames} frames"
        );
    }
}
