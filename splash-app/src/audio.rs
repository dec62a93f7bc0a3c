//! Audio thread: owns the cpal stream and feeds engine commands to the mixer

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{error, info, warn};

use splash_audio::{AudioCommand, AudioEngine, AudioEvent, EngineState};

/// Rate assumed when the audio thread does not report in time
pub const FALLBACK_SAMPLE_RATE: u32 = 48_000;

/// How long to wait for the output device before starting without it
const READY_TIMEOUT: Duration = Duration::from_secs(2);

const STATE_UPDATE_INTERVAL: Duration = Duration::from_millis(33);

/// Largest callback buffer converted for non-stereo devices
const MAX_CALLBACK_FRAMES: usize = 8192;

pub fn run_audio_thread(
    cmd_rx: Receiver<AudioCommand>,
    evt_tx: Sender<AudioEvent>,
    shutdown: Arc<AtomicBool>,
) {
    let host = cpal::default_host();
    let Some(device) = host.default_output_device() else {
        let _ = evt_tx.send(AudioEvent::Error("No audio output device found".into()));
        return;
    };

    let config = match device.default_output_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = evt_tx.send(AudioEvent::Error(format!(
                "Failed to get audio config: {e}"
            )));
            return;
        }
    };

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    info!(sample_rate, channels, "audio output opened");

    let engine_state = Arc::new(Mutex::new(EngineState::new(sample_rate)));
    let engine_for_callback = engine_state.clone();

    // Allocated once, outside the callback
    let mut stereo_buffer = vec![0.0f32; MAX_CALLBACK_FRAMES * 2];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            // Never block the real-time thread; output silence on contention
            let Some(mut state) = engine_for_callback.try_lock() else {
                data.fill(0.0);
                return;
            };

            write_output(data, channels, &mut stereo_buffer, |buf| state.process(buf));
        },
        |err| {
            error!(error = %err, "audio stream error");
        },
        None,
    );

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = evt_tx.send(AudioEvent::Error(format!(
                "Failed to create audio stream: {e}"
            )));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = evt_tx.send(AudioEvent::Error(format!("Failed to start audio: {e}")));
        return;
    }

    let _ = evt_tx.send(AudioEvent::Ready { sample_rate });

    let mut last_state_update = Instant::now();
    while !shutdown.load(Ordering::Relaxed) {
        match cmd_rx.recv_timeout(Duration::from_millis(10)) {
            Ok(AudioCommand::Shutdown) => break,
            Ok(cmd) => engine_state.lock().handle_command(cmd),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }

        if last_state_update.elapsed() >= STATE_UPDATE_INTERVAL {
            let _ = evt_tx.try_send(engine_state.lock().get_state());
            last_state_update = Instant::now();
        }
    }

    info!("audio thread stopped");
}

/// Fill an interleaved device buffer from the stereo mixer.
///
/// Non-stereo devices are mixed through `scratch` in blocks of at most
/// `scratch.len() / 2` frames; mono gets the average of both sides and
/// channels past the first two stay silent.
fn write_output(
    data: &mut [f32],
    channels: usize,
    scratch: &mut [f32],
    mut mix: impl FnMut(&mut [f32]),
) {
    if channels == 2 {
        mix(data);
        return;
    }

    let channels = channels.max(1);
    data.fill(0.0);
    for block in data.chunks_mut(scratch.len() / 2 * channels) {
        let frames = block.len() / channels;
        let stereo = &mut scratch[..frames * 2];
        mix(stereo);
        for (out, pair) in block.chunks_exact_mut(channels).zip(stereo.chunks_exact(2)) {
            if channels == 1 {
                out[0] = (pair[0] + pair[1]) * 0.5;
            } else {
                out[0] = pair[0];
                out[1] = pair[1];
            }
        }
    }
}

/// Wait for the audio thread to open the device.
///
/// Returns the output rate, or the fallback rate and the reason the device
/// is unavailable.
pub fn wait_for_ready(engine: &AudioEngine) -> (u32, Option<String>) {
    match engine.event_rx.recv_timeout(READY_TIMEOUT) {
        Ok(AudioEvent::Ready { sample_rate }) => (sample_rate, None),
        Ok(AudioEvent::Error(e)) => {
            warn!(error = %e, "audio unavailable");
            (FALLBACK_SAMPLE_RATE, Some(e))
        }
        Ok(AudioEvent::StateUpdate { .. }) | Err(_) => {
            warn!("audio thread did not report ready");
            (FALLBACK_SAMPLE_RATE, None)
        }
    }
}
