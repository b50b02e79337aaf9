//! Audio capture (cpal) and playback (rodio)

pub mod player;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use player::{AudioPlayer, RodioPlayer};

pub const SAMPLE_RATE: u32 = 16000;
const CHUNK_SIZE: usize = 1024;

/// Whether the host exposes any input device
pub fn has_input_device() -> bool {
    cpal::default_host().default_input_device().is_some()
}

/// Live capture. Dropping it stops the stream.
pub struct Capture {
    _stream: cpal::Stream,
    pub receiver: Receiver<Vec<i16>>,
}

/// Start audio capture from `device_index` (or the default input)
pub fn start_capture(device_index: Option<usize>) -> Result<Capture> {
    let host = cpal::default_host();

    let device = if let Some(idx) = device_index {
        host.input_devices()?
            .nth(idx)
            .context("Device index out of range")?
    } else {
        host.default_input_device()
            .context("No default input device")?
    };

    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    info!("Using audio device: {}", device_name);

    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Fixed(CHUNK_SIZE as u32),
    };

    let (tx, rx): (Sender<Vec<i16>>, Receiver<Vec<i16>>) = mpsc::channel();

    let stream = device.build_input_stream(
        &config,
        move |data: &[i16], _: &cpal::InputCallbackInfo| {
            if tx.send(data.to_vec()).is_err() {
                debug!("Audio receiver dropped");
            }
        },
        |err| {
            warn!("Audio stream error: {}", err);
        },
        None,
    )?;

    stream.play()?;

    Ok(Capture {
        _stream: stream,
        receiver: rx,
    })
}

/// Record for `window` and return every captured sample (blocking)
pub fn record(device_index: Option<usize>, window: Duration) -> Result<Vec<i16>> {
    let capture = start_capture(device_index)?;
    let deadline = Instant::now() + window;
    let mut samples = Vec::with_capacity(SAMPLE_RATE as usize * window.as_secs() as usize);

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match capture.receiver.recv_timeout(remaining) {
            Ok(chunk) => samples.extend_from_slice(&chunk),
            Err(mpsc::RecvTimeoutError::Timeout) => break,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                anyhow::bail!("Audio stream closed during capture")
            }
        }
    }

    debug!("Captured {} samples", samples.len());
    Ok(samples)
}

/// RMS energy of a block of samples
pub fn calculate_energy(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: i64 = samples.iter().map(|&s| (s as i64).pow(2)).sum();
    (sum as f32 / samples.len() as f32).sqrt()
}
