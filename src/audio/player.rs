//! Playback of synthesized clips
//!
//! rodio's output stream is not Send, so a dedicated audio thread owns it and
//! receives commands over a channel.

use crate::tts::cache::AudioClip;
use anyhow::Result;
use async_trait::async_trait;
use std::io::Cursor;
use std::sync::mpsc;
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Something that can play an encoded audio clip
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Start playing `clip`. Returns once playback has begun; an error means
    /// the clip could not be decoded or the output is gone.
    async fn play(&self, clip: &AudioClip) -> Result<()>;

    /// Stop whatever is playing
    fn stop(&self) {}

    /// Resolves once queued audio has finished
    async fn drain(&self) {}
}

enum AudioCommand {
    Play(AudioClip, oneshot::Sender<Result<()>>),
    Drain(oneshot::Sender<()>),
    Stop,
}

/// Thread-safe handle to the rodio audio thread
#[derive(Clone)]
pub struct RodioPlayer {
    sender: mpsc::Sender<AudioCommand>,
}

impl std::fmt::Debug for RodioPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioPlayer").finish()
    }
}

impl RodioPlayer {
    pub fn new() -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<AudioCommand>();

        thread::Builder::new()
            .name("lingochamp-audio".to_string())
            .spawn(move || Self::audio_thread(receiver))?;

        Ok(Self { sender })
    }

    fn audio_thread(receiver: mpsc::Receiver<AudioCommand>) {
        use rodio::OutputStream;

        let (stream, stream_handle) = match OutputStream::try_default() {
            Ok(s) => s,
            Err(e) => {
                warn!("🔇 Failed to initialize audio output: {}", e);
                // Keep answering so callers fall back instead of hanging
                while let Ok(cmd) = receiver.recv() {
                    match cmd {
                        AudioCommand::Play(_, resp) => {
                            let _ = resp.send(Err(anyhow::anyhow!("no audio output: {}", e)));
                        }
                        AudioCommand::Drain(resp) => {
                            let _ = resp.send(());
                        }
                        AudioCommand::Stop => {}
                    }
                }
                return;
            }
        };

        let _stream = stream;
        let mut sink = match rodio::Sink::try_new(&stream_handle) {
            Ok(s) => s,
            Err(e) => {
                error!("❌ Failed to create audio sink: {}", e);
                return;
            }
        };

        info!("🔊 Audio thread started");

        while let Ok(cmd) = receiver.recv() {
            match cmd {
                AudioCommand::Play(clip, resp) => {
                    // Only the newest clip should be heard
                    sink.stop();
                    if let Ok(new_sink) = rodio::Sink::try_new(&stream_handle) {
                        sink = new_sink;
                    }
                    let result = rodio::Decoder::new(Cursor::new(clip.bytes.clone()))
                        .map(|source| {
                            sink.append(source);
                            debug!("🔊 Playing clip ({} bytes)", clip.len());
                        })
                        .map_err(|e| anyhow::anyhow!("undecodable {} clip: {}", clip.mime, e));
                    let _ = resp.send(result);
                }
                AudioCommand::Drain(resp) => {
                    sink.sleep_until_end();
                    let _ = resp.send(());
                }
                AudioCommand::Stop => {
                    sink.stop();
                    if let Ok(new_sink) = rodio::Sink::try_new(&stream_handle) {
                        sink = new_sink;
                    }
                }
            }
        }

        info!("🔇 Audio thread stopped");
    }
}

#[async_trait]
impl AudioPlayer for RodioPlayer {
    async fn play(&self, clip: &AudioClip) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(AudioCommand::Play(clip.clone(), tx))
            .map_err(|e| anyhow::anyhow!("Audio thread disconnected: {}", e))?;
        rx.await
            .map_err(|e| anyhow::anyhow!("Audio thread dropped request: {}", e))?
    }

    fn stop(&self) {
        let _ = self.sender.send(AudioCommand::Stop);
    }

    async fn drain(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(AudioCommand::Drain(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

/// Player used when audio output is disabled
#[derive(Debug, Default)]
pub struct SilentPlayer;

#[async_trait]
impl AudioPlayer for SilentPlayer {
    async fn play(&self, clip: &AudioClip) -> Result<()> {
        debug!("🔇 Audio disabled, skipping {} byte clip", clip.len());
        Ok(())
    }
}
