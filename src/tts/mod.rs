//! Speech Output
//!
//! [`SpeechOutput`] prefers cloud synthesis and falls back to the on-device
//! synthesizer on any failure. Synthesized clips are cached by exact text.

pub mod cache;
pub mod cloud;
pub mod system;

use crate::audio::player::{AudioPlayer, RodioPlayer, SilentPlayer};
use crate::config::Config;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

pub use cache::{AudioCache, AudioClip};
pub use cloud::{CloudSynthesizer, SynthesisBackend};
pub use system::{preferred_voice, DeviceSpeech, DeviceVoice, SystemSpeech, Utterance};

/// Pause between cancelling device speech and starting a new utterance
pub const FALLBACK_DELAY: Duration = Duration::from_millis(100);

/// Longest wait for device voice enumeration
pub const VOICE_LIST_TIMEOUT: Duration = Duration::from_secs(1);

/// Trait for TTS engines. Speaking never fails to the caller.
#[async_trait]
pub trait TtsEngine: Send + Sync {
    async fn speak(&self, text: &str, language: &str);

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Cloud-first speech output with cache and device fallback
pub struct SpeechOutput {
    backend: Arc<dyn SynthesisBackend>,
    player: Arc<dyn AudioPlayer>,
    device: Arc<dyn DeviceSpeech>,
    cache: Mutex<AudioCache>,
    fallback_rate: f32,
}

impl std::fmt::Debug for SpeechOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechOutput")
            .field("backend", &self.backend.name())
            .field("device", &self.device.name())
            .finish()
    }
}

impl SpeechOutput {
    pub fn new(
        backend: Arc<dyn SynthesisBackend>,
        player: Arc<dyn AudioPlayer>,
        device: Arc<dyn DeviceSpeech>,
        cache: AudioCache,
    ) -> Self {
        Self {
            backend,
            player,
            device,
            cache: Mutex::new(cache),
            fallback_rate: 0.8,
        }
    }

    pub fn with_fallback_rate(mut self, rate: f32) -> Self {
        self.fallback_rate = rate;
        self
    }

    /// Build the configured cloud/rodio/system stack
    pub fn from_config(config: &Config) -> Self {
        let player: Arc<dyn AudioPlayer> = if !config.audio_enabled {
            info!("🔇 Audio output disabled");
            Arc::new(SilentPlayer)
        } else {
            match RodioPlayer::new() {
                Ok(p) => Arc::new(p),
                Err(e) => {
                    warn!("⚠️ Audio player unavailable, clips will fall back: {}", e);
                    Arc::new(SilentPlayer)
                }
            }
        };

        let backend = CloudSynthesizer::new(config);
        if !backend.is_configured() {
            info!("🔑 No TTS API key, using on-device speech only");
        }

        Self::new(
            Arc::new(backend),
            player,
            Arc::new(SystemSpeech::new()),
            AudioCache::new(),
        )
        .with_fallback_rate(config.fallback_rate)
    }

    /// Number of cached clips
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Wait for clip playback to finish
    pub async fn drain(&self) {
        self.player.drain().await;
    }

    /// Release every cached clip and stop playback
    pub fn cleanup(&self) -> usize {
        self.player.stop();
        let released = match self.cache.lock() {
            Ok(mut cache) => cache.clear(),
            Err(e) => {
                warn!("Audio cache lock poisoned: {}", e);
                0
            }
        };
        debug!("🧹 Released {} cached clips", released);
        released
    }

    fn cached(&self, text: &str) -> Option<AudioClip> {
        self.cache.lock().ok().and_then(|c| c.get(text).cloned())
    }

    fn store(&self, text: &str, clip: AudioClip) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(text, clip);
        }
    }

    /// Try cache then cloud. `false` means the fallback must run.
    async fn speak_cloud(&self, text: &str, language: &str) -> bool {
        if let Some(clip) = self.cached(text) {
            return match self.player.play(&clip).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("⚠️ Cached clip playback failed: {}", e);
                    false
                }
            };
        }

        let clip = match self.backend.synthesize(text, language).await {
            Ok(clip) => clip,
            Err(e) => {
                warn!("⚠️ {} synthesis failed, using device voice: {}", self.backend.name(), e);
                return false;
            }
        };
        self.store(text, clip.clone());

        match self.player.play(&clip).await {
            Ok(()) => true,
            Err(e) => {
                warn!("⚠️ Clip playback failed: {}", e);
                false
            }
        }
    }

    /// On-device speech
    async fn speak_device(&self, text: &str, language: &str) {
        self.device.cancel();
        tokio::time::sleep(FALLBACK_DELAY).await;

        let voices = match self.device.voices() {
            Some(voices) => voices,
            None => {
                debug!("Waiting for device voices...");
                let _ = tokio::time::timeout(VOICE_LIST_TIMEOUT, self.device.voices_ready()).await;
                self.device.voices().unwrap_or_default()
            }
        };

        let utterance = Utterance {
            text: text.to_string(),
            language: language.to_string(),
            rate: self.fallback_rate,
            voice: preferred_voice(&voices, language).map(|v| v.name),
        };
        if let Err(e) = self.device.speak(&utterance).await {
            warn!("❌ Device speech failed: {}", e);
        }
    }
}

#[async_trait]
impl TtsEngine for SpeechOutput {
    async fn speak(&self, text: &str, language: &str) {
        if text.trim().is_empty() {
            return;
        }
        debug!("📢 Speaking '{}' ({})", text, language);
        if !self.speak_cloud(text, language).await {
            self.speak_device(text, language).await;
        }
    }

    fn name(&self) -> &str {
        "speech-output"
    }
}
