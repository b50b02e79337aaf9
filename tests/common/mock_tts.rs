//! Mock speech output and device synthesizer for testing
//!
//! Records all spoken text for verification.

use anyhow::Result;
use async_trait::async_trait;
use lingochamp::audio::player::AudioPlayer;
use lingochamp::tts::{AudioClip, DeviceSpeech, DeviceVoice, TtsEngine, Utterance};
use std::sync::{Arc, Mutex};

/// Mock TTS engine that records spoken text
#[derive(Debug, Clone, Default)]
pub struct MockTts {
    pub spoken: Arc<Mutex<Vec<String>>>,
}

impl MockTts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn was_spoken(&self, text: &str) -> bool {
        self.spoken.lock().unwrap().iter().any(|s| s == text)
    }
}

#[async_trait]
impl TtsEngine for MockTts {
    async fn speak(&self, text: &str, _language: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Device synthesizer with a ready voice list that records utterances
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    pub utterances: Arc<Mutex<Vec<Utterance>>>,
    pub cancels: Arc<Mutex<usize>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.utterances.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceSpeech for MockDevice {
    fn cancel(&self) {
        *self.cancels.lock().unwrap() += 1;
    }

    fn voices(&self) -> Option<Vec<DeviceVoice>> {
        Some(vec![
            DeviceVoice {
                name: "default-us".to_string(),
                language: "en-US".to_string(),
                is_default: true,
            },
            DeviceVoice {
                name: "clear-us".to_string(),
                language: "en-US".to_string(),
                is_default: false,
            },
        ])
    }

    async fn voices_ready(&self) {}

    async fn speak(&self, utterance: &Utterance) -> Result<()> {
        self.utterances.lock().unwrap().push(utterance.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "mock-device"
    }
}

/// Player that records clip sizes instead of playing them
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    pub played: Arc<Mutex<Vec<usize>>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<usize> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioPlayer for RecordingPlayer {
    async fn play(&self, clip: &AudioClip) -> Result<()> {
        self.played.lock().unwrap().push(clip.len());
        Ok(())
    }
}
