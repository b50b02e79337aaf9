//! On-device speech synthesis (speech-dispatcher / espeak-ng)
//!
//! Voice enumeration runs in the background; until it finishes
//! [`DeviceSpeech::voices`] returns `None`.

use anyhow::Result;
use async_trait::async_trait;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

/// espeak-ng words per minute at rate 1.0
const BASE_WPM: f32 = 175.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceVoice {
    pub name: String,
    pub language: String,
    /// The platform's default voice for this language
    pub is_default: bool,
}

/// Request for the on-device synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub rate: f32,
    pub voice: Option<String>,
}

/// On-device synthesizer capability
#[async_trait]
pub trait DeviceSpeech: Send + Sync {
    /// Cancel any in-flight speech
    fn cancel(&self);

    /// Enumerated voices, or `None` while enumeration is pending
    fn voices(&self) -> Option<Vec<DeviceVoice>>;

    /// Resolves once voice enumeration has completed
    async fn voices_ready(&self);

    async fn speak(&self, utterance: &Utterance) -> Result<()>;

    fn name(&self) -> &str;
}

/// Pick a voice for `language`, preferring a non-default one
pub fn preferred_voice(voices: &[DeviceVoice], language: &str) -> Option<DeviceVoice> {
    let matching: Vec<&DeviceVoice> = voices
        .iter()
        .filter(|v| v.language.eq_ignore_ascii_case(language))
        .collect();
    matching
        .iter()
        .find(|v| !v.is_default)
        .or_else(|| matching.first())
        .map(|v| (*v).clone())
}

/// Parse `espeak-ng --voices` output. The first voice listed for a language
/// is that language's default.
pub fn parse_espeak_voices(output: &str) -> Vec<DeviceVoice> {
    let mut voices: Vec<DeviceVoice> = Vec::new();
    for line in output.lines().skip(1) {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 5 {
            continue;
        }
        let language = cols[1].to_string();
        let is_default = !voices
            .iter()
            .any(|v| v.language.eq_ignore_ascii_case(&language));
        voices.push(DeviceVoice {
            name: cols[4].to_string(),
            language,
            is_default,
        });
    }
    voices
}

/// System synthesizer backed by spd-say or espeak-ng
pub struct SystemSpeech {
    voices: watch::Receiver<Option<Vec<DeviceVoice>>>,
    current: Mutex<Option<Child>>,
}

impl std::fmt::Debug for SystemSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemSpeech").finish()
    }
}

impl Default for SystemSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSpeech {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(None);

        std::thread::spawn(move || {
            let voices = match Command::new("espeak-ng").arg("--voices").output() {
                Ok(out) if out.status.success() => {
                    parse_espeak_voices(&String::from_utf8_lossy(&out.stdout))
                }
                Ok(out) => {
                    warn!("espeak-ng --voices exited with {}", out.status);
                    Vec::new()
                }
                Err(e) => {
                    debug!("espeak-ng not available for voice listing: {}", e);
                    Vec::new()
                }
            };
            debug!("Enumerated {} device voices", voices.len());
            let _ = tx.send(Some(voices));
        });

        Self {
            voices: rx,
            current: Mutex::new(None),
        }
    }

    fn spawn(utterance: &Utterance) -> Result<Child> {
        let wpm = (BASE_WPM * utterance.rate).round() as u32;

        let mut espeak = Command::new("espeak-ng");
        espeak.arg("-s").arg(wpm.to_string());
        espeak.arg("-v").arg(
            utterance
                .voice
                .clone()
                .unwrap_or_else(|| utterance.language.to_lowercase()),
        );
        espeak.arg(&utterance.text);
        if let Ok(child) = espeak.stdout(Stdio::null()).stderr(Stdio::null()).spawn() {
            return Ok(child);
        }

        // spd-say rate is -100..100 around normal speed
        let spd_rate = ((utterance.rate - 1.0) * 100.0).round().clamp(-100.0, 100.0) as i32;
        let language = utterance.language.split('-').next().unwrap_or("en");
        if let Ok(child) = Command::new("spd-say")
            .arg("-l")
            .arg(language)
            .arg("-r")
            .arg(spd_rate.to_string())
            .arg(&utterance.text)
            .spawn()
        {
            return Ok(child);
        }

        Err(anyhow::anyhow!(
            "No system TTS command found (tried espeak-ng, spd-say)"
        ))
    }
}

#[async_trait]
impl DeviceSpeech for SystemSpeech {
    fn cancel(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(mut child) = current.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }

    fn voices(&self) -> Option<Vec<DeviceVoice>> {
        self.voices.borrow().clone()
    }

    async fn voices_ready(&self) {
        let mut rx = self.voices.clone();
        let _ = rx.wait_for(|v| v.is_some()).await;
    }

    async fn speak(&self, utterance: &Utterance) -> Result<()> {
        debug!("System speaking: {}", utterance.text);
        let child = Self::spawn(utterance)?;
        let mut current = self
            .current
            .lock()
            .map_err(|e| anyhow::anyhow!("speech lock poisoned: {}", e))?;
        *current = Some(child);
        Ok(())
    }

    fn name(&self) -> &str {
        "system"
    }
}
