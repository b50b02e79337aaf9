//! Wyoming Protocol Recognizer
//!
//! Captures one listening window from the microphone and sends it to a
//! Wyoming ASR server (events are JSON lines over TCP).
//!
//! Reference: https://github.com/rhasspy/wyoming

use super::{RecognitionError, RecognitionEvent, Recognizer};
use crate::audio;
use crate::config::Config;
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Below this RMS energy a capture is treated as silence
const SILENCE_ENERGY: f32 = 200.0;

/// Wyoming client for ASR services
#[derive(Debug, Clone)]
pub struct WyomingClient {
    host: String,
    port: u16,
    sample_rate: u32,
    timeout: Duration,
}

impl WyomingClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            sample_rate: audio::SAMPLE_RATE,
            timeout: Duration::from_secs(30),
        }
    }

    /// Check if the server is reachable
    pub async fn health_check(&self) -> bool {
        match TcpStream::connect((&*self.host, self.port)).await {
            Ok(_) => {
                debug!("Wyoming server available at {}:{}", self.host, self.port);
                true
            }
            Err(e) => {
                warn!("Wyoming server not available: {}", e);
                false
            }
        }
    }

    /// Send 16-bit mono PCM and return the transcript (possibly empty)
    pub async fn transcribe(&self, samples: &[i16], language: &str) -> Result<String> {
        let stream = TcpStream::connect((&*self.host, self.port))
            .await
            .context("Failed to connect to Wyoming server")?;

        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        let audio_bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let language = language.split('-').next().unwrap_or("en");

        let events = [
            serde_json::json!({"type": "transcribe", "data": {"language": language}}),
            serde_json::json!({
                "type": "audio-start",
                "data": {"rate": self.sample_rate, "width": 2, "channels": 1}
            }),
            serde_json::json!({
                "type": "audio-chunk",
                "data": {
                    "rate": self.sample_rate,
                    "width": 2,
                    "channels": 1,
                    "audio": STANDARD.encode(&audio_bytes),
                    "timestamp": 0
                }
            }),
            serde_json::json!({"type": "audio-stop"}),
        ];
        for event in &events {
            writer.write_all(event.to_string().as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
        writer.flush().await?;

        debug!(
            "Sent audio ({} bytes), waiting for transcript...",
            audio_bytes.len()
        );

        let transcript = tokio::time::timeout(self.timeout, async {
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).await? == 0 {
                    break;
                }

                if let Ok(event) = serde_json::from_str::<serde_json::Value>(&line) {
                    if event.get("type").and_then(|t| t.as_str()) == Some("transcript") {
                        if let Some(text) = event
                            .get("data")
                            .and_then(|d| d.get("text"))
                            .and_then(|t| t.as_str())
                        {
                            return Ok::<_, anyhow::Error>(text.trim().to_string());
                        }
                    }
                }
            }
            Ok(String::new())
        })
        .await
        .context("Timeout waiting for transcript")??;

        info!("📝 Wyoming transcript: '{}'", transcript);
        Ok(transcript)
    }
}

/// Microphone + Wyoming recognition
#[derive(Debug)]
pub struct WyomingRecognizer {
    client: WyomingClient,
    device: Option<usize>,
    window: Duration,
}

impl WyomingRecognizer {
    pub fn new(config: &Config) -> Self {
        Self {
            client: WyomingClient::new(&config.wyoming_host, config.wyoming_port),
            device: config.input_device,
            window: Duration::from_secs(config.listen_seconds.max(1)),
        }
    }
}

impl Recognizer for WyomingRecognizer {
    fn name(&self) -> &str {
        "wyoming"
    }

    fn is_available(&self) -> bool {
        audio::has_input_device()
    }

    fn start(&mut self, language: &str, events: UnboundedSender<RecognitionEvent>) -> Result<()> {
        let client = self.client.clone();
        let device = self.device;
        let window = self.window;
        let language = language.to_string();

        tokio::spawn(async move {
            let _ = events.send(RecognitionEvent::Started);

            let captured =
                tokio::task::spawn_blocking(move || audio::record(device, window)).await;

            let outcome = match captured {
                Ok(Ok(samples)) if audio::calculate_energy(&samples) < SILENCE_ENERGY => {
                    Err(RecognitionError::NoSpeech)
                }
                Ok(Ok(samples)) => match client.transcribe(&samples, &language).await {
                    Ok(text) if text.is_empty() => Err(RecognitionError::NoSpeech),
                    Ok(text) => Ok(text),
                    Err(e) => Err(RecognitionError::Network(e.to_string())),
                },
                Ok(Err(e)) => Err(RecognitionError::AudioCapture(e.to_string())),
                Err(e) => Err(RecognitionError::AudioCapture(e.to_string())),
            };

            let event = match outcome {
                Ok(text) => RecognitionEvent::Transcript(text),
                Err(error) => RecognitionEvent::Error(error),
            };
            let _ = events.send(event);
            let _ = events.send(RecognitionEvent::Ended);
        });
        Ok(())
    }
}
