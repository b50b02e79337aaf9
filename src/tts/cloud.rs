//! Cloud speech synthesis (Google Text-to-Speech REST API)

use super::cache::AudioClip;
use crate::config::Config;
use crate::error::{LingoError, LingoResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Remote synthesizer returning encoded audio
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str) -> LingoResult<AudioClip>;

    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisResponse {
    audio_content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CloudSynthesizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    default_language: String,
    premium_voice: String,
    speaking_rate: f32,
}

impl CloudSynthesizer {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.tts_endpoint.clone(),
            api_key: config.tts_api_key.clone(),
            default_language: config.language.clone(),
            premium_voice: config.premium_voice.clone(),
            speaking_rate: config.speaking_rate,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// High-quality voice for the default language, a standard one otherwise
    pub fn voice_for(&self, language: &str) -> String {
        if language == self.default_language {
            self.premium_voice.clone()
        } else {
            format!("{}-Standard-A", language)
        }
    }

    fn request_body(&self, text: &str, language: &str) -> serde_json::Value {
        serde_json::json!({
            "input": { "text": text },
            "voice": {
                "languageCode": language,
                "name": self.voice_for(language),
                "ssmlGender": "NEUTRAL"
            },
            "audioConfig": {
                "audioEncoding": "MP3",
                "speakingRate": self.speaking_rate,
                "pitch": 0,
                "volumeGainDb": 0
            }
        })
    }
}

/// Decode the `audioContent` payload of a synthesis response
fn decode_response(body: &str) -> LingoResult<AudioClip> {
    let response: SynthesisResponse = serde_json::from_str(body)?;
    let content = response
        .audio_content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| LingoError::Tts("response carried no audio".to_string()))?;
    let bytes = STANDARD
        .decode(content.as_bytes())
        .map_err(|e| LingoError::Tts(format!("invalid audio payload: {}", e)))?;
    Ok(AudioClip::mp3(bytes))
}

#[async_trait]
impl SynthesisBackend for CloudSynthesizer {
    async fn synthesize(&self, text: &str, language: &str) -> LingoResult<AudioClip> {
        if !self.is_configured() {
            return Err(LingoError::Tts("no TTS API key configured".to_string()));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(text, language))
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            warn!("❌ TTS API Error ({}): {}", status, body_text);
            return Err(LingoError::Tts(format!("synthesis failed with {}", status)));
        }

        let clip = decode_response(&body_text)?;
        debug!("🗣️ Synthesized {} bytes for '{}'", clip.len(), text);
        Ok(clip)
    }

    fn name(&self) -> &str {
        "google-tts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_selection() {
        let synth = CloudSynthesizer::new(&Config::default());
        assert_eq!(synth.voice_for("en-US"), "en-US-Neural2-F");
        assert_eq!(synth.voice_for("en-GB"), "en-GB-Standard-A");
    }

    #[test]
    fn test_request_body_shape() {
        let synth = CloudSynthesizer::new(&Config::default());
        let body = synth.request_body("vivid", "en-US");
        assert_eq!(body["input"]["text"], "vivid");
        assert_eq!(body["voice"]["ssmlGender"], "NEUTRAL");
        assert_eq!(body["audioConfig"]["audioEncoding"], "MP3");
        let rate = body["audioConfig"]["speakingRate"].as_f64().unwrap();
        assert!((rate - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_decode_response() {
        let clip = decode_response(r#"{"audioContent":"AQID"}"#).unwrap();
        assert_eq!(&*clip.bytes, &[1u8, 2, 3]);
        assert_eq!(clip.mime, "audio/mpeg");

        assert!(decode_response("{}").is_err());
        assert!(decode_response(r#"{"audioContent":""}"#).is_err());
        assert!(decode_response(r#"{"audioContent":"***"}"#).is_err());
        assert!(decode_response("not json").is_err());
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        let mut config = Config::default();
        config.tts_endpoint = "http://127.0.0.1:1/unreachable".to_string();
        let synth = CloudSynthesizer::new(&config);
        match synth.synthesize("hello", "en-US").await {
            Err(LingoError::Tts(msg)) => assert!(msg.contains("API key")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
