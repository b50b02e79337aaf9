//! Typed stand-in for a microphone
//!
//! While a session is open, the next line the learner types is treated as
//! the recognized utterance.

use super::{RecognitionEvent, Recognizer};
use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ConsoleRecognizer {
    session: Option<UnboundedSender<RecognitionEvent>>,
}

impl ConsoleRecognizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Recognizer for ConsoleRecognizer {
    fn name(&self) -> &str {
        "console"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn start(&mut self, _language: &str, events: UnboundedSender<RecognitionEvent>) -> Result<()> {
        events
            .send(RecognitionEvent::Started)
            .map_err(|e| anyhow::anyhow!("event receiver dropped: {}", e))?;
        self.session = Some(events);
        Ok(())
    }

    fn accept_typed(&mut self, text: &str) -> bool {
        let Some(events) = self.session.take() else {
            return false;
        };
        let text = text.trim();
        debug!("Console utterance: '{}'", text);
        if !text.is_empty() {
            let _ = events.send(RecognitionEvent::Transcript(text.to_string()));
        }
        let _ = events.send(RecognitionEvent::Ended);
        true
    }
}
