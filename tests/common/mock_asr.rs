//! Scripted recognizer for testing
//!
//! Each `start` replays the next scripted session and closes it with
//! `Ended`.

use anyhow::Result;
use lingochamp::asr::{RecognitionError, RecognitionEvent, Recognizer};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;

pub enum Scripted {
    Heard(&'static str),
    Silence,
    Fail(RecognitionError),
}

pub struct MockRecognizer {
    script: VecDeque<Scripted>,
    pub starts: Arc<Mutex<usize>>,
}

impl MockRecognizer {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: script.into(),
            starts: Arc::new(Mutex::new(0)),
        }
    }
}

impl Recognizer for MockRecognizer {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn start(&mut self, _language: &str, events: UnboundedSender<RecognitionEvent>) -> Result<()> {
        *self.starts.lock().unwrap() += 1;
        let _ = events.send(RecognitionEvent::Started);
        match self.script.pop_front() {
            Some(Scripted::Heard(text)) => {
                let _ = events.send(RecognitionEvent::Transcript(text.to_string()));
            }
            Some(Scripted::Fail(error)) => {
                let _ = events.send(RecognitionEvent::Error(error));
            }
            Some(Scripted::Silence) | None => {}
        }
        let _ = events.send(RecognitionEvent::Ended);
        Ok(())
    }
}
