//! Speech Input
//!
//! One-shot recognition behind the [`Recognizer`] capability:
//! - Wyoming: microphone capture transcribed by a remote ASR server
//! - Console: the learner types what they said
//! - Unsupported: no recognition available
//!
//! Recognizers report [`RecognitionEvent`]s on a channel. [`SpeechInput`]
//! tracks the listening flag and the context a session was started for, and
//! turns raw events into [`RecognitionOutcome`]s for the phase controller.

pub mod console;
pub mod wyoming;

use crate::config::Config;
use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

pub use console::ConsoleRecognizer;
pub use wyoming::{WyomingClient, WyomingRecognizer};

/// Why a recognition session was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenContext {
    /// Learning: confirm the microphone works
    MicCheck,
    /// Learning: pronounce the current word
    Pronunciation,
    /// Hard test: pronunciation leg
    TestPronunciation,
}

/// Recognition failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    NotSupported,
    AlreadyListening,
    NoSpeech,
    AudioCapture(String),
    Network(String),
}

impl RecognitionError {
    /// Short machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            RecognitionError::NotSupported => "not-supported",
            RecognitionError::AlreadyListening => "already-listening",
            RecognitionError::NoSpeech => "no-speech",
            RecognitionError::AudioCapture(_) => "audio-capture",
            RecognitionError::Network(_) => "network",
        }
    }
}

impl std::fmt::Display for RecognitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecognitionError::NotSupported => {
                write!(f, "Speech recognition is not supported on this system")
            }
            RecognitionError::AlreadyListening => write!(f, "Already listening"),
            RecognitionError::NoSpeech => write!(f, "No speech detected. Please try again."),
            RecognitionError::AudioCapture(msg) => write!(f, "Microphone error: {}", msg),
            RecognitionError::Network(msg) => write!(f, "Recognition service error: {}", msg),
        }
    }
}

/// Raw events emitted by a recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Started,
    Transcript(String),
    Error(RecognitionError),
    Ended,
}

/// Recognition capability
pub trait Recognizer: Send {
    fn name(&self) -> &str;

    /// Whether recognition can run at all
    fn is_available(&self) -> bool;

    /// Begin a one-shot session. Events go to `events`; the session must
    /// always finish with `Ended`.
    fn start(&mut self, language: &str, events: UnboundedSender<RecognitionEvent>) -> Result<()>;

    /// Offer typed text as the spoken utterance. Only text-driven
    /// recognizers accept it.
    fn accept_typed(&mut self, _text: &str) -> bool {
        false
    }
}

/// Recognizer for systems without any speech input
#[derive(Debug, Default)]
pub struct Unsupported;

impl Recognizer for Unsupported {
    fn name(&self) -> &str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self, _language: &str, _events: UnboundedSender<RecognitionEvent>) -> Result<()> {
        Err(anyhow::anyhow!("speech recognition unavailable"))
    }
}

/// What the controller receives from a finished (or failing) session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    Transcript {
        context: ListenContext,
        text: String,
    },
    Error {
        context: ListenContext,
        error: RecognitionError,
    },
}

/// Phase-agnostic speech input adapter
pub struct SpeechInput {
    recognizer: Box<dyn Recognizer>,
    language: String,
    listening: bool,
    context: Option<ListenContext>,
    got_transcript: bool,
    got_error: bool,
    events: UnboundedSender<RecognitionEvent>,
}

impl SpeechInput {
    /// Returns the adapter and the receiver its recognizer reports on.
    /// Feed every received event to [`SpeechInput::handle`].
    pub fn new(
        recognizer: Box<dyn Recognizer>,
        language: &str,
    ) -> (Self, UnboundedReceiver<RecognitionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let input = Self {
            recognizer,
            language: language.to_string(),
            listening: false,
            context: None,
            got_transcript: false,
            got_error: false,
            events,
        };
        (input, rx)
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_available()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn context(&self) -> Option<ListenContext> {
        self.context
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Start a session for `context`. Fails fast without side effects if the
    /// capability is missing or a session is already active.
    pub fn start(&mut self, context: ListenContext) -> Result<(), RecognitionError> {
        if !self.recognizer.is_available() {
            return Err(RecognitionError::NotSupported);
        }
        if self.listening {
            debug!("Ignoring start request, already listening");
            return Err(RecognitionError::AlreadyListening);
        }

        self.context = Some(context);
        self.got_transcript = false;
        self.got_error = false;
        self.listening = true;

        if let Err(e) = self.recognizer.start(&self.language, self.events.clone()) {
            warn!("❌ Failed to start {} recognizer: {}", self.recognizer.name(), e);
            self.listening = false;
            self.context = None;
            return Err(RecognitionError::AudioCapture(e.to_string()));
        }
        info!("🎙️ Listening ({:?})", context);
        Ok(())
    }

    /// Pass typed text to a text-driven recognizer while listening
    pub fn offer_typed(&mut self, text: &str) -> bool {
        self.listening && self.recognizer.accept_typed(text)
    }

    /// Single dispatch point for recognizer events
    pub fn handle(&mut self, event: RecognitionEvent) -> Option<RecognitionOutcome> {
        let context = self.context?;
        match event {
            RecognitionEvent::Started => {
                self.listening = true;
                None
            }
            RecognitionEvent::Transcript(text) => {
                if self.got_transcript {
                    return None;
                }
                self.got_transcript = true;
                debug!("📝 Heard: '{}'", text);
                Some(RecognitionOutcome::Transcript { context, text })
            }
            RecognitionEvent::Error(error) => {
                self.got_error = true;
                warn!("⚠️ Recognition error ({}): {}", error.code(), error);
                Some(RecognitionOutcome::Error { context, error })
            }
            RecognitionEvent::Ended => {
                self.listening = false;
                self.context = None;
                if !self.got_transcript && !self.got_error && context == ListenContext::MicCheck {
                    return Some(RecognitionOutcome::Error {
                        context,
                        error: RecognitionError::NoSpeech,
                    });
                }
                None
            }
        }
    }
}

/// Factory to create the configured recognizer
pub fn create_recognizer(config: &Config) -> Box<dyn Recognizer> {
    match config.recognizer.as_str() {
        "wyoming" => Box::new(WyomingRecognizer::new(config)),
        "console" => Box::new(ConsoleRecognizer::new()),
        "none" => Box::new(Unsupported),
        other => {
            warn!("Unknown recognizer '{}', falling back to console", other);
            Box::new(ConsoleRecognizer::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> (SpeechInput, UnboundedReceiver<RecognitionEvent>) {
        SpeechInput::new(Box::new(ConsoleRecognizer::new()), "en-US")
    }

    #[test]
    fn test_unsupported_fails_fast() {
        let (mut input, _rx) = SpeechInput::new(Box::new(Unsupported), "en-US");
        assert_eq!(
            input.start(ListenContext::MicCheck),
            Err(RecognitionError::NotSupported)
        );
        assert!(!input.is_listening());
    }

    #[test]
    fn test_second_start_is_rejected() {
        let (mut input, _rx) = console();
        input.start(ListenContext::Pronunciation).unwrap();
        assert_eq!(
            input.start(ListenContext::Pronunciation),
            Err(RecognitionError::AlreadyListening)
        );
    }

    #[test]
    fn test_transcript_is_routed_with_context() {
        let (mut input, mut rx) = console();
        input.start(ListenContext::Pronunciation).unwrap();
        assert!(input.offer_typed("vivid"));

        let mut outcomes = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let Some(outcome) = input.handle(event) {
                outcomes.push(outcome);
            }
        }
        assert_eq!(
            outcomes,
            vec![RecognitionOutcome::Transcript {
                context: ListenContext::Pronunciation,
                text: "vivid".to_string()
            }]
        );
        assert!(!input.is_listening());
    }

    #[test]
    fn test_mic_check_without_result_reports_no_speech() {
        let (mut input, _rx) = console();
        input.start(ListenContext::MicCheck).unwrap();
        input.handle(RecognitionEvent::Started);
        let outcome = input.handle(RecognitionEvent::Ended);
        assert_eq!(
            outcome,
            Some(RecognitionOutcome::Error {
                context: ListenContext::MicCheck,
                error: RecognitionError::NoSpeech
            })
        );
    }

    #[test]
    fn test_only_first_transcript_counts() {
        let (mut input, _rx) = console();
        input.start(ListenContext::Pronunciation).unwrap();
        assert!(input
            .handle(RecognitionEvent::Transcript("one".to_string()))
            .is_some());
        assert!(input
            .handle(RecognitionEvent::Transcript("two".to_string()))
            .is_none());
        assert!(input.handle(RecognitionEvent::Ended).is_none());
    }

    #[test]
    fn test_events_without_session_are_dropped() {
        let (mut input, _rx) = console();
        assert!(input
            .handle(RecognitionEvent::Transcript("stray".to_string()))
            .is_none());
    }
}
