//! Learning session state machine
//!
//! welcome → mic-check → (introduction → pronunciation → spelling)* → completed

use super::{next_epoch, Effect, Feedback, Timer, TimerKind};
use crate::asr::ListenContext;
use crate::words::{self, Word};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

/// Learner's current step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Welcome,
    MicCheck,
    Introduction,
    Pronunciation,
    Spelling,
    Completed,
}

impl Phase {
    /// Phases that operate on the current word
    pub fn has_word(&self) -> bool {
        matches!(
            self,
            Phase::Introduction | Phase::Pronunciation | Phase::Spelling
        )
    }
}

#[derive(Debug)]
pub struct LearningSession {
    words: Vec<Word>,
    current_index: usize,
    phase: Phase,
    feedback: Feedback,
    text_input: String,
    transcript: String,
    hint: Option<String>,
    /// Mic-check status line (errors, "no speech detected")
    status: Option<String>,
    epoch: u64,
}

impl Default for LearningSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LearningSession {
    /// New session over a fresh shuffle of the built-in words
    pub fn new() -> Self {
        Self::with_words(words::shuffled(&mut rand::thread_rng()))
    }

    /// New session iterating `words` in the given order
    pub fn with_words(words: Vec<Word>) -> Self {
        Self {
            words,
            current_index: 0,
            phase: Phase::Welcome,
            feedback: Feedback::None,
            text_input: String::new(),
            transcript: String::new(),
            hint: None,
            status: None,
            epoch: next_epoch(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn text_input(&self) -> &str {
        &self.text_input
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Word being learned, if the phase has one
    pub fn current_word(&self) -> Option<&Word> {
        if self.phase.has_word() {
            self.words.get(self.current_index)
        } else {
            None
        }
    }

    /// One-based position and total, for display
    pub fn progress(&self) -> (usize, usize) {
        let shown = (self.current_index + 1).min(self.words.len());
        (shown, self.words.len())
    }

    /// Welcome → mic-check
    pub fn start(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Welcome {
            return Vec::new();
        }
        if self.words.is_empty() {
            info!("📭 No words to learn");
            self.set_phase(Phase::Completed);
            return Vec::new();
        }
        info!("🎙️ Starting microphone check");
        self.set_phase(Phase::MicCheck);
        vec![Effect::Listen(ListenContext::MicCheck)]
    }

    /// Start listening for whichever phase needs speech
    pub fn listen(&self) -> Vec<Effect> {
        match self.phase {
            Phase::MicCheck => vec![Effect::Listen(ListenContext::MicCheck)],
            Phase::Pronunciation if !self.feedback.is_shown() => {
                vec![Effect::Listen(ListenContext::Pronunciation)]
            }
            _ => Vec::new(),
        }
    }

    /// Route a recognized transcript by the context it was captured in
    pub fn on_transcript(&mut self, context: ListenContext, text: &str) -> Vec<Effect> {
        match (context, self.phase) {
            (ListenContext::MicCheck, Phase::MicCheck) => {
                if text.trim().is_empty() {
                    self.status = Some("No speech detected. Please try again.".to_string());
                    return Vec::new();
                }
                info!("✅ Microphone check passed: '{}'", text.trim());
                self.status = None;
                self.enter_introduction()
            }
            (ListenContext::Pronunciation, Phase::Pronunciation) => {
                if self.feedback.is_shown() {
                    return Vec::new();
                }
                self.transcript = text.to_string();
                let correct = self
                    .words
                    .get(self.current_index)
                    .is_some_and(|w| w.matches(text));
                self.evaluate(correct)
            }
            _ => {
                debug!(
                    "Ignoring transcript for {:?} while in {:?}",
                    context, self.phase
                );
                Vec::new()
            }
        }
    }

    /// Record a recognition failure for display
    pub fn on_recognition_error(&mut self, context: ListenContext, message: &str) {
        match (context, self.phase) {
            (ListenContext::MicCheck, Phase::MicCheck)
            | (ListenContext::Pronunciation, Phase::Pronunciation) => {
                self.status = Some(message.to_string());
            }
            _ => debug!(
                "Ignoring recognition error for {:?} while in {:?}",
                context, self.phase
            ),
        }
    }

    /// Introduction → pronunciation
    pub fn ready(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Introduction {
            return Vec::new();
        }
        self.set_phase(Phase::Pronunciation);
        Vec::new()
    }

    /// Pending typed answer
    pub fn set_text_input(&mut self, text: &str) {
        self.text_input = text.to_string();
    }

    /// Evaluate a typed spelling
    pub fn submit_spelling(&mut self, text: &str) -> Vec<Effect> {
        if self.phase != Phase::Spelling || self.feedback.is_shown() {
            return Vec::new();
        }
        self.text_input = text.to_string();
        let correct = self
            .words
            .get(self.current_index)
            .is_some_and(|w| w.matches(text));
        self.evaluate(correct)
    }

    /// Speak the current word again
    pub fn replay(&self) -> Vec<Effect> {
        self.current_word()
            .map(|w| vec![Effect::Speak(w.clean_word.to_string())])
            .unwrap_or_default()
    }

    /// Ask for an example sentence for the current word
    pub fn request_hint(&self) -> Vec<Effect> {
        self.current_word()
            .map(|w| {
                vec![Effect::FetchHint {
                    word: w.clean_word.to_string(),
                    epoch: self.epoch,
                }]
            })
            .unwrap_or_default()
    }

    /// Store a hint if it still belongs to the current word
    pub fn hint_ready(&mut self, epoch: u64, text: String) -> bool {
        if epoch != self.epoch {
            debug!("Discarding late hint (epoch {} != {})", epoch, self.epoch);
            return false;
        }
        self.hint = Some(text);
        true
    }

    /// Completed → welcome with a fresh shuffle
    pub fn restart(&mut self) -> Vec<Effect> {
        self.restart_with(&mut rand::thread_rng())
    }

    /// [`restart`](Self::restart) with a caller-supplied shuffle source
    pub fn restart_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Effect> {
        if self.phase != Phase::Completed {
            return Vec::new();
        }
        self.words.shuffle(rng);
        self.current_index = 0;
        self.feedback = Feedback::None;
        self.status = None;
        self.clear_inputs();
        self.set_phase(Phase::Welcome);
        info!("🔄 Session restarted");
        Vec::new()
    }

    /// Apply a timer. Stale timers do nothing.
    pub fn fire(&mut self, timer: Timer) -> Vec<Effect> {
        if timer.epoch != self.epoch {
            debug!(
                "Stale {:?} timer ignored (epoch {} != {})",
                timer.kind, timer.epoch, self.epoch
            );
            return Vec::new();
        }

        match timer.kind {
            TimerKind::SpeakIntroduction => {
                if self.phase == Phase::Introduction {
                    self.replay()
                } else {
                    Vec::new()
                }
            }
            TimerKind::ResolveFeedback => match self.feedback {
                Feedback::Correct => {
                    self.feedback = Feedback::None;
                    self.advance()
                }
                Feedback::Incorrect => {
                    self.feedback = Feedback::None;
                    Vec::new()
                }
                Feedback::None => Vec::new(),
            },
        }
    }

    fn evaluate(&mut self, correct: bool) -> Vec<Effect> {
        self.feedback = Feedback::from_outcome(correct);
        debug!(
            "{:?} answer in {:?} for word #{}",
            self.feedback, self.phase, self.current_index
        );
        vec![Effect::Schedule(Timer::new(
            TimerKind::ResolveFeedback,
            self.epoch,
        ))]
    }

    fn advance(&mut self) -> Vec<Effect> {
        self.clear_inputs();
        self.status = None;
        match self.phase {
            Phase::Pronunciation => {
                self.set_phase(Phase::Spelling);
                Vec::new()
            }
            Phase::Spelling => {
                if self.current_index + 1 < self.words.len() {
                    self.current_index += 1;
                    self.enter_introduction()
                } else {
                    info!("🏁 All {} words learned", self.words.len());
                    self.set_phase(Phase::Completed);
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    fn enter_introduction(&mut self) -> Vec<Effect> {
        self.set_phase(Phase::Introduction);
        vec![Effect::Schedule(Timer::new(
            TimerKind::SpeakIntroduction,
            self.epoch,
        ))]
    }

    fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.epoch = next_epoch();
    }

    fn clear_inputs(&mut self) {
        self.text_input.clear();
        self.transcript.clear();
        self.hint = None;
    }
}
