//! Phase Controller
//!
//! Learning and test sessions are plain state containers. Actions mutate the
//! state and return [`Effect`]s; the caller performs them (speech, listening,
//! hint requests, timers, persistence) and feeds completions back in.
//!
//! Deferred transitions are [`Timer`]s stamped with the session epoch. Any
//! transition bumps the epoch, so a timer scheduled against an older state
//! fires as a no-op.

pub mod learning;

use crate::asr::ListenContext;
use crate::history::TestResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub use learning::{LearningSession, Phase};
pub use test::{grade, percentage, HardLeg, TestMode, TestQuestion, TestSession};

/// How long correct/incorrect feedback stays on screen
pub const FEEDBACK_DELAY: Duration = Duration::from_millis(1500);

/// Pause before the word is spoken on entering the introduction phase
pub const INTRODUCTION_DELAY: Duration = Duration::from_millis(500);

/// Easy test question count
pub const EASY_QUESTION_COUNT: usize = 10;

/// Hard test question count
pub const HARD_QUESTION_COUNT: usize = 20;

/// Epochs are unique across every session in the process, so a timer can
/// never match a session other than the one that scheduled it.
static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

/// Transient feedback shown after an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feedback {
    #[default]
    None,
    Correct,
    Incorrect,
}

impl Feedback {
    pub fn from_outcome(correct: bool) -> Self {
        if correct {
            Feedback::Correct
        } else {
            Feedback::Incorrect
        }
    }

    pub fn is_shown(&self) -> bool {
        *self != Feedback::None
    }
}

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Speak the current word (introduction entry action)
    SpeakIntroduction,
    /// Clear feedback and, if it was positive, advance
    ResolveFeedback,
}

/// A deferred transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub kind: TimerKind,
    pub epoch: u64,
    pub delay: Duration,
}

impl Timer {
    pub fn new(kind: TimerKind, epoch: u64) -> Self {
        let delay = match kind {
            TimerKind::SpeakIntroduction => INTRODUCTION_DELAY,
            TimerKind::ResolveFeedback => FEEDBACK_DELAY,
        };
        Self { kind, epoch, delay }
    }
}

/// Side effect requested by a session
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Play this text through the speech output adapter
    Speak(String),
    /// Start a one-shot recognition session
    Listen(ListenContext),
    /// Ask the hint generator for an example sentence
    FetchHint { word: String, epoch: u64 },
    /// Deliver the timer back to the session after `delay`
    Schedule(Timer),
    /// Append this result to the persisted history
    Persist(TestResult),
}
