//! Terminal front end
//!
//! A single event loop owns the active session. Timers, hint requests and
//! speech run as spawned tasks and report back over the event channel, so
//! every state change happens on the loop task.

use crate::asr::{RecognitionError, RecognitionEvent, RecognitionOutcome, SpeechInput};
use crate::core::HintSource;
use crate::history::{History, KeyValueStore, TestResult};
use crate::session::{
    grade, Effect, Feedback, HardLeg, LearningSession, Phase, TestMode, TestSession,
};
use crate::tts::TtsEngine;
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Everything that can wake the event loop
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A line typed by the learner
    Input(String),
    Recognition(RecognitionEvent),
    Timer(crate::session::Timer),
    Hint { epoch: u64, text: String },
    Quit,
}

/// The active session
#[derive(Debug)]
pub enum Screen {
    Learning(LearningSession),
    Test(TestSession),
}

/// Snapshot used to decide whether to redraw
#[derive(Debug, Clone, PartialEq, Eq)]
struct View {
    stage: String,
    index: usize,
    feedback: Feedback,
    hint: bool,
}

pub struct App<S: KeyValueStore, W: Write> {
    screen: Screen,
    speech: Arc<dyn TtsEngine>,
    hints: Arc<dyn HintSource>,
    input: SpeechInput,
    history: History<S>,
    language: String,
    events: UnboundedSender<AppEvent>,
    out: W,
    last_view: Option<View>,
    running: bool,
}

impl<S: KeyValueStore, W: Write> App<S, W> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        screen: Screen,
        speech: Arc<dyn TtsEngine>,
        hints: Arc<dyn HintSource>,
        input: SpeechInput,
        history: History<S>,
        language: &str,
        events: UnboundedSender<AppEvent>,
        out: W,
    ) -> Self {
        Self {
            screen,
            speech,
            hints,
            input,
            history,
            language: language.to_string(),
            events,
            out,
            last_view: None,
            running: true,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Show the opening screen and perform its entry effects
    pub fn begin(&mut self) {
        if !self.input.is_available() {
            self.say("⚠️ Speech recognition is not available; speaking steps cannot be completed.");
        }
        let effects = match &mut self.screen {
            Screen::Learning(_) => Vec::new(),
            Screen::Test(test) => test.begin(),
        };
        self.perform(effects);
        self.render();
    }

    /// Drive the loop until the learner quits or input ends
    pub async fn run(
        mut self,
        mut events: UnboundedReceiver<AppEvent>,
        mut recognition: UnboundedReceiver<RecognitionEvent>,
    ) -> Result<()> {
        spawn_stdin_reader(self.events.clone());
        self.begin();

        while self.running {
            let event = tokio::select! {
                Some(event) = events.recv() => event,
                Some(event) = recognition.recv() => AppEvent::Recognition(event),
                else => break,
            };
            self.handle(event);
        }
        info!("👋 Goodbye");
        Ok(())
    }

    /// Apply one event
    pub fn handle(&mut self, event: AppEvent) {
        debug!("Event: {:?}", event);
        let effects = match event {
            AppEvent::Quit => {
                self.running = false;
                return;
            }
            AppEvent::Input(line) => self.on_input(line.trim()),
            AppEvent::Recognition(event) => match self.input.handle(event) {
                Some(outcome) => self.on_recognition(outcome),
                None => Vec::new(),
            },
            AppEvent::Timer(timer) => match &mut self.screen {
                Screen::Learning(s) => s.fire(timer),
                Screen::Test(t) => t.fire(timer),
            },
            AppEvent::Hint { epoch, text } => {
                if let Screen::Learning(s) = &mut self.screen {
                    s.hint_ready(epoch, text);
                }
                Vec::new()
            }
        };
        self.perform(effects);
        self.render();
    }

    fn on_input(&mut self, line: &str) -> Vec<Effect> {
        if matches!(line, ":q" | ":quit") {
            self.running = false;
            return Vec::new();
        }
        // Typed utterances for the console recognizer
        if !line.starts_with(':') && self.input.offer_typed(line) {
            return Vec::new();
        }

        match &mut self.screen {
            Screen::Learning(s) => match (line, s.phase()) {
                (":again", _) => s.replay(),
                (":hint", _) => s.request_hint(),
                (":listen", _) => s.listen(),
                (_, Phase::Welcome) => s.start(),
                (_, Phase::Introduction) => s.ready(),
                (_, Phase::Spelling) if !line.is_empty() => s.submit_spelling(line),
                (":restart", Phase::Completed) => s.restart(),
                _ => Vec::new(),
            },
            Screen::Test(t) => match (line, t.mode(), t.leg()) {
                (":again", _, _) => t.replay(),
                (":listen", TestMode::Hard, HardLeg::Pronunciation) => {
                    vec![Effect::Listen(crate::asr::ListenContext::TestPronunciation)]
                }
                ("", _, _) => Vec::new(),
                (_, TestMode::Easy, _) => {
                    let options = t.current().and_then(|q| q.options.as_deref());
                    let choice = resolve_choice(line, options);
                    t.submit_choice(&choice)
                }
                (_, TestMode::Hard, HardLeg::Spelling) => t.submit_spelling(line),
                _ => Vec::new(),
            },
        }
    }

    fn on_recognition(&mut self, outcome: RecognitionOutcome) -> Vec<Effect> {
        match outcome {
            RecognitionOutcome::Transcript { context, text } => {
                self.say(&format!("🎧 Heard: \"{}\"", text));
                match &mut self.screen {
                    Screen::Learning(s) => s.on_transcript(context, &text),
                    Screen::Test(t) => t.on_transcript(context, &text),
                }
            }
            RecognitionOutcome::Error { context, error } => {
                self.say(&format!("⚠️ {}", error));
                match &mut self.screen {
                    Screen::Learning(s) => {
                        s.on_recognition_error(context, &error.to_string());
                        Vec::new()
                    }
                    // Without a recognizer the pronunciation leg scores nothing
                    Screen::Test(t) if error == RecognitionError::NotSupported => {
                        t.submit_pronunciation("")
                    }
                    Screen::Test(_) => Vec::new(),
                }
            }
        }
    }

    fn perform(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Speak(text) => {
                    let speech = self.speech.clone();
                    let language = self.language.clone();
                    tokio::spawn(async move { speech.speak(&text, &language).await });
                }
                Effect::Listen(context) => {
                    if let Err(error) = self.input.start(context) {
                        let outcome = RecognitionOutcome::Error { context, error };
                        let more = self.on_recognition(outcome);
                        self.perform(more);
                    } else if self.input.recognizer_name() == "console" {
                        self.say("🎙️ Type what you say, then press Enter:");
                    } else {
                        self.say("🎙️ Listening...");
                    }
                }
                Effect::FetchHint { word, epoch } => {
                    let hints = self.hints.clone();
                    let events = self.events.clone();
                    tokio::spawn(async move {
                        let text = hints.example_sentence(&word).await;
                        let _ = events.send(AppEvent::Hint { epoch, text });
                    });
                }
                Effect::Schedule(timer) => {
                    let events = self.events.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(timer.delay).await;
                        let _ = events.send(AppEvent::Timer(timer));
                    });
                }
                Effect::Persist(result) => {
                    if let Err(e) = self.history.append(&result) {
                        warn!("❌ Could not save test result: {}", e);
                    }
                    self.show_result(&result);
                }
            }
        }
    }

    fn view(&self) -> View {
        match &self.screen {
            Screen::Learning(s) => View {
                stage: format!("{:?}", s.phase()),
                index: s.current_index(),
                feedback: s.feedback(),
                hint: s.hint().is_some(),
            },
            Screen::Test(t) => View {
                stage: if t.is_finished() {
                    "Finished".to_string()
                } else {
                    format!("{:?}", t.leg())
                },
                index: t.current_index(),
                feedback: t.feedback(),
                hint: false,
            },
        }
    }

    fn render(&mut self) {
        let view = self.view();
        if self.last_view.as_ref() == Some(&view) {
            return;
        }
        self.last_view = Some(view.clone());

        match view.feedback {
            Feedback::Correct => return self.say("✅ Correct!"),
            Feedback::Incorrect => return self.say("❌ Not quite, try again."),
            Feedback::None => {}
        }

        let lines = match &self.screen {
            Screen::Learning(s) => render_learning(s),
            Screen::Test(t) => render_test(t),
        };
        for line in lines {
            self.say(&line);
        }
    }

    fn show_result(&mut self, result: &TestResult) {
        self.say(&format!(
            "🏁 {} test complete: {}/{} ({}%) grade {}",
            result.mode,
            result.score,
            result.max_score,
            result.percentage,
            grade(result.percentage)
        ));
        if let Screen::Test(t) = &self.screen {
            let misses: Vec<String> = t
                .review()
                .iter()
                .map(|q| {
                    format!(
                        "   {} ({}) - you answered \"{}\"",
                        q.word.clean_word,
                        q.word.translation,
                        q.user_answer.as_deref().unwrap_or("")
                    )
                })
                .collect();
            if !misses.is_empty() {
                self.say("Review these words:");
                for miss in misses {
                    self.say(&miss);
                }
            }
        }
        self.running = false;
    }

    fn say(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}", line);
    }
}

fn render_learning(s: &LearningSession) -> Vec<String> {
    let (position, total) = s.progress();
    match s.phase() {
        Phase::Welcome => vec![
            "👋 Welcome to LingoChamp!".to_string(),
            format!("{} words today. Press Enter to start.", total),
        ],
        Phase::MicCheck => {
            let mut lines = vec!["🎙️ Microphone check: say anything.".to_string()];
            if let Some(status) = s.status() {
                lines.push(format!("   {} (:listen to retry)", status));
            }
            lines
        }
        Phase::Introduction => match s.current_word() {
            Some(w) => vec![
                format!("📖 Word {}/{}: {}  {}", position, total, w.word, w.pronunciation),
                format!("   {} - {}", w.translation, w.explanation),
                format!(
                    "   Press Enter when ready (:again to replay).{}",
                    s.hint().map(|h| format!("\n   💡 {}", h)).unwrap_or_default()
                ),
            ],
            None => Vec::new(),
        },
        Phase::Pronunciation => vec![format!(
            "🗣️ Say the word aloud (:listen, :again){}",
            s.hint().map(|h| format!("\n   💡 {}", h)).unwrap_or_default()
        )],
        Phase::Spelling => vec![format!(
            "⌨️ Type the word you heard (:again, :hint){}",
            s.hint().map(|h| format!("\n   💡 {}", h)).unwrap_or_default()
        )],
        Phase::Completed => vec![
            format!("🎉 You finished all {} words!", total),
            "   :restart to go again, :q to quit.".to_string(),
        ],
    }
}

fn render_test(t: &TestSession) -> Vec<String> {
    let Some(q) = t.current() else {
        return Vec::new();
    };
    let header = format!(
        "Question {}/{}",
        t.current_index() + 1,
        t.questions().len()
    );
    match (t.mode(), t.leg()) {
        (TestMode::Easy, _) => {
            let mut lines = vec![format!("{}: which word means \"{}\"?", header, q.word.translation)];
            for (i, option) in q.options.iter().flatten().enumerate() {
                lines.push(format!("   {}. {}", i + 1, option));
            }
            lines
        }
        (TestMode::Hard, HardLeg::Spelling) => vec![format!(
            "{}: spell the word you hear ({}). :again to replay.",
            header, q.word.translation
        )],
        (TestMode::Hard, HardLeg::Pronunciation) => {
            vec!["🗣️ Now say it aloud (:listen to retry).".to_string()]
        }
    }
}

/// Accept either an option number or the option text
fn resolve_choice(line: &str, options: Option<&[String]>) -> String {
    if let (Ok(n), Some(options)) = (line.parse::<usize>(), options) {
        if let Some(option) = n.checked_sub(1).and_then(|i| options.get(i)) {
            return option.clone();
        }
    }
    line.to_string()
}

/// Stdin is read on a plain thread so an idle read never holds up shutdown
fn spawn_stdin_reader(events: UnboundedSender<AppEvent>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if events.send(AppEvent::Input(line)).is_err() {
                return;
            }
        }
        let _ = events.send(AppEvent::Quit);
    });
}
