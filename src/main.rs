//! LingoChamp - Vocabulary practice in the terminal
//!
//! Learn words with spoken prompts, then take easy or hard tests.

use anyhow::Result;
use clap::{Parser, Subcommand};
use lingochamp::app::{App, Screen};
use lingochamp::asr::{create_recognizer, SpeechInput};
use lingochamp::config::Config;
use lingochamp::core::{GeminiClient, HintSource};
use lingochamp::history::{History, JsonFileStore};
use lingochamp::session::{grade, LearningSession, TestMode, TestSession};
use lingochamp::tts::{SpeechOutput, TtsEngine};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable audio output (device speech still runs)
    #[arg(long, global = true)]
    no_audio: bool,

    /// Speech recognizer: console, wyoming or none
    #[arg(long, global = true)]
    recognizer: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through every word (default)
    Learn,
    /// Take a scored test
    Test {
        #[arg(long, default_value = "easy")]
        mode: TestMode,
    },
    /// Show past test results
    History,
    /// Speak some text through the speech output stack
    Speak { text: String },
    /// Print an example sentence for a word
    Hint { word: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if args.no_audio {
        config.audio_enabled = false;
    }
    if let Some(recognizer) = &args.recognizer {
        config.recognizer = recognizer.clone();
    }

    // Setup logging
    let level = if args.verbose {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::INFO)
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🏆 LingoChamp v{} starting...", env!("CARGO_PKG_VERSION"));

    let history = History::new(JsonFileStore::new(config.data_path()));

    match args.command.unwrap_or(Command::Learn) {
        Command::History => {
            let results = history.load()?;
            if results.is_empty() {
                println!("No tests taken yet.");
            }
            for result in results {
                println!(
                    "{}  {:<4}  {:>3}/{:<3} {:>3}%  {}",
                    result.completed_at.format("%Y-%m-%d %H:%M"),
                    result.mode,
                    result.score,
                    result.max_score,
                    result.percentage,
                    grade(result.percentage)
                );
            }
        }
        Command::Speak { text } => {
            let speech = SpeechOutput::from_config(&config);
            speech.speak(&text, &config.language).await;
            speech.drain().await;
            speech.cleanup();
        }
        Command::Hint { word } => {
            let hints = GeminiClient::new(&config);
            println!("{}", hints.example_sentence(&word).await);
        }
        command => {
            let screen = match command {
                Command::Test { mode } => Screen::Test(TestSession::generate(mode)),
                _ => Screen::Learning(LearningSession::new()),
            };

            let speech = Arc::new(SpeechOutput::from_config(&config));
            let (input, recognition) =
                SpeechInput::new(create_recognizer(&config), &config.language);
            info!("🎙️ Recognizer: {}", input.recognizer_name());

            let (events_tx, events_rx) = mpsc::unbounded_channel();
            let app = App::new(
                screen,
                speech.clone(),
                Arc::new(GeminiClient::new(&config)),
                input,
                history,
                &config.language,
                events_tx,
                std::io::stdout(),
            );
            app.run(events_rx, recognition).await?;
            speech.cleanup();
        }
    }

    Ok(())
}
