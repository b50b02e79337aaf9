//! LingoChamp Library
//!
//! Vocabulary practice with spoken prompts, speech recognition checks and
//! scored tests.

pub mod app;
pub mod asr;
pub mod audio;
pub mod config;
pub mod core;
pub mod error;
pub mod history;
pub mod session;
pub mod tts;
pub mod words;
