//! External text services
//!
//! Currently the example-sentence hint generator.

pub mod gemini;

pub use gemini::{GeminiClient, HintSource, FALLBACK_SENTENCE};
