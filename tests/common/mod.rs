pub mod http;
pub mod mock_asr;
pub mod mock_tts;

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Isolated XDG directories for running the `lingochamp` binary
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        for dir in ["config", "data"] {
            fs::create_dir_all(temp_dir.path().join(dir)).expect("Failed to create dir");
        }
        Self { temp_dir }
    }

    /// Where the binary keeps test history
    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data/lingochamp")
    }

    /// Run the binary with `args`, feeding `stdin` and closing it
    pub fn run(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_lingochamp"))
            .args(args)
            .env("XDG_CONFIG_HOME", self.temp_dir.path().join("config"))
            .env("XDG_DATA_HOME", self.temp_dir.path().join("data"))
            .env_remove("LINGOCHAMP_TTS_API_KEY")
            .env_remove("LINGOCHAMP_GEMINI_API_KEY")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn lingochamp");

        if let Some(mut input) = child.stdin.take() {
            input
                .write_all(stdin.as_bytes())
                .expect("Failed to write stdin");
        }
        child.wait_with_output().expect("Failed to wait for lingochamp")
    }
}
