//! Vosk (Kaldi) recognizer backend.
//!
//! Wraps the `vosk` bindings behind the engine seam. Models are plain
//! directories unpacked by the setup tool; one loaded model serves any
//! number of recognizer sessions. Kaldi prints a screenful of
//! initialization log lines to stderr, so model loading runs with stderr
//! parked on /dev/null the same way the capture log keeps CPAL quiet.

use super::{
    DecoderSession, FeedOutcome, FinalTranscript, ModelLoader, PartialTranscript, ScoredWord,
    SpeechModel,
};
use crate::error::EngineError;
use std::path::Path;
use std::sync::Arc;
use vosk::{CompleteResult, DecodingState, Model, Recognizer};

/// Loader for Vosk model directories.
pub struct VoskLoader;

impl VoskLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VoskLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelLoader for VoskLoader {
    fn load(&self, dir: &Path) -> Result<Arc<dyn SpeechModel>, EngineError> {
        let path = dir.to_string_lossy().into_owned();
        let model = with_silenced_stderr(|| Model::new(path));
        match model {
            Some(model) => Ok(Arc::new(VoskModel { model })),
            None => Err(EngineError::ModelLoad {
                path: dir.to_path_buf(),
                reason: "libvosk could not read the model directory".to_string(),
            }),
        }
    }
}

struct VoskModel {
    model: Model,
}

impl SpeechModel for VoskModel {
    fn start_session(&self, sample_rate: u32) -> Result<Box<dyn DecoderSession>, EngineError> {
        let mut recognizer = Recognizer::new(&self.model, sample_rate as f32).ok_or_else(|| {
            EngineError::Session(format!("recognizer rejected sample rate {sample_rate}"))
        })?;
        // Word-level output carries the per-word confidences the hypothesis
        // scoring needs.
        recognizer.set_words(true);
        Ok(Box::new(VoskSession { recognizer }))
    }
}

struct VoskSession {
    recognizer: Recognizer,
}

impl DecoderSession for VoskSession {
    fn feed(&mut self, pcm: &[i16]) -> Result<FeedOutcome, EngineError> {
        match self.recognizer.accept_waveform(pcm) {
            Ok(DecodingState::Finalized) => Ok(FeedOutcome::Boundary),
            Ok(DecodingState::Running) => Ok(FeedOutcome::Pending),
            Ok(DecodingState::Failed) => Err(EngineError::Waveform(
                "decoder entered failed state".to_string(),
            )),
            Err(err) => Err(EngineError::Waveform(err.to_string())),
        }
    }

    fn final_transcript(&mut self) -> FinalTranscript {
        complete_to_transcript(self.recognizer.result())
    }

    fn partial_transcript(&mut self) -> PartialTranscript {
        PartialTranscript {
            text: self.recognizer.partial_result().partial.to_string(),
        }
    }

    fn flush(&mut self) -> FinalTranscript {
        let transcript = complete_to_transcript(self.recognizer.final_result());
        self.recognizer.reset();
        transcript
    }
}

fn complete_to_transcript(result: CompleteResult<'_>) -> FinalTranscript {
    match result.single() {
        Some(single) => FinalTranscript {
            text: single.text.to_string(),
            words: single
                .result
                .iter()
                .map(|w| ScoredWord {
                    word: w.word.to_string(),
                    confidence: w.conf,
                })
                .collect(),
        },
        None => FinalTranscript::default(),
    }
}

/// Run `f` with stderr parked on /dev/null so Kaldi's loader chatter does
/// not interleave with live captions.
#[cfg(unix)]
fn with_silenced_stderr<T>(f: impl FnOnce() -> T) -> T {
    use crate::log_debug;
    use std::os::unix::io::AsRawFd;

    let null = match std::fs::OpenOptions::new().write(true).open("/dev/null") {
        Ok(file) => file,
        Err(err) => {
            log_debug(&format!("could not open /dev/null; model load will be loud: {err}"));
            return f();
        }
    };
    // SAFETY: dup(2) copies the stderr descriptor and dup2 swaps it for
    // /dev/null; the original is restored and closed before returning.
    let orig_stderr = unsafe { libc::dup(2) };
    if orig_stderr < 0 {
        return f();
    }
    if unsafe { libc::dup2(null.as_raw_fd(), 2) } < 0 {
        unsafe { libc::close(orig_stderr) };
        return f();
    }
    let out = f();
    unsafe {
        libc::dup2(orig_stderr, 2);
        libc::close(orig_stderr);
    }
    out
}

#[cfg(not(unix))]
fn with_silenced_stderr<T>(f: impl FnOnce() -> T) -> T {
    f()
}
