//! Decoding-engine seam.
//!
//! The session layer talks to speech models through these object-safe traits
//! so the recognizer backend stays swappable and tests can run against
//! scripted decoders. The default backend binds libvosk and is feature-gated
//! because it needs the native library at link time.

use crate::error::EngineError;
use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "vosk")]
pub mod vosk;

/// One recognized word with the decoder's confidence for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredWord {
    pub word: String,
    pub confidence: f32,
}

/// Utterance-final decoder output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalTranscript {
    pub text: String,
    pub words: Vec<ScoredWord>,
}

/// Mid-utterance decoder output. Text grows and may be revised until the
/// utterance closes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialTranscript {
    pub text: String,
}

/// What the decoder concluded about the most recent batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The utterance ended inside the batch; a final transcript is ready.
    Boundary,
    /// Still mid-utterance; only a partial transcript is available.
    Pending,
}

/// Loads a model directory into memory.
pub trait ModelLoader {
    fn load(&self, dir: &Path) -> Result<Arc<dyn SpeechModel>, EngineError>;
}

/// A loaded model. Read-only after construction, so one instance can back
/// any number of concurrent sessions.
pub trait SpeechModel: Send + Sync {
    fn start_session(&self, sample_rate: u32) -> Result<Box<dyn DecoderSession>, EngineError>;
}

/// Streaming decoder state. Single-writer: exactly one thread feeds it.
pub trait DecoderSession: Send {
    /// Feed PCM and learn whether an utterance boundary was crossed.
    fn feed(&mut self, pcm: &[i16]) -> Result<FeedOutcome, EngineError>;

    /// Transcript of the utterance that just closed. Valid after `feed`
    /// reported [`FeedOutcome::Boundary`].
    fn final_transcript(&mut self) -> FinalTranscript;

    /// Current in-progress text.
    fn partial_transcript(&mut self) -> PartialTranscript;

    /// Force-finalize whatever audio is pending and reset utterance state.
    fn flush(&mut self) -> FinalTranscript;
}

/// The backend compiled into this build.
#[cfg(feature = "vosk")]
pub fn default_loader() -> Result<Box<dyn ModelLoader>, EngineError> {
    Ok(Box::new(vosk::VoskLoader::new()))
}

#[cfg(not(feature = "vosk"))]
pub fn default_loader() -> Result<Box<dyn ModelLoader>, EngineError> {
    Err(EngineError::Unavailable)
}
