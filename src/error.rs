//! Error types for the capture → conditioning → decoding pipeline.
//!
//! Fault policy: a capture failure kills the stream, a missing model is
//! reported and leaves the session untouched, and a decode fault is logged
//! and absorbed (the offending batch is dropped, the session stays live).

use std::path::PathBuf;

use thiserror::Error;

/// Canonical error type for the library surface.
#[derive(Error, Debug)]
pub enum TranscribeError {
    /// No usable input device, or the device rejected the stream config.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// No installed model directory matches the requested language code.
    #[error("no model installed for language '{code}' (looked in {})", searched.display())]
    ModelNotFound { code: String, searched: PathBuf },

    /// The decoder rejected a batch. Recoverable; the session survives.
    #[error("decoder rejected batch: {0}")]
    DecodeFault(String),

    /// Engine-level failure (model load, session construction).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Download or archive handling failed in the setup tool.
    #[error("model fetch failed: {0}")]
    Fetch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures raised by a decoding backend.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The model directory exists but the engine could not load it.
    #[error("failed to load model from {}: {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    /// A recognizer could not be created for the requested sample rate.
    #[error("failed to start decoder session: {0}")]
    Session(String),

    /// The engine rejected fed audio.
    #[error("waveform rejected: {0}")]
    Waveform(String),

    /// The backend was compiled out of this build.
    #[error("speech engine support is not compiled into this build")]
    Unavailable,
}

pub type Result<T> = std::result::Result<T, TranscribeError>;
