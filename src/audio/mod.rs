//! Microphone capture and frame conditioning pipeline.
//!
//! Audio is captured via CPAL on the device's native format, normalized to
//! 16 kHz mono i16 PCM in fixed half-second frames, and queued to the
//! consumer thread. The conditioner drains the queue, applies the RMS noise
//! gate, and hands contiguous batches to the decoder.

/// Sample rate the decoder expects.
pub const SAMPLE_RATE: u32 = 16_000;

/// Samples per queued frame (half a second at 16 kHz).
pub const FRAME_SAMPLES: usize = 8_000;

/// Default RMS level below which a frame is treated as noise.
pub const DEFAULT_GATE_RMS: u32 = 500;

/// One queued capture frame: mono 16 kHz linear PCM.
pub type AudioFrame = Vec<i16>;

/// One or more gated frames concatenated for the decoder.
pub type AudioBatch = Vec<i16>;

mod capture;
mod conditioner;
mod dispatch;
mod gate;
mod resample;

pub use capture::{CaptureConfig, CaptureStream, Microphone};
pub use conditioner::FrameConditioner;
pub use gate::{rms, NoiseGate};
