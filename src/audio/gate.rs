//! RMS noise gate for captured frames.
//!
//! Keyboard rattle and room hum sit well below speech energy, so frames whose
//! RMS falls under the threshold are zeroed instead of dropped. The decoder
//! still sees a continuous signal and its internal timing stays aligned with
//! the capture clock.

/// Root-mean-square level of a PCM frame, truncated to an integer.
///
/// Matches the classic telephony definition: `sqrt(sum(s^2) / n)`. An empty
/// frame reads as 0.
pub fn rms(samples: &[i16]) -> u32 {
    if samples.is_empty() {
        return 0;
    }
    let sum_squares: u64 = samples
        .iter()
        .map(|&s| {
            let s = i64::from(s);
            (s * s) as u64
        })
        .sum();
    (sum_squares as f64 / samples.len() as f64).sqrt() as u32
}

/// Threshold gate: frames below the configured RMS are silenced in place.
#[derive(Debug, Clone)]
pub struct NoiseGate {
    threshold: u32,
}

impl NoiseGate {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Zero the frame when its level is under the threshold. Length is always
    /// preserved; a frame exactly at the threshold passes through.
    pub fn apply(&self, frame: &mut [i16]) {
        if rms(frame) < self.threshold {
            frame.fill(0);
        }
    }
}

impl Default for NoiseGate {
    fn default() -> Self {
        Self::new(super::DEFAULT_GATE_RMS)
    }
}
