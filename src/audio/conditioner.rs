//! Frame conditioning: gate, drain, and batch queued capture frames.
//!
//! The conditioner is the single consumer of the capture queue. Each batch
//! starts with a blocking wait for one frame, then greedily drains whatever
//! else has already arrived so the decoder catches up after a slow decode
//! instead of falling further behind.

use super::gate::NoiseGate;
use super::{AudioBatch, AudioFrame};
use crossbeam_channel::{Receiver, TryRecvError};

/// Iterator over decoder-ready batches. Ends when the producer side of the
/// queue is gone and every buffered frame has been consumed.
pub struct FrameConditioner {
    frames: Receiver<AudioFrame>,
    gate: NoiseGate,
}

impl FrameConditioner {
    pub fn new(frames: Receiver<AudioFrame>, gate: NoiseGate) -> Self {
        Self { frames, gate }
    }

    pub fn next_batch(&mut self) -> Option<AudioBatch> {
        // Blocking wait for the first frame. A disconnected-but-nonempty
        // queue still yields its buffered frames here; the error only
        // surfaces once nothing is left.
        let mut batch = match self.frames.recv() {
            Ok(frame) => frame,
            Err(_) => return None,
        };
        self.gate.apply(&mut batch);

        // Drain everything already queued, preserving arrival order.
        loop {
            match self.frames.try_recv() {
                Ok(mut frame) => {
                    self.gate.apply(&mut frame);
                    batch.extend_from_slice(&frame);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }

        Some(batch)
    }
}

impl Iterator for FrameConditioner {
    type Item = AudioBatch;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch()
    }
}
