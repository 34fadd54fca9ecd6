use super::resample::convert_block;
use super::{AudioFrame, SAMPLE_RATE};
use crossbeam_channel::Sender;

/// Downmix multi-channel input to mono while applying the provided converter
/// so the decoder receives a single channel regardless of microphone layout.
pub(super) fn append_downmixed_samples<T, F>(
    buf: &mut Vec<f32>,
    data: &[T],
    channels: usize,
    mut convert: F,
) where
    T: Copy,
    F: FnMut(T) -> f32,
{
    if channels <= 1 {
        buf.extend(data.iter().copied().map(&mut convert));
        return;
    }

    // Average each interleaved frame to produce a mono representation.
    let mut acc = 0.0f32;
    let mut count = 0usize;
    for sample in data.iter().copied() {
        acc += convert(sample);
        count += 1;
        if count == channels {
            buf.push(acc / channels as f32);
            acc = 0.0;
            count = 0;
        }
    }
    if count > 0 {
        buf.push(acc / count as f32);
    }
}

/// Callback-side frame assembler. Accumulates downmixed device-rate samples,
/// cuts them into blocks worth one decoder frame, converts each block to
/// 16 kHz i16, and enqueues it. The channel is unbounded, so `send` returns
/// immediately and the capture callback never waits on the consumer.
pub(super) struct FrameDispatcher {
    device_block_samples: usize,
    frame_samples: usize,
    device_rate: u32,
    pending: Vec<f32>,
    scratch: Vec<f32>,
    sender: Sender<AudioFrame>,
}

impl FrameDispatcher {
    pub(super) fn new(frame_samples: usize, device_rate: u32, sender: Sender<AudioFrame>) -> Self {
        let frame_samples = frame_samples.max(1);
        let device_block_samples = ((frame_samples as u64 * u64::from(device_rate))
            / u64::from(SAMPLE_RATE))
        .max(1) as usize;
        Self {
            device_block_samples,
            frame_samples,
            device_rate,
            pending: Vec::with_capacity(device_block_samples),
            scratch: Vec::new(),
            sender,
        }
    }

    pub(super) fn push<T, F>(&mut self, data: &[T], channels: usize, convert: F)
    where
        T: Copy,
        F: FnMut(T) -> f32,
    {
        self.scratch.clear();
        append_downmixed_samples(&mut self.scratch, data, channels, convert);
        self.pending.extend_from_slice(&self.scratch);

        while self.pending.len() >= self.device_block_samples {
            let block: Vec<f32> = self.pending.drain(..self.device_block_samples).collect();
            let frame = convert_block(block, self.device_rate, self.frame_samples);
            if self.sender.send(frame).is_err() {
                // Consumer hung up; stop cutting frames, the stream is closing.
                self.pending.clear();
                break;
            }
        }
    }
}
