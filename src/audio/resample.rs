use super::SAMPLE_RATE;
use std::cmp::Ordering as CmpOrdering;
use std::f32::consts::PI;

// Practical ratio bounds (~0.01x .. 8x) around the 16 kHz decoder rate.
pub(super) const MIN_DEVICE_RATE: u32 = 2_000;
pub(super) const MAX_DEVICE_RATE: u32 = 1_600_000;
const MAX_DOWNSAMPLING_TAPS: usize = 129;

/// Convert one device-rate mono block into a decoder frame: resample to
/// 16 kHz, pin the length to `desired_len`, and requantize to i16.
pub(super) fn convert_block(block: Vec<f32>, device_rate: u32, desired_len: usize) -> Vec<i16> {
    let at_target = if device_rate == SAMPLE_RATE {
        block
    } else {
        to_decoder_rate(&block, device_rate)
    };
    let fitted = fit_length(at_target, desired_len);
    fitted.into_iter().map(quantize_i16).collect()
}

pub(super) fn quantize_i16(sample: f32) -> i16 {
    (sample * 32_768.0).round().clamp(-32_768.0, 32_767.0) as i16
}

/// Resample a device-rate block to the decoder rate. Decimation runs a short
/// FIR low-pass first so 44.1/48 kHz microphones don't alias speech harmonics
/// into the band the recognizer listens to.
pub(super) fn to_decoder_rate(input: &[f32], device_rate: u32) -> Vec<f32> {
    if device_rate == 0 || input.is_empty() || device_rate == SAMPLE_RATE {
        return input.to_vec();
    }
    if !(MIN_DEVICE_RATE..=MAX_DEVICE_RATE).contains(&device_rate) {
        return input.to_vec();
    }

    let ratio = SAMPLE_RATE as f32 / device_rate as f32;
    let filtered = if device_rate > SAMPLE_RATE {
        let taps = downsampling_tap_count(device_rate);
        low_pass_fir(input, device_rate, taps)
    } else {
        input.to_vec()
    };
    resample_linear(&filtered, ratio)
}

/// Linear interpolation resampler. Adequate for speech frames where latency
/// matters more than phase accuracy.
pub(super) fn resample_linear(input: &[f32], ratio: f32) -> Vec<f32> {
    let input_len = input.len();
    let output_len = (input_len as f32 * ratio).round() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_idx = i as f32 / ratio;
        let idx = src_idx.floor() as usize;
        let frac = src_idx - idx as f32;

        if idx + 1 < input_len {
            let sample = input[idx] * (1.0 - frac) + input[idx + 1] * frac;
            output.push(sample);
        } else {
            let pad = input.last().copied().unwrap_or(0.0);
            output.push(pad);
        }
    }

    output
}

/// Tap count scaled by the decimation ratio so the FIR stays short for
/// near-equal rates and longer when collapsing 48 kHz down to 16 kHz.
pub(super) fn downsampling_tap_count(device_rate: u32) -> usize {
    let decimation_ratio = device_rate as f32 / SAMPLE_RATE as f32;
    let mut taps = (decimation_ratio * 4.0).ceil().max(11.0) as usize;
    if taps % 2 == 0 {
        taps += 1;
    }
    taps.min(MAX_DOWNSAMPLING_TAPS)
}

/// FIR low-pass that tames frequencies above the decoder Nyquist before
/// samples are dropped.
pub(super) fn low_pass_fir(input: &[f32], device_rate: u32, taps: usize) -> Vec<f32> {
    if input.is_empty() || taps <= 1 {
        return input.to_vec();
    }

    let normalized_cutoff = (SAMPLE_RATE as f32 * 0.5 / device_rate as f32).min(0.499);
    let coeffs = design_low_pass(normalized_cutoff, taps);
    let half = taps / 2;
    let mut output = Vec::with_capacity(input.len());

    for n in 0..input.len() {
        let mut acc = 0.0;
        for (k, coeff) in coeffs.iter().enumerate() {
            if let Some(idx) = n.checked_add(k).and_then(|sum| sum.checked_sub(half)) {
                if let Some(sample) = input.get(idx) {
                    acc += *sample * coeff;
                }
            }
        }
        output.push(acc);
    }

    output
}

/// Pad (repeating the last sample) or truncate to the exact frame length the
/// queue contract promises.
pub(super) fn fit_length(mut data: Vec<f32>, desired: usize) -> Vec<f32> {
    match data.len().cmp(&desired) {
        CmpOrdering::Greater => {
            data.truncate(desired);
        }
        CmpOrdering::Less => {
            let pad = *data.last().unwrap_or(&0.0);
            data.resize(desired, pad);
        }
        CmpOrdering::Equal => {}
    }
    data
}

/// Normalized Hamming-windowed sinc taps for the FIR filter.
pub(super) fn design_low_pass(normalized_cutoff: f32, taps: usize) -> Vec<f32> {
    let mut coeffs = Vec::with_capacity(taps);
    let m = (taps - 1) as f32;

    for n in 0..taps {
        let centered = n as f32 - m / 2.0;
        let x = 2.0 * PI * normalized_cutoff * centered;
        let sinc = if centered == 0.0 {
            2.0 * normalized_cutoff
        } else {
            (2.0 * normalized_cutoff * x.sin()) / x
        };
        let window = if taps <= 1 {
            1.0
        } else {
            0.54 - 0.46 * ((2.0 * PI * n as f32) / m).cos()
        };
        coeffs.push(sinc * window);
    }

    let sum: f32 = coeffs.iter().sum();
    if sum != 0.0 {
        for coeff in coeffs.iter_mut() {
            *coeff /= sum;
        }
    }

    coeffs
}
