//! System microphone capture via CPAL.
//!
//! Handles device enumeration and stream construction for whichever sample
//! format the hardware reports. The data callback assembles fixed-size
//! decoder frames and enqueues them without ever blocking; closing the
//! stream drops the producer side of the queue, which is how the consumer
//! learns the stream ended.

use super::dispatch::FrameDispatcher;
use super::{AudioFrame, FRAME_SAMPLES};
use crate::error::{Result, TranscribeError};
use crate::log_debug;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use crossbeam_channel::{unbounded, Receiver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Knobs for a capture stream. Frame length is expressed in decoder-rate
/// samples; the default is half a second, which sets the caption cadence.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub frame_samples: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_samples: FRAME_SAMPLES,
        }
    }
}

/// Audio input device wrapper.
pub struct Microphone {
    device: cpal::Device,
}

impl Microphone {
    /// List microphone names so the CLI can expose a device selector.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|err| TranscribeError::DeviceUnavailable(err.to_string()))?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Resolve an input device, optionally by name for machines that expose
    /// several microphones.
    pub fn new(preferred_device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match preferred_device {
            Some(name) => {
                let mut devices = host
                    .input_devices()
                    .map_err(|err| TranscribeError::DeviceUnavailable(err.to_string()))?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| {
                        TranscribeError::DeviceUnavailable(format!(
                            "input device '{name}' not found"
                        ))
                    })?
            }
            None => host.default_input_device().ok_or_else(|| {
                TranscribeError::DeviceUnavailable(format!(
                    "no default input device available. {}",
                    mic_permission_hint()
                ))
            })?,
        };
        Ok(Self { device })
    }

    /// Name of the active input device.
    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "Unknown Device".to_string())
    }

    /// Start capturing. The returned stream owns the device handle; frames
    /// arrive on its queue until `close` (or drop) ends the stream.
    pub fn open(&self, cfg: &CaptureConfig) -> Result<CaptureStream> {
        let default_config = self
            .device
            .default_input_config()
            .map_err(|err| TranscribeError::DeviceUnavailable(err.to_string()))?;
        let format = default_config.sample_format();
        let device_config: StreamConfig = default_config.into();
        let device_sample_rate = device_config.sample_rate.0;
        let channels = usize::from(device_config.channels.max(1));

        log_debug(&format!(
            "capture config: format={format:?} sample_rate={device_sample_rate}Hz channels={channels} frame_samples={}",
            cfg.frame_samples
        ));

        let (sender, receiver) = unbounded::<AudioFrame>();
        let faults = Arc::new(AtomicUsize::new(0));
        let dispatcher = Arc::new(Mutex::new(FrameDispatcher::new(
            cfg.frame_samples,
            device_sample_rate,
            sender,
        )));

        // Keep the error callback quiet on screen and mirror issues into the log.
        let err_fn = |err| log_debug(&format!("audio_stream_error: {err}"));

        let stream = match format {
            SampleFormat::F32 => {
                let dispatcher = dispatcher.clone();
                let faults = faults.clone();
                self.device
                    .build_input_stream(
                        &device_config,
                        move |data: &[f32], _| {
                            if let Ok(mut pump) = dispatcher.try_lock() {
                                pump.push(data, channels, |sample| sample);
                            } else {
                                faults.fetch_add(1, Ordering::Relaxed);
                            }
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|err| TranscribeError::DeviceUnavailable(err.to_string()))?
            }
            SampleFormat::I16 => {
                let dispatcher = dispatcher.clone();
                let faults = faults.clone();
                self.device
                    .build_input_stream(
                        &device_config,
                        move |data: &[i16], _| {
                            if let Ok(mut pump) = dispatcher.try_lock() {
                                pump.push(data, channels, |sample| sample as f32 / 32_768.0);
                            } else {
                                faults.fetch_add(1, Ordering::Relaxed);
                            }
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|err| TranscribeError::DeviceUnavailable(err.to_string()))?
            }
            SampleFormat::U16 => {
                let dispatcher = dispatcher.clone();
                let faults = faults.clone();
                self.device
                    .build_input_stream(
                        &device_config,
                        move |data: &[u16], _| {
                            if let Ok(mut pump) = dispatcher.try_lock() {
                                pump.push(data, channels, |sample| {
                                    (sample as f32 - 32_768.0) / 32_768.0
                                });
                            } else {
                                faults.fetch_add(1, Ordering::Relaxed);
                            }
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|err| TranscribeError::DeviceUnavailable(err.to_string()))?
            }
            other => {
                return Err(TranscribeError::DeviceUnavailable(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        };

        stream
            .play()
            .map_err(|err| TranscribeError::DeviceUnavailable(err.to_string()))?;

        Ok(CaptureStream {
            stream: Some(stream),
            receiver,
            faults,
        })
    }
}

fn mic_permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "macOS: System Settings > Privacy & Security > Microphone (enable your terminal)."
    }
    #[cfg(target_os = "linux")]
    {
        "Linux: check PipeWire/PulseAudio permissions and ensure the device is not muted."
    }
    #[cfg(target_os = "windows")]
    {
        "Windows: Settings > Privacy & Security > Microphone (allow access for your terminal)."
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        "Check OS microphone permissions."
    }
}

/// Live capture stream. Frames flow on the queue while the CPAL stream runs;
/// dropping this guard (or calling `close`) pauses the stream and releases
/// the producer, after which the queue drains and then reports disconnect.
pub struct CaptureStream {
    stream: Option<cpal::Stream>,
    receiver: Receiver<AudioFrame>,
    faults: Arc<AtomicUsize>,
}

impl CaptureStream {
    /// Consumer handle for the frame queue.
    pub fn frames(&self) -> Receiver<AudioFrame> {
        self.receiver.clone()
    }

    /// Number of data callbacks that could not deliver samples (assembler
    /// busy). Non-zero values point at a stalled capture thread.
    pub fn callback_faults(&self) -> usize {
        self.faults.load(Ordering::Relaxed)
    }

    /// Stop capturing. Idempotent; a partial trailing frame is discarded.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.pause() {
                log_debug(&format!("failed to pause audio stream: {err}"));
            }
            drop(stream);
        }
    }
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        self.close();
    }
}
