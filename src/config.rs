//! Command-line configuration for the `hearsay` binary.

use crate::audio::{CaptureConfig, NoiseGate, DEFAULT_GATE_RMS, SAMPLE_RATE};
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

const MIN_FRAME_MS: u64 = 100;
const MAX_FRAME_MS: u64 = 2_000;
/// Upper bound for `--gate-rms`; a full-scale square wave measures 32 768.
const MAX_GATE_RMS: u32 = 30_000;

#[derive(Parser, Debug, Clone)]
#[command(about = "Live microphone transcription", version)]
pub struct AppConfig {
    /// Directory holding installed recognition models.
    #[arg(long = "models-dir", env = "HEARSAY_MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,

    /// Model name to load immediately, skipping the picker (e.g. `en-us-small`).
    #[arg(long = "lang", env = "HEARSAY_LANG")]
    pub lang: Option<String>,

    /// Capture device name; the system default input is used when omitted.
    #[arg(long = "input-device")]
    pub input_device: Option<String>,

    /// Print available capture devices and exit.
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Print installed models and exit.
    #[arg(long = "list-models", default_value_t = false)]
    pub list_models: bool,

    /// RMS floor below which a frame is muted before decoding.
    #[arg(long = "gate-rms", default_value_t = DEFAULT_GATE_RMS)]
    pub gate_rms: u32,

    /// Capture frame length in milliseconds.
    #[arg(long = "frame-ms", default_value_t = 500)]
    pub frame_ms: u64,

    /// Enable debug logging to the temp-dir log file.
    #[arg(long = "logs", env = "HEARSAY_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging, overriding --logs.
    #[arg(long = "no-logs", env = "HEARSAY_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Include capture/decode timing lines in the debug log.
    #[arg(long = "log-timings", default_value_t = false)]
    pub log_timings: bool,

    /// Emit structured JSON traces alongside the debug log.
    #[arg(long = "trace", default_value_t = false)]
    pub trace: bool,
}

impl AppConfig {
    /// Parse CLI arguments and validate them in one step.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Validate ranges and reject hostile values before they reach the pipeline.
    pub fn validate(&mut self) -> Result<()> {
        if self.gate_rms > MAX_GATE_RMS {
            bail!(
                "--gate-rms must be between 0 and {}, got {}",
                MAX_GATE_RMS,
                self.gate_rms
            );
        }
        if self.frame_ms < MIN_FRAME_MS || self.frame_ms > MAX_FRAME_MS {
            bail!(
                "--frame-ms must be between {} and {}, got {}",
                MIN_FRAME_MS,
                MAX_FRAME_MS,
                self.frame_ms
            );
        }
        if let Some(lang) = &self.lang {
            if lang.is_empty() || !lang.chars().all(is_model_name_char) {
                bail!(
                    "--lang must be a model name like en-us-small (letters, digits, '-', '_', '.'), got {:?}",
                    lang
                );
            }
        }
        if let Some(device) = &self.input_device {
            if device.is_empty() || device.len() > 256 || device.chars().any(char::is_control) {
                bail!("--input-device must be a plain device name, got {:?}", device);
            }
        }
        if self.models_dir.exists() && !self.models_dir.is_dir() {
            bail!(
                "--models-dir must point at a directory, got {}",
                self.models_dir.display()
            );
        }
        Ok(())
    }

    /// Whether debug logging should be active for this run.
    pub fn logging_enabled(&self) -> bool {
        (self.logs || self.log_timings) && !self.no_logs
    }

    /// Frame length in samples at the decoder rate.
    pub fn frame_samples(&self) -> usize {
        (u64::from(SAMPLE_RATE) * self.frame_ms / 1_000) as usize
    }

    /// Snapshot of the capture settings handed to the microphone.
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            frame_samples: self.frame_samples(),
        }
    }

    /// Noise gate configured from the CLI threshold.
    pub fn noise_gate(&self) -> NoiseGate {
        NoiseGate::new(self.gate_rms)
    }
}

fn is_model_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}
