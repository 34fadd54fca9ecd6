pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
mod logging;
pub mod models;
pub mod session;
mod telemetry;

pub use logging::{init_logging, log_debug, log_file_path, log_panic, log_timing};
pub use session::{Hypothesis, ModelCache, Transcriber};
pub use telemetry::init_tracing;
