//! Live microphone transcription at the terminal.
//!
//! Captures from the default (or named) input device, mutes frames below the
//! noise gate, and streams batches through the selected recognition model.
//! Partial captions repaint a single console line; finalized utterances are
//! committed on their own line with a confidence tag when the decoder is
//! unsure.

mod picker;
mod render;
mod signal;

use anyhow::Result;
use hearsay::audio::{FrameConditioner, Microphone};
use hearsay::config::AppConfig;
use hearsay::engine::default_loader;
use hearsay::models::ModelStore;
use hearsay::{
    init_logging, init_tracing, log_debug, log_file_path, log_panic, Hypothesis, ModelCache,
    Transcriber,
};
use render::{TransientLine, CONFIDENCE_DISPLAY_FLOOR};
use std::panic;

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    init_tracing(&config);
    panic::set_hook(Box::new(|info| log_panic(info)));
    if config.logging_enabled() {
        eprintln!("Debug log: {}", log_file_path().display());
    }

    if config.list_input_devices {
        return list_input_devices();
    }

    let store = ModelStore::new(&config.models_dir);
    if config.list_models {
        return list_models(&store);
    }

    run(&config, store)
}

fn run(config: &AppConfig, store: ModelStore) -> Result<()> {
    println!("{}", "=".repeat(60));
    println!("      Live Multilingual Speech-to-Text");
    println!("{}", "=".repeat(60));

    let loader = default_loader()?;

    let installed = store.installed();
    if installed.is_empty() {
        println!("[!] No models found in {}", store.root().display());
        println!("    Run 'hearsay-models list' to see what is available.");
        println!("    Example: 'hearsay-models fetch en-us-small'");
        return Ok(());
    }

    let selected = match &config.lang {
        Some(lang) => lang.clone(),
        None => match picker::prompt_model_choice(&installed)? {
            Some(name) => name,
            None => {
                println!("[!] Invalid selection. Exiting.");
                return Ok(());
            }
        },
    };

    let mut transcriber = Transcriber::new(ModelCache::new(store, loader));

    println!("\n[*] Initializing '{selected}'... (Please wait)");
    if let Err(err) = transcriber.select_model(&selected) {
        println!("[!] Failed to load model: {err}");
        println!("    Run 'hearsay-models fetch {selected}' if it is not installed yet.");
        return Ok(());
    }

    let microphone = Microphone::new(config.input_device.as_deref())?;
    let mut stream = microphone.open(&config.capture_config())?;
    let mut conditioner = FrameConditioner::new(stream.frames(), config.noise_gate());
    signal::install_sigint_handler()?;

    println!(
        "\n[*] Model loaded. Listening on '{}'... (Press Ctrl+C to stop)",
        microphone.device_name()
    );
    println!(
        "[*] Confidence threshold for display: {:.0}%",
        CONFIDENCE_DISPLAY_FLOOR * 100.0
    );
    println!("{}", "=".repeat(60));

    let mut line = TransientLine::new();
    while !signal::interrupted() {
        let Some(batch) = conditioner.next_batch() else {
            // Producer went away: device lost or stream closed underneath us.
            break;
        };
        match transcriber.process(&batch) {
            Hypothesis::Final { text, confidence } => line.show_final(&text, confidence),
            Hypothesis::Partial { text } => line.show_partial(&text),
        }
    }

    println!("\n\n[*] Stopping...");
    stream.close();
    let tail = transcriber.finalize();
    if !tail.is_empty() {
        println!(">> {tail}");
    }
    let faults = stream.callback_faults();
    if faults > 0 {
        log_debug(&format!("capture ended with {faults} callback faults"));
    }
    println!("Goodbye.");
    Ok(())
}

fn list_input_devices() -> Result<()> {
    // HEARSAY_TEST_DEVICES lets CI exercise this path without audio hardware.
    let devices = if let Ok(raw) = std::env::var("HEARSAY_TEST_DEVICES") {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        }
    } else {
        Microphone::list_devices().unwrap_or_else(|err| {
            eprintln!("Failed to list audio input devices: {err}");
            Vec::new()
        })
    };

    if devices.is_empty() {
        println!("No audio input devices detected.");
    } else {
        println!("Available audio input devices:");
        for name in devices {
            println!("  - {name}");
        }
    }
    Ok(())
}

fn list_models(store: &ModelStore) -> Result<()> {
    let installed = store.installed();
    if installed.is_empty() {
        println!("No models installed in {}.", store.root().display());
        println!("Run 'hearsay-models fetch <name>' to install one.");
    } else {
        println!("Installed models in {}:", store.root().display());
        for name in installed {
            println!("  - {name}");
        }
    }
    Ok(())
}
