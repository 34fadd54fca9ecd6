//! Model setup tool: browse the catalog and install models for `hearsay`.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use hearsay::models::{catalog, fetch_model, FetchOutcome, ModelClass, ModelSpec, ModelStore};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(about = "Download and install recognition models", version)]
struct Args {
    /// Directory models are installed into.
    #[arg(
        long = "models-dir",
        env = "HEARSAY_MODELS_DIR",
        default_value = "models",
        global = true
    )]
    models_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show every model the tool can install.
    List,
    /// Download and unpack models by name.
    Fetch {
        /// Model names from the catalog (see `list`).
        names: Vec<String>,

        /// Install every model in the catalog. Warning: tens of gigabytes.
        #[arg(long, conflicts_with = "names")]
        all: bool,

        /// Install every large model.
        #[arg(long, conflicts_with_all = ["names", "all"])]
        large: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::List => {
            print_catalog(&ModelStore::new(&args.models_dir));
            Ok(())
        }
        Command::Fetch { names, all, large } => fetch(&args.models_dir, &names, all, large),
    }
}

fn print_catalog(store: &ModelStore) {
    println!("\nAvailable Models:");
    println!("{:<15} {:<10} {:<20} {}", "Name", "Type", "Language", "Status");
    println!("{}", "-".repeat(60));
    for spec in catalog() {
        let status = if store.is_installed(spec.name) {
            "installed"
        } else {
            "-"
        };
        println!(
            "{:<15} {:<10} {:<20} {}",
            spec.name,
            spec.class.label(),
            spec.language,
            status
        );
    }
    println!("{}", "-".repeat(60));
}

fn fetch(models_dir: &PathBuf, names: &[String], all: bool, large: bool) -> Result<()> {
    let targets: Vec<&ModelSpec> = if all {
        catalog().iter().collect()
    } else if large {
        catalog()
            .iter()
            .filter(|spec| spec.class == ModelClass::Large)
            .collect()
    } else {
        let unknown: Vec<&str> = names
            .iter()
            .filter(|name| ModelSpec::find(name).is_none())
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            println!("[!] Warning: unknown models skipped: {}", unknown.join(", "));
        }
        names.iter().filter_map(|name| ModelSpec::find(name)).collect()
    };

    if targets.is_empty() {
        bail!("no valid models selected; run 'hearsay-models list' to see the catalog");
    }

    let selected: Vec<&str> = targets.iter().map(|spec| spec.name).collect();
    println!("Selected models: {}", selected.join(", "));

    let mut failures = 0usize;
    for spec in &targets {
        if let Err(err) = install_one(models_dir, spec) {
            eprintln!("\n[!] Error installing {}: {err}", spec.name);
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} of {} models failed to install", targets.len());
    }
    Ok(())
}

fn install_one(models_dir: &PathBuf, spec: &ModelSpec) -> Result<()> {
    // The download header and extract notice ride on the progress callback:
    // the first call marks bytes flowing, the last one precedes unpacking.
    let mut started = false;
    let mut extracting = false;
    let outcome = fetch_model(models_dir, spec, |bytes, total| {
        if !started {
            println!("[+] Downloading '{}' from {}...", spec.name, spec.url);
            started = true;
        }
        report_progress(bytes, total);
        if !extracting && total.is_some_and(|total| total > 0 && bytes >= total) {
            println!("\n[+] Download complete. Extracting...");
            extracting = true;
        }
    })?;
    match outcome {
        FetchOutcome::AlreadyInstalled => {
            println!(
                "[*] Model '{}' already installed at {}",
                spec.name,
                models_dir.join(spec.name).display()
            );
        }
        FetchOutcome::Installed => {
            println!("[*] Setup finished for {}", spec.name);
        }
    }
    Ok(())
}

/// One-line download meter, rewritten in place.
fn report_progress(bytes: u64, total: Option<u64>) {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    match total {
        Some(total) if total > 0 => {
            let percent = bytes * 100 / total;
            print!("\r  Downloading... {percent}% ({mb:.1} MB)");
        }
        _ => {
            print!("\r  Downloading... {mb:.1} MB");
        }
    }
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn fetch_requires_a_subcommand() {
        assert!(Args::try_parse_from(["hearsay-models"]).is_err());
    }

    #[test]
    fn list_parses_with_custom_dir() {
        let args =
            Args::try_parse_from(["hearsay-models", "--models-dir", "/tmp/m", "list"]).unwrap();
        assert_eq!(args.models_dir, PathBuf::from("/tmp/m"));
        assert!(matches!(args.command, Command::List));
    }

    #[test]
    fn fetch_flags_are_mutually_exclusive() {
        assert!(Args::try_parse_from(["hearsay-models", "fetch", "--all", "--large"]).is_err());
        assert!(
            Args::try_parse_from(["hearsay-models", "fetch", "en-us-small", "--all"]).is_err()
        );
    }

    #[test]
    fn fetch_collects_names() {
        let args =
            Args::try_parse_from(["hearsay-models", "fetch", "en-us-small", "hi-small"]).unwrap();
        match args.command {
            Command::Fetch { names, all, large } => {
                assert_eq!(names, vec!["en-us-small", "hi-small"]);
                assert!(!all && !large);
            }
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn unknown_names_fail_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let err = fetch(&dir.path().to_path_buf(), &["zz-tiny".to_string()], false, false)
            .unwrap_err();
        assert!(err.to_string().contains("no valid models selected"));
    }
}
