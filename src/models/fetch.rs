//! Download and unpack model archives.
//!
//! Flow per model: stream the zip into the store root, extract it, rename
//! the versioned directory the archive carries to the catalog name, and
//! delete the zip whether or not anything succeeded. A failed install never
//! leaves a half-written model behind under the catalog name.

use super::catalog::ModelSpec;
use crate::error::{Result, TranscribeError};
use crate::log_debug;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
// Per-read timeout; a whole archive may take far longer than this.
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const PROGRESS_STEP_BYTES: u64 = 1024 * 1024;

/// What `fetch_model` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Installed,
    AlreadyInstalled,
}

/// Provenance record dropped inside each installed model directory.
#[derive(Serialize)]
struct InstallRecord<'a> {
    name: &'a str,
    url: &'a str,
    fetched_at: u64,
}

/// Install one catalog model under `root`. `on_progress` receives
/// (bytes downloaded, total if the server reported one) roughly once per
/// megabyte.
pub fn fetch_model(
    root: &Path,
    spec: &ModelSpec,
    mut on_progress: impl FnMut(u64, Option<u64>),
) -> Result<FetchOutcome> {
    fs::create_dir_all(root)?;
    let target = root.join(spec.name);
    if target.is_dir() {
        return Ok(FetchOutcome::AlreadyInstalled);
    }

    let archive_path = root.join(format!("{}.zip", spec.name));
    let result = download_archive(spec.url, &archive_path, &mut on_progress)
        .and_then(|_| install_archive(&archive_path, root, &target, spec));
    if archive_path.exists() {
        if let Err(err) = fs::remove_file(&archive_path) {
            log_debug(&format!("failed to remove archive {}: {err}", archive_path.display()));
        }
    }
    result?;
    Ok(FetchOutcome::Installed)
}

fn download_archive(
    url: &str,
    dest: &Path,
    on_progress: &mut dyn FnMut(u64, Option<u64>),
) -> Result<()> {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(CONNECT_TIMEOUT)
        .timeout_read(READ_TIMEOUT)
        .build();
    let response = agent
        .get(url)
        .call()
        .map_err(|err| TranscribeError::Fetch(format!("download of {url} failed: {err}")))?;
    if response.status() != 200 {
        return Err(TranscribeError::Fetch(format!(
            "download of {url} failed with status {}",
            response.status()
        )));
    }

    let total = response
        .header("Content-Length")
        .and_then(|v| v.parse::<u64>().ok());
    let mut reader = response.into_reader();
    let mut file = File::create(dest)?;
    let mut buf = [0u8; 64 * 1024];
    let mut written = 0u64;
    let mut last_reported = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        written += n as u64;
        if written - last_reported >= PROGRESS_STEP_BYTES {
            on_progress(written, total);
            last_reported = written;
        }
    }
    on_progress(written, total);
    Ok(())
}

fn install_archive(
    archive_path: &Path,
    root: &Path,
    target: &Path,
    spec: &ModelSpec,
) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|err| {
        TranscribeError::Fetch(format!("unreadable archive for {}: {err}", spec.name))
    })?;
    let extracted_root = archive_root(&archive).ok_or_else(|| {
        TranscribeError::Fetch(format!("archive for {} is empty", spec.name))
    })?;
    archive.extract(root).map_err(|err| {
        TranscribeError::Fetch(format!("extracting {} failed: {err}", spec.name))
    })?;

    // Archives carry a versioned directory name; reinstall it under the
    // stable catalog name the recognizer looks up.
    let extracted = root.join(&extracted_root);
    if extracted != target {
        log_debug(&format!("renaming {extracted_root} -> {}", spec.name));
        if target.exists() {
            fs::remove_dir_all(target)?;
        }
        fs::rename(&extracted, target)?;
    }
    write_install_record(target, spec)
}

/// Top-level directory inside the archive, per the first entry. Model zips
/// published upstream always have exactly one.
fn archive_root<R: Read + Seek>(archive: &zip::ZipArchive<R>) -> Option<String> {
    archive
        .file_names()
        .filter_map(|name| name.split('/').next())
        .find(|part| !part.is_empty())
        .map(|part| part.to_string())
}

fn write_install_record(target: &Path, spec: &ModelSpec) -> Result<()> {
    let record = InstallRecord {
        name: spec.name,
        url: spec.url,
        fetched_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
    };
    let json = serde_json::to_string_pretty(&record)
        .map_err(|err| TranscribeError::Fetch(err.to_string()))?;
    fs::write(target.join("install.json"), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::catalog::ModelClass;
    use super::*;

    fn test_spec() -> ModelSpec {
        ModelSpec {
            name: "xx-small",
            language: "Test",
            class: ModelClass::Small,
            url: "https://example.invalid/vosk-model-small-xx-0.1.zip",
        }
    }

    fn write_test_archive(path: &Path, root_dir: &str) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer
            .start_file(format!("{root_dir}/am/final.mdl"), options)
            .unwrap();
        writer.write_all(b"acoustic model bytes").unwrap();
        writer
            .start_file(format!("{root_dir}/conf/mfcc.conf"), options)
            .unwrap();
        writer.write_all(b"--sample-frequency=16000").unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn archive_root_reads_first_directory() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("m.zip");
        write_test_archive(&zip_path, "vosk-model-small-xx-0.1");

        let archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        assert_eq!(
            archive_root(&archive).as_deref(),
            Some("vosk-model-small-xx-0.1")
        );
    }

    #[test]
    fn install_archive_extracts_and_renames() {
        let dir = tempfile::tempdir().unwrap();
        let spec = test_spec();
        let zip_path = dir.path().join("xx-small.zip");
        write_test_archive(&zip_path, "vosk-model-small-xx-0.1");

        let target = dir.path().join("xx-small");
        install_archive(&zip_path, dir.path(), &target, &spec).unwrap();

        assert!(target.join("am/final.mdl").is_file());
        assert!(target.join("conf/mfcc.conf").is_file());
        assert!(target.join("install.json").is_file());
        assert!(!dir.path().join("vosk-model-small-xx-0.1").exists());

        let record = fs::read_to_string(target.join("install.json")).unwrap();
        assert!(record.contains("xx-small"));
    }

    #[test]
    fn fetch_skips_models_already_installed() {
        let dir = tempfile::tempdir().unwrap();
        let spec = test_spec();
        fs::create_dir_all(dir.path().join(spec.name)).unwrap();

        // No network involved: the install check runs before any download.
        let outcome = fetch_model(dir.path(), &spec, |_, _| {}).unwrap();
        assert_eq!(outcome, FetchOutcome::AlreadyInstalled);
    }
}
