//! Model storage: the directory of unpacked recognizer models.
//!
//! Each installed model is a plain directory named after its language code
//! (`en-us-small`, `hi-large`, ...). The setup tool populates this layout;
//! the runtime only ever reads it.

mod catalog;
mod fetch;

pub use catalog::{catalog, ModelClass, ModelSpec};
pub use fetch::{fetch_model, FetchOutcome};

use std::fs;
use std::path::{Path, PathBuf};

/// Read-only view over the model directory.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of installed models, sorted. A missing root reads as empty so
    /// first-run UX can point at the setup tool instead of erroring.
    pub fn installed(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = fs::read_dir(&self.root) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        names.push(name.to_string());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Directory holding the model for `code`, if one is installed. Codes
    /// travel from user input straight into a path join, so anything that
    /// isn't a plain directory name is rejected outright.
    pub fn resolve(&self, code: &str) -> Option<PathBuf> {
        if !is_safe_name(code) {
            return None;
        }
        let dir = self.root.join(code);
        dir.is_dir().then_some(dir)
    }

    pub fn is_installed(&self, code: &str) -> bool {
        self.resolve(code).is_some()
    }
}

fn is_safe_name(code: &str) -> bool {
    !code.is_empty()
        && !code.starts_with('.')
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installed_lists_sorted_directories_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zh-large", "en-us-small", "hi-small"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("stray.zip"), b"not a model").unwrap();

        let store = ModelStore::new(dir.path());
        assert_eq!(store.installed(), vec!["en-us-small", "hi-small", "zh-large"]);
    }

    #[test]
    fn missing_root_reads_as_empty() {
        let store = ModelStore::new("/no/such/model/root");
        assert!(store.installed().is_empty());
    }

    #[test]
    fn resolve_finds_installed_model() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("en-us-small")).unwrap();

        let store = ModelStore::new(dir.path());
        assert_eq!(
            store.resolve("en-us-small"),
            Some(dir.path().join("en-us-small"))
        );
        assert!(store.resolve("en-us-large").is_none());
    }

    #[test]
    fn resolve_rejects_path_escapes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("en-us-small")).unwrap();

        let store = ModelStore::new(dir.path().join("en-us-small"));
        assert!(store.resolve("../en-us-small").is_none());
        assert!(store.resolve(".hidden").is_none());
        assert!(store.resolve("").is_none());
    }
}
