//! Session persistence for the command line: one JSON object per file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use prodops_client::net::session::KeyValueStore;

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

/// Key/value store backed by a JSON file. Every call re-reads the file, so
/// concurrent invocations see each other's writes.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `~/.prodops/session.json`, or a file in the working directory when no
    /// home directory is known.
    pub fn default_path() -> PathBuf {
        dirs::home_dir().map_or_else(
            || PathBuf::from(".prodops-session.json"),
            |home| home.join(".prodops").join("session.json"),
        )
    }

    fn load(&self) -> BTreeMap<String, String> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
            BTreeMap::new()
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) {
        if let Err(e) = self.write(entries) {
            tracing::warn!(path = %self.path.display(), error = %e, "session file write failed");
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, raw)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.load();
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.load();
        if entries.remove(key).is_some() {
            self.save(&entries);
        }
    }
}
