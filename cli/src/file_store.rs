use anyhow::{Context, Result};
use dailymines_protocol::{KeyValueStore, StoreError};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key-value store kept as one JSON object on disk, rewritten on every set.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Platform data directory location, e.g. `~/.local/share/dailymines/store.json`.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "dailymines")
            .context("Could not determine data directory")?;
        Ok(project_dirs.data_dir().join("store.json"))
    }

    /// Opens `path`, starting empty when the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                log::warn!("Ignoring corrupt store {}: {}", path.display(), err);
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err).with_context(|| format!("Could not read {}", path.display()));
            }
        };
        log::debug!("Opened store {} with {} keys", path.display(), values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, raw)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_owned(), value.to_owned());
        self.flush().map_err(|err| StoreError::Write {
            key: key.to_owned(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("dailymines-{}-{name}", std::process::id()))
            .join("store.json")
    }

    #[test]
    fn values_survive_reopen() {
        let path = temp_path("reopen");
        let mut store = FileStore::open(&path).unwrap();
        store.set("difficulty", "Expert").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("difficulty").as_deref(), Some("Expert"));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[1, 2").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("difficulty"), None);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
