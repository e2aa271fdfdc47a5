//! High score persistence
//!
//! A single best score stored as `{"high_score": n}`. A missing file reads as 0.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{HighScoreStore, MemoryHighScore};

/// Store shared by every session of a server
pub type SharedHighScore = Arc<Mutex<dyn HighScoreStore + Send>>;

/// In-memory store, forgotten on exit
pub fn memory_store() -> SharedHighScore {
    Arc::new(Mutex::new(MemoryHighScore::default()))
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct HighScoreFile {
    high_score: u32,
}

/// Best score backed by a JSON file, rewritten whenever the score improves
#[derive(Debug, Clone)]
pub struct JsonFileHighScore {
    path: PathBuf,
    best: u32,
}

impl JsonFileHighScore {
    /// Open the store at `path`, reading the current best if the file exists
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let best = match fs::read_to_string(&path) {
            Ok(s) => {
                serde_json::from_str::<HighScoreFile>(&s)
                    .with_context(|| format!("malformed high score file {}", path.display()))?
                    .high_score
            }
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };
        Ok(Self { path, best })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current best to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec(&HighScoreFile {
            high_score: self.best,
        })?;
        fs::write(&self.path, bytes).with_context(|| format!("writing {}", self.path.display()))
    }
}

impl HighScoreStore for JsonFileHighScore {
    fn get(&self) -> u32 {
        self.best
    }

    fn set_if_greater(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(e) = self.save() {
            eprintln!("[Server] Failed to save high score: {:#}", e);
        }
        true
    }
}

/// Shared store for the configured path, or an in-memory one when unset
pub fn open_store(path: Option<&str>) -> anyhow::Result<SharedHighScore> {
    match path {
        Some(path) => {
            let store = JsonFileHighScore::load(path)?;
            println!(
                "[Server] High score {} loaded from {}",
                store.get(),
                store.path().display()
            );
            Ok(Arc::new(Mutex::new(store)))
        }
        None => Ok(memory_store()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "bomb-tetris-{}-{}-{}.json",
            name,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn test_missing_file_reads_zero() {
        let store = JsonFileHighScore::load(temp_path("missing")).unwrap();
        assert_eq!(store.get(), 0);
    }

    #[test]
    fn test_persists_improvements() {
        let path = temp_path("persist");
        let mut store = JsonFileHighScore::load(&path).unwrap();
        assert!(store.set_if_greater(1200));
        assert!(!store.set_if_greater(800));

        let reopened = JsonFileHighScore::load(&path).unwrap();
        assert_eq!(reopened.get(), 1200);
        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"high_score":1200}"#);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_path("malformed");
        fs::write(&path, "not json").unwrap();
        assert!(JsonFileHighScore::load(&path).is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_open_store_without_path_is_memory() {
        let store = open_store(None).unwrap();
        let mut guard = store.lock().unwrap();
        assert_eq!(guard.get(), 0);
        assert!(guard.set_if_greater(5));
        assert_eq!(guard.get(), 5);
    }
}
