//! Legacy plaintext layout.
//!
//! Older installs kept each collection as a plain JSON array in its own file
//! (`journalEntries.json`, `tasks.json`, `events.json`). This module only reads
//! and removes those files; encrypting their contents is the migration's job.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ChieError, Result};
use crate::storage::types::Collection;

/// Directory holding legacy plaintext collection files.
#[derive(Debug, Clone)]
pub struct LegacyDir {
    dir: PathBuf,
}

impl LegacyDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn file(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.legacy_file_name())
    }

    /// Whether any legacy collection file is present.
    pub fn has_any(&self) -> bool {
        Collection::ALL
            .iter()
            .any(|collection| self.file(*collection).is_file())
    }

    /// Raw records of one collection; a missing file reads as empty.
    pub fn read(&self, collection: Collection) -> Result<Vec<Value>> {
        let path = self.file(collection);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&text)? {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            _ => Err(ChieError::InvalidInput(format!(
                "{} is not a JSON array",
                path.display()
            ))),
        }
    }

    /// Delete the legacy file of one collection, if present.
    pub fn remove(&self, collection: Collection) -> Result<()> {
        match fs::remove_file(self.file(collection)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_files_read_empty() {
        let dir = tempdir().unwrap();
        let legacy = LegacyDir::new(dir.path());
        assert!(!legacy.has_any());
        assert!(legacy.read(Collection::Tasks).unwrap().is_empty());
    }

    #[test]
    fn test_read_array() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tasks.json"),
            r#"[{"text": "a"}, {"text": "b"}]"#,
        )
        .unwrap();

        let legacy = LegacyDir::new(dir.path());
        assert!(legacy.has_any());
        assert_eq!(legacy.read(Collection::Tasks).unwrap().len(), 2);
    }

    #[test]
    fn test_non_array_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("events.json"), r#"{"oops": true}"#).unwrap();

        let legacy = LegacyDir::new(dir.path());
        assert!(matches!(
            legacy.read(Collection::Events),
            Err(ChieError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_remove_tolerates_missing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("journalEntries.json"), "[]").unwrap();

        let legacy = LegacyDir::new(dir.path());
        for collection in Collection::ALL {
            legacy.remove(collection).unwrap();
        }
        assert!(!legacy.has_any());
    }
}
