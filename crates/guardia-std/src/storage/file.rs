// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! File-based JSON storage backend.
//!
//! [`FileStorage`] keeps every key of a [`Storage`] namespace in one JSON
//! object on disk.  Every mutation flushes the file atomically
//! (write-rename) so that a crash mid-write does not corrupt existing data.
//!
//! ## Layout
//!
//! ```json
//! {
//!   "guardia_audit":           "[...]",
//!   "guardia_consents":        "[...]",
//!   "guardia_grievances":      "[...]",
//!   "guardia_onboarding_done": "true",
//!   "guardia_pro":             "false"
//! }
//! ```
//!
//! Values are the engine's opaque strings, stored verbatim.
//!
//! ## Caveats
//!
//! * The whole map is rewritten on every save.  Not intended for
//!   high-frequency write workloads.
//! * Concurrent access from multiple processes is not supported.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use guardia_core::error::{GuardiaError, GuardiaResult};
use guardia_core::storage::Storage;

/// A file-backed [`Storage`] implementation that persists values as JSON.
///
/// # Examples
///
/// ```rust,no_run
/// use guardia_std::storage::file::FileStorage;
/// use guardia_core::Storage;
///
/// let mut storage = FileStorage::open("/tmp/guardia.json")
///     .expect("could not open storage");
///
/// storage.save("guardia_pro", "true".into()).unwrap();
/// assert_eq!(storage.load("guardia_pro").as_deref(), Some("true"));
/// ```
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    data: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open an existing JSON storage file, or start empty if the path does
    /// not exist.  Nothing is written until the first mutation.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the file exists but cannot be read or if
    /// the JSON is malformed.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw).map_err(|error| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("guardia storage JSON parse error: {}", error),
                )
            })?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = data.len(), "file storage opened");
        Ok(Self { path, data })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush the current in-memory state to disk using an atomic write-rename.
    ///
    /// The file is written to `<path>.tmp` first, then renamed over the
    /// target, so a crash during the write never leaves a partial file.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if serialisation fails or the file cannot be
    /// written or renamed.
    pub fn flush(&self) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.data).map_err(|error| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("guardia storage serialisation error: {}", error),
            )
        })?;

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Put `key` back to its value before a mutation whose flush failed,
    /// so memory never holds what the file does not.
    fn restore(&mut self, key: &str, previous: Option<String>) {
        match previous {
            Some(value) => {
                self.data.insert(key.to_owned(), value);
            }
            None => {
                self.data.remove(key);
            }
        }
    }

    fn flush_or_error(&self) -> GuardiaResult<()> {
        self.flush().map_err(|error| {
            GuardiaError::Storage(format!("{}: {}", self.path.display(), error))
        })
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: String) -> GuardiaResult<()> {
        let previous = self.data.insert(key.to_owned(), value);
        if let Err(error) = self.flush_or_error() {
            self.restore(key, previous);
            return Err(error);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> GuardiaResult<()> {
        if let Some(previous) = self.data.remove(key) {
            if let Err(error) = self.flush_or_error() {
                self.restore(key, Some(previous));
                return Err(error);
            }
        }
        Ok(())
    }
}
