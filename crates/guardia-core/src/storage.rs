// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Key-value storage abstraction.
//!
//! The [`Storage`] trait is the single interface between the engine and any
//! persistence layer: a browser's key-value storage, a JSON file, or plain
//! process memory.  This crate ships [`InMemoryStorage`]; the file backend
//! lives in `guardia-std` and the browser bridge in `guardia-wasm`.
//!
//! Values are opaque strings.  The engine stores JSON documents and
//! `"true"`/`"false"` flags; the backend never interprets them.  Writes to
//! different keys carry no transactional guarantee.
//!
//! # Implementing `Storage`
//!
//! ```rust
//! use guardia_core::error::GuardiaResult;
//! use guardia_core::storage::Storage;
//!
//! struct NullStorage;
//!
//! impl Storage for NullStorage {
//!     fn load(&self, _key: &str) -> Option<String> { None }
//!     fn save(&mut self, _key: &str, _value: String) -> GuardiaResult<()> { Ok(()) }
//!     fn remove(&mut self, _key: &str) -> GuardiaResult<()> { Ok(()) }
//! }
//! ```

use hashbrown::HashMap;

use crate::error::GuardiaResult;

/// Pluggable key-value persistence interface.
///
/// Implementations MUST be `Send + Sync` so the engine can be shared across
/// tasks when wrapped in `Arc<RwLock<...>>`.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn load(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, value: String) -> GuardiaResult<()>;

    /// Delete `key`.  Removing an absent key is a no-op.
    fn remove(&mut self, key: &str) -> GuardiaResult<()>;
}

/// A volatile [`Storage`] implementation backed by [`hashbrown::HashMap`].
///
/// All data lives in process memory and is lost when the storage is
/// dropped.  Used for tests, for the session-scoped store, and inside the
/// WASM bindings where the browser owns durable storage.
///
/// # Examples
///
/// ```rust
/// use guardia_core::storage::{InMemoryStorage, Storage};
///
/// let mut store = InMemoryStorage::new();
/// store.save("guardia_pro", "true".into()).unwrap();
/// assert_eq!(store.load("guardia_pro").as_deref(), Some("true"));
/// assert!(store.load("guardia_consents").is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    entries: HashMap<String, String>,
}

impl InMemoryStorage {
    /// Create a new, empty [`InMemoryStorage`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with `entries`.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// All stored pairs, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for InMemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: String) -> GuardiaResult<()> {
        self.entries.insert(key.into(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> GuardiaResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
