// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # guardia-std
//!
//! `std`-only storage backends for `guardia-core`.
//!
//! This crate provides [`FileStorage`], a JSON file-backed implementation of
//! the [`Storage`](guardia_core::Storage) trait for CLI tools and local
//! deployments, and [`open_engine`] to wire it into a [`GuardiaEngine`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use guardia_core::config::Config;
//!
//! let mut engine = guardia_std::open_engine("/var/lib/guardia/state.json", Config::default())
//!     .expect("failed to open storage file");
//! engine.login("Asha").unwrap();
//! ```

use std::io;
use std::path::Path;

use guardia_core::{Config, GuardiaEngine};

pub mod storage;

pub use storage::file::FileStorage;

/// Open an engine whose durable state lives in the JSON file at `path`.
///
/// The session-scoped principal is kept in memory and ends with the
/// process.
///
/// # Errors
///
/// Returns an [`io::Error`] if the file exists but cannot be read or parsed.
pub fn open_engine<P: AsRef<Path>>(path: P, config: Config) -> io::Result<GuardiaEngine<FileStorage>> {
    let storage = FileStorage::open(path)?;
    Ok(GuardiaEngine::new(config, storage))
}

#[cfg(test)]
mod tests {
    use guardia_core::types::ConsentStatus;

    use super::*;

    #[test]
    fn engine_state_persists_to_file() {
        let dir = std::env::temp_dir().join(format!("guardia-std-engine-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("state.json");
        let _ = std::fs::remove_file(&path);

        let config = Config {
            seed_demo_data: false,
            ..Config::default()
        };
        let mut engine = open_engine(&path, config.clone()).unwrap();
        let artifact = engine.grant_consent("fid-2", &["p1", "p2"]).unwrap();
        engine.withdraw_consent(&artifact.id).unwrap();
        drop(engine);

        let reopened = open_engine(&path, config).unwrap();
        let store = reopened.session().consent_store();
        assert_eq!(store.len(), 1);
        assert_eq!(store[0].status, ConsentStatus::Withdrawn);
        assert_eq!(reopened.session().audit().len(), 2);
    }
}
