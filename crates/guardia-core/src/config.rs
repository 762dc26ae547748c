// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Engine-level configuration.
//!
//! [`Config`] is the single entry point for tuning the engine at
//! construction time.  All fields have defaults so that `Config::default()`
//! is always a valid starting point, and a partial JSON or TOML document
//! deserialises with the missing fields filled in.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum description length for a grievance, in characters.
pub const DEFAULT_MIN_GRIEVANCE_LEN: usize = 20;

/// Bounded wait for a text-generation call before the fallback is used.
pub const DEFAULT_GENERATION_TIMEOUT_MS: u64 = 15_000;

/// How the three stores are written to the key-value backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    /// One key per store.  A failure between saves can leave the stores
    /// mutually inconsistent; each store falls back to seed data on its own.
    #[default]
    Independent,
    /// A single snapshot blob holding all three stores, written in one save.
    Snapshot,
}

impl fmt::Display for PersistenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceMode::Independent => write!(f, "independent"),
            PersistenceMode::Snapshot    => write!(f, "snapshot"),
        }
    }
}

/// Top-level configuration for [`GuardiaEngine`](crate::engine::GuardiaEngine).
///
/// # Examples
///
/// ```rust
/// use guardia_core::config::{Config, PersistenceMode};
///
/// let config = Config {
///     persistence_mode: PersistenceMode::Snapshot,
///     ..Config::default()
/// };
/// assert_eq!(config.min_grievance_description_len, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grievance descriptions shorter than this (after trimming) are
    /// rejected.
    pub min_grievance_description_len: usize,

    /// Redacted network address stamped on every audit entry.
    pub source_address: String,

    /// Actor id recorded when no principal is logged in.
    pub anonymous_actor_id: String,

    /// Upper bound on a text-generation call, in milliseconds.
    pub generation_timeout_ms: u64,

    /// Store layout in the persistence backend.
    pub persistence_mode: PersistenceMode,

    /// When `true`, absent or unparsable stores load the built-in
    /// demonstration data instead of starting empty.
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_grievance_description_len: DEFAULT_MIN_GRIEVANCE_LEN,
            source_address: "106.21.XX.XX".into(),
            anonymous_actor_id: "anon".into(),
            generation_timeout_ms: DEFAULT_GENERATION_TIMEOUT_MS,
            persistence_mode: PersistenceMode::Independent,
            seed_demo_data: true,
        }
    }
}

/// A [`Config`] field outside its permitted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field \"{field}\": value \"{value}\" out of range: {reason}")]
pub struct RangeError {
    /// Field name.
    pub field: &'static str,
    /// Offending value.
    pub value: String,
    /// The permitted range.
    pub reason: &'static str,
}

impl Config {
    /// Check every field against its permitted range.
    ///
    /// Deserialisation fills missing fields but does not range-check
    /// them, so configs built from untrusted JSON or TOML go through here.
    ///
    /// ```rust
    /// use guardia_core::config::Config;
    ///
    /// assert!(Config::default().validate().is_ok());
    /// let config = Config { generation_timeout_ms: 0, ..Config::default() };
    /// assert_eq!(config.validate().unwrap_err().field, "generation_timeout_ms");
    /// ```
    pub fn validate(&self) -> Result<(), RangeError> {
        if self.generation_timeout_ms == 0 {
            return Err(RangeError {
                field: "generation_timeout_ms",
                value: "0".into(),
                reason: "must be > 0",
            });
        }
        if self.min_grievance_description_len == 0 {
            return Err(RangeError {
                field: "min_grievance_description_len",
                value: "0".into(),
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}
