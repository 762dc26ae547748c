// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Configuration loader for [`GuardiaEngine`](crate::engine::GuardiaEngine).
//!
//! Supports two load strategies:
//!
//! 1. **TOML file**: [`load_config`] reads and deserialises a TOML file into
//!    a [`Config`].
//! 2. **Environment variables**: [`load_config_from_env`] reads
//!    `GUARDIA_`-prefixed environment variables.
//!
//! # File format
//!
//! ```toml
//! min_grievance_description_len = 20
//! source_address                = "106.21.XX.XX"
//! generation_timeout_ms         = 15000
//! persistence_mode              = "independent"   # "independent" | "snapshot"
//! seed_demo_data                = true
//! ```
//!
//! # Environment variables
//!
//! | Variable                          | Type    | Default         |
//! |-----------------------------------|---------|-----------------|
//! | `GUARDIA_MIN_GRIEVANCE_LEN`       | integer | 20              |
//! | `GUARDIA_SOURCE_ADDRESS`          | string  | "106.21.XX.XX"  |
//! | `GUARDIA_GENERATION_TIMEOUT_MS`   | integer | 15000           |
//! | `GUARDIA_PERSISTENCE_MODE`        | string  | "independent"   |
//! | `GUARDIA_SEED_DEMO_DATA`          | boolean | true            |

// Only compile this module when the "config-loader" feature is enabled.
#![cfg(feature = "config-loader")]

use std::fs;

use thiserror::Error;

use crate::config::{Config, PersistenceMode, RangeError};

/// Errors that can occur while loading or parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required file could not be opened.
    #[error("failed to read config file \"{path}\": {source}")]
    FileRead {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The TOML content could not be deserialised.
    #[error("failed to parse TOML config: {source}")]
    TomlParse {
        /// Underlying parse failure.
        #[from]
        source: toml::de::Error,
    },
    /// A field could not be parsed to its expected type.
    #[error("field \"{field}\": cannot parse \"{value}\": {reason}")]
    ParseField {
        /// Variable or key name.
        field: String,
        /// Raw value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },
    /// A field value is outside the permitted range.
    #[error("field \"{field}\": value \"{value}\" out of range: {reason}")]
    InvalidRange {
        /// Variable or key name.
        field: String,
        /// Raw value.
        value: String,
        /// The permitted range.
        reason: String,
    },
}

impl From<RangeError> for ConfigError {
    fn from(error: RangeError) -> Self {
        ConfigError::InvalidRange {
            field: error.field.to_owned(),
            value: error.value,
            reason: error.reason.to_owned(),
        }
    }
}

/// Load a [`Config`] from a TOML file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or if the TOML
/// content does not match the expected schema.
///
/// # Example
///
/// ```rust,no_run
/// use guardia_core::config_loader::load_config;
///
/// let config = load_config("/etc/guardia/guardia.toml").unwrap();
/// println!("Timeout: {} ms", config.generation_timeout_ms);
/// ```
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_owned(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parse a [`Config`] from TOML text and validate it.
pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load a [`Config`] from `GUARDIA_`-prefixed environment variables.
///
/// Unset variables fall back to their defaults.
///
/// # Errors
///
/// Returns a [`ConfigError::ParseField`] if any variable is set to a value
/// that cannot be parsed, or a [`ConfigError::InvalidRange`] for
/// out-of-range numbers.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    load_config_from_lookup(|key| std::env::var(key).ok())
}

/// Build a [`Config`] from an arbitrary variable lookup.
///
/// [`load_config_from_env`] passes `std::env::var`; tests pass a map.
pub fn load_config_from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    let min_grievance_description_len = match lookup("GUARDIA_MIN_GRIEVANCE_LEN") {
        Some(value) => parse_number::<usize>("GUARDIA_MIN_GRIEVANCE_LEN", &value)?,
        None => defaults.min_grievance_description_len,
    };

    let generation_timeout_ms = match lookup("GUARDIA_GENERATION_TIMEOUT_MS") {
        Some(value) => parse_number::<u64>("GUARDIA_GENERATION_TIMEOUT_MS", &value)?,
        None => defaults.generation_timeout_ms,
    };

    let persistence_mode = match lookup("GUARDIA_PERSISTENCE_MODE") {
        Some(value) => parse_mode(&value)?,
        None => defaults.persistence_mode,
    };

    let seed_demo_data = match lookup("GUARDIA_SEED_DEMO_DATA") {
        Some(value) => parse_bool("GUARDIA_SEED_DEMO_DATA", &value)?,
        None => defaults.seed_demo_data,
    };

    let config = Config {
        min_grievance_description_len,
        source_address: lookup("GUARDIA_SOURCE_ADDRESS").unwrap_or(defaults.source_address),
        anonymous_actor_id: defaults.anonymous_actor_id,
        generation_timeout_ms,
        persistence_mode,
        seed_demo_data,
    };
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|source| ConfigError::ParseField {
        field: key.to_owned(),
        value: value.to_owned(),
        reason: source.to_string(),
    })
}

fn parse_mode(value: &str) -> Result<PersistenceMode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "independent" => Ok(PersistenceMode::Independent),
        "snapshot"    => Ok(PersistenceMode::Snapshot),
        other => Err(ConfigError::ParseField {
            field: "GUARDIA_PERSISTENCE_MODE".into(),
            value: other.into(),
            reason: "expected one of: independent, snapshot".into(),
        }),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true"  | "1" | "yes" | "on"  => Ok(true),
        "false" | "0" | "no"  | "off" => Ok(false),
        other => Err(ConfigError::ParseField {
            field: key.to_owned(),
            value: other.to_owned(),
            reason: "expected one of: true/false, 1/0, yes/no, on/off".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = load_config_from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn environment_overrides_are_applied() {
        let config = load_config_from_lookup(lookup_from(&[
            ("GUARDIA_MIN_GRIEVANCE_LEN", "40"),
            ("GUARDIA_PERSISTENCE_MODE", "Snapshot"),
            ("GUARDIA_SEED_DEMO_DATA", "off"),
            ("GUARDIA_SOURCE_ADDRESS", "10.0.XX.XX"),
        ]))
        .unwrap();
        assert_eq!(config.min_grievance_description_len, 40);
        assert_eq!(config.persistence_mode, PersistenceMode::Snapshot);
        assert!(!config.seed_demo_data);
        assert_eq!(config.source_address, "10.0.XX.XX");
    }

    #[test]
    fn unparsable_number_is_reported() {
        let error = load_config_from_lookup(lookup_from(&[(
            "GUARDIA_GENERATION_TIMEOUT_MS",
            "soon",
        )]))
        .unwrap_err();
        assert!(matches!(error, ConfigError::ParseField { .. }));
    }

    #[test]
    fn zero_timeout_is_out_of_range() {
        let error = load_config_from_str("generation_timeout_ms = 0").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidRange { .. }));
    }

    #[test]
    fn toml_document_parses() {
        let config = load_config_from_str(
            "min_grievance_description_len = 30\npersistence_mode = \"snapshot\"\n",
        )
        .unwrap();
        assert_eq!(config.min_grievance_description_len, 30);
        assert_eq!(config.persistence_mode, PersistenceMode::Snapshot);
        assert_eq!(config.anonymous_actor_id, "anon");
    }
}
