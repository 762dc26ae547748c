// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Identifier generation and integrity fingerprints.
//!
//! Fingerprints are SHA-256 digests over `:`-joined fields, rendered as
//! `SHA256-<UPPER HEX>`.  They detect accidental edits of a persisted record;
//! they are not signatures.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Prefix shared by every fingerprint produced by this crate.
pub const FINGERPRINT_PREFIX: &str = "SHA256-";

/// Compute a fingerprint over `parts`.
///
/// ```rust
/// use guardia_core::integrity::fingerprint;
///
/// let a = fingerprint(&["ART-1", "user-1"]);
/// assert_eq!(a, fingerprint(&["ART-1", "user-1"]));
/// assert_ne!(a, fingerprint(&["ART-1", "user-2"]));
/// assert!(a.starts_with("SHA256-"));
/// ```
pub fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            hasher.update(b":");
        }
        hasher.update(part.as_bytes());
    }
    format!("{}{}", FINGERPRINT_PREFIX, hex::encode_upper(hasher.finalize()))
}

/// Generate an identifier of the form `<prefix>-XXXXXXXX`.
pub fn new_id(prefix: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    format!("{}-{}", prefix, &simple[..8])
}

/// Generate a grievance reference number, `REF-DPDP-1000` to `REF-DPDP-9999`.
pub fn new_reference_number() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    let raw = u16::from_be_bytes([bytes[0], bytes[1]]);
    format!("REF-DPDP-{}", 1000 + raw % 9000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_separates_fields() {
        assert_ne!(fingerprint(&["ab", "c"]), fingerprint(&["a", "bc"]));
    }

    #[test]
    fn fingerprint_is_upper_hex_sha256() {
        let value = fingerprint(&["x"]);
        let digest = &value[FINGERPRINT_PREFIX.len()..];
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn ids_carry_prefix_and_eight_chars() {
        let id = new_id("ART");
        assert!(id.starts_with("ART-"));
        assert_eq!(id.len(), 12);
        assert_ne!(id, new_id("ART"));
    }

    #[test]
    fn reference_numbers_have_four_digits() {
        for _ in 0..64 {
            let reference = new_reference_number();
            let digits = reference.trim_start_matches("REF-DPDP-");
            assert_eq!(digits.len(), 4);
            assert!(digits.parse::<u16>().is_ok());
        }
    }
}
