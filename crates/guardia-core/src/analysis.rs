// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Parsing of generated compliance reports.
//!
//! Generated text is free-form and may ignore the requested structure, so
//! every parser here has a default and never fails.

use chrono::{DateTime, Utc};

use crate::integrity::{fingerprint, new_id};
use crate::types::Certificate;

/// Score used when a policy scan carries no `[SCORE]` marker.
pub const DEFAULT_POLICY_SCORE: u8 = 5;

/// Score used when a deep audit mentions no score.
pub const DEFAULT_AUDIT_SCORE: u8 = 45;

const SCORE_MARKER: &str = "[score]";

/// Policy-scan score on a ten-point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyScore {
    pub value: u8,
    pub total: u8,
}

impl PolicyScore {
    /// Score as a percentage of the total, capped at 100.
    pub fn percent(&self) -> u8 {
        let percent = (u32::from(self.value) * 100) / u32::from(self.total.max(1));
        percent.min(100) as u8
    }
}

/// Read the `[SCORE] N` marker of a policy scan.
///
/// Whitespace, blank lines, and `*` may sit between the marker and the
/// number.  Values above 10 are clamped.
///
/// ```rust
/// use guardia_core::analysis::parse_policy_score;
///
/// assert_eq!(parse_policy_score("[SCORE]\n**7\n[RISKS]").value, 7);
/// assert_eq!(parse_policy_score("no marker here").value, 5);
/// ```
pub fn parse_policy_score(text: &str) -> PolicyScore {
    let value = find_marker_number(text)
        .map(|(_, n)| n.min(10) as u8)
        .unwrap_or(DEFAULT_POLICY_SCORE);
    PolicyScore { value, total: 10 }
}

/// First number following the word "score" on the same line, capped at
/// 100.
///
/// ```rust
/// use guardia_core::analysis::extract_audit_score;
///
/// assert_eq!(extract_audit_score("Final Score: 82/100"), 82);
/// assert_eq!(extract_audit_score("score: 420"), 100);
/// assert_eq!(extract_audit_score("nothing to see"), 45);
/// ```
pub fn extract_audit_score(text: &str) -> u8 {
    let lower = text.to_ascii_lowercase();
    let mut from = 0;
    while let Some(offset) = lower[from..].find("score") {
        let after = from + offset + "score".len();
        let line = lower[after..].split('\n').next().unwrap_or("");
        if let Some(start) = line.find(|c: char| c.is_ascii_digit()) {
            return leading_number(&line[start..]).min(100) as u8;
        }
        from = after;
    }
    DEFAULT_AUDIT_SCORE
}

/// Turn a structured policy scan into markdown.
///
/// The `[SCORE] N` marker is removed and `[RISKS]` / `[SUMMARY]` become
/// headings.  Markers match case-insensitively.
///
/// ```rust
/// use guardia_core::analysis::split_sections;
///
/// let markdown = split_sections("[SCORE] 6\n[RISKS]\n- a\n[summary]\nok");
/// assert_eq!(markdown, "\n### Compliance Gaps\n- a\n### Audit Summary\nok");
/// ```
pub fn split_sections(text: &str) -> String {
    let mut out = strip_score_markers(text);
    out = replace_ignore_case(&out, "[risks]", "### Compliance Gaps");
    replace_ignore_case(&out, "[summary]", "### Audit Summary")
}

/// Issue a compliance certificate for an audited URL.
pub fn issue_certificate(
    user_id: &str,
    target_url: &str,
    score: u8,
    issued_at: DateTime<Utc>,
) -> Certificate {
    let id = new_id("CERT");
    let score = score.min(100);
    let hash = fingerprint(&[
        &id,
        user_id,
        target_url,
        &issued_at.to_rfc3339(),
        &score.to_string(),
    ]);
    Certificate {
        id,
        user_id: user_id.to_owned(),
        target_url: target_url.to_owned(),
        issued_at,
        score,
        hash,
    }
}

/// Locate the first `[SCORE]` marker followed by a number and return the
/// byte range it spans together with the number.
fn find_marker_number(text: &str) -> Option<(std::ops::Range<usize>, u64)> {
    let lower = text.to_ascii_lowercase();
    let mut from = 0;
    while let Some(offset) = lower[from..].find(SCORE_MARKER) {
        let start = from + offset;
        let mut cursor = start + SCORE_MARKER.len();
        let bytes = lower.as_bytes();
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        while cursor < bytes.len() && bytes[cursor] == b'*' {
            cursor += 1;
        }
        let digits = lower[cursor..].bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 {
            let number = leading_number(&lower[cursor..]);
            return Some((start..cursor + digits, number));
        }
        from = start + SCORE_MARKER.len();
    }
    None
}

fn strip_score_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some((range, _)) = find_marker_number(rest) {
        out.push_str(&rest[..range.start]);
        rest = &rest[range.end..];
    }
    out.push_str(rest);
    out
}

fn replace_ignore_case(text: &str, needle: &str, replacement: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (index, _) in lower.match_indices(needle) {
        out.push_str(&text[last..index]);
        out.push_str(replacement);
        last = index + needle.len();
    }
    out.push_str(&text[last..]);
    out
}

fn leading_number(text: &str) -> u64 {
    text.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, b| acc.saturating_mul(10).saturating_add(u64::from(b - b'0')))
}
