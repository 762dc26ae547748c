// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Built-in demonstration records.
//!
//! A store whose persisted blob is absent or unparsable loads these when
//! [`Config::seed_demo_data`](crate::config::Config::seed_demo_data) is set.
//! Their fingerprints are opaque legacy values and do not verify.

use chrono::{DateTime, TimeZone, Utc};

use crate::types::{
    AuditAction, AuditLogEntry, ConsentArtifact, ConsentStatus, Grievance, GrievanceCategory,
    GrievanceStatus, UserRole,
};

const SEED_USER: &str = "user-123";
const SEED_SOURCE: &str = "106.21.XX.XX";

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn artifact(
    id: &str,
    fiduciary_id: &str,
    purposes: &[&str],
    status: ConsentStatus,
    timestamp: DateTime<Utc>,
    expiry_date: DateTime<Utc>,
    hash: &str,
) -> ConsentArtifact {
    ConsentArtifact {
        id: id.into(),
        user_id: SEED_USER.into(),
        fiduciary_id: fiduciary_id.into(),
        purposes: purposes.iter().map(|p| (*p).to_owned()).collect(),
        status,
        timestamp,
        expiry_date,
        hash: hash.into(),
        parental_consent_id: None,
        is_withdrawal_pending: None,
    }
}

/// Demonstration consent artifacts, newest first.
pub fn initial_consents() -> Vec<ConsentArtifact> {
    vec![
        artifact(
            "ART-88219",
            "fid-1",
            &["p1", "p3"],
            ConsentStatus::Active,
            at(2023, 11, 20, 14, 20),
            at(2025, 11, 20, 14, 20),
            "8F2E34B991C...",
        ),
        artifact(
            "ART-00221",
            "fid-3",
            &["p1"],
            ConsentStatus::Withdrawn,
            at(2023, 8, 10, 9, 15),
            at(2024, 8, 10, 9, 15),
            "SHA256-EF992...",
        ),
        artifact(
            "ART-EX99",
            "fid-2",
            &["p1", "p2"],
            ConsentStatus::Expired,
            at(2022, 1, 1, 0, 0),
            at(2023, 1, 1, 0, 0),
            "SHA256-EXPIRED-NODE",
        ),
    ]
}

/// Demonstration grievances, newest first.
pub fn initial_grievances() -> Vec<Grievance> {
    vec![
        Grievance {
            id: "grv-001".into(),
            user_id: SEED_USER.into(),
            category: GrievanceCategory::AccessRequest,
            description: "Formal request for summary of data processing for BharatHealth. \
                          I wish to know where my blood group data is stored."
                .into(),
            status: GrievanceStatus::InProgress,
            created_at: at(2024, 1, 10, 9, 0),
            reference_number: "REF-2024-991".into(),
            fiduciary_id: None,
            resolution_notes: None,
        },
        Grievance {
            id: "grv-002".into(),
            user_id: SEED_USER.into(),
            category: GrievanceCategory::ConsentViolation,
            description: "My marketing consent was withdrawn on Aug 10, but I still received \
                          a promotional SMS on Aug 15."
                .into(),
            status: GrievanceStatus::Resolved,
            created_at: at(2023, 8, 15, 11, 20),
            reference_number: "REF-2023-442".into(),
            fiduciary_id: None,
            resolution_notes: None,
        },
    ]
}

/// Demonstration audit entries, newest first.
pub fn initial_audit_logs() -> Vec<AuditLogEntry> {
    vec![
        AuditLogEntry {
            id: "LOG-101".into(),
            user_id: SEED_USER.into(),
            action: AuditAction::Grant,
            purpose_id: Some("p1".into()),
            timestamp: at(2023, 11, 20, 14, 20),
            status: "SUCCESS".into(),
            initiator: UserRole::DataPrincipal,
            source_ip: SEED_SOURCE.into(),
            hash: "SHA256-A1B2C3D4...".into(),
        },
        AuditLogEntry {
            id: "LOG-102".into(),
            user_id: SEED_USER.into(),
            action: AuditAction::Withdraw,
            purpose_id: Some("ART-00221".into()),
            timestamp: at(2023, 8, 10, 9, 15),
            status: "COMPLETED".into(),
            initiator: UserRole::DataPrincipal,
            source_ip: SEED_SOURCE.into(),
            hash: "SHA256-REVOKED".into(),
        },
    ]
}
