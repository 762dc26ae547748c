// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Shared data types used across the consent, grievance, and audit
//! sub-systems.
//!
//! Every persisted type serialises with camelCase field names and
//! SCREAMING_SNAKE_CASE enum values so that blobs written by the browser
//! front-end load without conversion.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Roles and principals
// ---------------------------------------------------------------------------

/// Role the acting user holds within the session.
///
/// The role is snapshotted into every audit entry at append time, so a later
/// role switch never rewrites history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// The individual whose personal data is processed.
    #[default]
    DataPrincipal,
    /// Platform administrator.
    Admin,
    /// Data protection officer handling grievances.
    Dpo,
    /// Compliance auditor.
    Auditor,
    /// Registered consent manager acting on behalf of principals.
    ConsentManager,
}

impl UserRole {
    /// Wire name of the role, identical to its serialised form.
    ///
    /// ```rust
    /// use guardia_core::types::UserRole;
    /// assert_eq!(UserRole::DataPrincipal.as_str(), "DATA_PRINCIPAL");
    /// ```
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::DataPrincipal  => "DATA_PRINCIPAL",
            UserRole::Admin          => "ADMIN",
            UserRole::Dpo            => "DPO",
            UserRole::Auditor        => "AUDITOR",
            UserRole::ConsentManager => "CONSENT_MANAGER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user of the current session.
///
/// Session-scoped: restored only for the lifetime of one browser tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Opaque principal identifier.
    pub id: String,
    /// Display name entered at login.
    pub name: String,
    /// Role currently selected for the session.
    pub role: UserRole,
    /// Whether the pro-tier upgrade flag was set when the session started.
    #[serde(default)]
    pub is_pro: bool,
}

/// The identity recorded on an audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Acting user identifier (`"anon"` when nobody is logged in).
    pub user_id: String,
    /// Role at the moment the action was accepted.
    pub role: UserRole,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A discrete, named reason for processing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentPurpose {
    /// Purpose identifier, e.g. `"p1"`.
    pub id: String,
    /// Short human-readable name.
    pub name: String,
    /// Longer description shown on the consent notice.
    pub description: String,
    /// Whether the purpose must be selected for the grant to be valid.
    pub is_mandatory: bool,
    /// Whether the purpose is offered on child-directed notices.
    #[serde(default)]
    pub is_child_sensitive: bool,
}

/// An organisation requesting or processing a principal's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fiduciary {
    /// Fiduciary identifier, e.g. `"fid-2"`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Sector label.
    pub category: String,
    /// Two-letter monogram.
    pub logo: String,
    /// Short description.
    pub description: String,
    /// Grievance contact address.
    pub contact_email: String,
    /// Optional 0–100 compliance score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_score: Option<u8>,
    /// Child-directed fiduciaries require verifiable parental consent and
    /// offer only mandatory and child-sensitive purposes.
    #[serde(default)]
    pub is_child_app: bool,
}

// ---------------------------------------------------------------------------
// Consent
// ---------------------------------------------------------------------------

/// Lifecycle status of a [`ConsentArtifact`].
///
/// `Withdrawn` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsentStatus {
    /// Consent is in force.
    Active,
    /// Consent was withdrawn by the principal.
    Withdrawn,
    /// Consent lapsed at its expiry date.
    Expired,
    /// Consent awaits a further step (never produced by the lifecycle
    /// manager, only carried through from persisted data).
    Pending,
}

impl ConsentStatus {
    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            ConsentStatus::Active    => "ACTIVE",
            ConsentStatus::Withdrawn => "WITHDRAWN",
            ConsentStatus::Expired   => "EXPIRED",
            ConsentStatus::Pending   => "PENDING",
        }
    }

    /// Whether no further transition is possible from this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConsentStatus::Withdrawn | ConsentStatus::Expired)
    }
}

impl fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fiduciary-scoped grant of data-processing permission.
///
/// Artifacts are never deleted; withdrawn and expired artifacts stay in the
/// store as historical records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentArtifact {
    /// Opaque artifact identifier (`ART-…`).
    pub id: String,
    /// Owning principal.
    pub user_id: String,
    /// Target fiduciary.
    pub fiduciary_id: String,
    /// Granted purpose identifiers, in selection order, without duplicates.
    pub purposes: Vec<String>,
    /// Stored status. Use
    /// [`evaluate_expiry`](crate::consent::evaluate_expiry) for the
    /// effective status at a given instant.
    pub status: ConsentStatus,
    /// Creation time, or the time of the last purpose update.
    pub timestamp: DateTime<Utc>,
    /// Instant at which an active artifact becomes expired.
    pub expiry_date: DateTime<Utc>,
    /// Integrity fingerprint over the grant terms.
    pub hash: String,
    /// Verification id of the guardian approval for child-directed grants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parental_consent_id: Option<String>,
    /// Carried through from persisted data; the lifecycle manager withdraws
    /// synchronously and never sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_withdrawal_pending: Option<bool>,
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// Kind of state-changing action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A consent artifact was created.
    Grant,
    /// A consent artifact was withdrawn.
    Withdraw,
    /// The purpose set of an active artifact changed.
    Update,
    /// An artifact was validated by a fiduciary or auditor.
    Validate,
    /// A grievance was filed or changed status.
    Notification,
    /// A guardian verified consent on behalf of a minor.
    ParentalVerify,
}

impl AuditAction {
    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Grant          => "GRANT",
            AuditAction::Withdraw       => "WITHDRAW",
            AuditAction::Update         => "UPDATE",
            AuditAction::Validate       => "VALIDATE",
            AuditAction::Notification   => "NOTIFICATION",
            AuditAction::ParentalVerify => "PARENTAL_VERIFY",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of a single accepted state-changing action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Entry identifier (`LOG-…`).
    pub id: String,
    /// Acting user.
    pub user_id: String,
    /// What happened.
    pub action: AuditAction,
    /// Target purpose or artifact reference, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose_id: Option<String>,
    /// When the action was accepted.
    pub timestamp: DateTime<Utc>,
    /// Resulting status string (`ACTIVE`, `WITHDRAWN`, `SUBMITTED`, …).
    pub status: String,
    /// Role of the actor at append time.
    pub initiator: UserRole,
    /// Redacted originating network address.
    pub source_ip: String,
    /// Integrity fingerprint over the entry fields.
    pub hash: String,
}

/// Filter used to narrow the results of
/// [`AuditTrail::query`](crate::audit::AuditTrail::query).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFilter {
    /// If set, only return entries recorded for this user.
    #[serde(default)]
    pub user_id: Option<String>,
    /// If set, only return entries with this action.
    #[serde(default)]
    pub action: Option<AuditAction>,
    /// If set, only return entries at or after this instant.
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    /// If set, only return entries at or before this instant.
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
    /// If set, limit the number of returned entries.
    #[serde(default)]
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Grievances
// ---------------------------------------------------------------------------

/// Fixed grievance categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrievanceCategory {
    /// Processing continued without or beyond consent.
    ConsentViolation,
    /// Personal data was exposed.
    DataBreach,
    /// Data was processed incorrectly.
    ProcessingError,
    /// Question about the principal's rights.
    RightsInquiry,
    /// Request for a summary of processed data.
    AccessRequest,
}

impl GrievanceCategory {
    /// Wire name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            GrievanceCategory::ConsentViolation => "CONSENT_VIOLATION",
            GrievanceCategory::DataBreach       => "DATA_BREACH",
            GrievanceCategory::ProcessingError  => "PROCESSING_ERROR",
            GrievanceCategory::RightsInquiry    => "RIGHTS_INQUIRY",
            GrievanceCategory::AccessRequest    => "ACCESS_REQUEST",
        }
    }
}

/// Redressal status of a [`Grievance`].
///
/// Progression is `Submitted → InProgress → Resolved | Closed`; variants are
/// declared in that order so `Ord` reflects progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrievanceStatus {
    /// Filed, not yet picked up.
    Submitted,
    /// Under review by the fiduciary's officer.
    InProgress,
    /// Resolved with notes.
    Resolved,
    /// Closed without further action.
    Closed,
}

impl GrievanceStatus {
    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            GrievanceStatus::Submitted  => "SUBMITTED",
            GrievanceStatus::InProgress => "IN_PROGRESS",
            GrievanceStatus::Resolved   => "RESOLVED",
            GrievanceStatus::Closed     => "CLOSED",
        }
    }

    /// `Resolved` and `Closed` accept no further transitions.
    pub fn is_final(self) -> bool {
        matches!(self, GrievanceStatus::Resolved | GrievanceStatus::Closed)
    }
}

impl fmt::Display for GrievanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A principal-filed complaint subject to a resolution workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grievance {
    /// Grievance identifier.
    pub id: String,
    /// Filing principal.
    pub user_id: String,
    /// Complaint category.
    pub category: GrievanceCategory,
    /// Free-text description.
    pub description: String,
    /// Current redressal status.
    pub status: GrievanceStatus,
    /// Filing time.
    pub created_at: DateTime<Utc>,
    /// Human-readable reference (`REF-DPDP-NNNN`).
    pub reference_number: String,
    /// Fiduciary the complaint is about, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiduciary_id: Option<String>,
    /// Notes recorded when the grievance was resolved or closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Certificates
// ---------------------------------------------------------------------------

/// Compliance certificate issued from a policy audit score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Certificate identifier (`CERT-…`).
    pub id: String,
    /// Issuing user.
    pub user_id: String,
    /// Audited URL.
    pub target_url: String,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Audit score, 0–100.
    pub score: u8,
    /// Integrity fingerprint.
    pub hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_wire_names() {
        let json = serde_json::to_string(&AuditAction::ParentalVerify).unwrap();
        assert_eq!(json, "\"PARENTAL_VERIFY\"");
        let json = serde_json::to_string(&GrievanceStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let role: UserRole = serde_json::from_str("\"CONSENT_MANAGER\"").unwrap();
        assert_eq!(role, UserRole::ConsentManager);
    }

    #[test]
    fn artifact_reads_browser_blob() {
        let raw = r#"{
            "id": "ART-88219",
            "userId": "user-123",
            "fiduciaryId": "fid-1",
            "purposes": ["p1", "p3"],
            "status": "ACTIVE",
            "timestamp": "2023-11-20T14:20:00Z",
            "expiryDate": "2025-11-20T14:20:00Z",
            "hash": "8F2E34B991C..."
        }"#;
        let artifact: ConsentArtifact = serde_json::from_str(raw).unwrap();
        assert_eq!(artifact.status, ConsentStatus::Active);
        assert_eq!(artifact.purposes, vec!["p1", "p3"]);
        assert!(artifact.parental_consent_id.is_none());
    }

    #[test]
    fn grievance_status_orders_by_progression() {
        assert!(GrievanceStatus::Submitted < GrievanceStatus::InProgress);
        assert!(GrievanceStatus::InProgress < GrievanceStatus::Resolved);
        assert!(GrievanceStatus::Closed.is_final());
        assert!(!GrievanceStatus::InProgress.is_final());
    }
}
