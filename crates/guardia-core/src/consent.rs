// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Consent lifecycle management.
//!
//! [`ConsentManager`] enforces the artifact state machine:
//!
//! ```text
//!            grant                     withdraw
//!   (none) ────────▶ ACTIVE ──────────────────────▶ WITHDRAWN (terminal)
//!                     │  ▲
//!                     │  └── update (purposes, timestamp, hash)
//!                     │
//!                     └── now >= expiry_date ──────▶ EXPIRED (terminal, derived lazily)
//! ```
//!
//! Every accepted operation appends exactly one audit entry
//! ([`grant_for_minor`](ConsentManager::grant_for_minor) appends two: the
//! guardian verification and the grant).  All checks run before the first
//! write, so a rejected operation leaves both the store and the trail
//! untouched.

use chrono::{DateTime, Duration, Utc};

use crate::error::{GuardiaError, GuardiaResult};
use crate::integrity::{fingerprint, new_id};
use crate::session::SessionContext;
use crate::types::{AuditAction, ConsentArtifact, ConsentStatus};

/// Validity period of a freshly granted artifact.
pub const CONSENT_VALIDITY_DAYS: i64 = 365;

/// Effective status of `artifact` at `now`.
///
/// An `Active` artifact whose expiry date has been reached reads as
/// `Expired`; every other status is returned unchanged.  The artifact is not
/// modified.
///
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use guardia_core::consent::evaluate_expiry;
/// use guardia_core::types::ConsentStatus;
///
/// let mut artifacts = guardia_core::seed::initial_consents();
/// let artifact = &mut artifacts[0];
/// artifact.status = ConsentStatus::Active;
///
/// let before = artifact.expiry_date - Duration::seconds(1);
/// assert_eq!(evaluate_expiry(artifact, before), ConsentStatus::Active);
/// assert_eq!(evaluate_expiry(artifact, artifact.expiry_date), ConsentStatus::Expired);
/// assert_eq!(artifact.status, ConsentStatus::Active);
/// ```
pub fn evaluate_expiry(artifact: &ConsentArtifact, now: DateTime<Utc>) -> ConsentStatus {
    if artifact.status == ConsentStatus::Active && now >= artifact.expiry_date {
        ConsentStatus::Expired
    } else {
        artifact.status
    }
}

/// Fingerprint over an artifact's grant terms.
///
/// Status is excluded: withdrawal changes the status but not the terms.
pub fn artifact_fingerprint(artifact: &ConsentArtifact) -> String {
    let purposes = artifact.purposes.join(",");
    let timestamp = artifact.timestamp.to_rfc3339();
    let expiry = artifact.expiry_date.to_rfc3339();
    fingerprint(&[
        &artifact.id,
        &artifact.user_id,
        &artifact.fiduciary_id,
        &purposes,
        &timestamp,
        &expiry,
        artifact.parental_consent_id.as_deref().unwrap_or(""),
    ])
}

/// Whether the stored hash matches the artifact's current terms.
///
/// Records imported with opaque legacy fingerprints report `false`.
pub fn verify_integrity(artifact: &ConsentArtifact) -> bool {
    artifact.hash == artifact_fingerprint(artifact)
}

/// Deduplicate a purpose selection, keeping first-seen order.
fn normalize_purposes<S: AsRef<str>>(purpose_ids: &[S]) -> Vec<String> {
    let mut selection: Vec<String> = Vec::with_capacity(purpose_ids.len());
    for id in purpose_ids {
        let id = id.as_ref().trim();
        if !id.is_empty() && !selection.iter().any(|s| s == id) {
            selection.push(id.to_owned());
        }
    }
    selection
}

/// Borrowed view over a session's consent store.
///
/// Obtain one with [`SessionContext::consents`].
///
/// # Examples
///
/// ```rust
/// use guardia_core::{catalog::Catalog, config::Config, session::SessionContext};
/// use guardia_core::types::{AuditAction, ConsentStatus};
///
/// let mut session = SessionContext::new(Config::default(), Catalog::builtin());
///
/// let artifact = session.consents().grant("user-1", "fid-2", &["p1", "p2"]).unwrap();
/// assert_eq!(artifact.status, ConsentStatus::Active);
/// assert_eq!(session.audit().latest().unwrap().action, AuditAction::Grant);
///
/// let withdrawn = session.consents().withdraw(&artifact.id).unwrap();
/// assert_eq!(withdrawn.status, ConsentStatus::Withdrawn);
///
/// // Withdrawal is terminal.
/// assert!(session.consents().withdraw(&artifact.id).is_err());
/// ```
pub struct ConsentManager<'s> {
    session: &'s mut SessionContext,
}

impl<'s> ConsentManager<'s> {
    pub(crate) fn new(session: &'s mut SessionContext) -> Self {
        Self { session }
    }

    /// Grant consent from `principal_id` to `fiduciary_id` for
    /// `purpose_ids`.
    ///
    /// The new artifact is `Active`, expires [`CONSENT_VALIDITY_DAYS`] after
    /// the grant, and is placed at the front of the store.  A `GRANT` entry
    /// targeting the first selected purpose is appended.
    ///
    /// # Errors
    ///
    /// * [`GuardiaError::Validation`]: empty selection, a purpose the
    ///   fiduciary's notice does not offer, or a missing mandatory purpose.
    /// * [`GuardiaError::NotFound`]: unknown fiduciary.
    pub fn grant<S: AsRef<str>>(
        &mut self,
        principal_id: &str,
        fiduciary_id: &str,
        purpose_ids: &[S],
    ) -> GuardiaResult<ConsentArtifact> {
        let selection = normalize_purposes(purpose_ids);
        self.session.catalog.validate_selection(fiduciary_id, &selection)?;
        Ok(self.commit_grant(principal_id, fiduciary_id, selection, None))
    }

    /// Grant consent on behalf of a minor after guardian verification.
    ///
    /// Appends `PARENTAL_VERIFY` (status `VERIFIED`) and then `GRANT`; the
    /// verification id is stored on the artifact.  The guardian address is
    /// checked but never written to the audit trail.
    ///
    /// # Errors
    ///
    /// Everything [`grant`](Self::grant) reports, plus
    /// [`GuardiaError::Validation`] for a malformed guardian address or a
    /// fiduciary that is not child-directed.
    pub fn grant_for_minor<S: AsRef<str>>(
        &mut self,
        principal_id: &str,
        fiduciary_id: &str,
        purpose_ids: &[S],
        guardian_email: &str,
    ) -> GuardiaResult<ConsentArtifact> {
        let guardian_email = guardian_email.trim();
        if guardian_email.is_empty() || !guardian_email.contains('@') {
            return Err(GuardiaError::Validation(
                "a valid guardian email is required for parental consent".into(),
            ));
        }

        let is_child_app = self
            .session
            .catalog
            .fiduciary(fiduciary_id)
            .map(|f| f.is_child_app)
            .ok_or_else(|| GuardiaError::NotFound(format!("fiduciary '{}'", fiduciary_id)))?;
        if !is_child_app {
            return Err(GuardiaError::Validation(format!(
                "fiduciary '{}' is not child-directed",
                fiduciary_id
            )));
        }

        let selection = normalize_purposes(purpose_ids);
        self.session.catalog.validate_selection(fiduciary_id, &selection)?;

        let verification_id = new_id("VPC");
        let actor = self.session.actor();
        let now = self.session.now();
        self.session.audit.append(
            AuditAction::ParentalVerify,
            &actor,
            Some(verification_id.clone()),
            "VERIFIED",
            now,
        );
        tracing::info!(
            verification_id = %verification_id,
            fiduciary_id,
            "guardian verification recorded"
        );

        Ok(self.commit_grant(principal_id, fiduciary_id, selection, Some(verification_id)))
    }

    fn commit_grant(
        &mut self,
        principal_id: &str,
        fiduciary_id: &str,
        purposes: Vec<String>,
        parental_consent_id: Option<String>,
    ) -> ConsentArtifact {
        let now = self.session.now();
        let mut artifact = ConsentArtifact {
            id: new_id("ART"),
            user_id: principal_id.to_owned(),
            fiduciary_id: fiduciary_id.to_owned(),
            purposes,
            status: ConsentStatus::Active,
            timestamp: now,
            expiry_date: now + Duration::days(CONSENT_VALIDITY_DAYS),
            hash: String::new(),
            parental_consent_id,
            is_withdrawal_pending: None,
        };
        artifact.hash = artifact_fingerprint(&artifact);

        let actor = self.session.actor();
        let target = artifact.purposes.first().cloned();
        self.session.consents.insert(0, artifact.clone());
        self.session.audit.append(
            AuditAction::Grant,
            &actor,
            target,
            ConsentStatus::Active.as_str(),
            now,
        );

        tracing::info!(
            artifact_id = %artifact.id,
            fiduciary_id = %artifact.fiduciary_id,
            purposes = artifact.purposes.len(),
            "consent granted"
        );
        artifact
    }

    /// Replace the purpose set of an active artifact.
    ///
    /// The id and expiry date are retained; the timestamp and hash are
    /// recomputed.  An `UPDATE` entry targeting the first purpose is
    /// appended.
    ///
    /// # Errors
    ///
    /// * [`GuardiaError::NotFound`]: unknown artifact.
    /// * [`GuardiaError::InvalidState`]: the effective status is not
    ///   `Active` (withdrawn, expired, or pending).
    /// * [`GuardiaError::Validation`]: the new selection is invalid.
    pub fn update<S: AsRef<str>>(
        &mut self,
        artifact_id: &str,
        new_purpose_ids: &[S],
    ) -> GuardiaResult<ConsentArtifact> {
        let now = self.session.now();
        let index = self.active_index(artifact_id, now, "updated")?;

        let selection = normalize_purposes(new_purpose_ids);
        let fiduciary_id = self.session.consents[index].fiduciary_id.clone();
        self.session.catalog.validate_selection(&fiduciary_id, &selection)?;

        let actor = self.session.actor();
        let artifact = &mut self.session.consents[index];
        artifact.purposes = selection;
        artifact.timestamp = now;
        artifact.hash = artifact_fingerprint(artifact);
        let updated = artifact.clone();

        self.session.audit.append(
            AuditAction::Update,
            &actor,
            updated.purposes.first().cloned(),
            ConsentStatus::Active.as_str(),
            now,
        );
        tracing::info!(artifact_id, purposes = updated.purposes.len(), "consent updated");
        Ok(updated)
    }

    /// Withdraw an active artifact.  Irreversible.
    ///
    /// A `WITHDRAW` entry targeting the artifact id is appended.
    ///
    /// # Errors
    ///
    /// * [`GuardiaError::NotFound`]: unknown artifact.
    /// * [`GuardiaError::InvalidState`]: the artifact is already withdrawn,
    ///   expired, or pending.  A repeated withdraw is rejected rather than
    ///   treated as a no-op, and produces no audit entry.
    pub fn withdraw(&mut self, artifact_id: &str) -> GuardiaResult<ConsentArtifact> {
        let now = self.session.now();
        let index = self.active_index(artifact_id, now, "withdrawn")?;

        let actor = self.session.actor();
        let artifact = &mut self.session.consents[index];
        artifact.status = ConsentStatus::Withdrawn;
        let withdrawn = artifact.clone();

        self.session.audit.append(
            AuditAction::Withdraw,
            &actor,
            Some(withdrawn.id.clone()),
            ConsentStatus::Withdrawn.as_str(),
            now,
        );
        tracing::info!(artifact_id, "consent withdrawn");
        Ok(withdrawn)
    }

    /// Look up an artifact by id.
    pub fn get(&self, artifact_id: &str) -> Option<&ConsentArtifact> {
        self.session.consents.iter().find(|a| a.id == artifact_id)
    }

    /// Effective status of an artifact at the session's current instant.
    ///
    /// # Errors
    ///
    /// [`GuardiaError::NotFound`] for an unknown artifact.
    pub fn effective_status(&self, artifact_id: &str) -> GuardiaResult<ConsentStatus> {
        let now = self.session.now();
        self.get(artifact_id)
            .map(|artifact| evaluate_expiry(artifact, now))
            .ok_or_else(|| GuardiaError::NotFound(format!("consent artifact '{}'", artifact_id)))
    }

    /// Artifacts referencing `fiduciary_id`, newest first.
    pub fn for_fiduciary(&self, fiduciary_id: &str) -> Vec<&ConsentArtifact> {
        self.session
            .consents
            .iter()
            .filter(|a| a.fiduciary_id == fiduciary_id)
            .collect()
    }

    /// Number of artifacts whose effective status is `Active`.
    pub fn active_count(&self) -> usize {
        let now = self.session.now();
        self.session
            .consents
            .iter()
            .filter(|a| evaluate_expiry(a, now) == ConsentStatus::Active)
            .count()
    }

    fn active_index(&self, artifact_id: &str, now: DateTime<Utc>, verb: &str) -> GuardiaResult<usize> {
        let index = self
            .session
            .consents
            .iter()
            .position(|a| a.id == artifact_id)
            .ok_or_else(|| GuardiaError::NotFound(format!("consent artifact '{}'", artifact_id)))?;

        let status = evaluate_expiry(&self.session.consents[index], now);
        if status != ConsentStatus::Active {
            return Err(GuardiaError::InvalidState(format!(
                "consent artifact '{}' is {}; only ACTIVE artifacts can be {}",
                artifact_id, status, verb
            )));
        }
        Ok(index)
    }
}
