// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Grievance redressal workflow.
//!
//! Status only moves forward:
//!
//! ```text
//! SUBMITTED ──▶ IN_PROGRESS ──▶ RESOLVED
//!     │              │
//!     └──────────────┴────────▶ CLOSED
//! ```
//!
//! `RESOLVED` and `CLOSED` are final.  Each accepted transition appends one
//! `NOTIFICATION` entry whose status is the new grievance status and whose
//! target is the grievance id.

use crate::error::{GuardiaError, GuardiaResult};
use crate::integrity::{new_id, new_reference_number};
use crate::session::SessionContext;
use crate::types::{AuditAction, Grievance, GrievanceCategory, GrievanceStatus};

/// Borrowed view over a session's grievance store.
///
/// Obtain one with [`SessionContext::grievances`].
///
/// # Examples
///
/// ```rust
/// use guardia_core::{catalog::Catalog, config::Config, session::SessionContext};
/// use guardia_core::types::{GrievanceCategory, GrievanceStatus};
///
/// let mut session = SessionContext::new(Config::default(), Catalog::builtin());
/// let grievance = session
///     .grievances()
///     .submit(
///         "user-1",
///         GrievanceCategory::DataBreach,
///         "My phone number appeared in a public partner export.",
///         Some("fid-3".into()),
///     )
///     .unwrap();
/// assert!(grievance.reference_number.starts_with("REF-DPDP-"));
///
/// let resolved = session
///     .grievances()
///     .resolve(&grievance.id, "Export revoked and partner notified.")
///     .unwrap();
/// assert_eq!(resolved.status, GrievanceStatus::Resolved);
/// ```
pub struct GrievanceWorkflow<'s> {
    session: &'s mut SessionContext,
}

impl<'s> GrievanceWorkflow<'s> {
    pub(crate) fn new(session: &'s mut SessionContext) -> Self {
        Self { session }
    }

    /// File a new grievance.
    ///
    /// # Errors
    ///
    /// [`GuardiaError::Validation`] when the trimmed description is blank or
    /// shorter than [`Config::min_grievance_description_len`](crate::config::Config::min_grievance_description_len)
    /// characters.  Nothing is stored or audited in that case.
    pub fn submit(
        &mut self,
        principal_id: &str,
        category: GrievanceCategory,
        description: &str,
        fiduciary_id: Option<String>,
    ) -> GuardiaResult<Grievance> {
        let description = description.trim();
        if description.is_empty() {
            return Err(GuardiaError::Validation(
                "grievance description must not be empty".into(),
            ));
        }
        let minimum = self.session.config.min_grievance_description_len;
        if description.chars().count() < minimum {
            return Err(GuardiaError::Validation(format!(
                "grievance description must be at least {} characters",
                minimum
            )));
        }

        let now = self.session.now();
        let grievance = Grievance {
            id: new_id("GRV"),
            user_id: principal_id.to_owned(),
            category,
            description: description.to_owned(),
            status: GrievanceStatus::Submitted,
            created_at: now,
            reference_number: new_reference_number(),
            fiduciary_id,
            resolution_notes: None,
        };

        let actor = self.session.actor();
        self.session.grievances.insert(0, grievance.clone());
        self.session.audit.append(
            AuditAction::Notification,
            &actor,
            Some(grievance.id.clone()),
            GrievanceStatus::Submitted.as_str(),
            now,
        );

        tracing::info!(
            grievance_id = %grievance.id,
            reference = %grievance.reference_number,
            category = category.as_str(),
            "grievance submitted"
        );
        Ok(grievance)
    }

    /// Move a submitted grievance under review.
    ///
    /// # Errors
    ///
    /// [`GuardiaError::NotFound`] for an unknown id;
    /// [`GuardiaError::InvalidState`] unless the grievance is `Submitted`.
    pub fn start_progress(&mut self, grievance_id: &str) -> GuardiaResult<Grievance> {
        let index = self.index_of(grievance_id)?;
        let current = self.session.grievances[index].status;
        if current != GrievanceStatus::Submitted {
            return Err(GuardiaError::InvalidState(format!(
                "grievance '{}' is {}; only SUBMITTED grievances can be taken up",
                grievance_id, current
            )));
        }
        Ok(self.transition(index, GrievanceStatus::InProgress, None))
    }

    /// Resolve a grievance with `notes`.
    ///
    /// # Errors
    ///
    /// [`GuardiaError::Validation`] for blank notes,
    /// [`GuardiaError::NotFound`] for an unknown id, and
    /// [`GuardiaError::InvalidState`] when the grievance is already final.
    pub fn resolve(&mut self, grievance_id: &str, notes: &str) -> GuardiaResult<Grievance> {
        self.finish(grievance_id, notes, GrievanceStatus::Resolved)
    }

    /// Close a grievance without resolution.  Same rules as
    /// [`resolve`](Self::resolve).
    pub fn close(&mut self, grievance_id: &str, notes: &str) -> GuardiaResult<Grievance> {
        self.finish(grievance_id, notes, GrievanceStatus::Closed)
    }

    /// Look up a grievance by id.
    pub fn get(&self, grievance_id: &str) -> Option<&Grievance> {
        self.session.grievances.iter().find(|g| g.id == grievance_id)
    }

    /// Grievances that have not reached a final status.
    pub fn open(&self) -> Vec<&Grievance> {
        self.session
            .grievances
            .iter()
            .filter(|g| !g.status.is_final())
            .collect()
    }

    fn finish(
        &mut self,
        grievance_id: &str,
        notes: &str,
        target: GrievanceStatus,
    ) -> GuardiaResult<Grievance> {
        let notes = notes.trim();
        if notes.is_empty() {
            return Err(GuardiaError::Validation(
                "resolution notes must not be empty".into(),
            ));
        }

        let index = self.index_of(grievance_id)?;
        let current = self.session.grievances[index].status;
        if current.is_final() {
            return Err(GuardiaError::InvalidState(format!(
                "grievance '{}' is already {}",
                grievance_id, current
            )));
        }
        Ok(self.transition(index, target, Some(notes.to_owned())))
    }

    fn transition(
        &mut self,
        index: usize,
        status: GrievanceStatus,
        notes: Option<String>,
    ) -> Grievance {
        let now = self.session.now();
        let actor = self.session.actor();
        let grievance = &mut self.session.grievances[index];
        grievance.status = status;
        if notes.is_some() {
            grievance.resolution_notes = notes;
        }
        let updated = grievance.clone();

        self.session.audit.append(
            AuditAction::Notification,
            &actor,
            Some(updated.id.clone()),
            status.as_str(),
            now,
        );
        tracing::info!(grievance_id = %updated.id, status = %status, "grievance status changed");
        updated
    }

    fn index_of(&self, grievance_id: &str) -> GuardiaResult<usize> {
        self.session
            .grievances
            .iter()
            .position(|g| g.id == grievance_id)
            .ok_or_else(|| GuardiaError::NotFound(format!("grievance '{}'", grievance_id)))
    }
}
