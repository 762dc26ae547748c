// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Audit trail management.
//!
//! [`AuditTrail`] exposes two operations only:
//!
//! * [`append`](AuditTrail::append): record an accepted mutation
//! * [`query`](AuditTrail::query)  : search / filter the trail
//!
//! Entries are kept newest first.  Insertion order is the only ordering
//! guarantee: there is no sequence number and timestamps are not required
//! to be monotonic.  Nothing in this module modifies or removes an entry
//! once appended.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::integrity::{fingerprint, new_id};
use crate::types::{Actor, AuditAction, AuditFilter, AuditLogEntry};

/// Append-only, newest-first record of accepted actions.
///
/// # Examples
///
/// ```rust
/// use chrono::Utc;
/// use guardia_core::audit::AuditTrail;
/// use guardia_core::types::{Actor, AuditAction, AuditFilter, UserRole};
///
/// let mut trail = AuditTrail::new("106.21.XX.XX");
/// let actor = Actor { user_id: "user-1".into(), role: UserRole::DataPrincipal };
///
/// trail.append(AuditAction::Grant, &actor, Some("p1".into()), "ACTIVE", Utc::now());
/// trail.append(AuditAction::Withdraw, &actor, Some("ART-1".into()), "WITHDRAWN", Utc::now());
///
/// assert_eq!(trail.len(), 2);
/// assert_eq!(trail.latest().unwrap().action, AuditAction::Withdraw);
///
/// let grants = trail.query(&AuditFilter {
///     action: Some(AuditAction::Grant),
///     ..AuditFilter::default()
/// });
/// assert_eq!(grants.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    entries: VecDeque<AuditLogEntry>,
    source_address: String,
}

impl AuditTrail {
    /// Create an empty trail stamping entries with `source_address`.
    pub fn new(source_address: impl Into<String>) -> Self {
        Self {
            entries: VecDeque::new(),
            source_address: source_address.into(),
        }
    }

    /// Rebuild a trail from persisted entries (newest first).
    pub fn from_entries(entries: Vec<AuditLogEntry>, source_address: impl Into<String>) -> Self {
        Self {
            entries: entries.into(),
            source_address: source_address.into(),
        }
    }

    /// Append an entry for an accepted mutation and return it.
    ///
    /// The actor's role is copied into the entry, so later role switches do
    /// not affect it.  The fingerprint covers every other field.
    pub fn append(
        &mut self,
        action: AuditAction,
        actor: &Actor,
        target: Option<String>,
        status: impl Into<String>,
        at: DateTime<Utc>,
    ) -> &AuditLogEntry {
        let id = new_id("LOG");
        let status = status.into();
        let timestamp = at.to_rfc3339();
        let hash = fingerprint(&[
            &id,
            &actor.user_id,
            action.as_str(),
            target.as_deref().unwrap_or(""),
            &timestamp,
            &status,
            actor.role.as_str(),
            &self.source_address,
        ]);

        tracing::debug!(
            entry_id = %id,
            action = %action,
            user_id = %actor.user_id,
            status = %status,
            "audit entry appended"
        );

        self.entries.push_front(AuditLogEntry {
            id,
            user_id: actor.user_id.clone(),
            action,
            purpose_id: target,
            timestamp: at,
            status,
            initiator: actor.role,
            source_ip: self.source_address.clone(),
            hash,
        });
        &self.entries[0]
    }

    /// The most recently appended entry.
    pub fn latest(&self) -> Option<&AuditLogEntry> {
        self.entries.front()
    }

    /// Iterate entries newest first.
    pub fn entries(&self) -> impl Iterator<Item = &AuditLogEntry> {
        self.entries.iter()
    }

    /// Copy of all entries, newest first, ready for persistence.
    pub fn to_vec(&self) -> Vec<AuditLogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return entries satisfying `filter`, newest first.
    pub fn query(&self, filter: &AuditFilter) -> Vec<AuditLogEntry> {
        self.entries
            .iter()
            .filter(|entry| {
                if let Some(ref user_id) = filter.user_id {
                    if &entry.user_id != user_id {
                        return false;
                    }
                }
                if let Some(action) = filter.action {
                    if entry.action != action {
                        return false;
                    }
                }
                if let Some(since) = filter.since {
                    if entry.timestamp < since {
                        return false;
                    }
                }
                if let Some(until) = filter.until {
                    if entry.timestamp > until {
                        return false;
                    }
                }
                true
            })
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}
