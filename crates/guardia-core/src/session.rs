// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! The session context.
//!
//! [`SessionContext`] owns the three stores (consents, grievances, audit
//! trail) together with the catalog, configuration, clock, and the acting
//! principal.  Lifecycle managers borrow it mutably for the duration of one
//! operation:
//!
//! ```text
//! SessionContext
//!   ├── consents()   → ConsentManager<'_>    grant / update / withdraw
//!   └── grievances() → GrievanceWorkflow<'_> submit / progress / resolve / close
//! ```
//!
//! Both managers append to the same [`AuditTrail`], so audit order equals
//! acceptance order across stores.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::audit::AuditTrail;
use crate::catalog::Catalog;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::consent::{evaluate_expiry, ConsentManager};
use crate::grievance::GrievanceWorkflow;
use crate::types::{
    Actor, AuditLogEntry, ConsentArtifact, ConsentStatus, Grievance, Principal, UserRole,
};

/// Counters shown on the principal's dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Artifacts whose effective status is `Active`.
    pub live_consents: usize,
    /// Number of audit entries.
    pub audit_entries: usize,
    /// Number of grievances.
    pub grievances: usize,
}

/// Exclusively-owned state of one user session.
pub struct SessionContext {
    pub(crate) config: Config,
    pub(crate) catalog: Catalog,
    pub(crate) consents: Vec<ConsentArtifact>,
    pub(crate) grievances: Vec<Grievance>,
    pub(crate) audit: AuditTrail,
    pub(crate) principal: Option<Principal>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl SessionContext {
    /// Create an empty session with the wall clock.
    pub fn new(config: Config, catalog: Catalog) -> Self {
        Self::with_clock(config, catalog, Arc::new(SystemClock))
    }

    /// Create an empty session reading time from `clock`.
    pub fn with_clock(config: Config, catalog: Catalog, clock: Arc<dyn Clock>) -> Self {
        let audit = AuditTrail::new(config.source_address.clone());
        Self {
            config,
            catalog,
            consents: Vec::new(),
            grievances: Vec::new(),
            audit,
            principal: None,
            clock,
        }
    }

    /// Replace the three stores, e.g. with persisted state.
    pub fn restore(
        &mut self,
        consents: Vec<ConsentArtifact>,
        grievances: Vec<Grievance>,
        audit_logs: Vec<AuditLogEntry>,
    ) {
        self.consents = consents;
        self.grievances = grievances;
        self.audit = AuditTrail::from_entries(audit_logs, self.config.source_address.clone());
    }

    /// Borrow the consent lifecycle manager.
    pub fn consents(&mut self) -> ConsentManager<'_> {
        ConsentManager::new(self)
    }

    /// Borrow the grievance workflow.
    pub fn grievances(&mut self) -> GrievanceWorkflow<'_> {
        GrievanceWorkflow::new(self)
    }

    /// Consent artifacts, newest first.
    pub fn consent_store(&self) -> &[ConsentArtifact] {
        &self.consents
    }

    /// Grievances, newest first.
    pub fn grievance_store(&self) -> &[Grievance] {
        &self.grievances
    }

    /// The audit trail.
    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    /// The catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current instant according to the session clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The logged-in principal, if any.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Set or clear the logged-in principal.
    pub fn set_principal(&mut self, principal: Option<Principal>) {
        self.principal = principal;
    }

    /// Switch the role of the logged-in principal.  No-op when logged out.
    pub fn switch_role(&mut self, role: UserRole) {
        if let Some(principal) = self.principal.as_mut() {
            principal.role = role;
        }
    }

    /// Identity to record on the next audit entry.
    pub fn actor(&self) -> Actor {
        match &self.principal {
            Some(principal) => Actor {
                user_id: principal.id.clone(),
                role: principal.role,
            },
            None => Actor {
                user_id: self.config.anonymous_actor_id.clone(),
                role: UserRole::DataPrincipal,
            },
        }
    }

    /// Dashboard counters at the current instant.
    pub fn summary(&self) -> SessionSummary {
        let now = self.now();
        SessionSummary {
            live_consents: self
                .consents
                .iter()
                .filter(|a| evaluate_expiry(a, now) == ConsentStatus::Active)
                .count(),
            audit_entries: self.audit.len(),
            grievances: self.grievances.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_actor_uses_configured_id() {
        let session = SessionContext::new(Config::default(), Catalog::builtin());
        let actor = session.actor();
        assert_eq!(actor.user_id, "anon");
        assert_eq!(actor.role, UserRole::DataPrincipal);
    }

    #[test]
    fn role_switch_changes_actor_role() {
        let mut session = SessionContext::new(Config::default(), Catalog::builtin());
        session.set_principal(Some(Principal {
            id: "u-1".into(),
            name: "Asha".into(),
            role: UserRole::DataPrincipal,
            is_pro: false,
        }));
        session.switch_role(UserRole::Auditor);
        assert_eq!(session.actor().role, UserRole::Auditor);
    }
}
