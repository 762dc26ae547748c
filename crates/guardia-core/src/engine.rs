// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Guardia engine: the top-level composition of session state and
//! persistence.
//!
//! [`GuardiaEngine`] owns one [`SessionContext`] and one
//! [`PersistenceAdapter`].  Every mutating call follows the same sequence:
//!
//! 1. **Attribute**: the acting identity is the logged-in principal, or the
//!    configured anonymous actor.
//! 2. **Apply**: the lifecycle manager validates, mutates, and appends the
//!    audit entry.  A rejected call changes nothing.
//! 3. **Persist**: on success all three stores are written.  A write failure
//!    is logged at WARN and the in-memory session carries on.
//!
//! Rejected calls are logged at WARN and returned to the caller unchanged.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::consent::evaluate_expiry;
use crate::error::{GuardiaError, GuardiaResult};
use crate::integrity::new_id;
use crate::persistence::{PersistenceAdapter, ONBOARDING_KEY, PRO_KEY};
use crate::session::{SessionContext, SessionSummary};
use crate::storage::{InMemoryStorage, Storage};
use crate::types::{
    AuditFilter, AuditLogEntry, ConsentArtifact, ConsentStatus, Grievance, GrievanceCategory,
    Principal, UserRole,
};

/// Consent, grievance, and audit engine for one user session.
///
/// Generic over the durable storage `L` and the session-scoped storage `T`.
///
/// # Examples
///
/// ```rust
/// use guardia_core::{
///     config::Config,
///     engine::GuardiaEngine,
///     storage::InMemoryStorage,
///     types::{AuditAction, ConsentStatus},
/// };
///
/// let mut engine = GuardiaEngine::new(Config::default(), InMemoryStorage::new());
/// engine.login("Asha").unwrap();
///
/// let artifact = engine.grant_consent("fid-2", &["p1", "p2"]).unwrap();
/// assert_eq!(artifact.status, ConsentStatus::Active);
///
/// let latest = engine.session().audit().latest().unwrap();
/// assert_eq!(latest.action, AuditAction::Grant);
/// assert_eq!(latest.purpose_id.as_deref(), Some("p1"));
/// ```
pub struct GuardiaEngine<L: Storage, T: Storage = InMemoryStorage> {
    session: SessionContext,
    persistence: PersistenceAdapter<L, T>,
}

impl<L: Storage> GuardiaEngine<L, InMemoryStorage> {
    /// Open an engine over `local` with the built-in catalog, the wall
    /// clock, and a fresh in-memory session storage.
    pub fn new(config: Config, local: L) -> Self {
        Self::open(
            config,
            Catalog::builtin(),
            Arc::new(SystemClock),
            local,
            InMemoryStorage::new(),
        )
    }
}

impl<L: Storage, T: Storage> GuardiaEngine<L, T> {
    /// Open an engine, loading persisted state from `local` and the
    /// logged-in principal from `session_storage`.
    pub fn open(
        config: Config,
        catalog: Catalog,
        clock: Arc<dyn Clock>,
        local: L,
        session_storage: T,
    ) -> Self {
        let persistence = PersistenceAdapter::new(
            local,
            session_storage,
            config.persistence_mode,
            config.seed_demo_data,
        );
        let state = persistence.load_state();

        let mode = config.persistence_mode;
        let mut session = SessionContext::with_clock(config, catalog, clock);
        session.restore(state.consents, state.grievances, state.audit_logs);
        session.set_principal(persistence.load_principal());

        tracing::info!(
            mode = %mode,
            consents = session.consent_store().len(),
            grievances = session.grievance_store().len(),
            audit_entries = session.audit().len(),
            "engine opened"
        );
        Self { session, persistence }
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Log in as a data principal named `name`.
    ///
    /// The pro-tier flag is read from storage into the principal, and the
    /// principal is written to session storage.
    ///
    /// # Errors
    ///
    /// [`GuardiaError::Validation`] for a blank name.
    pub fn login(&mut self, name: &str) -> GuardiaResult<Principal> {
        let name = name.trim();
        if name.is_empty() {
            let error = GuardiaError::Validation("a name is required to log in".into());
            tracing::warn!(error = %error, "login rejected");
            return Err(error);
        }

        let principal = Principal {
            id: new_id("USR"),
            name: name.to_owned(),
            role: UserRole::DataPrincipal,
            is_pro: self.persistence.flag(PRO_KEY),
        };
        self.session.set_principal(Some(principal.clone()));
        self.persist_principal();

        tracing::info!(principal_id = %principal.id, is_pro = principal.is_pro, "principal logged in");
        Ok(principal)
    }

    /// Clear the logged-in principal.
    pub fn logout(&mut self) {
        self.session.set_principal(None);
        if let Err(error) = self.persistence.clear_principal() {
            tracing::warn!(%error, "failed to clear session principal");
        }
        tracing::info!("principal logged out");
    }

    /// Change the acting role.  Later audit entries record the new role;
    /// earlier ones keep theirs.
    ///
    /// # Errors
    ///
    /// [`GuardiaError::InvalidState`] when nobody is logged in.
    pub fn switch_role(&mut self, role: UserRole) -> GuardiaResult<()> {
        if self.session.principal().is_none() {
            return Err(GuardiaError::InvalidState("no principal is logged in".into()));
        }
        self.session.switch_role(role);
        self.persist_principal();
        tracing::info!(role = %role, "role switched");
        Ok(())
    }

    /// Mark onboarding as completed.
    pub fn complete_onboarding(&mut self) {
        if let Err(error) = self.persistence.set_flag(ONBOARDING_KEY, true) {
            tracing::warn!(%error, "failed to persist onboarding flag");
        }
    }

    /// Whether onboarding has been completed.
    pub fn has_completed_onboarding(&self) -> bool {
        self.persistence.flag(ONBOARDING_KEY)
    }

    /// Upgrade to the pro tier.  Sets the stored flag and the logged-in
    /// principal's `is_pro`.
    pub fn upgrade_to_pro(&mut self) {
        if let Err(error) = self.persistence.set_flag(PRO_KEY, true) {
            tracing::warn!(%error, "failed to persist pro flag");
        }
        if let Some(mut principal) = self.session.principal().cloned() {
            principal.is_pro = true;
            self.session.set_principal(Some(principal));
            self.persist_principal();
        }
        tracing::info!("upgraded to pro tier");
    }

    /// Whether the pro tier is active on this device.
    pub fn is_pro(&self) -> bool {
        self.persistence.flag(PRO_KEY)
    }

    // ------------------------------------------------------------------
    // Consents
    // ------------------------------------------------------------------

    /// Grant consent to `fiduciary_id` for `purpose_ids` on behalf of the
    /// acting principal.  See [`ConsentManager::grant`](crate::consent::ConsentManager::grant).
    pub fn grant_consent<S: AsRef<str>>(
        &mut self,
        fiduciary_id: &str,
        purpose_ids: &[S],
    ) -> GuardiaResult<ConsentArtifact> {
        let principal_id = self.session.actor().user_id;
        let result = self.session.consents().grant(&principal_id, fiduciary_id, purpose_ids);
        self.commit("grant_consent", result)
    }

    /// Grant consent on behalf of a minor.  See
    /// [`ConsentManager::grant_for_minor`](crate::consent::ConsentManager::grant_for_minor).
    pub fn grant_consent_for_minor<S: AsRef<str>>(
        &mut self,
        fiduciary_id: &str,
        purpose_ids: &[S],
        guardian_email: &str,
    ) -> GuardiaResult<ConsentArtifact> {
        let principal_id = self.session.actor().user_id;
        let result = self.session.consents().grant_for_minor(
            &principal_id,
            fiduciary_id,
            purpose_ids,
            guardian_email,
        );
        self.commit("grant_consent_for_minor", result)
    }

    /// Replace an artifact's purposes.
    pub fn update_consent<S: AsRef<str>>(
        &mut self,
        artifact_id: &str,
        purpose_ids: &[S],
    ) -> GuardiaResult<ConsentArtifact> {
        let result = self.session.consents().update(artifact_id, purpose_ids);
        self.commit("update_consent", result)
    }

    /// Withdraw an artifact.
    pub fn withdraw_consent(&mut self, artifact_id: &str) -> GuardiaResult<ConsentArtifact> {
        let result = self.session.consents().withdraw(artifact_id);
        self.commit("withdraw_consent", result)
    }

    // ------------------------------------------------------------------
    // Grievances
    // ------------------------------------------------------------------

    /// File a grievance on behalf of the acting principal.
    pub fn submit_grievance(
        &mut self,
        category: GrievanceCategory,
        description: &str,
        fiduciary_id: Option<String>,
    ) -> GuardiaResult<Grievance> {
        let principal_id = self.session.actor().user_id;
        let result = self
            .session
            .grievances()
            .submit(&principal_id, category, description, fiduciary_id);
        self.commit("submit_grievance", result)
    }

    /// Take up a submitted grievance.
    pub fn start_grievance(&mut self, grievance_id: &str) -> GuardiaResult<Grievance> {
        let result = self.session.grievances().start_progress(grievance_id);
        self.commit("start_grievance", result)
    }

    /// Resolve a grievance with notes.
    pub fn resolve_grievance(&mut self, grievance_id: &str, notes: &str) -> GuardiaResult<Grievance> {
        let result = self.session.grievances().resolve(grievance_id, notes);
        self.commit("resolve_grievance", result)
    }

    /// Close a grievance with notes.
    pub fn close_grievance(&mut self, grievance_id: &str, notes: &str) -> GuardiaResult<Grievance> {
        let result = self.session.grievances().close(grievance_id, notes);
        self.commit("close_grievance", result)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// The session state.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Effective status of an artifact at the current instant.  A stored
    /// `Active` artifact past its expiry date reads as `Expired`.
    ///
    /// # Errors
    ///
    /// [`GuardiaError::NotFound`] for an unknown artifact.
    pub fn consent_status(&self, artifact_id: &str) -> GuardiaResult<ConsentStatus> {
        let now = self.session.now();
        self.session
            .consent_store()
            .iter()
            .find(|a| a.id == artifact_id)
            .map(|artifact| evaluate_expiry(artifact, now))
            .ok_or_else(|| GuardiaError::NotFound(format!("consent artifact '{}'", artifact_id)))
    }

    /// Dashboard counters.
    pub fn summary(&self) -> SessionSummary {
        self.session.summary()
    }

    /// Audit entries matching `filter`, newest first.
    pub fn query_audit(&self, filter: &AuditFilter) -> Vec<AuditLogEntry> {
        self.session.audit().query(filter)
    }

    /// The persistence adapter.
    pub fn persistence(&self) -> &PersistenceAdapter<L, T> {
        &self.persistence
    }

    /// Consume the engine and return both storage backends.
    pub fn into_storage(self) -> (L, T) {
        self.persistence.into_parts()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn commit<R>(&mut self, operation: &'static str, result: GuardiaResult<R>) -> GuardiaResult<R> {
        match &result {
            Ok(_) => self.persist(),
            Err(error) => tracing::warn!(operation, error = %error, "operation rejected"),
        }
        result
    }

    fn persist(&mut self) {
        let saved = self.persistence.save_state(
            self.session.consent_store(),
            self.session.grievance_store(),
            &self.session.audit().to_vec(),
        );
        if let Err(error) = saved {
            tracing::warn!(%error, mode = %self.persistence.mode(), "failed to persist session state");
        }
    }

    fn persist_principal(&mut self) {
        if let Some(principal) = self.session.principal() {
            if let Err(error) = self.persistence.save_principal(principal) {
                tracing::warn!(%error, "failed to persist session principal");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::PersistenceMode;
    use crate::persistence::{CONSENTS_KEY, SESSION_KEY};
    use crate::types::{AuditAction, ConsentStatus, GrievanceStatus};

    fn fresh_config() -> Config {
        Config {
            seed_demo_data: false,
            ..Config::default()
        }
    }

    fn engine() -> GuardiaEngine<InMemoryStorage> {
        GuardiaEngine::new(fresh_config(), InMemoryStorage::new())
    }

    #[test]
    fn grant_and_withdraw_scenario() {
        let mut engine = engine();
        engine.login("Asha").unwrap();

        let artifact = engine.grant_consent("fid-2", &["p1", "p2"]).unwrap();
        assert_eq!(artifact.status, ConsentStatus::Active);
        let latest = engine.session().audit().latest().unwrap();
        assert_eq!(latest.action, AuditAction::Grant);
        assert_eq!(latest.purpose_id.as_deref(), Some("p1"));

        let withdrawn = engine.withdraw_consent(&artifact.id).unwrap();
        assert_eq!(withdrawn.status, ConsentStatus::Withdrawn);
        assert_eq!(engine.session().audit().latest().unwrap().action, AuditAction::Withdraw);
        assert_eq!(engine.summary().live_consents, 0);
    }

    #[test]
    fn state_survives_reopen() {
        let mut engine = engine();
        engine.login("Asha").unwrap();
        let artifact = engine.grant_consent("fid-1", &["p1", "p3"]).unwrap();
        engine
            .submit_grievance(
                GrievanceCategory::ProcessingError,
                "My KYC record lists the wrong date of birth.",
                Some("fid-1".into()),
            )
            .unwrap();
        let before = engine.session().audit().to_vec();

        let (local, session_storage) = engine.into_storage();
        let reopened = GuardiaEngine::open(
            fresh_config(),
            Catalog::builtin(),
            Arc::new(SystemClock),
            local,
            session_storage,
        );
        assert_eq!(reopened.session().consent_store()[0], artifact);
        assert_eq!(reopened.session().grievance_store().len(), 1);
        assert_eq!(reopened.session().audit().to_vec(), before);
        assert_eq!(reopened.session().principal().unwrap().name, "Asha");
    }

    #[test]
    fn rejected_operation_writes_nothing() {
        let mut engine = engine();
        let error = engine
            .submit_grievance(GrievanceCategory::DataBreach, "short", None)
            .unwrap_err();
        assert!(matches!(error, GuardiaError::Validation(_)));
        assert!(engine.session().grievance_store().is_empty());
        assert!(engine.session().audit().is_empty());
        assert!(engine.persistence().local().is_empty());
    }

    #[test]
    fn anonymous_actions_use_configured_actor() {
        let mut engine = engine();
        let artifact = engine.grant_consent("fid-3", &["p1"]).unwrap();
        assert_eq!(artifact.user_id, "anon");
        assert_eq!(engine.session().audit().latest().unwrap().user_id, "anon");
    }

    #[test]
    fn blank_login_is_rejected() {
        let mut engine = engine();
        assert!(matches!(engine.login("   "), Err(GuardiaError::Validation(_))));
        assert!(engine.session().principal().is_none());
    }

    #[test]
    fn login_reads_pro_flag_and_logout_clears_session() {
        let mut engine = engine();
        engine.upgrade_to_pro();
        let principal = engine.login("Kiran").unwrap();
        assert!(principal.is_pro);
        assert!(engine.persistence().session_storage().load(SESSION_KEY).is_some());

        engine.logout();
        assert!(engine.session().principal().is_none());
        assert!(engine.persistence().session_storage().load(SESSION_KEY).is_none());
    }

    #[test]
    fn upgrade_marks_logged_in_principal() {
        let mut engine = engine();
        engine.login("Kiran").unwrap();
        assert!(!engine.is_pro());
        engine.upgrade_to_pro();
        assert!(engine.is_pro());
        assert!(engine.session().principal().unwrap().is_pro);
    }

    #[test]
    fn onboarding_flag_persists() {
        let mut engine = engine();
        assert!(!engine.has_completed_onboarding());
        engine.complete_onboarding();
        assert!(engine.has_completed_onboarding());
    }

    #[test]
    fn switch_role_requires_login_and_attributes_later_entries() {
        let mut engine = engine();
        assert!(matches!(
            engine.switch_role(UserRole::Dpo),
            Err(GuardiaError::InvalidState(_))
        ));

        engine.login("Asha").unwrap();
        let grievance = engine
            .submit_grievance(
                GrievanceCategory::RightsInquiry,
                "Which partners receive my delivery address?",
                None,
            )
            .unwrap();
        engine.switch_role(UserRole::Dpo).unwrap();
        engine.start_grievance(&grievance.id).unwrap();
        let resolved = engine.resolve_grievance(&grievance.id, "Partner list shared.").unwrap();
        assert_eq!(resolved.status, GrievanceStatus::Resolved);

        let roles: Vec<UserRole> = engine.session().audit().entries().map(|e| e.initiator).collect();
        assert_eq!(roles, [UserRole::Dpo, UserRole::Dpo, UserRole::DataPrincipal]);
    }

    #[test]
    fn storage_failure_does_not_abort_session() {
        struct Failing;
        impl Storage for Failing {
            fn load(&self, _key: &str) -> Option<String> {
                None
            }
            fn save(&mut self, _key: &str, _value: String) -> GuardiaResult<()> {
                Err(GuardiaError::Storage("quota exceeded".into()))
            }
            fn remove(&mut self, _key: &str) -> GuardiaResult<()> {
                Ok(())
            }
        }

        let mut engine = GuardiaEngine::new(fresh_config(), Failing);
        let artifact = engine.grant_consent("fid-2", &["p1"]).unwrap();
        assert_eq!(engine.session().consent_store()[0], artifact);
        engine.complete_onboarding();
        assert!(!engine.has_completed_onboarding());
    }

    #[test]
    fn unparsable_store_falls_back_to_seed_on_open() {
        let mut local = InMemoryStorage::new();
        local.save(CONSENTS_KEY, "{{{".into()).unwrap();
        let engine = GuardiaEngine::new(Config::default(), local);
        assert_eq!(engine.session().consent_store(), crate::seed::initial_consents().as_slice());
        assert_eq!(engine.session().audit().len(), crate::seed::initial_audit_logs().len());
    }

    #[test]
    fn snapshot_mode_round_trips() {
        let config = Config {
            persistence_mode: PersistenceMode::Snapshot,
            ..fresh_config()
        };
        let mut engine = GuardiaEngine::new(config.clone(), InMemoryStorage::new());
        engine.grant_consent("fid-2", &["p1"]).unwrap();
        let (local, _) = engine.into_storage();
        assert_eq!(local.len(), 1);

        let reopened = GuardiaEngine::new(config, local);
        assert_eq!(reopened.session().consent_store().len(), 1);
    }

    #[test]
    fn expired_artifact_cannot_be_withdrawn() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let mut engine = GuardiaEngine::open(
            fresh_config(),
            Catalog::builtin(),
            clock.clone(),
            InMemoryStorage::new(),
            InMemoryStorage::new(),
        );
        let artifact = engine.grant_consent("fid-1", &["p1"]).unwrap();
        assert_eq!(engine.consent_status(&artifact.id), Ok(ConsentStatus::Active));
        clock.advance(Duration::days(400));
        assert_eq!(engine.consent_status(&artifact.id), Ok(ConsentStatus::Expired));
        assert_eq!(engine.session().consent_store()[0].status, ConsentStatus::Active);
        assert!(matches!(engine.consent_status("ART-NONE"), Err(GuardiaError::NotFound(_))));

        assert!(matches!(
            engine.withdraw_consent(&artifact.id),
            Err(GuardiaError::InvalidState(_))
        ));
        assert_eq!(engine.summary().live_consents, 0);
    }
}
