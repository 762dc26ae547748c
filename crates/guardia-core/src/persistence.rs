// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Mapping between session stores and the key-value backend.
//!
//! Durable state goes to the *local* storage; the logged-in principal goes
//! to a separate *session* storage so it disappears with the browsing
//! session.
//!
//! | Key                       | Storage | Value                                   |
//! |---------------------------|---------|-----------------------------------------|
//! | `guardia_consents`        | local   | JSON array of artifacts, newest first   |
//! | `guardia_grievances`      | local   | JSON array of grievances, newest first  |
//! | `guardia_audit`           | local   | JSON array of audit entries, newest first |
//! | `guardia_snapshot`        | local   | `{consents, grievances, auditLogs}` (snapshot mode) |
//! | `guardia_onboarding_done` | local   | `"true"` / `"false"`                    |
//! | `guardia_pro`             | local   | `"true"` / `"false"`                    |
//! | `guardia_session`         | session | JSON principal                          |
//!
//! Reads never fail.  An absent or unparsable store falls back on its own to
//! the demonstration data (or to an empty store when seeding is disabled);
//! unparsable values are reported at WARN.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::PersistenceMode;
use crate::error::GuardiaResult;
use crate::seed;
use crate::storage::Storage;
use crate::types::{AuditLogEntry, ConsentArtifact, Grievance, Principal};

pub const CONSENTS_KEY: &str = "guardia_consents";
pub const GRIEVANCES_KEY: &str = "guardia_grievances";
pub const AUDIT_KEY: &str = "guardia_audit";
pub const SNAPSHOT_KEY: &str = "guardia_snapshot";
pub const ONBOARDING_KEY: &str = "guardia_onboarding_done";
pub const PRO_KEY: &str = "guardia_pro";
pub const SESSION_KEY: &str = "guardia_session";

/// The three durable stores, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub consents: Vec<ConsentArtifact>,
    pub grievances: Vec<Grievance>,
    pub audit_logs: Vec<AuditLogEntry>,
}

/// Reads and writes session state through two [`Storage`] backends.
///
/// # Examples
///
/// ```rust
/// use guardia_core::config::PersistenceMode;
/// use guardia_core::persistence::{PersistenceAdapter, CONSENTS_KEY};
/// use guardia_core::storage::{InMemoryStorage, Storage};
///
/// let mut local = InMemoryStorage::new();
/// local.save(CONSENTS_KEY, "not json".into()).unwrap();
///
/// let adapter = PersistenceAdapter::new(local, InMemoryStorage::new(), PersistenceMode::Independent, true);
/// let state = adapter.load_state();
/// assert_eq!(state.consents.len(), 3); // demonstration data
/// ```
#[derive(Debug)]
pub struct PersistenceAdapter<L: Storage, T: Storage> {
    local: L,
    session: T,
    mode: PersistenceMode,
    seed_demo_data: bool,
}

impl<L: Storage, T: Storage> PersistenceAdapter<L, T> {
    /// Wrap `local` (durable) and `session` (session-scoped) storage.
    pub fn new(local: L, session: T, mode: PersistenceMode, seed_demo_data: bool) -> Self {
        Self {
            local,
            session,
            mode,
            seed_demo_data,
        }
    }

    /// Load the three stores.
    ///
    /// In snapshot mode a missing or unparsable snapshot falls back to the
    /// per-store keys, so data written in independent mode is picked up.
    pub fn load_state(&self) -> PersistedState {
        if self.mode == PersistenceMode::Snapshot {
            if let Some(state) = parse_value::<PersistedState>(&self.local, SNAPSHOT_KEY) {
                return state;
            }
        }

        PersistedState {
            consents: self.load_store(CONSENTS_KEY, seed::initial_consents),
            grievances: self.load_store(GRIEVANCES_KEY, seed::initial_grievances),
            audit_logs: self.load_store(AUDIT_KEY, seed::initial_audit_logs),
        }
    }

    /// Write the three stores.
    ///
    /// Independent mode issues three saves; a failure part-way leaves the
    /// earlier keys written.  Snapshot mode issues exactly one save.
    ///
    /// # Errors
    ///
    /// The first serialization or backend error encountered.
    pub fn save_state(
        &mut self,
        consents: &[ConsentArtifact],
        grievances: &[Grievance],
        audit_logs: &[AuditLogEntry],
    ) -> GuardiaResult<()> {
        match self.mode {
            PersistenceMode::Independent => {
                self.local.save(CONSENTS_KEY, serde_json::to_string(consents)?)?;
                self.local.save(GRIEVANCES_KEY, serde_json::to_string(grievances)?)?;
                self.local.save(AUDIT_KEY, serde_json::to_string(audit_logs)?)?;
            }
            PersistenceMode::Snapshot => {
                #[derive(Serialize)]
                #[serde(rename_all = "camelCase")]
                struct SnapshotRef<'a> {
                    consents: &'a [ConsentArtifact],
                    grievances: &'a [Grievance],
                    audit_logs: &'a [AuditLogEntry],
                }
                let blob = serde_json::to_string(&SnapshotRef {
                    consents,
                    grievances,
                    audit_logs,
                })?;
                self.local.save(SNAPSHOT_KEY, blob)?;
            }
        }
        Ok(())
    }

    /// Read a boolean flag.  Anything other than `"true"` reads as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.local.load(key).as_deref() == Some("true")
    }

    /// Write a boolean flag.
    pub fn set_flag(&mut self, key: &str, value: bool) -> GuardiaResult<()> {
        self.local.save(key, value.to_string())
    }

    /// The principal stored in session storage, if any.
    pub fn load_principal(&self) -> Option<Principal> {
        parse_value(&self.session, SESSION_KEY)
    }

    /// Store `principal` in session storage.
    pub fn save_principal(&mut self, principal: &Principal) -> GuardiaResult<()> {
        self.session.save(SESSION_KEY, serde_json::to_string(principal)?)
    }

    /// Remove the principal from session storage.
    pub fn clear_principal(&mut self) -> GuardiaResult<()> {
        self.session.remove(SESSION_KEY)
    }

    /// Durable storage backend.
    pub fn local(&self) -> &L {
        &self.local
    }

    /// Session-scoped storage backend.
    pub fn session_storage(&self) -> &T {
        &self.session
    }

    /// Active persistence mode.
    pub fn mode(&self) -> PersistenceMode {
        self.mode
    }

    /// Consume the adapter and return both backends.
    pub fn into_parts(self) -> (L, T) {
        (self.local, self.session)
    }

    fn load_store<V: DeserializeOwned>(&self, key: &str, seed: fn() -> Vec<V>) -> Vec<V> {
        match parse_value::<Vec<V>>(&self.local, key) {
            Some(values) => values,
            None if self.seed_demo_data => seed(),
            None => Vec::new(),
        }
    }
}

fn parse_value<V: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<V> {
    let raw = storage.load(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(key, %error, "persisted value is unparsable; using fallback");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardiaError;
    use crate::storage::InMemoryStorage;
    use crate::types::UserRole;

    fn adapter(mode: PersistenceMode, seed: bool) -> PersistenceAdapter<InMemoryStorage, InMemoryStorage> {
        PersistenceAdapter::new(InMemoryStorage::new(), InMemoryStorage::new(), mode, seed)
    }

    #[test]
    fn empty_storage_loads_seed_data() {
        let state = adapter(PersistenceMode::Independent, true).load_state();
        assert_eq!(state.consents, seed::initial_consents());
        assert_eq!(state.grievances, seed::initial_grievances());
        assert_eq!(state.audit_logs, seed::initial_audit_logs());
    }

    #[test]
    fn empty_storage_without_seeding_loads_nothing() {
        let state = adapter(PersistenceMode::Independent, false).load_state();
        assert_eq!(state, PersistedState::default());
    }

    #[test]
    fn each_unparsable_store_falls_back_independently() {
        let mut adapter = adapter(PersistenceMode::Independent, true);
        adapter.save_state(&[], &[], &[]).unwrap();
        adapter.local.save(GRIEVANCES_KEY, "{broken".into()).unwrap();

        let state = adapter.load_state();
        assert!(state.consents.is_empty());
        assert_eq!(state.grievances, seed::initial_grievances());
        assert!(state.audit_logs.is_empty());
    }

    #[test]
    fn independent_round_trip_preserves_order() {
        let mut adapter = adapter(PersistenceMode::Independent, false);
        let mut consents = seed::initial_consents();
        consents.reverse();
        adapter
            .save_state(&consents, &seed::initial_grievances(), &seed::initial_audit_logs())
            .unwrap();

        let state = adapter.load_state();
        assert_eq!(state.consents, consents);
        assert!(adapter.local().load(SNAPSHOT_KEY).is_none());
    }

    #[test]
    fn snapshot_mode_writes_single_blob() {
        let mut adapter = adapter(PersistenceMode::Snapshot, false);
        adapter
            .save_state(&seed::initial_consents(), &[], &seed::initial_audit_logs())
            .unwrap();

        assert_eq!(adapter.local().len(), 1);
        let raw = adapter.local().load(SNAPSHOT_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("auditLogs").is_some());

        let state = adapter.load_state();
        assert_eq!(state.consents, seed::initial_consents());
        assert!(state.grievances.is_empty());
    }

    #[test]
    fn snapshot_mode_reads_independent_keys_when_snapshot_missing() {
        let mut local = InMemoryStorage::new();
        local.save(CONSENTS_KEY, "[]".into()).unwrap();
        let adapter = PersistenceAdapter::new(local, InMemoryStorage::new(), PersistenceMode::Snapshot, true);

        let state = adapter.load_state();
        assert!(state.consents.is_empty());
        assert_eq!(state.grievances, seed::initial_grievances());
    }

    #[test]
    fn flags_default_to_false() {
        let mut adapter = adapter(PersistenceMode::Independent, true);
        assert!(!adapter.flag(PRO_KEY));
        adapter.set_flag(PRO_KEY, true).unwrap();
        assert!(adapter.flag(PRO_KEY));
        assert_eq!(adapter.local().load(PRO_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn principal_lives_in_session_storage() {
        let mut adapter = adapter(PersistenceMode::Independent, true);
        let principal = Principal {
            id: "USR-1".into(),
            name: "Meera".into(),
            role: UserRole::DataPrincipal,
            is_pro: true,
        };
        adapter.save_principal(&principal).unwrap();
        assert!(adapter.local().load(SESSION_KEY).is_none());
        assert_eq!(adapter.load_principal(), Some(principal));

        adapter.clear_principal().unwrap();
        assert_eq!(adapter.load_principal(), None);
    }

    #[test]
    fn backend_failure_surfaces_as_storage_error() {
        struct ReadOnly;
        impl Storage for ReadOnly {
            fn load(&self, _key: &str) -> Option<String> {
                None
            }
            fn save(&mut self, key: &str, _value: String) -> GuardiaResult<()> {
                Err(GuardiaError::Storage(format!("{} is read-only", key)))
            }
            fn remove(&mut self, _key: &str) -> GuardiaResult<()> {
                Ok(())
            }
        }

        let mut adapter = PersistenceAdapter::new(ReadOnly, InMemoryStorage::new(), PersistenceMode::Independent, true);
        let error = adapter.save_state(&[], &[], &[]).unwrap_err();
        assert!(matches!(error, GuardiaError::Storage(_)));
    }
}
