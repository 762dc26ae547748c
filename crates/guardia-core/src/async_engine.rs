// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Async engine backed by Tokio.
//!
//! This module is only compiled when the `async` feature flag is enabled:
//!
//! ```toml
//! [dependencies]
//! guardia-core = { version = "0.1", features = ["async"] }
//! ```
//!
//! # Design
//!
//! [`AsyncGuardiaEngine`] wraps a [`GuardiaEngine`] in a
//! [`tokio::sync::RwLock`].  Reads take the shared lock and mutations the
//! exclusive lock, so there is still a single mutator per session.
//!
//! [`draft`](AsyncGuardiaEngine::draft) holds no lock while the generator
//! runs; a slow text generator never blocks readers or writers.
//!
//! # Example
//!
//! ```rust,no_run
//! use guardia_core::{
//!     async_engine::AsyncGuardiaEngine,
//!     config::Config,
//!     storage::InMemoryStorage,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = AsyncGuardiaEngine::new(Config::default(), InMemoryStorage::new());
//!     engine.login("Asha").await.unwrap();
//!     let artifact = engine.grant_consent("fid-2", vec!["p1".into()]).await.unwrap();
//!     assert_eq!(engine.consents().await[0].id, artifact.id);
//! }
//! ```

#![cfg(feature = "async")]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::engine::GuardiaEngine;
use crate::error::GuardiaResult;
use crate::generation::{draft_with_timeout, AsyncTextGenerator, Draft, DraftTask};
use crate::session::SessionSummary;
use crate::storage::{InMemoryStorage, Storage};
use crate::types::{
    AuditFilter, AuditLogEntry, ConsentArtifact, Grievance, GrievanceCategory, Principal,
};

// ---------------------------------------------------------------------------
// AsyncGuardiaEngine
// ---------------------------------------------------------------------------

/// Shareable handle to a [`GuardiaEngine`] guarded by a Tokio `RwLock`.
///
/// Cloning the handle shares the same engine.
pub struct AsyncGuardiaEngine<L: Storage, T: Storage = InMemoryStorage> {
    inner: Arc<RwLock<GuardiaEngine<L, T>>>,
}

impl<L: Storage, T: Storage> Clone for AsyncGuardiaEngine<L, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: Storage> AsyncGuardiaEngine<L, InMemoryStorage> {
    /// Same as [`GuardiaEngine::new`].
    pub fn new(config: Config, local: L) -> Self {
        Self::from_engine(GuardiaEngine::new(config, local))
    }
}

impl<L: Storage, T: Storage> AsyncGuardiaEngine<L, T> {
    /// Wrap an existing engine.
    pub fn from_engine(engine: GuardiaEngine<L, T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    // ------------------------------------------------------------------
    // Mutations (exclusive lock)
    // ------------------------------------------------------------------

    /// See [`GuardiaEngine::login`].
    pub async fn login(&self, name: &str) -> GuardiaResult<Principal> {
        self.inner.write().await.login(name)
    }

    /// See [`GuardiaEngine::logout`].
    pub async fn logout(&self) {
        self.inner.write().await.logout();
    }

    /// See [`GuardiaEngine::grant_consent`].
    pub async fn grant_consent(
        &self,
        fiduciary_id: &str,
        purpose_ids: Vec<String>,
    ) -> GuardiaResult<ConsentArtifact> {
        self.inner.write().await.grant_consent(fiduciary_id, &purpose_ids)
    }

    /// See [`GuardiaEngine::update_consent`].
    pub async fn update_consent(
        &self,
        artifact_id: &str,
        purpose_ids: Vec<String>,
    ) -> GuardiaResult<ConsentArtifact> {
        self.inner.write().await.update_consent(artifact_id, &purpose_ids)
    }

    /// See [`GuardiaEngine::withdraw_consent`].
    pub async fn withdraw_consent(&self, artifact_id: &str) -> GuardiaResult<ConsentArtifact> {
        self.inner.write().await.withdraw_consent(artifact_id)
    }

    /// See [`GuardiaEngine::submit_grievance`].
    pub async fn submit_grievance(
        &self,
        category: GrievanceCategory,
        description: &str,
        fiduciary_id: Option<String>,
    ) -> GuardiaResult<Grievance> {
        self.inner
            .write()
            .await
            .submit_grievance(category, description, fiduciary_id)
    }

    /// See [`GuardiaEngine::resolve_grievance`].
    pub async fn resolve_grievance(&self, grievance_id: &str, notes: &str) -> GuardiaResult<Grievance> {
        self.inner.write().await.resolve_grievance(grievance_id, notes)
    }

    // ------------------------------------------------------------------
    // Reads (shared lock)
    // ------------------------------------------------------------------

    /// Snapshot of the consent store, newest first.
    pub async fn consents(&self) -> Vec<ConsentArtifact> {
        self.inner.read().await.session().consent_store().to_vec()
    }

    /// Snapshot of the grievance store, newest first.
    pub async fn grievances(&self) -> Vec<Grievance> {
        self.inner.read().await.session().grievance_store().to_vec()
    }

    /// Audit entries matching `filter`.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Vec<AuditLogEntry> {
        self.inner.read().await.query_audit(filter)
    }

    /// Dashboard counters.
    pub async fn summary(&self) -> SessionSummary {
        self.inner.read().await.summary()
    }

    // ------------------------------------------------------------------
    // Drafting (no lock held while generating)
    // ------------------------------------------------------------------

    /// Run `task` against `generator` bounded by the configured generation
    /// timeout.
    pub async fn draft<G: AsyncTextGenerator>(&self, generator: &G, task: &DraftTask) -> Draft {
        let timeout = {
            let engine = self.inner.read().await;
            Duration::from_millis(engine.session().config().generation_timeout_ms)
        };
        draft_with_timeout(generator, task, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardiaError;
    use crate::generation::GenerationError;
    use crate::types::AuditAction;

    fn engine() -> AsyncGuardiaEngine<InMemoryStorage> {
        let config = Config {
            seed_demo_data: false,
            generation_timeout_ms: 20,
            ..Config::default()
        };
        AsyncGuardiaEngine::new(config, InMemoryStorage::new())
    }

    struct Stalled;

    impl AsyncTextGenerator for Stalled {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn clones_share_state() {
        let engine = engine();
        let other = engine.clone();
        engine.login("Asha").await.unwrap();
        let artifact = other.grant_consent("fid-2", vec!["p1".into(), "p2".into()]).await.unwrap();

        let audit = engine.query_audit(&AuditFilter::default()).await;
        assert_eq!(audit[0].action, AuditAction::Grant);
        assert_eq!(engine.consents().await[0].id, artifact.id);
    }

    #[tokio::test]
    async fn concurrent_grants_are_serialised() {
        let engine = engine();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.grant_consent("fid-3", vec!["p1".into()]).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(engine.summary().await.live_consents, 8);
        assert_eq!(engine.summary().await.audit_entries, 8);
    }

    #[tokio::test]
    async fn stalled_generator_uses_configured_timeout() {
        let engine = engine();
        let task = DraftTask::DeepAudit { url: "https://example.in".into() };
        let result = engine.draft(&Stalled, &task).await;
        assert!(result.is_fallback());
        assert_eq!(result.text(), task.fallback());
    }

    #[tokio::test]
    async fn rejected_withdraw_propagates() {
        let engine = engine();
        let error = engine.withdraw_consent("ART-MISSING").await.unwrap_err();
        assert!(matches!(error, GuardiaError::NotFound(_)));
    }
}
