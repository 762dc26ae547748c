// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # guardia-core
//!
//! Consent lifecycle, grievance workflow, and audit trail engine for the
//! Guardia privacy hub (Digital Personal Data Protection Act 2023).
//!
//! A data principal grants a fiduciary consent for a set of purposes,
//! updates or withdraws it, and files grievances.  Every accepted action
//! leaves one fingerprinted entry on an append-only audit trail.
//!
//! ## Architecture
//!
//! ```text
//! GuardiaEngine<L: Storage, T: Storage>
//!   ├── SessionContext
//!   │     ├── ConsentManager<'_>     grant / update / withdraw / expiry
//!   │     ├── GrievanceWorkflow<'_>  submit / progress / resolve / close
//!   │     └── AuditTrail             append / query
//!   └── PersistenceAdapter<L, T>     load with seed fallback, save after each change
//!
//! generation  drafting tasks with fixed fallbacks
//! analysis    score parsing and certificates
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use guardia_core::{
//!     config::Config,
//!     engine::GuardiaEngine,
//!     storage::InMemoryStorage,
//!     types::{ConsentStatus, GrievanceCategory},
//! };
//!
//! let mut engine = GuardiaEngine::new(Config::default(), InMemoryStorage::new());
//! engine.login("Asha").unwrap();
//!
//! // Grant, then withdraw.
//! let artifact = engine.grant_consent("fid-2", &["p1", "p2"]).unwrap();
//! let withdrawn = engine.withdraw_consent(&artifact.id).unwrap();
//! assert_eq!(withdrawn.status, ConsentStatus::Withdrawn);
//!
//! // A second withdraw is rejected and leaves no trace.
//! let before = engine.session().audit().len();
//! assert!(engine.withdraw_consent(&artifact.id).is_err());
//! assert_eq!(engine.session().audit().len(), before);
//!
//! // File a grievance.
//! let grievance = engine
//!     .submit_grievance(
//!         GrievanceCategory::ConsentViolation,
//!         "Offers keep arriving after I withdrew consent.",
//!         Some("fid-2".into()),
//!     )
//!     .unwrap();
//! assert!(grievance.reference_number.starts_with("REF-DPDP-"));
//! ```

pub mod analysis;
pub mod async_engine;
pub mod audit;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod config_loader;
pub mod consent;
pub mod engine;
pub mod error;
pub mod generation;
pub mod grievance;
pub mod integrity;
pub mod persistence;
pub mod seed;
pub mod session;
pub mod storage;
pub mod types;

// Re-export the most commonly used items at the crate root so consumers can
// write `use guardia_core::GuardiaEngine;` instead of the fully qualified
// path.
pub use config::Config;
pub use engine::GuardiaEngine;
pub use error::{GuardiaError, GuardiaResult};
pub use storage::{InMemoryStorage, Storage};
pub use types::{
    AuditAction, AuditLogEntry, ConsentArtifact, ConsentStatus, Grievance, GrievanceCategory,
    GrievanceStatus, Principal, UserRole,
};

#[cfg(feature = "async")]
pub use async_engine::AsyncGuardiaEngine;
