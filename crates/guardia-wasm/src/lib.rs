// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # guardia-wasm
//!
//! WebAssembly bindings for the Guardia consent engine.
//!
//! This crate exposes the `guardia-core` API to JavaScript and TypeScript
//! consumers running in the browser via `wasm-bindgen`.
//!
//! ## Architecture
//!
//! Each engine is a [`GuardiaEngine`] over two [`InMemoryStorage`]s that
//! mirror the browser's `localStorage` and `sessionStorage`.  JavaScript
//! hydrates them on start-up and writes [`storage_entries`] /
//! [`session_entries`] back after each call.  Engine instances are stored in
//! a thread-local registry keyed by integer handles.
//!
//! ## Exported Functions
//!
//! | Function                    | Description                                         |
//! |-----------------------------|-----------------------------------------------------|
//! | `create_engine`             | Create an engine with default config                |
//! | `create_engine_with_config` | Create an engine with explicit JSON config          |
//! | `hydrate`                   | Create an engine from persisted browser storage     |
//! | `storage_entries`           | Local-storage key/value pairs to write back         |
//! | `session_entries`           | Session-storage key/value pairs to write back       |
//! | `login` / `logout`          | Start or end the principal's session                |
//! | `switch_role`               | Change the acting role recorded on audit entries    |
//! | `complete_onboarding`       | Set the persisted onboarding flag                   |
//! | `has_completed_onboarding`  | Read the onboarding flag                            |
//! | `upgrade_to_pro` / `is_pro` | Set or read the persisted pro-tier flag             |
//! | `grant_consent`             | Grant consent for a JSON array of purpose ids       |
//! | `grant_consent_for_minor`   | Grant consent after guardian verification           |
//! | `update_consent`            | Replace an artifact's purposes                      |
//! | `withdraw_consent`          | Withdraw an artifact                                |
//! | `consent_status`            | Effective status of an artifact, expiry applied     |
//! | `submit_grievance`          | File a grievance                                    |
//! | `start_grievance`           | Move a submitted grievance to `IN_PROGRESS`         |
//! | `resolve_grievance`         | Resolve a grievance with notes                      |
//! | `close_grievance`           | Close a grievance with notes                        |
//! | `get_consents`              | Consent store as a JSON array                       |
//! | `get_grievances`            | Grievance store as a JSON array                     |
//! | `get_audit_trail`           | Full audit trail as a JSON array                    |
//! | `query_audit`               | Audit trail filtered by a JSON filter               |
//! | `get_catalog`               | Fiduciaries and purposes as a JS object             |
//! | `destroy_engine`            | Release an engine handle and free its memory        |
//!
//! Mutating functions return the affected record as JSON (`{"ok":true}`
//! when there is no record), or `{"error":"..."}` when the call is rejected
//! or the handle is unknown.
//!
//! ## JavaScript Usage
//!
//! ```js
//! import init, {
//!   hydrate, login, grant_consent, withdraw_consent, storage_entries,
//! } from '@guardia/wasm';
//!
//! await init();
//!
//! const local = Object.fromEntries(Object.entries(localStorage));
//! const handle = hydrate('{}', JSON.stringify(local), '{}');
//!
//! login(handle, 'Asha');
//! const artifact = JSON.parse(grant_consent(handle, 'fid-2', '["p1","p2"]'));
//! withdraw_consent(handle, artifact.id);
//!
//! for (const [key, value] of Object.entries(JSON.parse(storage_entries(handle)))) {
//!   localStorage.setItem(key, value);
//! }
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use guardia_core::{
    catalog::Catalog,
    clock::SystemClock,
    config::Config,
    engine::GuardiaEngine,
    error::GuardiaResult,
    storage::InMemoryStorage,
    types::{AuditFilter, GrievanceCategory, UserRole},
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

type BrowserEngine = GuardiaEngine<InMemoryStorage, InMemoryStorage>;

// ---------------------------------------------------------------------------
// Engine registry
// ---------------------------------------------------------------------------

// WASM is single-threaded; RefCell<HashMap<...>> is safe here.
thread_local! {
    static ENGINES: RefCell<HashMap<u32, BrowserEngine>> = RefCell::new(HashMap::new());
    static NEXT_HANDLE: RefCell<u32> = const { RefCell::new(0) };
}

/// Allocate a new engine handle. Handles wrap around at `u32::MAX - 1` to
/// reserve `u32::MAX` as the error sentinel.
fn next_handle() -> u32 {
    NEXT_HANDLE.with(|counter| {
        let handle = *counter.borrow();
        let next = if handle >= u32::MAX - 1 { 0 } else { handle + 1 };
        *counter.borrow_mut() = next;
        handle
    })
}

fn register(engine: BrowserEngine) -> u32 {
    let handle = next_handle();
    ENGINES.with(|engines| {
        engines.borrow_mut().insert(handle, engine);
    });
    handle
}

/// Helper: run a closure with mutable access to an engine. Returns
/// `Err(message)` if the handle is unknown.
fn with_engine_mut<F, R>(handle: u32, callback: F) -> Result<R, String>
where
    F: FnOnce(&mut BrowserEngine) -> R,
{
    ENGINES.with(|engines| {
        let mut map = engines.borrow_mut();
        match map.get_mut(&handle) {
            Some(engine) => Ok(callback(engine)),
            None => Err(format!("unknown engine handle {}", handle)),
        }
    })
}

/// Helper: run a closure with shared access to an engine.
fn with_engine<F, R>(handle: u32, callback: F) -> Result<R, String>
where
    F: FnOnce(&BrowserEngine) -> R,
{
    ENGINES.with(|engines| {
        let map = engines.borrow();
        match map.get(&handle) {
            Some(engine) => Ok(callback(engine)),
            None => Err(format!("unknown engine handle {}", handle)),
        }
    })
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

fn error_json(message: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": message.to_string() }).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|error| error_json(format!("serialisation error: {}", error)))
}

/// Flatten "unknown handle" and engine rejections into the JSON reply.
fn respond<T: Serialize>(outcome: Result<GuardiaResult<T>, String>) -> String {
    match outcome {
        Ok(Ok(value)) => to_json(&value),
        Ok(Err(error)) => error_json(error),
        Err(error) => error_json(error),
    }
}

/// Reply for mutations that produce no record.
fn acknowledge(outcome: Result<GuardiaResult<()>, String>) -> String {
    match outcome {
        Ok(Ok(())) => serde_json::json!({ "ok": true }).to_string(),
        Ok(Err(error)) => error_json(error),
        Err(error) => error_json(error),
    }
}

/// Parse a SCREAMING_SNAKE_CASE wire name such as `"DPO"`.
fn parse_wire<T: serde::de::DeserializeOwned>(name: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(name.to_owned())).ok()
}

/// Deserialise and range-check a config document.
fn parse_config(config_json: &str) -> Option<Config> {
    let config: Config = serde_json::from_str(config_json).ok()?;
    config.validate().ok()?;
    Some(config)
}

fn parse_purposes(purposes_json: &str) -> Result<Vec<String>, String> {
    serde_json::from_str(purposes_json).map_err(|error| format!("purpose list parse error: {}", error))
}

fn parse_entries(entries_json: &str) -> Result<InMemoryStorage, serde_json::Error> {
    let entries: BTreeMap<String, String> = if entries_json.trim().is_empty() {
        BTreeMap::new()
    } else {
        serde_json::from_str(entries_json)?
    };
    Ok(InMemoryStorage::from_entries(entries))
}

fn entries_json(storage: &InMemoryStorage) -> String {
    let map: BTreeMap<String, String> = storage.entries().into_iter().collect();
    to_json(&map)
}

// ---------------------------------------------------------------------------
// Engine lifecycle
// ---------------------------------------------------------------------------

/// Create a new engine with default configuration and empty storage, and
/// return its integer handle.  The stores start with demonstration data.
#[wasm_bindgen]
pub fn create_engine() -> u32 {
    register(GuardiaEngine::new(Config::default(), InMemoryStorage::new()))
}

/// Create a new engine with explicit configuration.
///
/// `config_json` is a JSON object with any subset of the [`Config`] fields:
///
/// ```json
/// { "persistence_mode": "snapshot", "seed_demo_data": false }
/// ```
///
/// Returns the integer engine handle, or `u32::MAX` if the JSON does not
/// parse or a field is out of range (e.g. a zero timeout or minimum
/// description length).
#[wasm_bindgen]
pub fn create_engine_with_config(config_json: &str) -> u32 {
    match parse_config(config_json) {
        Some(config) => register(GuardiaEngine::new(config, InMemoryStorage::new())),
        None => u32::MAX,
    }
}

/// Create an engine from persisted browser storage.
///
/// `local_json` and `session_json` are JSON objects mapping storage keys to
/// their string values, e.g. `Object.fromEntries(Object.entries(localStorage))`.
/// Returns `u32::MAX` if any argument fails to parse or the config fails
/// validation.  Unparsable *values* are not an error: the affected store
/// falls back to its seed data.
#[wasm_bindgen]
pub fn hydrate(config_json: &str, local_json: &str, session_json: &str) -> u32 {
    let config = match parse_config(config_json) {
        Some(config) => config,
        None => return u32::MAX,
    };
    let (local, session) = match (parse_entries(local_json), parse_entries(session_json)) {
        (Ok(local), Ok(session)) => (local, session),
        _ => return u32::MAX,
    };
    register(GuardiaEngine::open(
        config,
        Catalog::builtin(),
        Arc::new(SystemClock),
        local,
        session,
    ))
}

/// Local-storage entries as a JSON object, for writing back to
/// `localStorage`.  Returns `"{}"` for an unknown handle.
#[wasm_bindgen]
pub fn storage_entries(handle: u32) -> String {
    with_engine(handle, |engine| entries_json(engine.persistence().local()))
        .unwrap_or_else(|_| "{}".into())
}

/// Session-storage entries as a JSON object, for writing back to
/// `sessionStorage`.  Returns `"{}"` for an unknown handle.
#[wasm_bindgen]
pub fn session_entries(handle: u32) -> String {
    with_engine(handle, |engine| entries_json(engine.persistence().session_storage()))
        .unwrap_or_else(|_| "{}".into())
}

/// Release the engine associated with `handle`, freeing its memory.
///
/// After calling this function the handle is no longer valid.
#[wasm_bindgen]
pub fn destroy_engine(handle: u32) {
    ENGINES.with(|engines| {
        engines.borrow_mut().remove(&handle);
    });
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Log in as `name` and return the principal as JSON.
#[wasm_bindgen]
pub fn login(handle: u32, name: &str) -> String {
    respond(with_engine_mut(handle, |engine| engine.login(name)))
}

/// End the principal's session.  Returns `{"ok":true}`, or an error for an
/// unknown handle.
#[wasm_bindgen]
pub fn logout(handle: u32) -> String {
    acknowledge(with_engine_mut(handle, |engine| {
        engine.logout();
        Ok(())
    }))
}

/// Switch the acting role (`"DATA_PRINCIPAL"`, `"ADMIN"`, `"DPO"`,
/// `"AUDITOR"`, `"CONSENT_MANAGER"`) and return the principal as JSON.
/// Later audit entries record the new role.
#[wasm_bindgen]
pub fn switch_role(handle: u32, role: &str) -> String {
    let role: UserRole = match parse_wire(role) {
        Some(role) => role,
        None => return error_json(format!("unknown role '{}'", role)),
    };
    respond(with_engine_mut(handle, |engine| {
        engine
            .switch_role(role)
            .map(|()| engine.session().principal().cloned())
    }))
}

/// Mark onboarding as completed.  The flag lands in [`storage_entries`].
#[wasm_bindgen]
pub fn complete_onboarding(handle: u32) -> String {
    acknowledge(with_engine_mut(handle, |engine| {
        engine.complete_onboarding();
        Ok(())
    }))
}

/// Whether onboarding has been completed.  `false` for an unknown handle.
#[wasm_bindgen]
pub fn has_completed_onboarding(handle: u32) -> bool {
    with_engine(handle, |engine| engine.has_completed_onboarding()).unwrap_or(false)
}

/// Upgrade to the pro tier, marking the logged-in principal as well.
#[wasm_bindgen]
pub fn upgrade_to_pro(handle: u32) -> String {
    acknowledge(with_engine_mut(handle, |engine| {
        engine.upgrade_to_pro();
        Ok(())
    }))
}

/// Whether the pro tier is active.  `false` for an unknown handle.
#[wasm_bindgen]
pub fn is_pro(handle: u32) -> bool {
    with_engine(handle, |engine| engine.is_pro()).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Consent management
// ---------------------------------------------------------------------------

/// Grant consent to `fiduciary_id` for the purposes in `purposes_json` (a
/// JSON array of purpose ids).  Returns the artifact as JSON.
#[wasm_bindgen]
pub fn grant_consent(handle: u32, fiduciary_id: &str, purposes_json: &str) -> String {
    let purposes = match parse_purposes(purposes_json) {
        Ok(purposes) => purposes,
        Err(error) => return error_json(error),
    };
    respond(with_engine_mut(handle, |engine| {
        engine.grant_consent(fiduciary_id, &purposes)
    }))
}

/// Grant consent on behalf of a minor after guardian verification.
#[wasm_bindgen]
pub fn grant_consent_for_minor(
    handle: u32,
    fiduciary_id: &str,
    purposes_json: &str,
    guardian_email: &str,
) -> String {
    let purposes = match parse_purposes(purposes_json) {
        Ok(purposes) => purposes,
        Err(error) => return error_json(error),
    };
    respond(with_engine_mut(handle, |engine| {
        engine.grant_consent_for_minor(fiduciary_id, &purposes, guardian_email)
    }))
}

/// Replace the purposes of `artifact_id`.  Returns the artifact as JSON.
#[wasm_bindgen]
pub fn update_consent(handle: u32, artifact_id: &str, purposes_json: &str) -> String {
    let purposes = match parse_purposes(purposes_json) {
        Ok(purposes) => purposes,
        Err(error) => return error_json(error),
    };
    respond(with_engine_mut(handle, |engine| {
        engine.update_consent(artifact_id, &purposes)
    }))
}

/// Withdraw `artifact_id`.  Returns the artifact as JSON.
#[wasm_bindgen]
pub fn withdraw_consent(handle: u32, artifact_id: &str) -> String {
    respond(with_engine_mut(handle, |engine| engine.withdraw_consent(artifact_id)))
}

/// Effective status of `artifact_id` as a JSON string such as
/// `"EXPIRED"`.  A stored `ACTIVE` artifact past its expiry reads as
/// expired.
#[wasm_bindgen]
pub fn consent_status(handle: u32, artifact_id: &str) -> String {
    respond(with_engine(handle, |engine| engine.consent_status(artifact_id)))
}

// ---------------------------------------------------------------------------
// Grievances
// ---------------------------------------------------------------------------

/// File a grievance.  `category` is a wire name such as `"DATA_BREACH"`.
/// Returns the grievance as JSON.
#[wasm_bindgen]
pub fn submit_grievance(
    handle: u32,
    category: &str,
    description: &str,
    fiduciary_id: Option<String>,
) -> String {
    let category: GrievanceCategory = match parse_wire(category) {
        Some(category) => category,
        None => return error_json(format!("unknown grievance category '{}'", category)),
    };
    respond(with_engine_mut(handle, |engine| {
        engine.submit_grievance(category, description, fiduciary_id)
    }))
}

/// Move a submitted grievance to `IN_PROGRESS`.  Returns the grievance as
/// JSON.
#[wasm_bindgen]
pub fn start_grievance(handle: u32, grievance_id: &str) -> String {
    respond(with_engine_mut(handle, |engine| engine.start_grievance(grievance_id)))
}

/// Close `grievance_id` with `notes`.  Returns the grievance as JSON.
#[wasm_bindgen]
pub fn close_grievance(handle: u32, grievance_id: &str, notes: &str) -> String {
    respond(with_engine_mut(handle, |engine| engine.close_grievance(grievance_id, notes)))
}

/// Resolve `grievance_id` with `notes`.  Returns the grievance as JSON.
#[wasm_bindgen]
pub fn resolve_grievance(handle: u32, grievance_id: &str, notes: &str) -> String {
    respond(with_engine_mut(handle, |engine| {
        engine.resolve_grievance(grievance_id, notes)
    }))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Consent store as a JSON array, newest first.  `"[]"` on error.
#[wasm_bindgen]
pub fn get_consents(handle: u32) -> String {
    with_engine(handle, |engine| to_json(&engine.session().consent_store()))
        .unwrap_or_else(|_| "[]".into())
}

/// Grievance store as a JSON array, newest first.  `"[]"` on error.
#[wasm_bindgen]
pub fn get_grievances(handle: u32) -> String {
    with_engine(handle, |engine| to_json(&engine.session().grievance_store()))
        .unwrap_or_else(|_| "[]".into())
}

/// Return the full audit trail as a JSON array, newest first.
///
/// Returns `"[]"` on error or if the trail is empty.
#[wasm_bindgen]
pub fn get_audit_trail(handle: u32) -> String {
    with_engine(handle, |engine| to_json(&engine.session().audit().to_vec()))
        .unwrap_or_else(|_| "[]".into())
}

/// Query the audit trail and return a JSON array of entries.
///
/// `filter_json` must be a JSON string matching the [`AuditFilter`] shape
/// (`userId`, `action`, `since`, `until`, `limit`).  Pass `"{}"` to
/// retrieve all entries.
#[wasm_bindgen]
pub fn query_audit(handle: u32, filter_json: &str) -> String {
    let filter: AuditFilter = serde_json::from_str(filter_json).unwrap_or_default();
    with_engine(handle, |engine| to_json(&engine.query_audit(&filter)))
        .unwrap_or_else(|_| "[]".into())
}

/// Fiduciaries and purposes as a JavaScript object.  `null` for an unknown
/// handle.
#[wasm_bindgen]
pub fn get_catalog(handle: u32) -> JsValue {
    with_engine(handle, |engine| {
        serde_wasm_bindgen::to_value(engine.session().catalog()).unwrap_or(JsValue::NULL)
    })
    .unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// wasm-bindgen tests
// ---------------------------------------------------------------------------

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_create_and_destroy_engine() {
        let handle = create_engine();
        assert_ne!(handle, u32::MAX);
        destroy_engine(handle);
    }

    #[wasm_bindgen_test]
    fn test_catalog_is_exposed() {
        let handle = create_engine();
        assert!(!get_catalog(handle).is_null());
        assert!(get_catalog(99999).is_null());
        destroy_engine(handle);
    }

    #[wasm_bindgen_test]
    fn test_grant_uses_browser_clock() {
        let handle = create_engine_with_config(r#"{"seed_demo_data":false}"#);
        let reply = grant_consent(handle, "fid-2", r#"["p1"]"#);
        assert!(!reply.contains("error"));
        destroy_engine(handle);
    }
}

// ---------------------------------------------------------------------------
// Native unit tests (run with `cargo test` outside of WASM)
// ---------------------------------------------------------------------------

#[cfg(test)]
#[cfg(not(target_arch = "wasm32"))]
mod native_tests {
    use super::*;

    fn empty_engine() -> u32 {
        create_engine_with_config(r#"{"seed_demo_data":false}"#)
    }

    fn field(json: &str, name: &str) -> serde_json::Value {
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        value[name].clone()
    }

    #[test]
    fn test_engine_lifecycle() {
        let handle = create_engine();
        assert_ne!(handle, u32::MAX);
        destroy_engine(handle);
        assert_eq!(get_consents(handle), "[]");
    }

    #[test]
    fn test_invalid_config_returns_sentinel() {
        assert_eq!(create_engine_with_config("not json"), u32::MAX);
        assert_eq!(hydrate("{}", "[1,2]", "{}"), u32::MAX);
    }

    #[test]
    fn test_out_of_range_config_returns_sentinel() {
        let zero_minimum = r#"{"seed_demo_data":false,"min_grievance_description_len":0}"#;
        let zero_timeout = r#"{"generation_timeout_ms":0}"#;
        assert_eq!(create_engine_with_config(zero_minimum), u32::MAX);
        assert_eq!(create_engine_with_config(zero_timeout), u32::MAX);
        assert_eq!(hydrate(zero_minimum, "{}", "{}"), u32::MAX);
        assert_eq!(hydrate(zero_timeout, "{}", "{}"), u32::MAX);

        let handle = empty_engine();
        assert!(submit_grievance(handle, "DATA_BREACH", "", None).contains("error"));
        assert!(submit_grievance(handle, "DATA_BREACH", "   ", None).contains("error"));
        assert_eq!(get_grievances(handle), "[]");
        destroy_engine(handle);
    }

    #[test]
    fn test_default_engine_is_seeded() {
        let handle = create_engine();
        let consents: Vec<serde_json::Value> = serde_json::from_str(&get_consents(handle)).unwrap();
        assert_eq!(consents.len(), 3);
        destroy_engine(handle);
    }

    #[test]
    fn test_grant_withdraw_flow() {
        let handle = empty_engine();
        login(handle, "Asha");

        let artifact = grant_consent(handle, "fid-2", r#"["p1","p2"]"#);
        assert_eq!(field(&artifact, "status"), "ACTIVE");
        let id = field(&artifact, "id").as_str().unwrap().to_owned();

        let withdrawn = withdraw_consent(handle, &id);
        assert_eq!(field(&withdrawn, "status"), "WITHDRAWN");

        let again = withdraw_consent(handle, &id);
        assert!(field(&again, "error").as_str().unwrap().contains("WITHDRAWN"));

        let trail: Vec<serde_json::Value> = serde_json::from_str(&get_audit_trail(handle)).unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0]["action"], "WITHDRAW");
        destroy_engine(handle);
    }

    #[test]
    fn test_bad_purpose_list_is_error() {
        let handle = empty_engine();
        assert!(grant_consent(handle, "fid-2", "p1,p2").contains("error"));
        assert!(grant_consent(handle, "fid-2", "[]").contains("error"));
        destroy_engine(handle);
    }

    #[test]
    fn test_unknown_handle_returns_error() {
        let reply = withdraw_consent(99999, "ART-1");
        assert!(field(&reply, "error").as_str().unwrap().contains("unknown engine handle"));
    }

    #[test]
    fn test_storage_round_trip_through_hydrate() {
        let handle = empty_engine();
        login(handle, "Asha");
        grant_consent(handle, "fid-1", r#"["p1","p3"]"#);
        let local = storage_entries(handle);
        let session = session_entries(handle);
        let before = get_consents(handle);
        destroy_engine(handle);

        let restored = hydrate(r#"{"seed_demo_data":false}"#, &local, &session);
        assert_ne!(restored, u32::MAX);
        assert_eq!(get_consents(restored), before);
        assert!(!login(restored, "Asha").contains("error"));
        destroy_engine(restored);
    }

    #[test]
    fn test_grievance_flow_and_query() {
        let handle = empty_engine();
        let short = submit_grievance(handle, "DATA_BREACH", "too short", None);
        assert!(short.contains("error"));
        assert!(submit_grievance(handle, "NOT_A_CATEGORY", "long enough description text", None).contains("error"));

        let grievance = submit_grievance(
            handle,
            "CONSENT_VIOLATION",
            "Calls continue after withdrawal of consent.",
            Some("fid-2".into()),
        );
        let id = field(&grievance, "id").as_str().unwrap().to_owned();
        let resolved = resolve_grievance(handle, &id, "Number removed from dialer.");
        assert_eq!(field(&resolved, "status"), "RESOLVED");

        let notifications: Vec<serde_json::Value> =
            serde_json::from_str(&query_audit(handle, r#"{"action":"NOTIFICATION","limit":1}"#)).unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["status"], "RESOLVED");

        let grievances: Vec<serde_json::Value> = serde_json::from_str(&get_grievances(handle)).unwrap();
        assert_eq!(grievances.len(), 1);
        destroy_engine(handle);
    }

    #[test]
    fn test_minor_consent_requires_guardian() {
        let handle = empty_engine();
        assert!(grant_consent_for_minor(handle, "fid-4", r#"["p1","p5"]"#, "").contains("error"));
        let artifact = grant_consent_for_minor(handle, "fid-4", r#"["p1","p5"]"#, "mum@example.in");
        assert!(field(&artifact, "parentalConsentId").is_string());
        let updated = update_consent(handle, field(&artifact, "id").as_str().unwrap(), r#"["p5","p1"]"#);
        assert_eq!(field(&updated, "purposes")[0], "p5");
        destroy_engine(handle);
    }

    #[test]
    fn test_logout_clears_session_entries() {
        let handle = empty_engine();
        login(handle, "Asha");
        assert_ne!(session_entries(handle), "{}");
        assert_eq!(field(&logout(handle), "ok"), true);
        assert_eq!(session_entries(handle), "{}");
        destroy_engine(handle);

        let reply = logout(handle);
        assert!(field(&reply, "error").as_str().unwrap().contains("unknown engine handle"));
        assert!(complete_onboarding(handle).contains("unknown engine handle"));
        assert!(upgrade_to_pro(handle).contains("unknown engine handle"));
    }

    #[test]
    fn test_switch_role_is_recorded_on_later_entries() {
        let handle = empty_engine();
        assert!(switch_role(handle, "DPO").contains("error"));

        login(handle, "Asha");
        assert!(field(&switch_role(handle, "SUPERUSER"), "error").as_str().unwrap().contains("SUPERUSER"));
        let principal = switch_role(handle, "DPO");
        assert_eq!(field(&principal, "role"), "DPO");

        grant_consent(handle, "fid-2", r#"["p1"]"#);
        let trail: Vec<serde_json::Value> = serde_json::from_str(&get_audit_trail(handle)).unwrap();
        assert_eq!(trail[0]["initiator"], "DPO");
        destroy_engine(handle);
    }

    #[test]
    fn test_onboarding_and_pro_flags_are_persisted() {
        let handle = empty_engine();
        assert!(!has_completed_onboarding(handle));
        assert!(!is_pro(handle));

        login(handle, "Asha");
        assert_eq!(field(&complete_onboarding(handle), "ok"), true);
        assert_eq!(field(&upgrade_to_pro(handle), "ok"), true);
        assert!(has_completed_onboarding(handle));
        assert!(is_pro(handle));

        let local = storage_entries(handle);
        let entries: BTreeMap<String, String> = serde_json::from_str(&local).unwrap();
        assert_eq!(entries["guardia_onboarding_done"], "true");
        assert_eq!(entries["guardia_pro"], "true");
        let session = session_entries(handle);
        destroy_engine(handle);

        let restored = hydrate(r#"{"seed_demo_data":false}"#, &local, &session);
        assert!(has_completed_onboarding(restored));
        assert!(is_pro(restored));
        destroy_engine(restored);

        assert!(!has_completed_onboarding(handle));
        assert!(!is_pro(handle));
    }

    #[test]
    fn test_grievance_start_then_close() {
        let handle = empty_engine();
        let grievance = submit_grievance(
            handle,
            "DATA_BREACH",
            "My address appeared in a leaked mailing list.",
            None,
        );
        let id = field(&grievance, "id").as_str().unwrap().to_owned();

        assert_eq!(field(&start_grievance(handle, &id), "status"), "IN_PROGRESS");
        assert!(start_grievance(handle, &id).contains("error"));
        assert_eq!(field(&close_grievance(handle, &id, "Vendor purged the list."), "status"), "CLOSED");
        assert!(start_grievance(handle, "GRV-NONE").contains("error"));

        let notifications: Vec<serde_json::Value> =
            serde_json::from_str(&query_audit(handle, r#"{"action":"NOTIFICATION"}"#)).unwrap();
        let statuses: Vec<&str> = notifications.iter().filter_map(|entry| entry["status"].as_str()).collect();
        assert!(statuses.contains(&"IN_PROGRESS"));
        assert!(statuses.contains(&"CLOSED"));
        destroy_engine(handle);
    }

    #[test]
    fn test_consent_status_reports_expiry() {
        let handle = create_engine();
        assert_eq!(consent_status(handle, "ART-EX99"), r#""EXPIRED""#);
        assert!(field(&consent_status(handle, "ART-NONE"), "error").is_string());
        destroy_engine(handle);
        assert!(consent_status(handle, "ART-EX99").contains("unknown engine handle"));
    }
}
