// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Walk a data principal through a consent journey and print the audit
//! trail.
//!
//! Run with: `RUST_LOG=guardia_core=debug cargo run --example consent_journey`

use guardia_core::{
    analysis::{extract_audit_score, issue_certificate, parse_policy_score, split_sections},
    config::Config,
    engine::GuardiaEngine,
    generation::{draft, DraftTask, GenerationError, OfflineGenerator},
    storage::InMemoryStorage,
    types::{GrievanceCategory, UserRole},
    GuardiaResult,
};
use tracing_subscriber::EnvFilter;

fn main() -> GuardiaResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut engine = GuardiaEngine::new(Config::default(), InMemoryStorage::new());
    let principal = engine.login("Asha Verma")?;
    engine.complete_onboarding();
    println!("logged in as {} ({})", principal.name, principal.id);

    // Adult consent, then a narrower update and a withdrawal.
    let payments = engine.grant_consent("fid-2", &["p1", "p2", "p3"])?;
    engine.update_consent(&payments.id, &["p1", "p3"])?;
    engine.withdraw_consent(&payments.id)?;
    if let Err(error) = engine.withdraw_consent(&payments.id) {
        println!("second withdraw rejected: {}", error);
    }

    // Verifiable parental consent for a child-directed service.
    let learning = engine.grant_consent_for_minor("fid-4", &["p1", "p5"], "parent@example.in")?;
    println!(
        "minor consent {} verified by {}",
        learning.id,
        learning.parental_consent_id.as_deref().unwrap_or("-")
    );

    // Grievance, handled by the DPO.
    let letter = draft(
        &OfflineGenerator,
        &DraftTask::GrievanceLetter {
            issue: "Promotional SMS after withdrawal".into(),
        },
    );
    println!("grievance draft (fallback: {}):\n{}\n", letter.is_fallback(), letter.text());

    let grievance = engine.submit_grievance(
        GrievanceCategory::ConsentViolation,
        "Promotional SMS continue after I withdrew consent for offers.",
        Some("fid-2".into()),
    )?;
    engine.switch_role(UserRole::Dpo)?;
    engine.start_grievance(&grievance.id)?;
    engine.resolve_grievance(&grievance.id, "Marketing list purged; confirmation sent.")?;

    // Policy scan with a canned generator.
    let scanner = |_: &str| -> Result<String, GenerationError> {
        Ok("[SCORE] 7\n[RISKS]\n- Retention period unstated.\n- No grievance timeline.\n[SUMMARY]\nBroadly aligned.".into())
    };
    let scan = draft(&scanner, &DraftTask::PolicyScan { policy_text: "...".into() });
    let score = parse_policy_score(scan.text());
    println!("policy score {}/{} ({}%)", score.value, score.total, score.percent());
    println!("{}\n", split_sections(scan.text()));

    let audit_text = "Withdrawal is one click away. Compliance score: 88 out of 100.";
    let certificate = issue_certificate(
        &principal.id,
        "https://rupeeswift.example",
        extract_audit_score(audit_text),
        engine.session().now(),
    );
    println!("certificate {} score {} {}", certificate.id, certificate.score, certificate.hash);

    println!("\naudit trail (newest first):");
    for entry in engine.session().audit().entries() {
        println!(
            "  {} {:<16} {:<12} {:<16} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action.as_str(),
            entry.status,
            entry.initiator.as_str(),
            entry.purpose_id.as_deref().unwrap_or("-"),
        );
    }

    let summary = engine.summary();
    println!(
        "\nlive consents: {}, grievances: {}, audit entries: {}",
        summary.live_consents, summary.grievances, summary.audit_entries
    );
    Ok(())
}
