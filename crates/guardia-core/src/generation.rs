// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Text-generation collaborator.
//!
//! Drafting tasks (purpose summaries, policy scans, grievance letters, and
//! so on) are delegated to an external text generator.  The generator may be
//! slow, unreachable, or misconfigured; every task therefore owns a fixed
//! fallback text, and [`draft`] always returns something displayable.
//!
//! [`Draft`] records whether the text was generated or substituted, so the
//! caller can label fallback content instead of presenting it as analysis.
//!
//! With the `async` feature, [`AsyncTextGenerator`] and
//! [`draft_with_timeout`] bound the wait; an elapsed timeout counts as a
//! failure and yields the fallback.

use thiserror::Error;

/// Why a generation attempt produced no usable text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The generator could not be reached or rejected the request.
    #[error("text generator unavailable: {0}")]
    Unavailable(String),

    /// The generator answered with blank text.
    #[error("text generator returned an empty response")]
    EmptyResponse,

    /// No answer arrived within the configured bound.
    #[error("text generation timed out after {0} ms")]
    Timeout(u64),
}

/// Blocking text generator.
///
/// Any `Fn(&str) -> Result<String, GenerationError>` is a generator:
///
/// ```rust
/// use guardia_core::generation::{draft, Draft, DraftTask, GenerationError};
///
/// let echo = |prompt: &str| -> Result<String, GenerationError> { Ok(format!("{} chars", prompt.len())) };
/// let result = draft(&echo, &DraftTask::GrievanceLetter { issue: "Spam calls".into() });
/// assert!(matches!(result, Draft::Generated(_)));
/// ```
pub trait TextGenerator {
    /// Produce text for `prompt`.
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

impl<F> TextGenerator for F
where
    F: Fn(&str) -> Result<String, GenerationError>,
{
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self(prompt)
    }
}

/// Generator used when no backend is configured.  Always unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGenerator;

impl TextGenerator for OfflineGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable("no text generator configured".into()))
    }
}

const STYLE_RULES: &str = "\
Formatting: no bold markers or double asterisks. \
Use ### headings for section titles only. \
Use plain numbered lists or single dashes for bullets. \
Write clean professional English without preamble or meta-commentary.";

/// A drafting job together with its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftTask {
    /// Two-sentence explanation of a processing purpose.
    PurposeSummary { purpose_name: String, description: String },
    /// Structured compliance scan of privacy-policy text.
    PolicyScan { policy_text: String },
    /// Code snippet addressing a compliance gap.
    Remediation { issue: String, context: String },
    /// Compliance review of a public URL ending with a score out of 100.
    DeepAudit { url: String },
    /// Formal grievance letter to a Data Protection Officer.
    GrievanceLetter { issue: String },
    /// Translation of a legal notice.
    NoticeTranslation { text: String, language: String },
    /// Privacy notice for a described service.
    PrivacyNotice { service_description: String },
}

impl DraftTask {
    /// Short task name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            DraftTask::PurposeSummary { .. }    => "purpose_summary",
            DraftTask::PolicyScan { .. }        => "policy_scan",
            DraftTask::Remediation { .. }       => "remediation",
            DraftTask::DeepAudit { .. }         => "deep_audit",
            DraftTask::GrievanceLetter { .. }   => "grievance_letter",
            DraftTask::NoticeTranslation { .. } => "notice_translation",
            DraftTask::PrivacyNotice { .. }     => "privacy_notice",
        }
    }

    /// Prompt sent to the generator.
    pub fn prompt(&self) -> String {
        match self {
            DraftTask::PurposeSummary { purpose_name, description } => format!(
                "Explain this data processing purpose to an Indian citizen under the DPDP Act 2023.\n\
                 Purpose: {purpose_name}\nDescription: {description}\n\
                 Answer in two plain sentences covering necessity and the principal's rights.\n{STYLE_RULES}"
            ),
            DraftTask::PolicyScan { policy_text } => format!(
                "Assess this privacy policy for DPDP Act 2023 compliance: \"{policy_text}\".\n\
                 Reply in exactly this structure:\n\
                 [SCORE] a single number from 1 to 10\n\
                 [RISKS] two bullet points naming specific legal risks\n\
                 [SUMMARY] a three-sentence professional overview\n{STYLE_RULES}"
            ),
            DraftTask::Remediation { issue, context } => format!(
                "Write remediation code for \"{issue}\" in \"{context}\".\n\
                 Return one clean code block followed by a one-sentence explanation without markdown."
            ),
            DraftTask::DeepAudit { url } => format!(
                "Review {url} for DPDP compliance, focusing on Data Protection Officer contact details \
                 and how easily consent can be withdrawn. End with a score out of 100.\n{STYLE_RULES}"
            ),
            DraftTask::GrievanceLetter { issue } => format!(
                "Draft a formal DPDP Act 2023 grievance about: \"{issue}\".\n\
                 Write it as a letter to the Data Protection Officer in plain, direct English.\n{STYLE_RULES}"
            ),
            DraftTask::NoticeTranslation { text, language } => format!(
                "Translate into formal {language}, keeping legal terms accurate: \"{text}\".\n{STYLE_RULES}"
            ),
            DraftTask::PrivacyNotice { service_description } => format!(
                "Draft a Section 6 DPDP Act 2023 privacy notice for this service: \"{service_description}\". \
                 Cover purpose limitation, the right to withdraw, and Data Protection Officer details \
                 in professional but accessible legal language."
            ),
        }
    }

    /// Text substituted when generation fails.
    pub fn fallback(&self) -> &'static str {
        match self {
            DraftTask::PurposeSummary { .. } => {
                "This purpose allows the fiduciary to process your data for its specified business goals in accordance with Section 6."
            }
            DraftTask::PolicyScan { .. } => {
                "[SCORE] 5\n[RISKS]\n- Unable to perform deep heuristic scan.\n- Manual review required.\n[SUMMARY]\nThe node is currently experiencing high load. Please try your scan again in a few moments."
            }
            DraftTask::Remediation { .. } => "// Remediation unavailable.",
            DraftTask::DeepAudit { .. } => "Deep audit node restricted. Manual verification recommended.",
            DraftTask::GrievanceLetter { .. } => {
                "To the Data Protection Officer,\n\nI am writing to formally lodge a grievance regarding the processing of my personal data. Please address this issue immediately under Section 13."
            }
            DraftTask::NoticeTranslation { .. } => "Translation unavailable.",
            DraftTask::PrivacyNotice { .. } => {
                "Error generating notice. Please check the text generator configuration."
            }
        }
    }
}

/// Outcome of a drafting task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    /// Text produced by the generator.
    Generated(String),
    /// The task's fixed fallback, with the reason generation failed.
    Fallback { text: String, reason: String },
}

impl Draft {
    /// The displayable text, generated or not.
    pub fn text(&self) -> &str {
        match self {
            Draft::Generated(text) => text,
            Draft::Fallback { text, .. } => text,
        }
    }

    /// Consume the draft and return its text.
    pub fn into_text(self) -> String {
        match self {
            Draft::Generated(text) => text,
            Draft::Fallback { text, .. } => text,
        }
    }

    /// Whether the text is a substitute.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Draft::Fallback { .. })
    }
}

/// Run `task` against `generator`, substituting the fallback on failure.
pub fn draft<G: TextGenerator + ?Sized>(generator: &G, task: &DraftTask) -> Draft {
    resolve(task, generator.generate(&task.prompt()))
}

fn resolve(task: &DraftTask, result: Result<String, GenerationError>) -> Draft {
    match result {
        Ok(text) if !text.trim().is_empty() => Draft::Generated(text),
        Ok(_) => substitute(task, GenerationError::EmptyResponse),
        Err(error) => substitute(task, error),
    }
}

fn substitute(task: &DraftTask, error: GenerationError) -> Draft {
    tracing::warn!(task = task.name(), %error, "text generation failed; using fallback");
    Draft::Fallback {
        text: task.fallback().to_owned(),
        reason: error.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Async
// ---------------------------------------------------------------------------

/// Non-blocking text generator.
#[cfg(feature = "async")]
pub trait AsyncTextGenerator: Send + Sync {
    /// Produce text for `prompt`.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;
}

/// Run `task` against `generator`, waiting at most `timeout`.
///
/// Dropping the returned future abandons the request.
#[cfg(feature = "async")]
pub async fn draft_with_timeout<G: AsyncTextGenerator>(
    generator: &G,
    task: &DraftTask,
    timeout: std::time::Duration,
) -> Draft {
    let prompt = task.prompt();
    match tokio::time::timeout(timeout, generator.generate(&prompt)).await {
        Ok(result) => resolve(task, result),
        Err(_) => {
            let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            substitute(task, GenerationError::Timeout(millis))
        }
    }
}
