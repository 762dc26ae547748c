// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Fiduciaries and purposes known to a session.
//!
//! The catalog decides which purposes a fiduciary's notice offers and which
//! of those are mandatory.  A child-directed fiduciary offers only its
//! mandatory and child-sensitive purposes; any other fiduciary offers every
//! purpose that is not child-sensitive.

use serde::{Deserialize, Serialize};

use crate::error::{GuardiaError, GuardiaResult};
use crate::types::{ConsentPurpose, Fiduciary};

/// Lookup tables for fiduciaries and purposes.
///
/// # Examples
///
/// ```rust
/// use guardia_core::catalog::Catalog;
///
/// let catalog = Catalog::builtin();
/// let mandatory: Vec<&str> = catalog
///     .mandatory_purposes("fid-4")
///     .unwrap()
///     .iter()
///     .map(|p| p.id.as_str())
///     .collect();
/// assert_eq!(mandatory, ["p1", "p5"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Known fiduciaries.
    pub fiduciaries: Vec<Fiduciary>,
    /// Known purposes.
    pub purposes: Vec<ConsentPurpose>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Create a catalog from explicit tables.
    pub fn new(fiduciaries: Vec<Fiduciary>, purposes: Vec<ConsentPurpose>) -> Self {
        Self { fiduciaries, purposes }
    }

    /// The demonstration catalog shipped with the application.
    pub fn builtin() -> Self {
        Self::new(builtin_fiduciaries(), builtin_purposes())
    }

    /// Look up a fiduciary by id.
    pub fn fiduciary(&self, fiduciary_id: &str) -> Option<&Fiduciary> {
        self.fiduciaries.iter().find(|f| f.id == fiduciary_id)
    }

    /// Look up a purpose by id.
    pub fn purpose(&self, purpose_id: &str) -> Option<&ConsentPurpose> {
        self.purposes.iter().find(|p| p.id == purpose_id)
    }

    /// Purposes presented on `fiduciary_id`'s consent notice.
    ///
    /// # Errors
    ///
    /// [`GuardiaError::NotFound`] for an unknown fiduciary.
    pub fn offered_purposes(&self, fiduciary_id: &str) -> GuardiaResult<Vec<&ConsentPurpose>> {
        let fiduciary = self
            .fiduciary(fiduciary_id)
            .ok_or_else(|| GuardiaError::NotFound(format!("fiduciary '{}'", fiduciary_id)))?;
        Ok(self
            .purposes
            .iter()
            .filter(|p| {
                if fiduciary.is_child_app {
                    p.is_child_sensitive || p.is_mandatory
                } else {
                    !p.is_child_sensitive
                }
            })
            .collect())
    }

    /// Offered purposes that must be part of every grant.
    pub fn mandatory_purposes(&self, fiduciary_id: &str) -> GuardiaResult<Vec<&ConsentPurpose>> {
        Ok(self
            .offered_purposes(fiduciary_id)?
            .into_iter()
            .filter(|p| p.is_mandatory)
            .collect())
    }

    /// Check a purpose selection against `fiduciary_id`'s notice.
    ///
    /// The selection must be non-empty, name only offered purposes, and
    /// include every mandatory one.
    ///
    /// # Errors
    ///
    /// [`GuardiaError::Validation`] describing the first violated rule, or
    /// [`GuardiaError::NotFound`] for an unknown fiduciary.
    pub fn validate_selection(&self, fiduciary_id: &str, selected: &[String]) -> GuardiaResult<()> {
        if selected.is_empty() {
            return Err(GuardiaError::Validation(
                "at least one purpose must be selected".into(),
            ));
        }

        let offered = self.offered_purposes(fiduciary_id)?;
        if let Some(unknown) = selected
            .iter()
            .find(|id| !offered.iter().any(|p| &p.id == *id))
        {
            return Err(GuardiaError::Validation(format!(
                "purpose '{}' is not offered by fiduciary '{}'",
                unknown, fiduciary_id
            )));
        }

        let missing: Vec<&str> = offered
            .iter()
            .filter(|p| p.is_mandatory && !selected.contains(&p.id))
            .map(|p| p.id.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(GuardiaError::Validation(format!(
                "mandatory purposes not selected: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn fiduciary(
    id: &str,
    name: &str,
    category: &str,
    logo: &str,
    description: &str,
    contact_email: &str,
    compliance_score: u8,
    is_child_app: bool,
) -> Fiduciary {
    Fiduciary {
        id: id.into(),
        name: name.into(),
        category: category.into(),
        logo: logo.into(),
        description: description.into(),
        contact_email: contact_email.into(),
        compliance_score: Some(compliance_score),
        is_child_app,
    }
}

fn builtin_fiduciaries() -> Vec<Fiduciary> {
    vec![
        fiduciary(
            "fid-1",
            "BharatHealth Diagnostics",
            "Healthcare",
            "BH",
            "National diagnostic network specializing in genomic data and blood reports.",
            "dpo@bharathealth.in",
            92,
            false,
        ),
        fiduciary(
            "fid-2",
            "RupeeSwift Payments",
            "Finance",
            "RS",
            "Next-gen UPI and credit platform with real-time risk assessment.",
            "privacy@rupeeswift.com",
            88,
            false,
        ),
        fiduciary(
            "fid-3",
            "IndiCart Logistics",
            "E-commerce",
            "IC",
            "Hyper-local delivery service for electronics and fresh produce.",
            "compliance@indicart.in",
            74,
            false,
        ),
        fiduciary(
            "fid-4",
            "GuruLearn Kids",
            "EdTech",
            "GL",
            "K-12 learning platform strictly following Section 9 guidelines for minors.",
            "guardian@gurulearn.edu",
            98,
            true,
        ),
    ]
}

fn purpose(id: &str, name: &str, description: &str, mandatory: bool, child: bool) -> ConsentPurpose {
    ConsentPurpose {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        is_mandatory: mandatory,
        is_child_sensitive: child,
    }
}

fn builtin_purposes() -> Vec<ConsentPurpose> {
    vec![
        purpose(
            "p1",
            "Identity KYC",
            "Mandatory verification per RBI/Govt guidelines using Aadhaar or PAN.",
            true,
            false,
        ),
        purpose(
            "p2",
            "Personalized Offers",
            "Using browsing history to show relevant product discounts.",
            false,
            false,
        ),
        purpose(
            "p3",
            "Service Analytics",
            "Internal monitoring to fix bugs and improve UI performance.",
            false,
            false,
        ),
        purpose(
            "p4",
            "Partner Integration",
            "Sharing address data with 3rd party couriers for delivery.",
            false,
            false,
        ),
        purpose(
            "p5",
            "Academic Progress",
            "Tracking student scores for educational reports. No behavioral monitoring.",
            true,
            true,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn adult_notice_omits_child_sensitive_purposes() {
        let catalog = Catalog::builtin();
        let offered: Vec<&str> = catalog
            .offered_purposes("fid-2")
            .unwrap()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(offered, ["p1", "p2", "p3", "p4"]);
        let mandatory = catalog.mandatory_purposes("fid-2").unwrap();
        assert_eq!(mandatory.len(), 1);
        assert_eq!(mandatory[0].id, "p1");
    }

    #[test]
    fn child_notice_offers_only_mandatory_or_child_sensitive() {
        let catalog = Catalog::builtin();
        let offered: Vec<&str> = catalog
            .offered_purposes("fid-4")
            .unwrap()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(offered, ["p1", "p5"]);
    }

    #[test]
    fn selection_without_mandatory_purpose_is_rejected() {
        let catalog = Catalog::builtin();
        let error = catalog.validate_selection("fid-2", &ids(&["p2"])).unwrap_err();
        assert!(matches!(error, GuardiaError::Validation(msg) if msg.contains("p1")));
    }

    #[test]
    fn selection_outside_notice_is_rejected() {
        let catalog = Catalog::builtin();
        let error = catalog
            .validate_selection("fid-4", &ids(&["p1", "p5", "p2"]))
            .unwrap_err();
        assert!(matches!(error, GuardiaError::Validation(msg) if msg.contains("'p2'")));
    }

    #[test]
    fn unknown_fiduciary_is_not_found() {
        let catalog = Catalog::builtin();
        let error = catalog.validate_selection("fid-9", &ids(&["p1"])).unwrap_err();
        assert!(matches!(error, GuardiaError::NotFound(_)));
    }
}
