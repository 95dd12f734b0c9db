//! Eligibility evaluation for job openings.
//!
//! [`evaluate`] is a pure function over supplied records; looking up the
//! student, the opening, and any existing placement is the caller's job.
//! Normal ineligibility is expressed through the verdict, never an error.

mod gates;

use serde::{Deserialize, Serialize};

use super::domain::{OpeningRecord, StudentRecord};

/// Result of the placement-gate lookup, supplied by the caller. Carries the
/// hiring company's name when the selection record still resolves to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementSnapshot {
    pub company_name: Option<String>,
}

/// The tuple every eligibility decision reduces to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityVerdict {
    pub is_eligible: bool,
    pub reason: String,
    pub is_placed: bool,
}

impl EligibilityVerdict {
    pub(crate) fn eligible(reason: impl Into<String>) -> Self {
        Self {
            is_eligible: true,
            reason: reason.into(),
            is_placed: false,
        }
    }

    pub(crate) fn ineligible(reason: impl Into<String>) -> Self {
        Self {
            is_eligible: false,
            reason: reason.into(),
            is_placed: false,
        }
    }

    pub(crate) fn placed(reason: impl Into<String>) -> Self {
        Self {
            is_eligible: false,
            reason: reason.into(),
            is_placed: true,
        }
    }
}

/// Evaluate a student against an opening.
///
/// Gates run in a fixed order and the first failure wins: admin bypass,
/// placement, batch, branch, CGPA. The admin bypass deliberately precedes
/// the placement gate, so an admin account that somehow holds a selection
/// record still reads as eligible and not placed.
pub fn evaluate(
    student: &StudentRecord,
    opening: &OpeningRecord,
    placement: Option<&PlacementSnapshot>,
) -> EligibilityVerdict {
    if student.is_admin {
        return EligibilityVerdict::eligible("Admin users are always eligible");
    }

    if let Some(placement) = placement {
        let company = placement.company_name.as_deref().unwrap_or("a company");
        return EligibilityVerdict::placed(format!(
            "You are already placed in {company}. You cannot apply for new job openings."
        ));
    }

    if let Some(verdict) = gates::batch_gate(student, opening) {
        return verdict;
    }

    if let Some(verdict) = gates::branch_gate(student, opening) {
        return verdict;
    }

    if let Some(verdict) = gates::cgpa_gate(student, opening) {
        return verdict;
    }

    EligibilityVerdict::eligible("You meet all eligibility criteria")
}
