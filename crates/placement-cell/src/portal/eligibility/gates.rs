use super::EligibilityVerdict;
use crate::portal::domain::{OpeningRecord, StudentRecord};

/// Batch must match exactly. No normalisation of casing or whitespace.
pub(crate) fn batch_gate(
    student: &StudentRecord,
    opening: &OpeningRecord,
) -> Option<EligibilityVerdict> {
    if student.batch != opening.batch {
        return Some(EligibilityVerdict::ineligible(format!(
            "Your batch ({}) is not eligible for this job. Required batch: {}",
            student.batch, opening.batch
        )));
    }
    None
}

/// Branch must appear in the opening's allow-list, compared by exact string
/// equality.
pub(crate) fn branch_gate(
    student: &StudentRecord,
    opening: &OpeningRecord,
) -> Option<EligibilityVerdict> {
    let allowed = opening
        .branches_allowed
        .iter()
        .any(|branch| branch == &student.branch);
    if !allowed {
        return Some(EligibilityVerdict::ineligible(format!(
            "Your branch ({}) is not eligible for this job. Allowed branches: {}",
            student.branch,
            opening.branches_allowed.join(", ")
        )));
    }
    None
}

/// A branch with no criterion entry has no CGPA requirement at all.
pub(crate) fn cgpa_gate(
    student: &StudentRecord,
    opening: &OpeningRecord,
) -> Option<EligibilityVerdict> {
    let criterion = opening
        .cgpa_criteria
        .iter()
        .find(|criterion| criterion.branch == student.branch)?;

    let required = parse_cgpa(&criterion.minimum_cgpa);
    let actual = if student.cgpa.is_finite() {
        student.cgpa
    } else {
        0.0
    };

    if actual < required {
        return Some(EligibilityVerdict::ineligible(format!(
            "Your CGPA ({actual}) is less than the required CGPA ({required}) for your branch"
        )));
    }
    None
}

/// Parse a free-text CGPA threshold. Anything unparsable or non-finite
/// counts as 0, so a broken threshold never blocks anyone.
pub(crate) fn parse_cgpa(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}
