use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for posted job openings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpeningId(pub String);

/// Identifier wrapper for placement (selection) records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionId(pub String);

/// A registered user: identity plus the academic attributes eligibility
/// decisions are made from. Branch and batch are free-form strings matched
/// by exact, case-sensitive equality against opening constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub enrolment_no: String,
    pub branch: String,
    pub batch: String,
    pub cgpa: f64,
    pub is_admin: bool,
}

/// Clamp a CGPA into the portal's [0, 10] scale. Non-finite input clamps to 0
/// so a broken value fails any real threshold instead of passing one.
pub fn clamp_cgpa(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 10.0)
}

/// Partial profile update applied to a stored student record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub branch: Option<String>,
    pub batch: Option<String>,
    pub cgpa: Option<f64>,
}

impl ProfileUpdate {
    pub fn apply(&self, record: &mut StudentRecord) {
        if let Some(branch) = &self.branch {
            record.branch = branch.clone();
        }
        if let Some(batch) = &self.batch {
            record.batch = batch.clone();
        }
        if let Some(cgpa) = self.cgpa {
            record.cgpa = clamp_cgpa(cgpa);
        }
    }
}

/// Per-branch CGPA threshold on an opening. The threshold arrives as free
/// text and is parsed at evaluation time; unparsable values count as 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CgpaCriterion {
    pub branch: String,
    pub minimum_cgpa: String,
}

/// A job/internship posting with its eligibility constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningRecord {
    pub id: OpeningId,
    pub company_name: String,
    pub offer_type: String,
    pub batch: String,
    pub branches_allowed: Vec<String>,
    pub cgpa_criteria: Vec<CgpaCriterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_date: Option<NaiveDate>,
    pub additional_info: String,
}

/// A recorded placement outcome linking one student to one opening.
///
/// A student holds at most one selection at a time; the store enforces the
/// uniqueness on insert rather than relying on read-then-write checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRecord {
    pub id: SelectionId,
    pub student_id: UserId,
    pub opening_id: OpeningId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A student's declared interest (or disinterest) in one opening, with the
/// eligibility verdict snapshotted at write time. Unique per (user, opening).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestRecord {
    pub user_id: UserId,
    pub opening_id: OpeningId,
    pub is_interested: bool,
    pub reason: String,
    pub is_eligible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
