use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{OpeningId, SelectionId, SelectionRecord, StudentRecord, UserId};
use super::repository::{InterestStore, OpeningStore, SelectionStore, StoreError, UserStore};
use super::service::{require_admin, validated_opening_id, PortalError};

static SELECTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_selection_id() -> SelectionId {
    let id = SELECTION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SelectionId(format!("sel-{id:06}"))
}

/// Student display fields carried on joined selection views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub name: String,
    pub enrolment_no: String,
    pub branch: String,
    pub batch: String,
}

/// Company display fields carried on joined selection views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub company_name: String,
    pub offer_type: String,
}

/// A selection joined with both sides for listing pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub id: SelectionId,
    pub student: StudentSummary,
    pub company: CompanySummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Placement and application standing for a single student, keyed by
/// enrolment number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStatus {
    pub is_placed: bool,
    pub has_applied: bool,
    pub student_name: String,
    pub enrolment_no: String,
    pub branch: String,
    pub batch: String,
}

/// Applicants and already-selected students for one opening.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedAndShortlisted {
    pub applied: Vec<StudentSummary>,
    pub shortlisted: Vec<StudentSummary>,
}

fn summary_of(record: &StudentRecord) -> StudentSummary {
    StudentSummary {
        name: record.name.clone(),
        enrolment_no: record.enrolment_no.clone(),
        branch: record.branch.clone(),
        batch: record.batch.clone(),
    }
}

/// Service managing placement outcomes.
pub struct SelectionService<U, O, S, I> {
    users: Arc<U>,
    openings: Arc<O>,
    selections: Arc<S>,
    interests: Arc<I>,
}

impl<U, O, S, I> SelectionService<U, O, S, I>
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
    S: SelectionStore + 'static,
    I: InterestStore + 'static,
{
    pub fn new(users: Arc<U>, openings: Arc<O>, selections: Arc<S>, interests: Arc<I>) -> Self {
        Self {
            users,
            openings,
            selections,
            interests,
        }
    }

    /// Record placements for a batch of students identified by enrolment
    /// number. Every enrolment must resolve before anything is written, and
    /// the store's per-student uniqueness turns a double placement into a
    /// conflict instead of a silent second record.
    pub fn add_selections(
        &self,
        acting: &UserId,
        opening_id: &str,
        enrolment_nos: &[String],
    ) -> Result<usize, PortalError> {
        if enrolment_nos.is_empty() {
            return Err(PortalError::Validation(
                "At least one enrolment number is required".to_string(),
            ));
        }
        if enrolment_nos.iter().any(|no| no.trim().is_empty()) {
            return Err(PortalError::Validation(
                "Enrolment No can't be empty".to_string(),
            ));
        }
        let opening_id = validated_opening_id(opening_id)?;
        require_admin(self.users.as_ref(), acting)?;
        self.openings
            .fetch(&opening_id)?
            .ok_or(PortalError::OpeningNotFound)?;

        let mut students = Vec::with_capacity(enrolment_nos.len());
        for enrolment_no in enrolment_nos {
            let student = self
                .users
                .find_by_enrolment(enrolment_no.trim())?
                .ok_or_else(|| PortalError::UnknownEnrolment(enrolment_no.trim().to_string()))?;
            students.push(student);
        }

        let mut inserted = 0;
        for student in students {
            let now = Utc::now();
            let record = SelectionRecord {
                id: next_selection_id(),
                student_id: student.id.clone(),
                opening_id: opening_id.clone(),
                created_at: now,
                updated_at: now,
            };
            match self.selections.insert(record) {
                Ok(_) => inserted += 1,
                Err(StoreError::Conflict) => {
                    return Err(PortalError::AlreadyPlaced {
                        reason: format!(
                            "Student {} is already placed and cannot be selected again",
                            student.enrolment_no
                        ),
                    });
                }
                Err(other) => return Err(PortalError::Store(other)),
            }
        }
        Ok(inserted)
    }

    /// Revoke a placement. Admin-only.
    pub fn delete_selection(
        &self,
        acting: &UserId,
        selection_id: &str,
    ) -> Result<(), PortalError> {
        require_admin(self.users.as_ref(), acting)?;
        let selection_id = SelectionId(selection_id.trim().to_string());
        match self.selections.remove(&selection_id) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(PortalError::SelectionNotFound),
            Err(other) => Err(PortalError::Store(other)),
        }
    }

    /// All selections joined with student and company details, newest first.
    /// Rows whose student or opening no longer resolves are skipped.
    pub fn list_selections(&self) -> Result<Vec<SelectionView>, PortalError> {
        let mut views = Vec::new();
        for selection in self.selections.list()? {
            let Some(student) = self.users.find_by_id(&selection.student_id)? else {
                continue;
            };
            let Some(opening) = self.openings.fetch(&selection.opening_id)? else {
                continue;
            };
            views.push(SelectionView {
                id: selection.id,
                student: summary_of(&student),
                company: CompanySummary {
                    company_name: opening.company_name,
                    offer_type: opening.offer_type,
                },
                created_at: selection.created_at,
                updated_at: selection.updated_at,
            });
        }
        views.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(views)
    }

    /// Placed/applied standing for one student, for admin review while
    /// building a selection list.
    pub fn student_status(
        &self,
        acting: &UserId,
        enrolment_no: &str,
        opening_id: Option<&str>,
    ) -> Result<StudentStatus, PortalError> {
        if enrolment_no.trim().is_empty() {
            return Err(PortalError::Validation(
                "Enrolment number is required".to_string(),
            ));
        }
        require_admin(self.users.as_ref(), acting)?;
        let student = self
            .users
            .find_by_enrolment(enrolment_no.trim())?
            .ok_or(PortalError::StudentNotFound)?;

        let is_placed = self.selections.find_for_student(&student.id)?.is_some();
        let has_applied = match opening_id {
            Some(raw) if !raw.trim().is_empty() => {
                let opening_id = OpeningId(raw.trim().to_string());
                matches!(
                    self.interests.find(&student.id, &opening_id)?,
                    Some(record) if record.is_interested
                )
            }
            _ => false,
        };

        Ok(StudentStatus {
            is_placed,
            has_applied,
            student_name: student.name,
            enrolment_no: student.enrolment_no,
            branch: student.branch,
            batch: student.batch,
        })
    }

    /// Interested students and already-selected students for one opening.
    pub fn applied_and_shortlisted(
        &self,
        acting: &UserId,
        opening_id: &str,
    ) -> Result<AppliedAndShortlisted, PortalError> {
        let opening_id = validated_opening_id(opening_id)?;
        require_admin(self.users.as_ref(), acting)?;
        self.openings
            .fetch(&opening_id)?
            .ok_or(PortalError::OpeningNotFound)?;

        let mut applied = Vec::new();
        for record in self.interests.list_interested(&opening_id)? {
            if let Some(student) = self.users.find_by_id(&record.user_id)? {
                applied.push(summary_of(&student));
            }
        }

        let mut shortlisted = Vec::new();
        for selection in self.selections.list_for_opening(&opening_id)? {
            if let Some(student) = self.users.find_by_id(&selection.student_id)? {
                shortlisted.push(summary_of(&student));
            }
        }

        Ok(AppliedAndShortlisted {
            applied,
            shortlisted,
        })
    }
}
