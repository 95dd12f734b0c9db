use std::sync::Arc;

use serde::Serialize;

use super::domain::{OpeningId, OpeningRecord, StudentRecord, UserId};
use super::eligibility::{evaluate, EligibilityVerdict, PlacementSnapshot};
use super::repository::{
    InterestFilter, InterestStore, InterestUpsert, OpeningStore, SelectionStore, StoreError,
    UserStore,
};

/// Error raised by the portal services.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("{0}")]
    Validation(String),
    #[error("Job opening not found")]
    OpeningNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Student not found")]
    StudentNotFound,
    #[error("No student found for enrolment number {0}")]
    UnknownEnrolment(String),
    #[error("Selection not found")]
    SelectionNotFound,
    #[error("{reason}")]
    AlreadyPlaced { reason: String },
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolve the acting user and reject non-admins with a readable reason.
pub(crate) fn require_admin<U: UserStore>(
    users: &U,
    acting: &UserId,
) -> Result<StudentRecord, PortalError> {
    let user = users.find_by_id(acting)?.ok_or(PortalError::UserNotFound)?;
    if !user.is_admin {
        return Err(PortalError::Forbidden(
            "Administrator access is required for this action".to_string(),
        ));
    }
    Ok(user)
}

pub(crate) fn validated_opening_id(raw: &str) -> Result<OpeningId, PortalError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PortalError::Validation("Opening ID is required".to_string()));
    }
    Ok(OpeningId(trimmed.to_string()))
}

/// Outcome of an express-interest call: the fresh verdict plus the
/// confirmation message shown to the student.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestAcknowledgement {
    pub verdict: EligibilityVerdict,
    pub message: String,
}

/// Live view of a student's standing on one opening. `is_interested` is
/// tri-state: a stored `false` is distinct from never having declared.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestStatus {
    pub is_interested: Option<bool>,
    pub reason: String,
    pub verdict: EligibilityVerdict,
}

/// A row of the statistics listing, joined with user display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestedStudent {
    pub name: String,
    pub email: String,
    pub branch: String,
    pub batch: String,
    pub enrolment_no: String,
}

/// Point-in-time tallies for one opening. `eligible_and_interested` can
/// never exceed `total_interested`; eligibility only narrows the set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningStatistics {
    pub total_interested: u64,
    pub total_not_interested: u64,
    pub eligible_and_interested: u64,
    pub interested_users: Vec<InterestedStudent>,
}

/// Service composing the stores and the eligibility evaluator to track
/// student interest in openings.
pub struct InterestService<U, O, S, I> {
    users: Arc<U>,
    openings: Arc<O>,
    selections: Arc<S>,
    interests: Arc<I>,
}

impl<U, O, S, I> InterestService<U, O, S, I>
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

    /// Record a student's interest (or disinterest) in an opening.
    ///
    /// A placed student cannot record anything, not even "not interested";
    /// the call fails before any write. Everyone else gets an upsert keyed
    /// by (user, opening) with the verdict snapshotted onto the record.
    pub fn express_interest(
        &self,
        user_id: &UserId,
        opening_id: &str,
        is_interested: bool,
        reason: Option<String>,
    ) -> Result<InterestAcknowledgement, PortalError> {
        let opening_id = validated_opening_id(opening_id)?;
        let opening = self
            .openings
            .fetch(&opening_id)?
            .ok_or(PortalError::OpeningNotFound)?;
        let student = self
            .users
            .find_by_id(user_id)?
            .ok_or(PortalError::UserNotFound)?;

        let verdict = self.verdict_for(&student, &opening)?;
        if verdict.is_placed {
            return Err(PortalError::AlreadyPlaced {
                reason: verdict.reason,
            });
        }

        // An empty reason keeps whatever reason was stored previously.
        let reason = reason.filter(|text| !text.is_empty());
        self.interests.upsert(
            user_id,
            &opening_id,
            InterestUpsert {
                is_interested,
                reason,
                is_eligible: verdict.is_eligible,
            },
        )?;

        let message = if verdict.is_eligible {
            "Your interest has been recorded".to_string()
        } else {
            "Your interest has been recorded, but you may not meet all eligibility criteria"
                .to_string()
        };

        Ok(InterestAcknowledgement { verdict, message })
    }

    /// Re-evaluate eligibility live and merge it with the stored choice.
    pub fn interest_status(
        &self,
        user_id: &UserId,
        opening_id: &str,
    ) -> Result<InterestStatus, PortalError> {
        let opening_id = validated_opening_id(opening_id)?;
        let opening = self
            .openings
            .fetch(&opening_id)?
            .ok_or(PortalError::OpeningNotFound)?;
        let student = self
            .users
            .find_by_id(user_id)?
            .ok_or(PortalError::UserNotFound)?;

        let verdict = self.verdict_for(&student, &opening)?;
        let status = match self.interests.find(user_id, &opening_id)? {
            Some(record) => InterestStatus {
                is_interested: Some(record.is_interested),
                reason: record.reason,
                verdict,
            },
            None => InterestStatus {
                is_interested: None,
                reason: String::new(),
                verdict,
            },
        };
        Ok(status)
    }

    /// Tally interest for an opening. Admin-only; counts are independent
    /// point-in-time queries, so a write racing the aggregation can shift a
    /// tally by one, which is acceptable for this domain.
    pub fn opening_statistics(
        &self,
        acting: &UserId,
        opening_id: &str,
    ) -> Result<OpeningStatistics, PortalError> {
        let opening_id = validated_opening_id(opening_id)?;
        require_admin(self.users.as_ref(), acting)?;
        self.openings
            .fetch(&opening_id)?
            .ok_or(PortalError::OpeningNotFound)?;

        let total_interested = self.interests.count(&opening_id, InterestFilter::Interested)?;
        let total_not_interested = self
            .interests
            .count(&opening_id, InterestFilter::NotInterested)?;
        let eligible_and_interested = self
            .interests
            .count(&opening_id, InterestFilter::EligibleAndInterested)?;

        let records = self.interests.list_interested(&opening_id)?;
        let mut interested_users = Vec::with_capacity(records.len());
        for record in records {
            if let Some(user) = self.users.find_by_id(&record.user_id)? {
                interested_users.push(InterestedStudent {
                    name: user.name,
                    email: user.email,
                    branch: user.branch,
                    batch: user.batch,
                    enrolment_no: user.enrolment_no,
                });
            }
        }

        Ok(OpeningStatistics {
            total_interested,
            total_not_interested,
            eligible_and_interested,
            interested_users,
        })
    }

    /// Run the evaluator with a fresh placement lookup. Admins skip the
    /// lookup entirely; the admin bypass would win regardless.
    fn verdict_for(
        &self,
        student: &StudentRecord,
        opening: &OpeningRecord,
    ) -> Result<EligibilityVerdict, PortalError> {
        let placement = if student.is_admin {
            None
        } else {
            match self.selections.find_for_student(&student.id)? {
                Some(selection) => {
                    let company_name = self
                        .openings
                        .fetch(&selection.opening_id)?
                        .map(|opening| opening.company_name);
                    Some(PlacementSnapshot { company_name })
                }
                None => None,
            }
        };
        Ok(evaluate(student, opening, placement.as_ref()))
    }
}
