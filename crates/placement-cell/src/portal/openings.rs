use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use super::domain::{CgpaCriterion, OpeningId, OpeningRecord, UserId};
use super::repository::{OpeningStore, StoreError, UserStore};
use super::service::{require_admin, validated_opening_id, PortalError};

static OPENING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_opening_id() -> OpeningId {
    let id = OPENING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OpeningId(format!("opening-{id:06}"))
}

/// Inbound form for creating or replacing an opening.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningDraft {
    pub company_name: String,
    pub offer_type: String,
    pub batch: String,
    #[serde(default)]
    pub branches_allowed: Vec<String>,
    #[serde(default)]
    pub cgpa_criteria: Vec<CgpaCriterion>,
    #[serde(default)]
    pub application_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub test_date: Option<NaiveDate>,
    #[serde(default)]
    pub additional_info: String,
}

impl OpeningDraft {
    fn validate(&self) -> Result<(), PortalError> {
        if self.company_name.trim().is_empty() {
            return Err(PortalError::Validation(
                "Company name is required".to_string(),
            ));
        }
        if self.batch.trim().is_empty() {
            return Err(PortalError::Validation("Batch is required".to_string()));
        }
        Ok(())
    }

    fn into_record(self, id: OpeningId) -> OpeningRecord {
        OpeningRecord {
            id,
            company_name: self.company_name,
            offer_type: self.offer_type,
            batch: self.batch,
            branches_allowed: self.branches_allowed,
            cgpa_criteria: self.cgpa_criteria,
            application_deadline: self.application_deadline,
            test_date: self.test_date,
            additional_info: self.additional_info,
        }
    }
}

/// Admin-gated CRUD over job openings. Reads are open to any signed-in user.
pub struct OpeningService<U, O> {
    users: Arc<U>,
    openings: Arc<O>,
}

impl<U, O> OpeningService<U, O>
where
    U: UserStore + 'static,
    O: OpeningStore + 'static,
{
    pub fn new(users: Arc<U>, openings: Arc<O>) -> Self {
        Self { users, openings }
    }

    pub fn add_opening(
        &self,
        acting: &UserId,
        draft: OpeningDraft,
    ) -> Result<OpeningRecord, PortalError> {
        draft.validate()?;
        require_admin(self.users.as_ref(), acting)?;
        let record = draft.into_record(next_opening_id());
        Ok(self.openings.insert(record)?)
    }

    pub fn update_opening(
        &self,
        acting: &UserId,
        opening_id: &str,
        draft: OpeningDraft,
    ) -> Result<OpeningRecord, PortalError> {
        let opening_id = validated_opening_id(opening_id)?;
        draft.validate()?;
        require_admin(self.users.as_ref(), acting)?;
        self.openings
            .fetch(&opening_id)?
            .ok_or(PortalError::OpeningNotFound)?;
        let record = draft.into_record(opening_id);
        match self.openings.update(record.clone()) {
            Ok(()) => Ok(record),
            Err(StoreError::NotFound) => Err(PortalError::OpeningNotFound),
            Err(other) => Err(PortalError::Store(other)),
        }
    }

    pub fn delete_opening(
        &self,
        acting: &UserId,
        opening_id: &str,
    ) -> Result<(), PortalError> {
        let opening_id = validated_opening_id(opening_id)?;
        require_admin(self.users.as_ref(), acting)?;
        match self.openings.remove(&opening_id) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(PortalError::OpeningNotFound),
            Err(other) => Err(PortalError::Store(other)),
        }
    }

    pub fn get_opening(&self, opening_id: &str) -> Result<OpeningRecord, PortalError> {
        let opening_id = validated_opening_id(opening_id)?;
        self.openings
            .fetch(&opening_id)?
            .ok_or(PortalError::OpeningNotFound)
    }

    pub fn list_openings(&self) -> Result<Vec<OpeningRecord>, PortalError> {
        Ok(self.openings.list()?)
    }
}
