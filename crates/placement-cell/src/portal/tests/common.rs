use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::portal::domain::{
    CgpaCriterion, InterestRecord, OpeningId, OpeningRecord, ProfileUpdate, SelectionId,
    SelectionRecord, StudentRecord, UserId,
};
use crate::portal::repository::{
    InterestFilter, InterestStore, InterestUpsert, OpeningStore, SelectionStore, StoreError,
    UserStore,
};
use crate::portal::router::PortalServices;

pub(super) fn student(id: &str, branch: &str, batch: &str, cgpa: f64) -> StudentRecord {
    StudentRecord {
        id: UserId(id.to_string()),
        name: format!("Student {id}"),
        email: format!("{id}@example.edu"),
        enrolment_no: format!("EN-{id}"),
        branch: branch.to_string(),
        batch: batch.to_string(),
        cgpa,
        is_admin: false,
    }
}

pub(super) fn admin(id: &str) -> StudentRecord {
    StudentRecord {
        id: UserId(id.to_string()),
        name: "Placement Officer".to_string(),
        email: format!("{id}@placement.example.edu"),
        enrolment_no: format!("ADM-{id}"),
        branch: String::new(),
        batch: String::new(),
        cgpa: 0.0,
        is_admin: true,
    }
}

pub(super) fn opening(
    id: &str,
    company: &str,
    batch: &str,
    branches: &[&str],
    criteria: &[(&str, &str)],
) -> OpeningRecord {
    OpeningRecord {
        id: OpeningId(id.to_string()),
        company_name: company.to_string(),
        offer_type: "Full Time".to_string(),
        batch: batch.to_string(),
        branches_allowed: branches.iter().map(|branch| branch.to_string()).collect(),
        cgpa_criteria: criteria
            .iter()
            .map(|(branch, minimum)| CgpaCriterion {
                branch: branch.to_string(),
                minimum_cgpa: minimum.to_string(),
            })
            .collect(),
        application_deadline: None,
        test_date: None,
        additional_info: String::new(),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryUserStore {
    records: Arc<Mutex<HashMap<UserId, StudentRecord>>>,
}

impl UserStore for MemoryUserStore {
    fn insert(&self, record: StudentRecord) -> Result<StudentRecord, StoreError> {
        let mut guard = self.records.lock().expect("user store mutex poisoned");
        if guard.contains_key(&record.id)
            || guard
                .values()
                .any(|existing| existing.enrolment_no == record.enrolment_no)
        {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn find_by_id(&self, id: &UserId) -> Result<Option<StudentRecord>, StoreError> {
        let guard = self.records.lock().expect("user store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_enrolment(&self, enrolment_no: &str) -> Result<Option<StudentRecord>, StoreError> {
        let guard = self.records.lock().expect("user store mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.enrolment_no == enrolment_no)
            .cloned())
    }

    fn update_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<StudentRecord, StoreError> {
        let mut guard = self.records.lock().expect("user store mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        update.apply(record);
        Ok(record.clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryOpeningStore {
    records: Arc<Mutex<HashMap<OpeningId, OpeningRecord>>>,
}

impl OpeningStore for MemoryOpeningStore {
    fn insert(&self, record: OpeningRecord) -> Result<OpeningRecord, StoreError> {
        let mut guard = self.records.lock().expect("opening store mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: OpeningRecord) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("opening store mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn remove(&self, id: &OpeningId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("opening store mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn fetch(&self, id: &OpeningId) -> Result<Option<OpeningRecord>, StoreError> {
        let guard = self.records.lock().expect("opening store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<OpeningRecord>, StoreError> {
        let guard = self.records.lock().expect("opening store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySelectionStore {
    records: Arc<Mutex<HashMap<SelectionId, SelectionRecord>>>,
}

impl SelectionStore for MemorySelectionStore {
    fn insert(&self, record: SelectionRecord) -> Result<SelectionRecord, StoreError> {
        let mut guard = self.records.lock().expect("selection store mutex poisoned");
        if guard
            .values()
            .any(|existing| existing.student_id == record.student_id)
        {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn remove(&self, id: &SelectionId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("selection store mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn find_for_student(&self, student: &UserId) -> Result<Option<SelectionRecord>, StoreError> {
        let guard = self.records.lock().expect("selection store mutex poisoned");
        Ok(guard
            .values()
            .find(|record| &record.student_id == student)
            .cloned())
    }

    fn list(&self) -> Result<Vec<SelectionRecord>, StoreError> {
        let guard = self.records.lock().expect("selection store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn list_for_opening(&self, opening: &OpeningId) -> Result<Vec<SelectionRecord>, StoreError> {
        let guard = self.records.lock().expect("selection store mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.opening_id == opening)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryInterestStore {
    records: Arc<Mutex<HashMap<(UserId, OpeningId), InterestRecord>>>,
}

impl InterestStore for MemoryInterestStore {
    fn upsert(
        &self,
        user: &UserId,
        opening: &OpeningId,
        update: InterestUpsert,
    ) -> Result<InterestRecord, StoreError> {
        let mut guard = self.records.lock().expect("interest store mutex poisoned");
        let now = Utc::now();
        let record = guard
            .entry((user.clone(), opening.clone()))
            .and_modify(|existing| {
                existing.is_interested = update.is_interested;
                existing.is_eligible = update.is_eligible;
                if let Some(reason) = &update.reason {
                    existing.reason = reason.clone();
                }
                existing.updated_at = now;
            })
            .or_insert_with(|| InterestRecord {
                user_id: user.clone(),
                opening_id: opening.clone(),
                is_interested: update.is_interested,
                reason: update.reason.clone().unwrap_or_default(),
                is_eligible: update.is_eligible,
                created_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }

    fn find(
        &self,
        user: &UserId,
        opening: &OpeningId,
    ) -> Result<Option<InterestRecord>, StoreError> {
        let guard = self.records.lock().expect("interest store mutex poisoned");
        Ok(guard.get(&(user.clone(), opening.clone())).cloned())
    }

    fn count(&self, opening: &OpeningId, filter: InterestFilter) -> Result<u64, StoreError> {
        let guard = self.records.lock().expect("interest store mutex poisoned");
        let count = guard
            .values()
            .filter(|record| &record.opening_id == opening)
            .filter(|record| match filter {
                InterestFilter::Interested => record.is_interested,
                InterestFilter::NotInterested => !record.is_interested,
                InterestFilter::EligibleAndInterested => {
                    record.is_interested && record.is_eligible
                }
            })
            .count();
        Ok(count as u64)
    }

    fn list_interested(&self, opening: &OpeningId) -> Result<Vec<InterestRecord>, StoreError> {
        let guard = self.records.lock().expect("interest store mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.opening_id == opening && record.is_interested)
            .cloned()
            .collect())
    }
}

impl MemoryInterestStore {
    pub(super) fn len(&self) -> usize {
        self.records
            .lock()
            .expect("interest store mutex poisoned")
            .len()
    }
}

/// Interest store that refuses every call, for the 500-path tests.
pub(super) struct UnavailableInterestStore;

impl InterestStore for UnavailableInterestStore {
    fn upsert(
        &self,
        _user: &UserId,
        _opening: &OpeningId,
        _update: InterestUpsert,
    ) -> Result<InterestRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn find(
        &self,
        _user: &UserId,
        _opening: &OpeningId,
    ) -> Result<Option<InterestRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn count(&self, _opening: &OpeningId, _filter: InterestFilter) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list_interested(&self, _opening: &OpeningId) -> Result<Vec<InterestRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) type Services =
    PortalServices<MemoryUserStore, MemoryOpeningStore, MemorySelectionStore, MemoryInterestStore>;

pub(super) struct Fixture {
    pub(super) services: Arc<Services>,
    pub(super) users: Arc<MemoryUserStore>,
    pub(super) openings: Arc<MemoryOpeningStore>,
    pub(super) selections: Arc<MemorySelectionStore>,
    pub(super) interests: Arc<MemoryInterestStore>,
}

pub(super) fn fixture() -> Fixture {
    let users = Arc::new(MemoryUserStore::default());
    let openings = Arc::new(MemoryOpeningStore::default());
    let selections = Arc::new(MemorySelectionStore::default());
    let interests = Arc::new(MemoryInterestStore::default());
    let services = Arc::new(PortalServices::new(
        users.clone(),
        openings.clone(),
        selections.clone(),
        interests.clone(),
    ));
    Fixture {
        services,
        users,
        openings,
        selections,
        interests,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
