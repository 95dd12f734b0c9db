use std::collections::HashMap;
use std::env;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use placement_cell::portal::domain::{
    InterestRecord, OpeningId, OpeningRecord, ProfileUpdate, SelectionId, SelectionRecord,
    StudentRecord, UserId,
};
use placement_cell::portal::repository::{
    InterestFilter, InterestStore, InterestUpsert, OpeningStore, SelectionStore, StoreError,
    UserStore,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryUserStore {
    records: Arc<Mutex<HashMap<UserId, StudentRecord>>>,
}

impl UserStore for InMemoryUserStore {
    fn insert(&self, record: StudentRecord) -> Result<StudentRecord, StoreError> {
        let mut guard = self.records.lock().expect("user store mutex poisoned");
        let duplicate = guard.contains_key(&record.id)
            || guard.values().any(|existing| {
                existing.enrolment_no == record.enrolment_no || existing.email == record.email
            });
        if duplicate {
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
pub(crate) struct InMemoryOpeningStore {
    records: Arc<Mutex<HashMap<OpeningId, OpeningRecord>>>,
}

impl OpeningStore for InMemoryOpeningStore {
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
pub(crate) struct InMemorySelectionStore {
    records: Arc<Mutex<HashMap<SelectionId, SelectionRecord>>>,
}

impl SelectionStore for InMemorySelectionStore {
    fn insert(&self, record: SelectionRecord) -> Result<SelectionRecord, StoreError> {
        let mut guard = self.records.lock().expect("selection store mutex poisoned");
        // One placement per student, enforced under the same lock as the
        // write so concurrent admin actions cannot double-place.
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
pub(crate) struct InMemoryInterestStore {
    records: Arc<Mutex<HashMap<(UserId, OpeningId), InterestRecord>>>,
}

impl InterestStore for InMemoryInterestStore {
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

/// Make sure the portal always has at least one admin account to sign in
/// with. Safe to call repeatedly; the account id is fixed.
pub(crate) fn seed_default_admin(users: &InMemoryUserStore) -> Result<StudentRecord, StoreError> {
    let admin_id = UserId("admin".to_string());
    if let Some(existing) = users.find_by_id(&admin_id)? {
        return Ok(existing);
    }

    let email =
        env::var("PORTAL_ADMIN_EMAIL").unwrap_or_else(|_| "placement-cell@example.edu".to_string());
    users.insert(StudentRecord {
        id: admin_id,
        name: "Placement Cell Admin".to_string(),
        email,
        enrolment_no: "ADMIN-000".to_string(),
        branch: String::new(),
        batch: String::new(),
        cgpa: 0.0,
        is_admin: true,
    })
}
