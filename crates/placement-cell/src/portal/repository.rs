use super::domain::{
    InterestRecord, OpeningId, OpeningRecord, ProfileUpdate, SelectionId, SelectionRecord,
    StudentRecord, UserId,
};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// User records: identity plus academic attributes.
pub trait UserStore: Send + Sync {
    fn insert(&self, record: StudentRecord) -> Result<StudentRecord, StoreError>;
    fn find_by_id(&self, id: &UserId) -> Result<Option<StudentRecord>, StoreError>;
    fn find_by_enrolment(&self, enrolment_no: &str) -> Result<Option<StudentRecord>, StoreError>;
    /// Apply a partial profile update. Implementations route the write
    /// through [`ProfileUpdate::apply`] so the CGPA clamp always runs.
    fn update_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<StudentRecord, StoreError>;
}

/// Opening records: postings with eligibility constraints.
pub trait OpeningStore: Send + Sync {
    fn insert(&self, record: OpeningRecord) -> Result<OpeningRecord, StoreError>;
    fn update(&self, record: OpeningRecord) -> Result<(), StoreError>;
    fn remove(&self, id: &OpeningId) -> Result<(), StoreError>;
    fn fetch(&self, id: &OpeningId) -> Result<Option<OpeningRecord>, StoreError>;
    fn list(&self) -> Result<Vec<OpeningRecord>, StoreError>;
}

/// Selection records: placement outcomes.
pub trait SelectionStore: Send + Sync {
    /// Insert a selection. Must return [`StoreError::Conflict`] when the
    /// student already holds a selection, enforcing the one-placement-per-
    /// student invariant at the storage layer.
    fn insert(&self, record: SelectionRecord) -> Result<SelectionRecord, StoreError>;
    fn remove(&self, id: &SelectionId) -> Result<(), StoreError>;
    fn find_for_student(&self, student: &UserId) -> Result<Option<SelectionRecord>, StoreError>;
    fn list(&self) -> Result<Vec<SelectionRecord>, StoreError>;
    fn list_for_opening(&self, opening: &OpeningId) -> Result<Vec<SelectionRecord>, StoreError>;
}

/// Fields written through an interest upsert. A `None` reason on an update
/// leaves the stored reason untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestUpsert {
    pub is_interested: bool,
    pub reason: Option<String>,
    pub is_eligible: bool,
}

/// Count filters over a single opening's interest records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestFilter {
    Interested,
    NotInterested,
    EligibleAndInterested,
}

/// Interest records, keyed uniquely by (user, opening).
pub trait InterestStore: Send + Sync {
    /// Create or update the single record for (user, opening) in one atomic
    /// step. Read-then-write upserts outside the store would race.
    fn upsert(
        &self,
        user: &UserId,
        opening: &OpeningId,
        update: InterestUpsert,
    ) -> Result<InterestRecord, StoreError>;
    fn find(
        &self,
        user: &UserId,
        opening: &OpeningId,
    ) -> Result<Option<InterestRecord>, StoreError>;
    fn count(&self, opening: &OpeningId, filter: InterestFilter) -> Result<u64, StoreError>;
    fn list_interested(&self, opening: &OpeningId) -> Result<Vec<InterestRecord>, StoreError>;
}
