//! Placement portal services: eligibility evaluation, interest tracking,
//! opening management, and selection records.

pub mod domain;
pub mod eligibility;
pub mod openings;
pub mod repository;
pub mod router;
pub mod selections;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    clamp_cgpa, CgpaCriterion, InterestRecord, OpeningId, OpeningRecord, ProfileUpdate,
    SelectionId, SelectionRecord, StudentRecord, UserId,
};
pub use eligibility::{evaluate, EligibilityVerdict, PlacementSnapshot};
pub use openings::{OpeningDraft, OpeningService};
pub use repository::{
    InterestFilter, InterestStore, InterestUpsert, OpeningStore, SelectionStore, StoreError,
    UserStore,
};
pub use router::{portal_router, PortalServices};
pub use selections::{
    AppliedAndShortlisted, CompanySummary, SelectionService, SelectionView, StudentStatus,
    StudentSummary,
};
pub use service::{
    InterestAcknowledgement, InterestService, InterestStatus, InterestedStudent,
    OpeningStatistics, PortalError,
};
