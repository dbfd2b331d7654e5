//! Storage seams consumed by the workflow engine.
//!
//! The ledger is a dumb store: it does not judge which status transitions are legal. It does
//! own the one uniqueness rule that must hold under concurrency, at most one non-rejected row
//! per (employee, position), and reports violations as [`StoreError::Conflict`].

use chrono::{DateTime, Utc};

use super::domain::{
    ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationStatus, Company, CompanyId,
    Employee, EmployeeId, Position, PositionFilter, PositionId, UserId,
};

/// Storage abstraction for application rows.
pub trait ApplicationLedger: Send + Sync {
    /// Create a PENDING row. Fails with `Conflict` if an active row exists for the pair.
    fn insert(
        &self,
        employee_id: &EmployeeId,
        position_id: &PositionId,
        apply_date: DateTime<Utc>,
    ) -> Result<ApplicationRecord, StoreError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError>;
    fn find_active(
        &self,
        employee_id: &EmployeeId,
        position_id: &PositionId,
    ) -> Result<Option<ApplicationRecord>, StoreError>;
    fn list(&self, filter: &ApplicationFilter) -> Result<Vec<ApplicationRecord>, StoreError>;
    /// Overwrite the status in place.
    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError>;
    /// Hard delete, returning the removed row.
    fn delete(&self, id: &ApplicationId) -> Result<ApplicationRecord, StoreError>;
}

/// Read access to job postings and their owning companies.
pub trait PositionCatalog: Send + Sync {
    fn find_position(&self, id: &PositionId) -> Result<Option<Position>, StoreError>;
    fn find_positions(&self, filter: &PositionFilter) -> Result<Vec<Position>, StoreError>;
    fn find_company(&self, id: &CompanyId) -> Result<Option<Company>, StoreError>;
}

/// Job-seeker profiles and their employer affiliation.
pub trait EmployeeDirectory: Send + Sync {
    fn find_employee(&self, id: &EmployeeId) -> Result<Option<Employee>, StoreError>;
    fn find_employee_by_user(&self, user_id: &UserId) -> Result<Option<Employee>, StoreError>;
}

/// The data writes of one status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionChange {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub employee_id: EmployeeId,
    pub affiliation: Option<CompanyId>,
}

/// Everything the engine needs from persistence, plus a single unit of work for transitions.
pub trait HiringStore: ApplicationLedger + PositionCatalog + EmployeeDirectory {
    /// Apply the status write and the affiliation write together. Either both land or
    /// neither does. Making a row active while another active row exists for the same
    /// (employee, position) fails with `Conflict`.
    fn commit_transition(
        &self,
        change: &TransitionChange,
    ) -> Result<(ApplicationRecord, Employee), StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
