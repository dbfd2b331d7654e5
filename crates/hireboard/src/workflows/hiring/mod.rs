//! Job application lifecycle: apply, review transitions, and their side effects.
//!
//! [`HiringWorkflowService`] is the only writer of application status and employee
//! affiliation. Persistence sits behind the [`HiringStore`] seam and outbound mail behind
//! [`NotificationDispatcher`].

pub mod domain;
pub mod identity;
pub mod memory;
pub mod messages;
pub mod notification;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationStatus, Company, CompanyId,
    Decision, Employee, EmployeeId, Position, PositionFilter, PositionId, PositionStatus,
    SalaryRange, UserId,
};
pub use identity::{Actor, Role};
pub use memory::MemoryHiringStore;
pub use messages::Locale;
pub use notification::{DecisionTemplates, DispatchError, MailMessage, NotificationDispatcher};
pub use router::hiring_router;
pub use service::{
    FailureKind, HiringWorkflowService, NotificationFailure, TransitionOutcome, WorkflowError,
    WorkflowPolicy,
};
pub use store::{
    ApplicationLedger, EmployeeDirectory, HiringStore, PositionCatalog, StoreError,
    TransitionChange,
};
