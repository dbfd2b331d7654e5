use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationStatus, Company, Decision,
    Employee, Position, PositionFilter, PositionId, PositionStatus,
};
use super::identity::{Actor, Role};
use super::messages::Locale;
use super::notification::{DecisionTemplates, DispatchError, NotificationDispatcher};
use super::store::{
    ApplicationLedger, EmployeeDirectory, HiringStore, PositionCatalog, StoreError,
    TransitionChange,
};
use crate::config::HiringConfig;

/// Policy switches for the workflow engine.
///
/// `enforce_company_scope` re-verifies on every transition and delete that an HR actor belongs
/// to the company owning the position. The other two switches are extensions beyond the plain
/// apply rules (status must be OPEN, no active duplicate) and stay off unless configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkflowPolicy {
    pub enforce_company_scope: bool,
    pub enforce_submission_window: bool,
    pub enforce_capacity: bool,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            enforce_company_scope: true,
            enforce_submission_window: false,
            enforce_capacity: false,
        }
    }
}

/// Engine owning every write to application status and employee affiliation.
pub struct HiringWorkflowService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    templates: DecisionTemplates,
    policy: WorkflowPolicy,
}

impl<S, N> HiringWorkflowService<S, N>
where
    S: HiringStore + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        templates: DecisionTemplates,
        policy: WorkflowPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            templates,
            policy,
        }
    }

    pub fn from_config(store: Arc<S>, notifier: Arc<N>, config: &HiringConfig) -> Self {
        let templates = DecisionTemplates::new(config.mail_from.clone(), config.locale);
        Self::new(store, notifier, templates, config.policy)
    }

    pub fn policy(&self) -> WorkflowPolicy {
        self.policy
    }

    /// Default display locale for boundary messages and decision mails.
    pub fn locale(&self) -> Locale {
        self.templates.locale()
    }

    /// Submit an application for the actor's employee profile.
    pub fn apply(
        &self,
        actor: &Actor,
        position_id: &PositionId,
    ) -> Result<ApplicationRecord, WorkflowError> {
        self.apply_at(actor, position_id, Utc::now())
    }

    pub fn apply_at(
        &self,
        actor: &Actor,
        position_id: &PositionId,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, WorkflowError> {
        if !matches!(actor.role, Role::JobSeeker) {
            return Err(WorkflowError::NotAnEmployee);
        }
        let employee = self
            .store
            .find_employee_by_user(&actor.user_id)?
            .ok_or(WorkflowError::NotAnEmployee)?;

        let position = self
            .store
            .find_position(position_id)?
            .ok_or(WorkflowError::PositionNotFound)?;

        if position.status != PositionStatus::Open {
            return Err(WorkflowError::PositionClosed);
        }
        if self.policy.enforce_submission_window && !position.within_submission_window(now) {
            return Err(WorkflowError::PositionClosed);
        }

        if self
            .store
            .find_active(&employee.id, &position.id)?
            .is_some()
        {
            return Err(WorkflowError::DuplicateApplication);
        }

        if self.policy.enforce_capacity {
            let filter = ApplicationFilter {
                position_id: Some(position.id.clone()),
                ..ApplicationFilter::default()
            };
            let active = self
                .store
                .list(&filter)?
                .iter()
                .filter(|record| record.is_active())
                .count();
            if active >= position.capacity as usize {
                return Err(WorkflowError::PositionFull);
            }
        }

        // The ledger rejects a concurrent insert that slipped past the check above.
        let record = self
            .store
            .insert(&employee.id, &position.id, now)
            .map_err(|err| match err {
                StoreError::Conflict => WorkflowError::DuplicateApplication,
                other => WorkflowError::Store(other),
            })?;

        info!(
            application_id = %record.id.0,
            employee_id = %employee.id.0,
            position_id = %position.id.0,
            "application submitted"
        );
        Ok(record)
    }

    /// Move an application to ACCEPTED or REJECTED and run the transition side effects.
    ///
    /// Any current status may be overwritten, including a terminal one. The affiliation is
    /// rewritten on every call: ACCEPTED points the employee at the position's company and
    /// REJECTED clears it, even when the current affiliation came from a different accepted
    /// application. That clearing rule is kept as-is pending a product decision.
    ///
    /// Reopening an old REJECTED row as ACCEPTED fails with `DuplicateApplication` while a
    /// newer active row exists for the same pair. An application whose position row has
    /// disappeared fails with `PositionNotFound`, since the affiliation target is unknown.
    /// The decision mail is written in the service's configured locale, not the reviewer's.
    pub fn transition(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        decision: Decision,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let application = self
            .store
            .fetch(application_id)?
            .ok_or(WorkflowError::ApplicationNotFound)?;

        if !actor.is_reviewer() {
            return Err(WorkflowError::Unauthorized);
        }

        let position = self
            .store
            .find_position(&application.position_id)?
            .ok_or(WorkflowError::PositionNotFound)?;
        if self.policy.enforce_company_scope && !actor.can_review_for(&position.company_id) {
            warn!(
                application_id = %application.id.0,
                user_id = %actor.user_id.0,
                "transition refused outside reviewer company"
            );
            return Err(WorkflowError::Unauthorized);
        }

        let employee = self
            .store
            .find_employee(&application.employee_id)?
            .ok_or(WorkflowError::EmployeeNotFound)?;

        let previous = application.applying_status;
        let status = ApplicationStatus::from(decision);
        let affiliation = match decision {
            Decision::Accepted => Some(position.company_id.clone()),
            Decision::Rejected => None,
        };
        let change = TransitionChange {
            application_id: application.id.clone(),
            status,
            employee_id: employee.id.clone(),
            affiliation,
        };
        let (application, employee) =
            self.store
                .commit_transition(&change)
                .map_err(|err| match err {
                    StoreError::NotFound => WorkflowError::ApplicationNotFound,
                    StoreError::Conflict => WorkflowError::DuplicateApplication,
                    other => WorkflowError::Store(other),
                })?;

        info!(
            application_id = %application.id.0,
            status = status.label(),
            previous = previous.label(),
            "application status committed"
        );

        match self.notify(decision, &employee, &position) {
            Ok(()) => Ok(TransitionOutcome::Saved {
                application,
                employee,
            }),
            Err(failure) => {
                warn!(
                    application_id = %application.id.0,
                    error = %failure,
                    "decision saved but notification failed"
                );
                Ok(TransitionOutcome::SavedButNotificationFailed {
                    application,
                    employee,
                    failure,
                })
            }
        }
    }

    /// Hard delete. The applicant's affiliation is left untouched even for an ACCEPTED row.
    pub fn delete(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, WorkflowError> {
        let application = self
            .store
            .fetch(application_id)?
            .ok_or(WorkflowError::ApplicationNotFound)?;

        if !actor.is_reviewer() {
            return Err(WorkflowError::Unauthorized);
        }
        if self.policy.enforce_company_scope && !actor.is_admin() {
            let owned = self
                .store
                .find_position(&application.position_id)?
                .is_some_and(|position| actor.can_review_for(&position.company_id));
            if !owned {
                return Err(WorkflowError::Unauthorized);
            }
        }

        let removed = self.store.delete(application_id).map_err(|err| match err {
            StoreError::NotFound => WorkflowError::ApplicationNotFound,
            other => WorkflowError::Store(other),
        })?;

        info!(
            application_id = %removed.id.0,
            status = removed.applying_status.label(),
            "application deleted"
        );
        Ok(removed)
    }

    /// Fetch one application if the actor owns it or reviews for its company.
    pub fn get(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, WorkflowError> {
        let application = self
            .store
            .fetch(application_id)?
            .ok_or(WorkflowError::ApplicationNotFound)?;

        let visible = match &actor.role {
            Role::Admin => true,
            Role::JobSeeker => self
                .store
                .find_employee_by_user(&actor.user_id)?
                .is_some_and(|employee| employee.id == application.employee_id),
            Role::HumanResource { company_id } => self
                .store
                .find_position(&application.position_id)?
                .is_some_and(|position| &position.company_id == company_id),
        };

        if visible {
            Ok(application)
        } else {
            Err(WorkflowError::Unauthorized)
        }
    }

    /// List applications, narrowed to what the actor is allowed to see.
    pub fn list(
        &self,
        actor: &Actor,
        filter: ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, WorkflowError> {
        let mut filter = filter;
        match &actor.role {
            Role::Admin => {}
            Role::HumanResource { company_id } => filter.company_id = Some(company_id.clone()),
            Role::JobSeeker => {
                let employee = self
                    .store
                    .find_employee_by_user(&actor.user_id)?
                    .ok_or(WorkflowError::NotAnEmployee)?;
                filter.employee_id = Some(employee.id);
            }
        }
        Ok(self.store.list(&filter)?)
    }

    /// Positions with their status as of `now`, so postings past their end date read as closed.
    pub fn positions(
        &self,
        filter: &PositionFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Position>, WorkflowError> {
        let query = PositionFilter {
            company_id: filter.company_id.clone(),
            status: None,
        };
        let positions = self
            .store
            .find_positions(&query)?
            .into_iter()
            .map(|mut position| {
                position.status = position.effective_status(now);
                position
            })
            .filter(|position| filter.status.map_or(true, |status| position.status == status))
            .collect();
        Ok(positions)
    }

    fn notify(
        &self,
        decision: Decision,
        employee: &Employee,
        position: &Position,
    ) -> Result<(), NotificationFailure> {
        let company = self
            .store
            .find_company(&position.company_id)
            .map_err(NotificationFailure::Compose)?
            .unwrap_or_else(|| Company {
                id: position.company_id.clone(),
                name: position.company_id.0.clone(),
            });

        let message = self
            .templates
            .render(decision, employee, position, &company);
        self.notifier.send(message)?;
        Ok(())
    }
}

/// Result of a committed transition. The data writes landed in both variants.
#[derive(Debug)]
pub enum TransitionOutcome {
    Saved {
        application: ApplicationRecord,
        employee: Employee,
    },
    SavedButNotificationFailed {
        application: ApplicationRecord,
        employee: Employee,
        failure: NotificationFailure,
    },
}

impl TransitionOutcome {
    pub fn application(&self) -> &ApplicationRecord {
        match self {
            TransitionOutcome::Saved { application, .. }
            | TransitionOutcome::SavedButNotificationFailed { application, .. } => application,
        }
    }

    pub fn employee(&self) -> &Employee {
        match self {
            TransitionOutcome::Saved { employee, .. }
            | TransitionOutcome::SavedButNotificationFailed { employee, .. } => employee,
        }
    }

    pub fn notification_delivered(&self) -> bool {
        matches!(self, TransitionOutcome::Saved { .. })
    }
}

/// Why the decision mail did not go out.
#[derive(Debug, thiserror::Error)]
pub enum NotificationFailure {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("could not compose notification: {0}")]
    Compose(StoreError),
}

/// Error raised by the workflow engine.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("actor has no employee profile")]
    NotAnEmployee,
    #[error("position not found")]
    PositionNotFound,
    #[error("position is closed")]
    PositionClosed,
    #[error("position has reached capacity")]
    PositionFull,
    #[error("an active application already exists for this position")]
    DuplicateApplication,
    #[error("application not found")]
    ApplicationNotFound,
    #[error("employee not found")]
    EmployeeNotFound,
    #[error("actor is not allowed to manage this application")]
    Unauthorized,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    pub fn kind(&self) -> FailureKind {
        match self {
            WorkflowError::NotAnEmployee => FailureKind::NotAnEmployee,
            WorkflowError::PositionNotFound => FailureKind::PositionNotFound,
            WorkflowError::PositionClosed => FailureKind::PositionClosed,
            WorkflowError::PositionFull => FailureKind::PositionFull,
            WorkflowError::DuplicateApplication => FailureKind::DuplicateApplication,
            WorkflowError::ApplicationNotFound => FailureKind::ApplicationNotFound,
            WorkflowError::EmployeeNotFound => FailureKind::EmployeeNotFound,
            WorkflowError::Unauthorized => FailureKind::Unauthorized,
            WorkflowError::Store(_) => FailureKind::Internal,
        }
    }

    pub fn is_infrastructure(&self) -> bool {
        matches!(self, WorkflowError::Store(_))
    }
}

/// Language-agnostic failure code used at the presentation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotAnEmployee,
    PositionNotFound,
    PositionClosed,
    PositionFull,
    DuplicateApplication,
    ApplicationNotFound,
    EmployeeNotFound,
    Unauthorized,
    Unauthenticated,
    InvalidRequest,
    Internal,
}

impl FailureKind {
    pub const fn code(self) -> &'static str {
        match self {
            FailureKind::NotAnEmployee => "not_an_employee",
            FailureKind::PositionNotFound => "position_not_found",
            FailureKind::PositionClosed => "position_closed",
            FailureKind::PositionFull => "position_full",
            FailureKind::DuplicateApplication => "duplicate_application",
            FailureKind::ApplicationNotFound => "application_not_found",
            FailureKind::EmployeeNotFound => "employee_not_found",
            FailureKind::Unauthorized => "unauthorized",
            FailureKind::Unauthenticated => "unauthenticated",
            FailureKind::InvalidRequest => "invalid_request",
            FailureKind::Internal => "internal",
        }
    }
}
