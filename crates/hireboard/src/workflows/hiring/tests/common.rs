use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::workflows::hiring::domain::{
    ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationStatus, Company, CompanyId,
    Employee, EmployeeId, Position, PositionFilter, PositionId, PositionStatus, SalaryRange,
    UserId,
};
use crate::workflows::hiring::identity::Actor;
use crate::workflows::hiring::memory::MemoryHiringStore;
use crate::workflows::hiring::messages::Locale;
use crate::workflows::hiring::notification::{
    DecisionTemplates, DispatchError, MailMessage, NotificationDispatcher,
};
use crate::workflows::hiring::service::{HiringWorkflowService, WorkflowPolicy};
use crate::workflows::hiring::store::{
    ApplicationLedger, EmployeeDirectory, HiringStore, PositionCatalog, StoreError,
    TransitionChange,
};

pub(super) const ACME: &str = "acme";
pub(super) const RHINO: &str = "rhino";
pub(super) const GLOBEX: &str = "globex";

pub(super) fn position(id: &str, company: &str, status: PositionStatus) -> Position {
    let now = Utc::now();
    Position {
        id: PositionId(id.to_string()),
        position_name: format!("{id} engineer"),
        capacity: 5,
        status,
        submission_start_date: now - Duration::days(7),
        submission_end_date: now + Duration::days(30),
        salary: Some(SalaryRange {
            min: 8_000_000,
            max: 12_000_000,
        }),
        company_id: CompanyId(company.to_string()),
    }
}

pub(super) fn employee(id: &str, user: &str) -> Employee {
    Employee {
        id: EmployeeId(id.to_string()),
        name: format!("Applicant {id}"),
        user_id: UserId(user.to_string()),
        email: format!("{id}@example.com"),
        company_id: None,
    }
}

/// Store seeded with three companies, positions P/Q (acme, open), P2 (acme, closed),
/// R (rhino, open), and employees E and F.
pub(super) fn seeded_store() -> MemoryHiringStore {
    let store = MemoryHiringStore::new();
    for (id, name) in [(ACME, "Acme Corp"), (RHINO, "Rhino Labs"), (GLOBEX, "Globex")] {
        store.insert_company(Company {
            id: CompanyId(id.to_string()),
            name: name.to_string(),
        });
    }
    store.insert_position(position("pos-p", ACME, PositionStatus::Open));
    store.insert_position(position("pos-q", ACME, PositionStatus::Open));
    store.insert_position(position("pos-p2", ACME, PositionStatus::Closed));
    store.insert_position(position("pos-r", RHINO, PositionStatus::Open));
    store.insert_employee(employee("emp-e", "u-e"));
    store.insert_employee(employee("emp-f", "u-f"));
    store
}

pub(super) fn seeker_e() -> Actor {
    Actor::job_seeker("u-e")
}

pub(super) fn seeker_f() -> Actor {
    Actor::job_seeker("u-f")
}

pub(super) fn hr_acme() -> Actor {
    Actor::hr("u-hr-acme", ACME)
}

pub(super) fn hr_globex() -> Actor {
    Actor::hr("u-hr-globex", GLOBEX)
}

pub(super) fn admin() -> Actor {
    Actor::admin("u-admin")
}

pub(super) fn pid(id: &str) -> PositionId {
    PositionId(id.to_string())
}

pub(super) fn eid(id: &str) -> EmployeeId {
    EmployeeId(id.to_string())
}

pub(super) type TestService<N> = HiringWorkflowService<MemoryHiringStore, N>;

pub(super) fn build_service_with(
    policy: WorkflowPolicy,
) -> (
    Arc<TestService<RecordingDispatcher>>,
    Arc<MemoryHiringStore>,
    Arc<RecordingDispatcher>,
) {
    let store = Arc::new(seeded_store());
    let mail = Arc::new(RecordingDispatcher::default());
    let service = Arc::new(HiringWorkflowService::new(
        store.clone(),
        mail.clone(),
        DecisionTemplates::new("careers@hireboard.local", Locale::En),
        policy,
    ));
    (service, store, mail)
}

pub(super) fn build_service() -> (
    Arc<TestService<RecordingDispatcher>>,
    Arc<MemoryHiringStore>,
    Arc<RecordingDispatcher>,
) {
    build_service_with(WorkflowPolicy::default())
}

pub(super) fn build_failing_service() -> (
    Arc<TestService<FailingDispatcher>>,
    Arc<MemoryHiringStore>,
) {
    let store = Arc::new(seeded_store());
    let service = Arc::new(HiringWorkflowService::new(
        store.clone(),
        Arc::new(FailingDispatcher),
        DecisionTemplates::new("careers@hireboard.local", Locale::En),
        WorkflowPolicy::default(),
    ));
    (service, store)
}

pub(super) fn affiliation(store: &MemoryHiringStore, employee: &str) -> Option<CompanyId> {
    store
        .find_employee(&eid(employee))
        .expect("lookup succeeds")
        .expect("employee present")
        .company_id
}

pub(super) fn stored_status(store: &MemoryHiringStore, id: &ApplicationId) -> ApplicationStatus {
    store
        .fetch(id)
        .expect("fetch succeeds")
        .expect("record present")
        .applying_status
}

#[derive(Default)]
pub(super) struct RecordingDispatcher {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingDispatcher {
    pub(super) fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().expect("mail mutex poisoned").clone()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn send(&self, message: MailMessage) -> Result<(), DispatchError> {
        self.sent
            .lock()
            .expect("mail mutex poisoned")
            .push(message);
        Ok(())
    }
}

pub(super) struct FailingDispatcher;

impl NotificationDispatcher for FailingDispatcher {
    fn send(&self, _message: MailMessage) -> Result<(), DispatchError> {
        Err(DispatchError::Transport("smtp timeout".to_string()))
    }
}

pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl ApplicationLedger for UnavailableStore {
    fn insert(
        &self,
        _employee_id: &EmployeeId,
        _position_id: &PositionId,
        _apply_date: DateTime<Utc>,
    ) -> Result<ApplicationRecord, StoreError> {
        offline()
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        offline()
    }

    fn find_active(
        &self,
        _employee_id: &EmployeeId,
        _position_id: &PositionId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        offline()
    }

    fn list(&self, _filter: &ApplicationFilter) -> Result<Vec<ApplicationRecord>, StoreError> {
        offline()
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError> {
        offline()
    }

    fn delete(&self, _id: &ApplicationId) -> Result<ApplicationRecord, StoreError> {
        offline()
    }
}

impl PositionCatalog for UnavailableStore {
    fn find_position(&self, _id: &PositionId) -> Result<Option<Position>, StoreError> {
        offline()
    }

    fn find_positions(&self, _filter: &PositionFilter) -> Result<Vec<Position>, StoreError> {
        offline()
    }

    fn find_company(&self, _id: &CompanyId) -> Result<Option<Company>, StoreError> {
        offline()
    }
}

impl EmployeeDirectory for UnavailableStore {
    fn find_employee(&self, _id: &EmployeeId) -> Result<Option<Employee>, StoreError> {
        offline()
    }

    fn find_employee_by_user(&self, _user_id: &UserId) -> Result<Option<Employee>, StoreError> {
        offline()
    }
}

impl HiringStore for UnavailableStore {
    fn commit_transition(
        &self,
        _change: &TransitionChange,
    ) -> Result<(ApplicationRecord, Employee), StoreError> {
        offline()
    }
}

pub(super) fn unavailable_service() -> Arc<HiringWorkflowService<UnavailableStore, RecordingDispatcher>>
{
    Arc::new(HiringWorkflowService::new(
        Arc::new(UnavailableStore),
        Arc::new(RecordingDispatcher::default()),
        DecisionTemplates::new("careers@hireboard.local", Locale::En),
        WorkflowPolicy::default(),
    ))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
