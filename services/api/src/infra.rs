use chrono::{DateTime, Duration, Utc};
use hireboard::workflows::hiring::{
    Company, CompanyId, DispatchError, Employee, EmployeeId, Locale, MailMessage,
    MemoryHiringStore, NotificationDispatcher, Position, PositionId, PositionStatus, SalaryRange,
    UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in for the outbound mail provider: logs each message and keeps a copy.
#[derive(Default, Clone)]
pub(crate) struct LoggingMailDispatcher {
    outbox: Arc<Mutex<Vec<MailMessage>>>,
}

impl NotificationDispatcher for LoggingMailDispatcher {
    fn send(&self, message: MailMessage) -> Result<(), DispatchError> {
        info!(to = %message.to, subject = %message.subject, "decision mail dispatched");
        let mut guard = self
            .outbox
            .lock()
            .map_err(|_| DispatchError::Transport("outbox mutex poisoned".to_string()))?;
        guard.push(message);
        Ok(())
    }
}

impl LoggingMailDispatcher {
    pub(crate) fn sent(&self) -> Vec<MailMessage> {
        self.outbox
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

fn posting(
    id: &str,
    name: &str,
    company: &str,
    status: PositionStatus,
    now: DateTime<Utc>,
) -> Position {
    Position {
        id: PositionId(id.to_string()),
        position_name: name.to_string(),
        capacity: 5,
        status,
        submission_start_date: now - Duration::days(14),
        submission_end_date: now + Duration::days(30),
        salary: Some(SalaryRange {
            min: 9_000_000,
            max: 15_000_000,
        }),
        company_id: CompanyId(company.to_string()),
    }
}

fn job_seeker(id: &str, name: &str, user: &str, email: &str) -> Employee {
    Employee {
        id: EmployeeId(id.to_string()),
        name: name.to_string(),
        user_id: UserId(user.to_string()),
        email: email.to_string(),
        company_id: None,
    }
}

/// Sample catalog used by `serve` and `demo`: two companies, four postings, two job seekers.
pub(crate) fn seeded_store(now: DateTime<Utc>) -> MemoryHiringStore {
    let store = MemoryHiringStore::new();
    store.insert_company(Company {
        id: CompanyId("nusantara".to_string()),
        name: "Nusantara Digital".to_string(),
    });
    store.insert_company(Company {
        id: CompanyId("rimba".to_string()),
        name: "Rimba Logistics".to_string(),
    });

    store.insert_position(posting(
        "backend-engineer",
        "Backend Engineer",
        "nusantara",
        PositionStatus::Open,
        now,
    ));
    store.insert_position(posting(
        "qa-analyst",
        "QA Analyst",
        "nusantara",
        PositionStatus::Open,
        now,
    ));
    store.insert_position(posting(
        "data-engineer",
        "Data Engineer",
        "nusantara",
        PositionStatus::Closed,
        now,
    ));
    store.insert_position(posting(
        "fleet-planner",
        "Fleet Planner",
        "rimba",
        PositionStatus::Open,
        now,
    ));

    store.insert_employee(job_seeker(
        "emp-ayu",
        "Ayu Lestari",
        "user-ayu",
        "ayu@example.com",
    ));
    store.insert_employee(job_seeker(
        "emp-budi",
        "Budi Santoso",
        "user-budi",
        "budi@example.com",
    ));
    store
}

pub(crate) fn parse_locale(raw: &str) -> Result<Locale, String> {
    Locale::parse(raw).ok_or_else(|| format!("unsupported locale '{raw}' (expected en or id)"))
}
