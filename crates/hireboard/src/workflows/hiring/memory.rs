use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::domain::{
    ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationStatus, Company, CompanyId,
    Employee, EmployeeId, Position, PositionFilter, PositionId, UserId,
};
use super::store::{
    ApplicationLedger, EmployeeDirectory, HiringStore, PositionCatalog, StoreError,
    TransitionChange,
};

/// Process-local store holding every table behind one lock, so a transition commit and the
/// active-application uniqueness check are each a single critical section.
#[derive(Default)]
pub struct MemoryHiringStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    sequence: u64,
    applications: BTreeMap<ApplicationId, ApplicationRecord>,
    positions: BTreeMap<PositionId, Position>,
    companies: BTreeMap<CompanyId, Company>,
    employees: BTreeMap<EmployeeId, Employee>,
}

impl State {
    fn next_application_id(&mut self) -> ApplicationId {
        self.sequence += 1;
        ApplicationId(format!("app-{:06}", self.sequence))
    }

    fn company_of(&self, position_id: &PositionId) -> Option<&CompanyId> {
        self.positions
            .get(position_id)
            .map(|position| &position.company_id)
    }

    fn matches(&self, record: &ApplicationRecord, filter: &ApplicationFilter) -> bool {
        filter
            .employee_id
            .as_ref()
            .map_or(true, |id| &record.employee_id == id)
            && filter
                .position_id
                .as_ref()
                .map_or(true, |id| &record.position_id == id)
            && filter
                .status
                .map_or(true, |status| record.applying_status == status)
            && filter
                .company_id
                .as_ref()
                .map_or(true, |id| self.company_of(&record.position_id) == Some(id))
    }
}

impl MemoryHiringStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_company(&self, company: Company) {
        self.seed().companies.insert(company.id.clone(), company);
    }

    pub fn insert_position(&self, position: Position) {
        self.seed().positions.insert(position.id.clone(), position);
    }

    pub fn insert_employee(&self, employee: Employee) {
        self.seed().employees.insert(employee.id.clone(), employee);
    }

    pub fn application_count(&self) -> usize {
        self.seed().applications.len()
    }

    fn seed(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl ApplicationLedger for MemoryHiringStore {
    fn insert(
        &self,
        employee_id: &EmployeeId,
        position_id: &PositionId,
        apply_date: DateTime<Utc>,
    ) -> Result<ApplicationRecord, StoreError> {
        let mut state = self.state()?;
        let duplicate = state.applications.values().any(|record| {
            record.is_active()
                && &record.employee_id == employee_id
                && &record.position_id == position_id
        });
        if duplicate {
            return Err(StoreError::Conflict);
        }

        let record = ApplicationRecord {
            id: state.next_application_id(),
            employee_id: employee_id.clone(),
            position_id: position_id.clone(),
            applying_status: ApplicationStatus::Pending,
            apply_date,
        };
        state
            .applications
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        Ok(self.state()?.applications.get(id).cloned())
    }

    fn find_active(
        &self,
        employee_id: &EmployeeId,
        position_id: &PositionId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let state = self.state()?;
        Ok(state
            .applications
            .values()
            .find(|record| {
                record.is_active()
                    && &record.employee_id == employee_id
                    && &record.position_id == position_id
            })
            .cloned())
    }

    fn list(&self, filter: &ApplicationFilter) -> Result<Vec<ApplicationRecord>, StoreError> {
        let state = self.state()?;
        let mut records: Vec<ApplicationRecord> = state
            .applications
            .values()
            .filter(|record| state.matches(record, filter))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.apply_date.cmp(&b.apply_date).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError> {
        let mut state = self.state()?;
        let record = state.applications.get_mut(id).ok_or(StoreError::NotFound)?;
        record.applying_status = status;
        Ok(record.clone())
    }

    fn delete(&self, id: &ApplicationId) -> Result<ApplicationRecord, StoreError> {
        self.state()?
            .applications
            .remove(id)
            .ok_or(StoreError::NotFound)
    }
}

impl PositionCatalog for MemoryHiringStore {
    fn find_position(&self, id: &PositionId) -> Result<Option<Position>, StoreError> {
        Ok(self.state()?.positions.get(id).cloned())
    }

    fn find_positions(&self, filter: &PositionFilter) -> Result<Vec<Position>, StoreError> {
        let state = self.state()?;
        Ok(state
            .positions
            .values()
            .filter(|position| {
                filter
                    .company_id
                    .as_ref()
                    .map_or(true, |id| &position.company_id == id)
                    && filter
                        .status
                        .map_or(true, |status| position.status == status)
            })
            .cloned()
            .collect())
    }

    fn find_company(&self, id: &CompanyId) -> Result<Option<Company>, StoreError> {
        Ok(self.state()?.companies.get(id).cloned())
    }
}

impl EmployeeDirectory for MemoryHiringStore {
    fn find_employee(&self, id: &EmployeeId) -> Result<Option<Employee>, StoreError> {
        Ok(self.state()?.employees.get(id).cloned())
    }

    fn find_employee_by_user(&self, user_id: &UserId) -> Result<Option<Employee>, StoreError> {
        let state = self.state()?;
        Ok(state
            .employees
            .values()
            .find(|employee| &employee.user_id == user_id)
            .cloned())
    }
}

impl HiringStore for MemoryHiringStore {
    fn commit_transition(
        &self,
        change: &TransitionChange,
    ) -> Result<(ApplicationRecord, Employee), StoreError> {
        let mut state = self.state()?;
        if !state.applications.contains_key(&change.application_id)
            || !state.employees.contains_key(&change.employee_id)
        {
            return Err(StoreError::NotFound);
        }

        let mut record = state.applications[&change.application_id].clone();
        if change.status.is_active()
            && state.applications.values().any(|other| {
                other.id != record.id
                    && other.employee_id == record.employee_id
                    && other.position_id == record.position_id
                    && other.is_active()
            })
        {
            return Err(StoreError::Conflict);
        }
        record.applying_status = change.status;
        let mut employee = state.employees[&change.employee_id].clone();
        employee.company_id = change.affiliation.clone();

        state
            .applications
            .insert(record.id.clone(), record.clone());
        state
            .employees
            .insert(employee.id.clone(), employee.clone());
        Ok((record, employee))
    }
}
