use serde::{Deserialize, Serialize};

use super::domain::{CompanyId, UserId};

/// Role attached to the current session. HR staff are scoped to exactly one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    JobSeeker,
    #[serde(rename = "hr")]
    HumanResource {
        company_id: CompanyId,
    },
    Admin,
}

/// Caller identity passed explicitly into every workflow operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    #[serde(flatten)]
    pub role: Role,
}

impl Actor {
    pub fn job_seeker(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role: Role::JobSeeker,
        }
    }

    pub fn hr(user_id: impl Into<String>, company_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role: Role::HumanResource {
                company_id: CompanyId(company_id.into()),
            },
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Whether the actor holds a reviewer role at all (HR of any company, or admin).
    pub fn is_reviewer(&self) -> bool {
        matches!(self.role, Role::Admin | Role::HumanResource { .. })
    }

    /// Whether the actor may review applications to positions owned by `company`.
    pub fn can_review_for(&self, company: &CompanyId) -> bool {
        match &self.role {
            Role::Admin => true,
            Role::HumanResource { company_id } => company_id == company,
            Role::JobSeeker => false,
        }
    }
}
