use super::{
    Member, MemberEvent, MembershipRepository, NewMember, NotificationSink, RepositoryError,
};
use crate::gateway::{Principal, Role};
use crate::shared::ProjectId;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMemberParams {
    pub project_id: ProjectId,
    pub principal: Principal,
    pub roles: Vec<Role>,
    pub notification_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    PrincipalLocked { principal: String },
    NoRoles,
    RoleNotAssignable { role: String },
    AlreadyMember { principal: String },
}

impl std::fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrincipalLocked { principal } => write!(f, "principal `{principal}` is locked"),
            Self::NoRoles => write!(f, "at least one role is required"),
            Self::RoleNotAssignable { role } => write!(f, "role `{role}` is not assignable"),
            Self::AlreadyMember { principal } => {
                write!(f, "principal `{principal}` is already a member")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreateMemberError {
    #[error("member contract failed: {}", format_violations(.0))]
    Contract(Vec<ContractViolation>),
    #[error("failed to save member: {0}")]
    Persist(RepositoryError),
}

fn format_violations(violations: &[ContractViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates, persists and announces a new project member.
///
/// Nothing is saved when the contract fails, and the `member_created` event
/// is sent only after the repository accepted the record.
pub struct CreateMemberService {
    repository: Arc<dyn MembershipRepository + Send + Sync>,
    notifications: Arc<dyn NotificationSink + Send + Sync>,
}

impl CreateMemberService {
    pub fn new(
        repository: Arc<dyn MembershipRepository + Send + Sync>,
        notifications: Arc<dyn NotificationSink + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            notifications,
        }
    }

    pub fn call(&self, params: CreateMemberParams) -> Result<Member, CreateMemberError> {
        let draft = self.set_attributes(params)?;
        let member = self
            .repository
            .save(draft)
            .map_err(CreateMemberError::Persist)?;
        self.notifications.send(&MemberEvent::Created {
            member: member.clone(),
        });
        Ok(member)
    }

    fn set_attributes(&self, params: CreateMemberParams) -> Result<NewMember, CreateMemberError> {
        let mut violations = Vec::new();

        if !params.principal.status.is_selectable() {
            violations.push(ContractViolation::PrincipalLocked {
                principal: params.principal.name.clone(),
            });
        }
        if params.roles.is_empty() {
            violations.push(ContractViolation::NoRoles);
        }
        for role in &params.roles {
            let assignable = self
                .repository
                .is_role_assignable(&role.id)
                .map_err(CreateMemberError::Persist)?;
            if !assignable {
                violations.push(ContractViolation::RoleNotAssignable {
                    role: role.name.clone(),
                });
            }
        }
        let already_member = self
            .repository
            .is_member(&params.project_id, &params.principal.id)
            .map_err(CreateMemberError::Persist)?;
        if already_member {
            violations.push(ContractViolation::AlreadyMember {
                principal: params.principal.name.clone(),
            });
        }

        if !violations.is_empty() {
            return Err(CreateMemberError::Contract(violations));
        }

        Ok(NewMember {
            project_id: params.project_id,
            principal: params.principal,
            roles: params.roles,
            notification_message: params.notification_message,
        })
    }
}
