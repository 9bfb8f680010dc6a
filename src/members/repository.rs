use super::Member;
use crate::gateway::{Principal, Role};
use crate::shared::{PrincipalId, ProjectId, RoleId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.join("; "))]
pub struct RepositoryError(pub Vec<String>);

impl RepositoryError {
    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }
}

/// Member attributes after contract validation, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub project_id: ProjectId,
    pub principal: Principal,
    pub roles: Vec<Role>,
    pub notification_message: String,
}

pub trait MembershipRepository {
    fn is_member(
        &self,
        project_id: &ProjectId,
        principal_id: &PrincipalId,
    ) -> Result<bool, RepositoryError>;

    fn is_role_assignable(&self, role_id: &RoleId) -> Result<bool, RepositoryError>;

    fn save(&self, member: NewMember) -> Result<Member, RepositoryError>;
}
