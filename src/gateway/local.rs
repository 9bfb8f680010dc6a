use super::api::name_matches;
use super::{
    GatewayError, InvitationApi, InviteError, InviteReceipt, InviteRequest, Invitee,
    LookupGateway, Principal, PrincipalQuery, PrincipalStatus, PrincipalType, Role,
};
use crate::members::{
    ContractViolation, CreateMemberError, CreateMemberParams, CreateMemberService, Member,
    MembershipRepository, NewMember, NotificationSink, RepositoryError,
};
use crate::shared::fs_atomic::atomic_write_file;
use crate::shared::{MemberId, PrincipalId, ProjectId, RoleId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DirectoryRole {
    pub id: RoleId,
    pub name: String,
    #[serde(default = "default_true")]
    pub grantable: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MembershipRecord {
    pub id: MemberId,
    pub project_id: ProjectId,
    pub principal_id: PrincipalId,
    pub role_ids: Vec<RoleId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DirectoryFile {
    #[serde(default)]
    pub principals: Vec<Principal>,
    #[serde(default)]
    pub roles: Vec<DirectoryRole>,
    #[serde(default)]
    pub memberships: Vec<MembershipRecord>,
}

/// YAML-backed principal/role/membership store for offline use.
///
/// Saves are written back atomically so a second process sees new members.
#[derive(Debug)]
pub struct LocalDirectory {
    path: PathBuf,
    state: Mutex<DirectoryFile>,
}

impl LocalDirectory {
    pub fn open(path: &Path) -> Result<Self, GatewayError> {
        let raw = fs::read_to_string(path).map_err(|source| GatewayError::DirectoryRead {
            path: path.display().to_string(),
            source,
        })?;
        let state: DirectoryFile =
            serde_yaml::from_str(&raw).map_err(|source| GatewayError::DirectoryParse {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> DirectoryFile {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut DirectoryFile) -> T,
    ) -> Result<T, RepositoryError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| RepositoryError::single("directory lock poisoned"))?;
        Ok(f(&mut state))
    }

    fn persist(&self, state: &DirectoryFile) -> Result<(), RepositoryError> {
        let body = serde_yaml::to_string(state)
            .map_err(|e| RepositoryError::single(format!("failed to encode directory: {e}")))?;
        atomic_write_file(&self.path, body.as_bytes()).map_err(|e| {
            RepositoryError::single(format!(
                "failed to write directory {}: {e}",
                self.path.display()
            ))
        })
    }

    fn find_principal(&self, invitee: &Invitee) -> Result<Option<Principal>, RepositoryError> {
        self.with_state(|state| {
            state
                .principals
                .iter()
                .find(|principal| match invitee {
                    Invitee::Principal { id, kind } => {
                        &principal.id == id && principal.kind == *kind
                    }
                    Invitee::Email(email) => principal
                        .email
                        .as_deref()
                        .is_some_and(|known| known.eq_ignore_ascii_case(email)),
                })
                .cloned()
        })
    }

    /// Drafts an invited user for an email address with no matching principal.
    ///
    /// The draft is only written to disk by [`MembershipRepository::save`].
    fn draft_invited_user(&self, email: &str) -> Result<Principal, RepositoryError> {
        self.with_state(|state| Principal {
            id: next_id(state.principals.iter().map(|p| p.id.as_str())),
            name: email.to_string(),
            email: Some(email.to_string()),
            kind: PrincipalType::User,
            status: PrincipalStatus::Invited,
        })
    }

    fn find_role(&self, role_id: &RoleId) -> Result<Option<Role>, RepositoryError> {
        self.with_state(|state| {
            state
                .roles
                .iter()
                .find(|role| &role.id == role_id)
                .map(|role| Role {
                    id: role.id.clone(),
                    name: role.name.clone(),
                })
        })
    }
}

fn next_id<'a, T>(existing: impl Iterator<Item = &'a str>) -> T
where
    T: TryFrom<String>,
    T::Error: std::fmt::Debug,
{
    let next = existing
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    match T::try_from(next.to_string()) {
        Ok(id) => id,
        // Numeric strings always satisfy the identifier rules.
        Err(err) => unreachable!("numeric id rejected: {err:?}"),
    }
}

impl LookupGateway for LocalDirectory {
    fn principals(&self, query: &PrincipalQuery) -> Result<Vec<Principal>, GatewayError> {
        let state = self
            .state
            .lock()
            .map_err(|_| GatewayError::Request("directory lock poisoned".to_string()))?;
        Ok(state
            .principals
            .iter()
            .filter(|principal| principal.kind == query.principal_type)
            .filter(|principal| principal.status.is_selectable())
            .filter(|principal| {
                name_matches(&principal.name, &query.term)
                    || principal
                        .email
                        .as_deref()
                        .is_some_and(|email| name_matches(email, &query.term))
            })
            .cloned()
            .collect())
    }

    fn roles(&self, term: &str) -> Result<Vec<Role>, GatewayError> {
        let state = self
            .state
            .lock()
            .map_err(|_| GatewayError::Request("directory lock poisoned".to_string()))?;
        Ok(state
            .roles
            .iter()
            .filter(|role| role.grantable && name_matches(&role.name, term))
            .map(|role| Role {
                id: role.id.clone(),
                name: role.name.clone(),
            })
            .collect())
    }
}

impl MembershipRepository for LocalDirectory {
    fn is_member(
        &self,
        project_id: &ProjectId,
        principal_id: &PrincipalId,
    ) -> Result<bool, RepositoryError> {
        self.with_state(|state| {
            state.memberships.iter().any(|membership| {
                &membership.project_id == project_id && &membership.principal_id == principal_id
            })
        })
    }

    fn is_role_assignable(&self, role_id: &RoleId) -> Result<bool, RepositoryError> {
        self.with_state(|state| {
            state
                .roles
                .iter()
                .any(|role| &role.id == role_id && role.grantable)
        })
    }

    fn save(&self, member: NewMember) -> Result<Member, RepositoryError> {
        let (record, registered, snapshot) = self.with_state(|state| {
            let registered = !state
                .principals
                .iter()
                .any(|principal| principal.id == member.principal.id);
            if registered {
                state.principals.push(member.principal.clone());
            }
            let record = MembershipRecord {
                id: next_id(state.memberships.iter().map(|m| m.id.as_str())),
                project_id: member.project_id.clone(),
                principal_id: member.principal.id.clone(),
                role_ids: member.roles.iter().map(|role| role.id.clone()).collect(),
            };
            state.memberships.push(record.clone());
            (record, registered, state.clone())
        })?;
        if let Err(err) = self.persist(&snapshot) {
            let _ = self.with_state(|state| {
                state.memberships.retain(|m| m.id != record.id);
                if registered {
                    state.principals.retain(|p| p.id != member.principal.id);
                }
            });
            return Err(err);
        }
        Ok(Member {
            id: record.id,
            project_id: member.project_id,
            principal: member.principal,
            roles: member.roles,
            notification_message: member.notification_message,
        })
    }
}

/// Invitation backend that runs the create-member service against a [`LocalDirectory`].
pub struct LocalInvitations {
    directory: Arc<LocalDirectory>,
    service: CreateMemberService,
}

impl LocalInvitations {
    pub fn new(
        directory: Arc<LocalDirectory>,
        notifications: Arc<dyn NotificationSink + Send + Sync>,
    ) -> Self {
        let service = CreateMemberService::new(directory.clone(), notifications);
        Self { directory, service }
    }
}

impl InvitationApi for LocalInvitations {
    fn invite(&self, request: &InviteRequest) -> Result<InviteReceipt, InviteError> {
        let invitee = request
            .invitee
            .as_ref()
            .ok_or(InviteError::MissingAnswer("principal"))?;
        let role_id = request
            .role_id
            .as_ref()
            .ok_or(InviteError::MissingAnswer("role"))?;

        let role = self
            .directory
            .find_role(role_id)
            .map_err(transport)?
            .ok_or_else(|| InviteError::RoleNotPermitted {
                role: role_id.to_string(),
            })?;

        let principal = match self.directory.find_principal(invitee).map_err(transport)? {
            Some(principal) => principal,
            None => match invitee {
                Invitee::Email(email) => self
                    .directory
                    .draft_invited_user(email)
                    .map_err(transport)?,
                Invitee::Principal { .. } => {
                    return Err(InviteError::Rejected(vec![format!(
                        "{} does not exist",
                        invitee.describe()
                    )]))
                }
            },
        };

        let member = self
            .service
            .call(CreateMemberParams {
                project_id: request.project_id.clone(),
                principal,
                roles: vec![role],
                notification_message: request.message.clone(),
            })
            .map_err(invite_error_from_create)?;
        Ok(InviteReceipt {
            member_id: member.id,
            principal_name: member.principal.name,
        })
    }
}

fn transport(err: RepositoryError) -> InviteError {
    InviteError::Transport(err.to_string())
}

fn invite_error_from_create(err: CreateMemberError) -> InviteError {
    match err {
        CreateMemberError::Contract(violations) => {
            for violation in &violations {
                match violation {
                    ContractViolation::AlreadyMember { principal } => {
                        return InviteError::AlreadyMember {
                            principal: principal.clone(),
                        }
                    }
                    ContractViolation::RoleNotAssignable { role } => {
                        return InviteError::RoleNotPermitted { role: role.clone() }
                    }
                    ContractViolation::PrincipalLocked { .. } | ContractViolation::NoRoles => {}
                }
            }
            InviteError::Rejected(violations.iter().map(ToString::to_string).collect())
        }
        CreateMemberError::Persist(err) => InviteError::Rejected(err.0),
    }
}
