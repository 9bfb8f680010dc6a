use crate::shared::{MemberId, PrincipalId, ProjectId, RoleId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalType {
    User,
    Group,
    Placeholder,
}

pub const ALL_PRINCIPAL_TYPES: [PrincipalType; 3] = [
    PrincipalType::User,
    PrincipalType::Group,
    PrincipalType::Placeholder,
];

impl PrincipalType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Placeholder => "placeholder",
        }
    }

    /// Resource type name used by the API filters and HAL `_type` fields.
    pub fn api_type_name(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Group => "Group",
            Self::Placeholder => "PlaceholderUser",
        }
    }

    pub fn api_collection(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Group => "groups",
            Self::Placeholder => "placeholder_users",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "group" => Ok(Self::Group),
            "placeholder" | "placeholderuser" | "placeholder_user" => Ok(Self::Placeholder),
            _ => Err("principal type must be one of: user, group, placeholder".to_string()),
        }
    }

    pub fn from_api_type_name(raw: &str) -> Option<Self> {
        ALL_PRINCIPAL_TYPES
            .into_iter()
            .find(|kind| kind.api_type_name() == raw)
    }
}

impl std::fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalStatus {
    #[default]
    Active,
    Registered,
    Invited,
    Locked,
}

impl PrincipalStatus {
    /// Locked principals (status code 3) are never offered as candidates.
    pub fn is_selectable(self) -> bool {
        self != Self::Locked
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub kind: PrincipalType,
    #[serde(default)]
    pub status: PrincipalStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

/// A record returned by a lookup and eligible for selection in a wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    PrincipalType(PrincipalType),
    Principal(Principal),
    Role(Role),
}

impl Candidate {
    pub fn display_name(&self) -> String {
        match self {
            Self::PrincipalType(kind) => kind.as_str().to_string(),
            Self::Principal(principal) => match &principal.email {
                Some(email) if email != &principal.name => {
                    format!("{} <{}>", principal.name, email)
                }
                _ => principal.name.clone(),
            },
            Self::Role(role) => role.name.clone(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::PrincipalType(kind) => kind.as_str(),
            Self::Principal(principal) => &principal.name,
            Self::Role(role) => &role.name,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Principal(principal) => principal.email.as_deref(),
            Self::PrincipalType(_) | Self::Role(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalQuery {
    pub term: String,
    pub project_id: ProjectId,
    pub principal_type: PrincipalType,
}

/// Who receives the invitation: an existing principal or a raw email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invitee {
    Principal { id: PrincipalId, kind: PrincipalType },
    Email(String),
}

impl Invitee {
    pub fn describe(&self) -> String {
        match self {
            Self::Principal { id, kind } => format!("{kind} {id}"),
            Self::Email(email) => email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteRequest {
    pub project_id: ProjectId,
    pub invitee: Option<Invitee>,
    pub role_id: Option<RoleId>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteReceipt {
    pub member_id: MemberId,
    pub principal_name: String,
}
