//! Membership creation: the service a backend runs when an invitation lands.

pub mod create_service;
pub mod notifications;
pub mod repository;

pub use create_service::{
    ContractViolation, CreateMemberError, CreateMemberParams, CreateMemberService,
};
pub use notifications::{LogNotifications, MemberEvent, NotificationSink, RecordingNotifications};
pub use repository::{MembershipRepository, NewMember, RepositoryError};

use crate::gateway::{Principal, Role};
use crate::shared::{MemberId, ProjectId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub project_id: ProjectId,
    pub principal: Principal,
    pub roles: Vec<Role>,
    pub notification_message: String,
}
