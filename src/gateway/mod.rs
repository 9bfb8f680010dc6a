//! Remote lookups and the invitation endpoint the wizard consumes.

pub mod api;
pub mod error;
pub mod filters;
pub mod local;
pub mod types;

pub use api::ApiClient;
pub use error::{GatewayError, InviteError};
pub use filters::FilterBuilder;
pub use local::{DirectoryFile, DirectoryRole, LocalDirectory, LocalInvitations, MembershipRecord};
pub use types::{
    Candidate, InviteReceipt, InviteRequest, Invitee, Principal, PrincipalQuery, PrincipalStatus,
    PrincipalType, Role, ALL_PRINCIPAL_TYPES,
};

/// Candidate lookups. Implementations are called from search worker threads.
pub trait LookupGateway: Send + Sync {
    /// Principals of `query.principal_type` matching the term, excluding locked ones.
    fn principals(&self, query: &PrincipalQuery) -> Result<Vec<Principal>, GatewayError>;

    fn roles(&self, term: &str) -> Result<Vec<Role>, GatewayError>;
}

pub trait InvitationApi {
    fn invite(&self, request: &InviteRequest) -> Result<InviteReceipt, InviteError>;
}

impl<T: InvitationApi + ?Sized> InvitationApi for Box<T> {
    fn invite(&self, request: &InviteRequest) -> Result<InviteReceipt, InviteError> {
        (**self).invite(request)
    }
}
