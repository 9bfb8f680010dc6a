#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("lookup request failed: {0}")]
    Request(String),
    #[error("lookup returned http {status}: {message}")]
    Response { status: u16, message: String },
    #[error("lookup response could not be decoded: {0}")]
    Decode(String),
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid directory yaml in {path}: {source}")]
    DirectoryParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Structured failure of an invitation attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InviteError {
    #[error("`{0}` must be answered before sending the invitation")]
    MissingAnswer(&'static str),
    #[error("{principal} is already a member of this project")]
    AlreadyMember { principal: String },
    #[error("role `{role}` cannot be assigned in this project")]
    RoleNotPermitted { role: String },
    #[error("invitation rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),
    #[error("invitation request failed: {0}")]
    Transport(String),
}
