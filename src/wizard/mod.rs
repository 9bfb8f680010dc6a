//! The invitation wizard: step table, answers, state machine, search and commit.

pub mod answers;
pub mod machine;
pub mod orchestrator;
pub mod principal_search;
pub mod search;
pub mod session;
pub mod steps;

pub use answers::{input_is_email, input_is_valid_email, AnswerSet, AnswerValue, EmailInvite};
pub use machine::{
    AdvanceOutcome, CommitHandler, CommitOutcome, FocusTarget, InviteWizard, WizardEffect,
    WizardError,
};
pub use orchestrator::{InvitationOrchestrator, SessionSignal};
pub use principal_search::{can_create_new, can_invite_by_email};
pub use search::{CandidateSource, Debouncer, SearchBatch, SearchChannel, DEFAULT_QUIESCENCE};
pub use session::{GatewayLookup, InviteSession, SessionAction, SessionExit, SessionOption};
pub use steps::{invite_steps, AnswerKey, CommitAction, FieldKind, LookupKind, StepDescriptor};

use crate::shared::ProjectId;

/// The project the invitation targets, passed in explicitly by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub id: ProjectId,
    pub name: String,
}

impl ProjectContext {
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
