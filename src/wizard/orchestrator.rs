use super::answers::{AnswerSet, AnswerValue};
use super::machine::{CommitHandler, CommitOutcome};
use super::steps::{AnswerKey, CommitAction};
use super::ProjectContext;
use crate::gateway::{InvitationApi, InviteError, InviteReceipt, InviteRequest, Invitee};
use crate::shared::EventLog;

/// What the host should do with the wizard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    Close,
}

/// Turns a finished answer set into one call against the invitation API.
pub struct InvitationOrchestrator<A: InvitationApi> {
    api: A,
    context: ProjectContext,
    log: EventLog,
}

impl<A: InvitationApi> InvitationOrchestrator<A> {
    pub fn new(api: A, context: ProjectContext, log: EventLog) -> Self {
        Self { api, context, log }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Request for the current answers. Only selected records contribute ids;
    /// free text never stands in for a principal or role.
    pub fn build_request(&self, answers: &AnswerSet) -> InviteRequest {
        let invitee = match answers.get(AnswerKey::Principal) {
            Some(AnswerValue::Principal(principal)) => Some(Invitee::Principal {
                id: principal.id.clone(),
                kind: principal.kind,
            }),
            Some(AnswerValue::EmailInvite(invite)) => Some(Invitee::Email(invite.email.clone())),
            _ => None,
        };
        let role_id = match answers.get(AnswerKey::Role) {
            Some(AnswerValue::Role(role)) => Some(role.id.clone()),
            _ => None,
        };
        InviteRequest {
            project_id: self.context.id.clone(),
            invitee,
            role_id,
            message: answers
                .text(AnswerKey::Message)
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn invite(&self, request: &InviteRequest) -> Result<InviteReceipt, InviteError> {
        match self.api.invite(request) {
            Ok(receipt) => {
                self.log.info(
                    "invite.sent",
                    &format!(
                        "project={} invitee={} member={}",
                        request.project_id, receipt.principal_name, receipt.member_id
                    ),
                );
                Ok(receipt)
            }
            Err(err) => {
                self.log.warn(
                    "invite.failed",
                    &format!("project={} error={err}", request.project_id),
                );
                Err(err)
            }
        }
    }

    pub fn final_action(&self) -> SessionSignal {
        SessionSignal::Close
    }
}

impl<A: InvitationApi> CommitHandler for InvitationOrchestrator<A> {
    fn commit(
        &mut self,
        action: CommitAction,
        answers: &AnswerSet,
    ) -> Result<CommitOutcome, InviteError> {
        match action {
            CommitAction::InviteMember => {
                let request = self.build_request(answers);
                self.invite(&request).map(CommitOutcome::Invited)
            }
            CommitAction::Finish => match self.final_action() {
                SessionSignal::Close => Ok(CommitOutcome::Closed),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Principal, PrincipalStatus, PrincipalType, Role};
    use crate::shared::{MemberId, PrincipalId, ProjectId, RoleId};
    use crate::wizard::answers::EmailInvite;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingApi {
        requests: RefCell<Vec<InviteRequest>>,
    }

    impl InvitationApi for RecordingApi {
        fn invite(&self, request: &InviteRequest) -> Result<InviteReceipt, InviteError> {
            self.requests.borrow_mut().push(request.clone());
            Ok(InviteReceipt {
                member_id: MemberId::parse("9").expect("member"),
                principal_name: request
                    .invitee
                    .as_ref()
                    .map(Invitee::describe)
                    .unwrap_or_default(),
            })
        }
    }

    fn orchestrator() -> InvitationOrchestrator<RecordingApi> {
        InvitationOrchestrator::new(
            RecordingApi::default(),
            ProjectContext::new(ProjectId::parse("42").expect("project"), "Apollo"),
            EventLog::disabled(),
        )
    }

    #[test]
    fn build_request_uses_selected_ids_and_project_context() {
        let orchestrator = orchestrator();
        let mut answers = AnswerSet::default();
        answers.set(
            AnswerKey::Principal,
            AnswerValue::Principal(Principal {
                id: PrincipalId::parse("5").expect("principal"),
                name: "Ada".to_string(),
                email: None,
                kind: PrincipalType::Group,
                status: PrincipalStatus::Active,
            }),
        );
        answers.set(
            AnswerKey::Role,
            AnswerValue::Role(Role {
                id: RoleId::parse("3").expect("role"),
                name: "Member".to_string(),
            }),
        );
        answers.set(AnswerKey::Message, AnswerValue::Text("welcome".to_string()));

        let request = orchestrator.build_request(&answers);
        assert_eq!(request.project_id.as_str(), "42");
        assert_eq!(
            request.invitee,
            Some(Invitee::Principal {
                id: PrincipalId::parse("5").expect("principal"),
                kind: PrincipalType::Group,
            })
        );
        assert_eq!(request.role_id, Some(RoleId::parse("3").expect("role")));
        assert_eq!(request.message, "welcome");
    }

    #[test]
    fn build_request_sends_email_for_placeholder_and_nulls_for_text() {
        let orchestrator = orchestrator();
        let mut answers = AnswerSet::default();
        answers.set(
            AnswerKey::Principal,
            AnswerValue::EmailInvite(EmailInvite::from_input("new@example.com")),
        );
        answers.set(AnswerKey::Role, AnswerValue::Text("Member".to_string()));

        let request = orchestrator.build_request(&answers);
        assert_eq!(
            request.invitee,
            Some(Invitee::Email("new@example.com".to_string()))
        );
        assert_eq!(request.role_id, None);
        assert_eq!(request.message, "");
    }

    #[test]
    fn commit_dispatches_on_action() {
        let mut orchestrator = orchestrator();
        let answers = AnswerSet::default();

        let outcome = orchestrator
            .commit(CommitAction::InviteMember, &answers)
            .expect("invite");
        assert!(matches!(outcome, CommitOutcome::Invited(_)));
        assert_eq!(orchestrator.api().requests.borrow().len(), 1);

        let outcome = orchestrator
            .commit(CommitAction::Finish, &answers)
            .expect("finish");
        assert_eq!(outcome, CommitOutcome::Closed);
        assert_eq!(orchestrator.api().requests.borrow().len(), 1);
        assert_eq!(orchestrator.final_action(), SessionSignal::Close);
    }
}
