use inviteflow::gateway::{
    InvitationApi, InviteError, InviteReceipt, InviteRequest, Invitee, LocalDirectory,
    LocalInvitations, Principal, PrincipalStatus, PrincipalType, Role,
};
use inviteflow::members::{MemberEvent, RecordingNotifications};
use inviteflow::shared::{event_log_path, EventLog, MemberId, PrincipalId, ProjectId, RoleId};
use inviteflow::wizard::{
    AdvanceOutcome, AnswerKey, AnswerValue, InvitationOrchestrator, InviteSession, InviteWizard,
    ProjectContext, SessionAction, SessionExit, WizardEffect,
};
use std::cell::RefCell;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

#[derive(Default)]
struct CountingApi {
    requests: RefCell<Vec<InviteRequest>>,
}

impl InvitationApi for CountingApi {
    fn invite(&self, request: &InviteRequest) -> Result<InviteReceipt, InviteError> {
        self.requests.borrow_mut().push(request.clone());
        Ok(InviteReceipt {
            member_id: MemberId::parse("501").expect("member"),
            principal_name: "Ada Lovelace".to_string(),
        })
    }
}

fn context() -> ProjectContext {
    ProjectContext::new(ProjectId::parse("demo").expect("project"), "Demo")
}

#[test]
fn six_step_wizard_invites_exactly_once_and_closes() {
    let mut wizard = InviteWizard::new(context());
    let mut orchestrator =
        InvitationOrchestrator::new(CountingApi::default(), context(), EventLog::disabled());

    wizard.answer(
        AnswerKey::PrincipalType,
        AnswerValue::PrincipalType(PrincipalType::User),
    );
    wizard.answer(
        AnswerKey::Principal,
        AnswerValue::Principal(Principal {
            id: PrincipalId::parse("4").expect("principal"),
            name: "Ada Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            kind: PrincipalType::User,
            status: PrincipalStatus::Active,
        }),
    );
    wizard.answer(
        AnswerKey::Role,
        AnswerValue::Role(Role {
            id: RoleId::parse("10").expect("role"),
            name: "Member".to_string(),
        }),
    );
    wizard.answer(AnswerKey::Message, AnswerValue::Text("Welcome".to_string()));

    for expected_to in 1..=5 {
        assert_eq!(
            wizard.advance(&mut orchestrator).expect("advance"),
            AdvanceOutcome::Advanced {
                from: expected_to - 1,
                to: expected_to
            }
        );
    }
    assert_eq!(
        wizard.advance(&mut orchestrator).expect("finish"),
        AdvanceOutcome::Completed
    );
    assert!(wizard.take_effects().contains(&WizardEffect::Close));

    let requests = orchestrator.api().requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].project_id.as_str(), "demo");
    assert_eq!(
        requests[0].invitee,
        Some(Invitee::Principal {
            id: PrincipalId::parse("4").expect("principal"),
            kind: PrincipalType::User,
        })
    );
    assert_eq!(requests[0].role_id, Some(RoleId::parse("10").expect("role")));
    assert_eq!(requests[0].message, "Welcome");
    assert_eq!(
        wizard.receipt().map(|receipt| receipt.member_id.as_str()),
        Some("501")
    );
}

const DIRECTORY: &str = r#"
principals:
  - { id: 1, name: Ada Lovelace, email: ada@example.com, kind: user }
  - { id: 2, name: Engineers, kind: group }
roles:
  - { id: 10, name: Member }
  - { id: 11, name: Reader }
memberships: []
"#;

fn type_text<A: InvitationApi>(session: &mut InviteSession<A>, text: &str) {
    for c in text.chars() {
        session.handle(SessionAction::Input(c));
    }
}

#[test]
fn typed_session_creates_member_in_local_directory() {
    let dir = tempdir().expect("tempdir");
    let directory_path = dir.path().join("directory.yaml");
    fs::write(&directory_path, DIRECTORY).expect("write directory");
    let directory = Arc::new(LocalDirectory::open(&directory_path).expect("open"));
    let notifications = Arc::new(RecordingNotifications::default());
    let log = EventLog::new(dir.path());

    let mut session = InviteSession::new(
        context(),
        LocalInvitations::new(directory.clone(), notifications.clone()),
        directory.clone(),
        Duration::from_millis(100),
        log,
    );

    session.handle(SessionAction::Submit);
    type_text(&mut session, "ada");
    assert!(session.wait_for_search(Duration::from_secs(2)));
    session.handle(SessionAction::Submit);
    type_text(&mut session, "read");
    assert!(session.wait_for_search(Duration::from_secs(2)));
    session.handle(SessionAction::Submit);
    type_text(&mut session, "Welcome to Demo");
    session.handle(SessionAction::Submit);
    assert_eq!(session.wizard().current_index(), 4);
    session.handle(SessionAction::Submit);
    session.handle(SessionAction::Submit);

    match session.exit() {
        Some(SessionExit::Completed(Some(receipt))) => {
            assert_eq!(receipt.principal_name, "Ada Lovelace");
        }
        other => panic!("unexpected exit: {other:?}"),
    }

    let reopened = LocalDirectory::open(&directory_path).expect("reopen");
    let memberships = reopened.snapshot().memberships;
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].principal_id.as_str(), "1");
    assert_eq!(memberships[0].role_ids, vec![RoleId::parse("11").expect("role")]);

    let events = notifications.events();
    assert_eq!(events.len(), 1);
    let MemberEvent::Created { member } = &events[0];
    assert_eq!(member.notification_message, "Welcome to Demo");

    let log_raw = fs::read_to_string(event_log_path(dir.path())).expect("read log");
    assert!(log_raw.contains("\"search.dispatch\""));
    assert!(log_raw.contains("\"wizard.advance\""));
    assert!(log_raw.contains("\"invite.sent\""));
}

#[test]
fn rejected_invitation_keeps_session_on_summary_step() {
    let dir = tempdir().expect("tempdir");
    let directory_path = dir.path().join("directory.yaml");
    fs::write(
        &directory_path,
        DIRECTORY.replace(
            "memberships: []",
            "memberships:\n  - { id: 1, project_id: demo, principal_id: 1, role_ids: [10] }",
        ),
    )
    .expect("write directory");
    let directory = Arc::new(LocalDirectory::open(&directory_path).expect("open"));
    let notifications = Arc::new(RecordingNotifications::default());

    let mut session = InviteSession::new(
        context(),
        LocalInvitations::new(directory.clone(), notifications.clone()),
        directory,
        Duration::from_millis(100),
        EventLog::disabled(),
    );
    session.handle(SessionAction::Submit);
    type_text(&mut session, "ada");
    assert!(session.wait_for_search(Duration::from_secs(2)));
    session.handle(SessionAction::Submit);
    type_text(&mut session, "mem");
    assert!(session.wait_for_search(Duration::from_secs(2)));
    session.handle(SessionAction::Submit);
    type_text(&mut session, "hello");
    session.handle(SessionAction::Submit);
    session.handle(SessionAction::Submit);

    assert_eq!(session.wizard().current_index(), 4);
    assert!(session.exit().is_none());
    assert!(session
        .status()
        .is_some_and(|status| status.contains("already a member")));
    assert!(notifications.events().is_empty());

    session.handle(SessionAction::Back);
    assert_eq!(session.wizard().current_index(), 3);
    assert!(session.wizard().last_error().is_none());
}
