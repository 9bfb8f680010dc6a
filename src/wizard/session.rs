use super::answers::{input_is_valid_email, AnswerValue};
use super::machine::{AdvanceOutcome, FocusTarget, InviteWizard, WizardEffect};
use super::orchestrator::InvitationOrchestrator;
use super::principal_search::{can_create_new, can_invite_by_email};
use super::search::{CandidateSource, SearchBatch, SearchChannel};
use super::steps::{AnswerKey, FieldKind, LookupKind};
use super::ProjectContext;
use crate::gateway::{
    Candidate, GatewayError, InvitationApi, InviteReceipt, LookupGateway, PrincipalQuery,
    PrincipalType, ALL_PRINCIPAL_TYPES,
};
use crate::shared::{EventLog, ProjectId};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Binds one step's lookup kind to the gateway.
pub struct GatewayLookup {
    gateway: Arc<dyn LookupGateway>,
    kind: LookupKind,
    project_id: ProjectId,
    principal_type: PrincipalType,
}

impl GatewayLookup {
    pub fn new(
        gateway: Arc<dyn LookupGateway>,
        kind: LookupKind,
        project_id: ProjectId,
        principal_type: PrincipalType,
    ) -> Self {
        Self {
            gateway,
            kind,
            project_id,
            principal_type,
        }
    }
}

/// Principal types whose name contains the term; served without the gateway.
pub fn principal_type_candidates(term: &str) -> Vec<Candidate> {
    let term = term.trim().to_ascii_lowercase();
    ALL_PRINCIPAL_TYPES
        .into_iter()
        .filter(|kind| kind.as_str().contains(&term))
        .map(Candidate::PrincipalType)
        .collect()
}

impl CandidateSource for GatewayLookup {
    fn lookup(&self, term: &str) -> Result<Vec<Candidate>, GatewayError> {
        match self.kind {
            LookupKind::PrincipalTypes => Ok(principal_type_candidates(term)),
            LookupKind::Principals => {
                let query = PrincipalQuery {
                    term: term.to_string(),
                    project_id: self.project_id.clone(),
                    principal_type: self.principal_type,
                };
                Ok(self
                    .gateway
                    .principals(&query)?
                    .into_iter()
                    .filter(|principal| principal.status.is_selectable())
                    .map(Candidate::Principal)
                    .collect())
            }
            LookupKind::Roles => Ok(self
                .gateway
                .roles(term)?
                .into_iter()
                .map(Candidate::Role)
                .collect()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    MovePrev,
    MoveNext,
    Submit,
    Back,
    Cancel,
    Input(char),
    Newline,
    Backspace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    Completed(Option<InviteReceipt>),
    Canceled,
}

/// An entry in the open candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOption {
    Candidate(Candidate),
    InviteByEmail(String),
}

impl SessionOption {
    pub fn label(&self) -> String {
        match self {
            Self::Candidate(candidate) => candidate.display_name(),
            Self::InviteByEmail(email) => format!("Invite {email} by email"),
        }
    }
}

/// Host-side state of one wizard run: typed input, the candidate list and the
/// search channel feeding it. Owned by the UI thread.
pub struct InviteSession<A: InvitationApi> {
    wizard: InviteWizard,
    orchestrator: InvitationOrchestrator<A>,
    gateway: Arc<dyn LookupGateway>,
    search: SearchChannel,
    log: EventLog,
    input: String,
    candidates: Vec<Candidate>,
    highlighted: usize,
    candidates_open: bool,
    lookup_error: Option<String>,
    focus: Option<FocusTarget>,
    status: Option<String>,
    exit: Option<SessionExit>,
}

impl<A: InvitationApi> InviteSession<A> {
    pub fn new(
        context: ProjectContext,
        api: A,
        gateway: Arc<dyn LookupGateway>,
        quiescence: Duration,
        log: EventLog,
    ) -> Self {
        let mut session = Self {
            wizard: InviteWizard::new(context.clone()),
            orchestrator: InvitationOrchestrator::new(api, context, log.clone()),
            gateway,
            search: SearchChannel::spawn(quiescence, log.clone()),
            log,
            input: String::new(),
            candidates: Vec::new(),
            highlighted: 0,
            candidates_open: false,
            lookup_error: None,
            focus: Some(FocusTarget::Select),
            status: None,
            exit: None,
        };
        session.enter_step();
        session
    }

    pub fn wizard(&self) -> &InviteWizard {
        &self.wizard
    }

    pub fn orchestrator(&self) -> &InvitationOrchestrator<A> {
        &self.orchestrator
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn candidates_open(&self) -> bool {
        self.candidates_open
    }

    pub fn lookup_error(&self) -> Option<&str> {
        self.lookup_error.as_deref()
    }

    pub fn focus(&self) -> Option<FocusTarget> {
        self.focus
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn exit(&self) -> Option<&SessionExit> {
        self.exit.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.exit.is_some()
    }

    pub fn options(&self) -> Vec<SessionOption> {
        let mut options: Vec<SessionOption> = self
            .candidates
            .iter()
            .cloned()
            .map(SessionOption::Candidate)
            .collect();
        if self.offers_email_invite() {
            options.push(SessionOption::InviteByEmail(self.input.trim().to_string()));
        }
        options
    }

    fn offers_email_invite(&self) -> bool {
        self.wizard
            .current_step()
            .is_some_and(|step| step.show_invite_by_email)
            && input_is_valid_email(&self.input)
            && can_invite_by_email(
                self.wizard.answers().principal_type(),
                &self.input,
                &self.candidates,
            )
    }

    /// Hint shown when a group or placeholder search finds nothing by that name.
    pub fn create_new_hint(&self) -> Option<String> {
        if self.current_lookup() != Some(LookupKind::Principals) {
            return None;
        }
        let kind = self.wizard.answers().principal_type();
        can_create_new(kind, &self.input, &self.candidates).then(|| {
            format!(
                "no {kind} named \"{}\" yet; create it in the project settings first",
                self.input.trim()
            )
        })
    }

    pub fn handle(&mut self, action: SessionAction) {
        if self.exit.is_some() {
            return;
        }
        match action {
            SessionAction::MovePrev => {
                self.highlighted = self.highlighted.saturating_sub(1);
            }
            SessionAction::MoveNext => {
                let max_index = self.options().len().saturating_sub(1);
                self.highlighted = std::cmp::min(self.highlighted + 1, max_index);
            }
            SessionAction::Submit => self.submit(),
            SessionAction::Back => self.back(),
            SessionAction::Cancel => self.exit = Some(SessionExit::Canceled),
            SessionAction::Input(c) => self.edit_input(|input| input.push(c)),
            SessionAction::Newline => {
                let multi_line = matches!(
                    self.wizard.current_step().and_then(|step| step.primary_field()),
                    Some(FieldKind::MultiLineText { .. })
                );
                if multi_line {
                    self.edit_input(|input| input.push('\n'));
                }
            }
            SessionAction::Backspace => self.edit_input(|input| {
                input.pop();
            }),
        }
        self.apply_effects();
    }

    /// Applies the newest search batch, if any arrived.
    pub fn poll_search(&mut self) -> bool {
        match self.search.try_next() {
            Some(batch) => {
                self.apply_batch(batch);
                true
            }
            None => false,
        }
    }

    /// Blocks until the batch for the whole current input arrives.
    ///
    /// Batches for partial terms dispatched between keystrokes are applied on
    /// the way but do not end the wait.
    pub fn wait_for_search(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(batch) = self.search.recv_timeout(remaining) else {
                return false;
            };
            let settled = batch.term.as_deref() == self.settled_term();
            self.apply_batch(batch);
            if settled {
                return true;
            }
        }
    }

    fn settled_term(&self) -> Option<&str> {
        Some(self.input.as_str()).filter(|input| !input.trim().is_empty())
    }

    fn current_lookup(&self) -> Option<LookupKind> {
        self.wizard.current_step().and_then(|step| step.lookup())
    }

    fn current_answer_key(&self) -> Option<AnswerKey> {
        self.wizard.current_step().and_then(|step| step.answer_key())
    }

    fn edit_input(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(field) = self
            .wizard
            .current_step()
            .and_then(|step| step.primary_field())
            .cloned()
        else {
            return;
        };
        match field {
            FieldKind::Selection { .. } => {
                edit(&mut self.input);
                self.candidates_open = true;
                self.search.push(Some(&self.input));
            }
            FieldKind::FreeText { answer, .. } | FieldKind::MultiLineText { answer, .. } => {
                edit(&mut self.input);
                self.wizard
                    .answer(answer, AnswerValue::Text(self.input.clone()));
            }
            FieldKind::Summary { .. } | FieldKind::Confirmation { .. } => {}
        }
    }

    fn submit(&mut self) {
        if self.candidates_open {
            self.select_highlighted();
        }
        self.advance();
    }

    fn select_highlighted(&mut self) {
        let Some(key) = self.current_answer_key() else {
            return;
        };
        let Some(option) = self.options().into_iter().nth(self.highlighted) else {
            return;
        };
        match option {
            SessionOption::Candidate(candidate) => {
                if let Candidate::PrincipalType(kind) = &candidate {
                    self.drop_mismatched_principal(*kind);
                }
                self.input = candidate.name().to_string();
                self.wizard.answer(key, candidate.into());
                self.candidates_open = false;
            }
            SessionOption::InviteByEmail(raw) => {
                self.wizard.set_user_email(&raw);
                self.input = raw;
            }
        }
    }

    fn drop_mismatched_principal(&mut self, kind: PrincipalType) {
        let stale = match self.wizard.answers().get(AnswerKey::Principal) {
            Some(AnswerValue::Principal(principal)) => principal.kind != kind,
            Some(AnswerValue::EmailInvite(_)) => kind != PrincipalType::User,
            _ => false,
        };
        if stale {
            self.wizard.clear_answer(AnswerKey::Principal);
        }
    }

    fn advance(&mut self) {
        let from = self.wizard.current_index();
        match self.wizard.advance(&mut self.orchestrator) {
            Ok(AdvanceOutcome::Advanced { from, to }) => {
                self.log
                    .info("wizard.advance", &format!("from={from} to={to}"));
                self.status = None;
                self.enter_step();
            }
            Ok(AdvanceOutcome::Blocked(issue)) => self.status = Some(issue.to_string()),
            Ok(AdvanceOutcome::Completed) => {
                self.log
                    .info("wizard.advance", &format!("from={from} completed"));
                self.status = None;
            }
            Ok(AdvanceOutcome::Unchanged) => {}
            Err(err) => {
                self.log.error("wizard.commit_failed", &err.to_string());
                self.status = Some(err.to_string());
            }
        }
    }

    fn back(&mut self) {
        let Some(step) = self.wizard.current_step() else {
            self.exit = Some(SessionExit::Canceled);
            return;
        };
        if self.wizard.current_index() == 0 {
            self.exit = Some(SessionExit::Canceled);
            return;
        }
        if step.previous_button_text.is_none() {
            return;
        }
        if self.wizard.retreat() {
            self.status = None;
            self.enter_step();
        }
    }

    fn enter_step(&mut self) {
        self.candidates.clear();
        self.highlighted = 0;
        self.candidates_open = false;
        self.lookup_error = None;

        let key = self.current_answer_key();
        let lookup = self.current_lookup();
        self.input = key
            .and_then(|key| self.wizard.answers().get(key))
            .map(AnswerValue::display_name)
            .unwrap_or_default();

        let source = lookup.map(|kind| {
            Arc::new(GatewayLookup::new(
                Arc::clone(&self.gateway),
                kind,
                self.wizard.context().id.clone(),
                self.wizard.answers().principal_type(),
            )) as Arc<dyn CandidateSource>
        });
        self.search.retarget(source);

        if lookup == Some(LookupKind::PrincipalTypes) {
            let current = self.wizard.answers().principal_type();
            self.candidates = principal_type_candidates("");
            self.candidates_open = true;
            self.highlighted = self
                .candidates
                .iter()
                .position(|candidate| candidate == &Candidate::PrincipalType(current))
                .unwrap_or(0);
        }
    }

    fn apply_batch(&mut self, batch: SearchBatch) {
        self.candidates = if batch.term.is_none()
            && self.current_lookup() == Some(LookupKind::PrincipalTypes)
        {
            principal_type_candidates("")
        } else {
            batch.candidates
        };
        self.lookup_error = batch.error;
        self.highlighted = 0;
        self.candidates_open = true;
    }

    fn apply_effects(&mut self) {
        for effect in self.wizard.take_effects() {
            match effect {
                WizardEffect::Focus { target, .. } => self.focus = Some(target),
                WizardEffect::CloseCandidates => self.candidates_open = false,
                WizardEffect::Close => {
                    self.exit = Some(SessionExit::Completed(self.wizard.receipt().cloned()));
                }
            }
        }
    }
}
