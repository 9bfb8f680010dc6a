use super::answers::{AnswerSet, AnswerValue, EmailInvite, ValidationIssue};
use super::steps::{invite_steps, AnswerKey, CommitAction, FieldKind, StepDescriptor};
use super::ProjectContext;
use crate::gateway::{InviteError, InviteReceipt};
use std::collections::VecDeque;

/// Current step index, moved by at most one per transition and clamped at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardState {
    index: usize,
    step_count: usize,
}

impl WizardState {
    pub fn new(step_count: usize) -> Self {
        Self {
            index: 0,
            step_count,
        }
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn is_terminal(self) -> bool {
        self.index + 1 >= self.step_count
    }

    fn step_forward(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.index += 1;
        true
    }

    fn step_back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Select,
    TextInput,
    TextArea,
}

/// Side effects the wizard asks its host to perform after a call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEffect {
    Focus { step: usize, target: FocusTarget },
    CloseCandidates,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Advanced { from: usize, to: usize },
    Blocked(ValidationIssue),
    Completed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Invited(InviteReceipt),
    Closed,
}

/// Runs the commit action bound to a step.
pub trait CommitHandler {
    fn commit(
        &mut self,
        action: CommitAction,
        answers: &AnswerSet,
    ) -> Result<CommitOutcome, InviteError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("step {step} action `{}` failed: {source}", .action.as_str())]
    Commit {
        step: usize,
        action: CommitAction,
        #[source]
        source: InviteError,
    },
}

#[derive(Debug, Clone)]
pub struct InviteWizard {
    steps: Vec<StepDescriptor>,
    state: WizardState,
    answers: AnswerSet,
    context: ProjectContext,
    effects: VecDeque<WizardEffect>,
    last_error: Option<WizardError>,
    receipt: Option<InviteReceipt>,
    completed: bool,
}

impl InviteWizard {
    pub fn new(context: ProjectContext) -> Self {
        Self::with_steps(invite_steps(), context)
    }

    /// Builds a wizard over a custom table; an empty table gets no steps to move between.
    pub fn with_steps(steps: Vec<StepDescriptor>, context: ProjectContext) -> Self {
        let state = WizardState::new(steps.len());
        Self {
            steps,
            state,
            answers: AnswerSet::default(),
            context,
            effects: VecDeque::new(),
            last_error: None,
            receipt: None,
            completed: false,
        }
    }

    pub fn context(&self) -> &ProjectContext {
        &self.context
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub fn current_index(&self) -> usize {
        self.state.index()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current_step(&self) -> Option<&StepDescriptor> {
        self.steps.get(self.state.index())
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn last_error(&self) -> Option<&WizardError> {
        self.last_error.as_ref()
    }

    pub fn receipt(&self) -> Option<&InviteReceipt> {
        self.receipt.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn answer(&mut self, key: AnswerKey, value: AnswerValue) {
        self.answers.set(key, value);
    }

    pub fn clear_answer(&mut self, key: AnswerKey) {
        self.answers.clear(key);
    }

    /// Stores an invite-by-email placeholder as the principal and closes the candidate list.
    pub fn set_user_email(&mut self, raw: &str) {
        self.answers.set(
            AnswerKey::Principal,
            AnswerValue::EmailInvite(EmailInvite::from_input(raw)),
        );
        self.effects.push_back(WizardEffect::CloseCandidates);
    }

    /// Whether the forward control should be disabled for the current step.
    pub fn is_blocked(&self) -> bool {
        self.blocking_issue().is_some()
    }

    fn blocking_issue(&self) -> Option<ValidationIssue> {
        let key = self.current_step()?.answer_key()?;
        self.answers.validate(key).err()
    }

    pub fn advance(
        &mut self,
        commit: &mut dyn CommitHandler,
    ) -> Result<AdvanceOutcome, WizardError> {
        if self.completed {
            return Ok(AdvanceOutcome::Unchanged);
        }
        let Some(step) = self.current_step() else {
            return Ok(AdvanceOutcome::Unchanged);
        };
        let action = step.commit;
        if let Some(issue) = self.blocking_issue() {
            return Ok(AdvanceOutcome::Blocked(issue));
        }

        if let Some(action) = action {
            match commit.commit(action, &self.answers) {
                Ok(CommitOutcome::Invited(receipt)) => self.receipt = Some(receipt),
                Ok(CommitOutcome::Closed) => {
                    self.completed = true;
                    self.effects.push_back(WizardEffect::Close);
                }
                Err(source) => {
                    let err = WizardError::Commit {
                        step: self.state.index(),
                        action,
                        source,
                    };
                    self.last_error = Some(err.clone());
                    return Err(err);
                }
            }
        }
        self.last_error = None;

        let from = self.state.index();
        if !self.state.step_forward() {
            return Ok(if self.completed {
                AdvanceOutcome::Completed
            } else {
                AdvanceOutcome::Unchanged
            });
        }
        let to = self.state.index();
        self.queue_focus(to);
        Ok(AdvanceOutcome::Advanced { from, to })
    }

    pub fn retreat(&mut self) -> bool {
        if self.completed {
            return false;
        }
        let moved = self.state.step_back();
        if moved {
            self.last_error = None;
        }
        moved
    }

    pub fn take_effects(&mut self) -> Vec<WizardEffect> {
        self.effects.drain(..).collect()
    }

    fn queue_focus(&mut self, step: usize) {
        let target = match self.steps.get(step).and_then(StepDescriptor::primary_field) {
            Some(FieldKind::Selection { .. }) => FocusTarget::Select,
            Some(FieldKind::FreeText { .. }) => FocusTarget::TextInput,
            Some(FieldKind::MultiLineText { .. }) => FocusTarget::TextArea,
            Some(FieldKind::Summary { .. } | FieldKind::Confirmation { .. }) | None => return,
        };
        self.effects.push_back(WizardEffect::Focus { step, target });
    }
}
