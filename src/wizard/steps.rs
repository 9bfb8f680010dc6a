use super::answers::AnswerSet;
use super::ProjectContext;

/// Identity of an entry in the answer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnswerKey {
    PrincipalType,
    Principal,
    Role,
    Message,
}

impl AnswerKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrincipalType => "type",
            Self::Principal => "principal",
            Self::Role => "role",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    PrincipalTypes,
    Principals,
    Roles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    InviteMember,
    Finish,
}

impl CommitAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InviteMember => "invite_member",
            Self::Finish => "finish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpLink {
    pub text: &'static str,
    pub href: &'static str,
}

/// Caption text; `{user}` and `{project}` are filled from the answers and context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caption(pub &'static str);

impl Caption {
    pub fn render(self, answers: &AnswerSet, context: &ProjectContext) -> String {
        self.0
            .replace("{user}", answers.user_to_invite().unwrap_or("the user"))
            .replace("{project}", &context.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Selection {
        label: Caption,
        summary_label: &'static str,
        answer: AnswerKey,
        lookup: LookupKind,
        description: Caption,
        link: Option<HelpLink>,
    },
    FreeText {
        label: Caption,
        summary_label: &'static str,
        answer: AnswerKey,
    },
    MultiLineText {
        label: Caption,
        summary_label: &'static str,
        answer: AnswerKey,
        description: Caption,
    },
    Summary {
        label: &'static str,
        answer: AnswerKey,
    },
    Confirmation {
        description: Caption,
    },
}

impl FieldKind {
    /// Answer key the field edits; summary and confirmation fields only display.
    pub fn input_key(&self) -> Option<AnswerKey> {
        match self {
            Self::Selection { answer, .. }
            | Self::FreeText { answer, .. }
            | Self::MultiLineText { answer, .. } => Some(*answer),
            Self::Summary { .. } | Self::Confirmation { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    pub fields: Vec<FieldKind>,
    pub commit: Option<CommitAction>,
    pub next_button_text: &'static str,
    pub previous_button_text: Option<&'static str>,
    pub show_invite_by_email: bool,
}

impl StepDescriptor {
    pub fn primary_field(&self) -> Option<&FieldKind> {
        self.fields.first()
    }

    pub fn answer_key(&self) -> Option<AnswerKey> {
        self.primary_field().and_then(FieldKind::input_key)
    }

    pub fn lookup(&self) -> Option<LookupKind> {
        match self.primary_field() {
            Some(FieldKind::Selection { lookup, .. }) => Some(*lookup),
            _ => None,
        }
    }
}

const NEXT: &str = "Next";
const BACK: &str = "Back";

pub const PERMISSIONS_HELP_LINK: HelpLink = HelpLink {
    text: "Learn more about users and permissions",
    href: "https://docs.openproject.org/system-admin-guide/users-permissions/",
};

/// The invitation wizard: type, principal, role, message, summary, confirmation.
pub fn invite_steps() -> Vec<StepDescriptor> {
    vec![
        StepDescriptor {
            fields: vec![FieldKind::Selection {
                label: Caption("Who do you want to invite to {project}?"),
                summary_label: "Type",
                answer: AnswerKey::PrincipalType,
                lookup: LookupKind::PrincipalTypes,
                description: Caption("Invite a user, a group or a placeholder user."),
                link: None,
            }],
            commit: None,
            next_button_text: NEXT,
            previous_button_text: None,
            show_invite_by_email: false,
        },
        StepDescriptor {
            fields: vec![FieldKind::Selection {
                label: Caption("Name or email address"),
                summary_label: "User",
                answer: AnswerKey::Principal,
                lookup: LookupKind::Principals,
                description: Caption(
                    "Search for an existing principal or type an email address to invite someone new.",
                ),
                link: None,
            }],
            commit: None,
            next_button_text: NEXT,
            previous_button_text: Some(BACK),
            show_invite_by_email: true,
        },
        StepDescriptor {
            fields: vec![FieldKind::Selection {
                label: Caption("Role in {project}"),
                summary_label: "Role",
                answer: AnswerKey::Role,
                lookup: LookupKind::Roles,
                description: Caption("The role {user} will have in this project."),
                link: Some(PERMISSIONS_HELP_LINK),
            }],
            commit: None,
            next_button_text: NEXT,
            previous_button_text: Some(BACK),
            show_invite_by_email: false,
        },
        StepDescriptor {
            fields: vec![FieldKind::MultiLineText {
                label: Caption("Invitation message"),
                summary_label: "Message",
                answer: AnswerKey::Message,
                description: Caption("{user} will receive this message with the invitation."),
            }],
            commit: None,
            next_button_text: "Review invitation",
            previous_button_text: Some(BACK),
            show_invite_by_email: false,
        },
        StepDescriptor {
            fields: vec![
                FieldKind::Summary {
                    label: "User",
                    answer: AnswerKey::Principal,
                },
                FieldKind::Summary {
                    label: "Role",
                    answer: AnswerKey::Role,
                },
                FieldKind::Summary {
                    label: "Message",
                    answer: AnswerKey::Message,
                },
            ],
            commit: Some(CommitAction::InviteMember),
            next_button_text: "Send invitation",
            previous_button_text: Some(BACK),
            show_invite_by_email: false,
        },
        StepDescriptor {
            fields: vec![FieldKind::Confirmation {
                description: Caption("{user} was invited to {project}."),
            }],
            commit: Some(CommitAction::Finish),
            next_button_text: "Continue",
            previous_button_text: None,
            show_invite_by_email: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_steps_bind_each_answer_once_before_the_summary() {
        let steps = invite_steps();
        assert_eq!(steps.len(), 6);
        let keys: Vec<Option<AnswerKey>> = steps.iter().map(StepDescriptor::answer_key).collect();
        assert_eq!(
            keys,
            vec![
                Some(AnswerKey::PrincipalType),
                Some(AnswerKey::Principal),
                Some(AnswerKey::Role),
                Some(AnswerKey::Message),
                None,
                None,
            ]
        );
    }

    #[test]
    fn only_summary_and_confirmation_steps_commit() {
        let commits: Vec<Option<CommitAction>> =
            invite_steps().iter().map(|step| step.commit).collect();
        assert_eq!(
            commits,
            vec![
                None,
                None,
                None,
                None,
                Some(CommitAction::InviteMember),
                Some(CommitAction::Finish)
            ]
        );
    }

    #[test]
    fn lookups_follow_selection_fields() {
        let lookups: Vec<Option<LookupKind>> =
            invite_steps().iter().map(StepDescriptor::lookup).collect();
        assert_eq!(lookups[0], Some(LookupKind::PrincipalTypes));
        assert_eq!(lookups[1], Some(LookupKind::Principals));
        assert_eq!(lookups[2], Some(LookupKind::Roles));
        assert!(lookups[3..].iter().all(Option::is_none));
    }

    #[test]
    fn captions_fall_back_when_no_user_is_chosen() {
        let context = ProjectContext::new(
            crate::shared::ProjectId::parse("demo").expect("project"),
            "Demo",
        );
        let caption = Caption("The role {user} will have in {project}.");
        assert_eq!(
            caption.render(&AnswerSet::default(), &context),
            "The role the user will have in Demo."
        );
    }
}
