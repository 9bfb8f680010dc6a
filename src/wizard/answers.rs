use super::steps::AnswerKey;
use crate::gateway::{Candidate, Principal, PrincipalType, Role};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    match Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    ) {
        Ok(pattern) => pattern,
        Err(err) => unreachable!("email pattern is a constant: {err}"),
    }
});

/// True once the raw input looks like the start of an email address.
pub fn input_is_email(raw: &str) -> bool {
    raw.contains('@')
}

pub fn input_is_valid_email(raw: &str) -> bool {
    EMAIL_PATTERN.is_match(&raw.trim().to_lowercase())
}

/// Placeholder principal for someone invited by raw email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailInvite {
    pub name: String,
    pub email: String,
    pub is_email: bool,
}

impl EmailInvite {
    pub fn from_input(raw: &str) -> Self {
        let email = raw.trim().to_string();
        Self {
            name: email.clone(),
            email,
            is_email: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    PrincipalType(PrincipalType),
    Principal(Principal),
    EmailInvite(EmailInvite),
    Role(Role),
    Text(String),
}

impl AnswerValue {
    pub fn display_name(&self) -> String {
        match self {
            Self::PrincipalType(kind) => kind.as_str().to_string(),
            Self::Principal(principal) => principal.name.clone(),
            Self::EmailInvite(invite) => invite.name.clone(),
            Self::Role(role) => role.name.clone(),
            Self::Text(text) => text.clone(),
        }
    }

    fn fits(&self, key: AnswerKey) -> bool {
        matches!(
            (key, self),
            (AnswerKey::PrincipalType, Self::PrincipalType(_))
                | (AnswerKey::Principal, Self::Principal(_))
                | (AnswerKey::Principal, Self::EmailInvite(_))
                | (AnswerKey::Role, Self::Role(_))
                | (AnswerKey::Message, Self::Text(_))
        )
    }
}

impl From<Candidate> for AnswerValue {
    fn from(candidate: Candidate) -> Self {
        match candidate {
            Candidate::PrincipalType(kind) => Self::PrincipalType(kind),
            Candidate::Principal(principal) => Self::Principal(principal),
            Candidate::Role(role) => Self::Role(role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    Missing(AnswerKey),
    Blank(AnswerKey),
    WrongKind(AnswerKey),
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "{key} is required"),
            Self::Blank(key) => write!(f, "{key} must not be blank"),
            Self::WrongKind(key) => write!(f, "{key} holds a value of the wrong kind"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    values: BTreeMap<AnswerKey, AnswerValue>,
}

impl AnswerSet {
    pub fn get(&self, key: AnswerKey) -> Option<&AnswerValue> {
        self.values.get(&key)
    }

    pub fn set(&mut self, key: AnswerKey, value: AnswerValue) {
        self.values.insert(key, value);
    }

    pub fn clear(&mut self, key: AnswerKey) {
        self.values.remove(&key);
    }

    pub fn is_set(&self, key: AnswerKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Every answer key is required; text answers must also be non-blank.
    pub fn validate(&self, key: AnswerKey) -> Result<(), ValidationIssue> {
        let Some(value) = self.values.get(&key) else {
            return Err(ValidationIssue::Missing(key));
        };
        if !value.fits(key) {
            return Err(ValidationIssue::WrongKind(key));
        }
        if let AnswerValue::Text(text) = value {
            if text.trim().is_empty() {
                return Err(ValidationIssue::Blank(key));
            }
        }
        Ok(())
    }

    pub fn principal_type(&self) -> PrincipalType {
        match self.values.get(&AnswerKey::PrincipalType) {
            Some(AnswerValue::PrincipalType(kind)) => *kind,
            _ => PrincipalType::User,
        }
    }

    pub fn user_to_invite(&self) -> Option<&str> {
        match self.values.get(&AnswerKey::Principal) {
            Some(AnswerValue::Principal(principal)) => Some(principal.name.as_str()),
            Some(AnswerValue::EmailInvite(invite)) => Some(invite.name.as_str()),
            _ => None,
        }
    }

    pub fn text(&self, key: AnswerKey) -> Option<&str> {
        match self.values.get(&key) {
            Some(AnswerValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}
