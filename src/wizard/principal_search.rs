use super::answers::input_is_email;
use crate::gateway::{Candidate, PrincipalType};

/// Offer "invite by email" for user searches that look like an address nobody has yet.
pub fn can_invite_by_email(kind: PrincipalType, input: &str, candidates: &[Candidate]) -> bool {
    let input = input.trim();
    kind == PrincipalType::User
        && input_is_email(input)
        && !candidates.iter().any(|candidate| {
            candidate
                .email()
                .is_some_and(|email| email.eq_ignore_ascii_case(input))
        })
}

/// Groups and placeholders can be created on the fly when no candidate carries the typed name.
pub fn can_create_new(kind: PrincipalType, input: &str, candidates: &[Candidate]) -> bool {
    let input = input.trim();
    kind != PrincipalType::User
        && !input.is_empty()
        && !candidates.iter().any(|candidate| candidate.name() == input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Principal, PrincipalStatus};
    use crate::shared::PrincipalId;

    fn principal(name: &str, email: Option<&str>, kind: PrincipalType) -> Candidate {
        Candidate::Principal(Principal {
            id: PrincipalId::parse("1").expect("id"),
            name: name.to_string(),
            email: email.map(str::to_string),
            kind,
            status: PrincipalStatus::Active,
        })
    }

    #[test]
    fn invite_by_email_requires_user_type_and_unknown_address() {
        let known = vec![principal("Ada", Some("ada@example.com"), PrincipalType::User)];
        assert!(can_invite_by_email(PrincipalType::User, "new@example.com", &known));
        assert!(!can_invite_by_email(PrincipalType::User, "ADA@example.com", &known));
        assert!(!can_invite_by_email(PrincipalType::User, "ada", &known));
        assert!(!can_invite_by_email(PrincipalType::Group, "new@example.com", &[]));
    }

    #[test]
    fn create_new_only_for_groups_and_placeholders_with_fresh_names() {
        let known = vec![principal("Ops", None, PrincipalType::Group)];
        assert!(can_create_new(PrincipalType::Group, "Design", &known));
        assert!(can_create_new(PrincipalType::Placeholder, "Contractor", &[]));
        assert!(!can_create_new(PrincipalType::Group, "Ops", &known));
        assert!(!can_create_new(PrincipalType::Group, "  ", &[]));
        assert!(!can_create_new(PrincipalType::User, "Design", &[]));
    }
}
