#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Invite,
    Principals,
    Roles,
    Config,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "invite" => CliVerb::Invite,
        "principals" => CliVerb::Principals,
        "roles" => CliVerb::Roles,
        "config" => CliVerb::Config,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  invite                               Run the invitation wizard for the configured project"
            .to_string(),
        "  principals <term> [--type T]         Search users, groups or placeholders (T: user|group|placeholder)"
            .to_string(),
        "  roles <term>                         Search roles grantable in the project".to_string(),
        "  config                               Show the active settings".to_string(),
        "  config init <id> <name> [--backend B] [--api-base URL]".to_string(),
        "                                       Write a starter config (B: local|http)".to_string(),
        "  help                                 Show this help".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    let mut lines = cli_help_lines();
    lines.push(String::new());
    lines.push("Invite keys: Enter next | Esc back | Up/Down move | Ctrl-C cancel".to_string());
    lines.join("\n")
}
