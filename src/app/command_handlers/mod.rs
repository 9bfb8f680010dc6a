use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod config;
pub mod invite;
pub mod lookup;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Invite => invite::cmd_invite(&args[1..]),
        CliVerb::Principals => lookup::cmd_principals(&args[1..]),
        CliVerb::Roles => lookup::cmd_roles(&args[1..]),
        CliVerb::Config => config::cmd_config(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
