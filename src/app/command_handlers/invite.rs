use crate::app::command_support::{build_backend, event_log, load_settings};
use crate::tui::invite::{is_interactive_terminal, run_invite_scripted, run_invite_tui};
use crate::tui::keys::{load_scripted_keys, SCRIPT_KEYS_ENV};
use crate::wizard::{InviteSession, ProjectContext, SessionExit};
use std::time::Duration;

pub fn cmd_invite(args: &[String]) -> Result<String, String> {
    if !args.is_empty() {
        return Err("usage: inviteflow invite".to_string());
    }
    let settings = load_settings()?;
    let log = event_log()?;
    let backend = build_backend(&settings, &log)?;
    let context = ProjectContext::new(settings.project.id.clone(), settings.project.name.clone());
    let mut session = InviteSession::new(
        context,
        backend.invitations,
        backend.lookups,
        Duration::from_millis(settings.search.debounce_ms),
        log,
    );

    if let Some(keys) = load_scripted_keys()? {
        run_invite_scripted(&mut session, keys)?;
    } else if is_interactive_terminal() {
        run_invite_tui(&mut session)?;
    } else {
        return Err(format!(
            "invite needs an interactive terminal; set {SCRIPT_KEYS_ENV} to drive it from a script"
        ));
    }

    Ok(match session.exit() {
        Some(SessionExit::Completed(Some(receipt))) => format!(
            "invitation sent\nproject={}\nprincipal={}\nmember={}",
            settings.project.id, receipt.principal_name, receipt.member_id
        ),
        Some(SessionExit::Completed(None)) => "invite wizard closed".to_string(),
        Some(SessionExit::Canceled) | None => "invite canceled".to_string(),
    })
}
