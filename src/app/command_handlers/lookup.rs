use crate::app::command_support::{build_backend, event_log, load_settings};
use crate::gateway::{PrincipalQuery, PrincipalType};

pub fn cmd_principals(args: &[String]) -> Result<String, String> {
    let usage = "usage: inviteflow principals <term> [--type user|group|placeholder]";
    let mut term = None;
    let mut principal_type = PrincipalType::User;
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--type" => {
                let raw = args.get(index + 1).ok_or_else(|| usage.to_string())?;
                principal_type = PrincipalType::parse(raw)?;
                index += 2;
            }
            value if term.is_none() => {
                term = Some(value.to_string());
                index += 1;
            }
            other => return Err(format!("unexpected argument `{other}`; {usage}")),
        }
    }
    let term = term.ok_or_else(|| usage.to_string())?;

    let settings = load_settings()?;
    let backend = build_backend(&settings, &event_log()?)?;
    let principals = backend
        .lookups
        .principals(&PrincipalQuery {
            term,
            project_id: settings.project.id.clone(),
            principal_type,
        })
        .map_err(|e| e.to_string())?;

    if principals.is_empty() {
        return Ok("no principals found".to_string());
    }
    Ok(principals
        .iter()
        .map(|principal| {
            format!(
                "id={} type={} name={} email={}",
                principal.id,
                principal.kind,
                principal.name,
                principal.email.as_deref().unwrap_or("none")
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn cmd_roles(args: &[String]) -> Result<String, String> {
    let [term] = args else {
        return Err("usage: inviteflow roles <term>".to_string());
    };
    let settings = load_settings()?;
    let backend = build_backend(&settings, &event_log()?)?;
    let roles = backend.lookups.roles(term).map_err(|e| e.to_string())?;
    if roles.is_empty() {
        return Ok("no roles found".to_string());
    }
    Ok(roles
        .iter()
        .map(|role| format!("id={} name={}", role.id, role.name))
        .collect::<Vec<_>>()
        .join("\n"))
}
