use crate::app::command_support::{load_settings, local_directory_path, map_config_err};
use crate::config::{default_global_config_path, save_settings, BackendKind, Settings};
use crate::shared::ProjectId;

pub fn cmd_config(args: &[String]) -> Result<String, String> {
    match args.first().map(String::as_str) {
        None | Some("show") => cmd_config_show(),
        Some("init") => cmd_config_init(&args[1..]),
        Some(other) => Err(format!("unknown config command `{other}`")),
    }
}

fn cmd_config_show() -> Result<String, String> {
    let path = default_global_config_path().map_err(map_config_err)?;
    let settings = load_settings()?;
    let mut lines = vec![
        format!("config={}", path.display()),
        format!("project.id={}", settings.project.id),
        format!("project.name={}", settings.project.name),
        format!("backend={}", settings.backend),
        format!("search.debounce_ms={}", settings.search.debounce_ms),
        format!("search.page_size={}", settings.search.page_size),
    ];
    match settings.backend {
        BackendKind::Http => {
            lines.push(format!(
                "api.base_url={}",
                settings.api.base_url.as_deref().unwrap_or("none")
            ));
            lines.push(format!(
                "api.api_key={}",
                if settings.api.api_key.is_some() {
                    "set"
                } else {
                    "none"
                }
            ));
        }
        BackendKind::Local => {
            lines.push(format!(
                "local_directory={}",
                local_directory_path(&settings)?.display()
            ));
        }
    }
    Ok(lines.join("\n"))
}

fn cmd_config_init(args: &[String]) -> Result<String, String> {
    let usage =
        "usage: inviteflow config init <project-id> <project-name> [--backend local|http] [--api-base URL]";
    let (Some(id), Some(name)) = (args.first(), args.get(1)) else {
        return Err(usage.to_string());
    };
    let project_id = ProjectId::parse(id)?;
    let mut settings = Settings::starter(project_id, name);

    let mut index = 2;
    while index < args.len() {
        let value = args.get(index + 1).ok_or_else(|| usage.to_string())?;
        match args[index].as_str() {
            "--backend" => settings.backend = BackendKind::parse(value)?,
            "--api-base" => settings.api.base_url = Some(value.clone()),
            other => return Err(format!("unexpected argument `{other}`; {usage}")),
        }
        index += 2;
    }

    let path = save_settings(&settings).map_err(map_config_err)?;
    Ok(format!(
        "config written\nconfig={}\nproject.id={}\nbackend={}",
        path.display(),
        settings.project.id,
        settings.backend
    ))
}
