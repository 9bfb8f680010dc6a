use crate::config::{
    default_local_directory_path, default_state_root, load_global_settings, BackendKind,
    ConfigError, Settings,
};
use crate::gateway::{ApiClient, InvitationApi, LocalDirectory, LocalInvitations, LookupGateway};
use crate::members::LogNotifications;
use crate::shared::EventLog;
use std::path::PathBuf;
use std::sync::Arc;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn load_settings() -> Result<Settings, String> {
    load_global_settings().map_err(map_config_err)
}

pub fn state_root() -> Result<PathBuf, String> {
    default_state_root().map_err(map_config_err)
}

pub fn event_log() -> Result<EventLog, String> {
    Ok(EventLog::new(state_root()?))
}

/// Lookup and invitation halves of the configured backend.
pub struct Backend {
    pub lookups: Arc<dyn LookupGateway>,
    pub invitations: Box<dyn InvitationApi>,
}

pub fn local_directory_path(settings: &Settings) -> Result<PathBuf, String> {
    match &settings.local_directory {
        Some(path) if path.is_absolute() => Ok(path.clone()),
        Some(path) => Ok(state_root()?.join(path)),
        None => default_local_directory_path().map_err(map_config_err),
    }
}

pub fn build_backend(settings: &Settings, log: &EventLog) -> Result<Backend, String> {
    match settings.backend {
        BackendKind::Http => {
            let base = settings
                .api
                .base_url
                .as_deref()
                .ok_or_else(|| "api.base_url is required for the http backend".to_string())?;
            let client = ApiClient::new(
                base,
                settings.api.api_key.clone(),
                settings.search.page_size,
            );
            Ok(Backend {
                lookups: Arc::new(client.clone()),
                invitations: Box::new(client),
            })
        }
        BackendKind::Local => {
            let path = local_directory_path(settings)?;
            let directory = Arc::new(LocalDirectory::open(&path).map_err(|e| e.to_string())?);
            let notifications = Arc::new(LogNotifications::new(log.clone()));
            Ok(Backend {
                lookups: directory.clone(),
                invitations: Box::new(LocalInvitations::new(directory, notifications)),
            })
        }
    }
}
