use crate::config::ConfigError;
use std::path::PathBuf;

pub const GLOBAL_STATE_DIR: &str = ".inviteflow";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const LOCAL_DIRECTORY_FILE_NAME: &str = "directory.yaml";

pub fn default_state_root() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_state_root()?.join(GLOBAL_SETTINGS_FILE_NAME))
}

pub fn default_local_directory_path() -> Result<PathBuf, ConfigError> {
    Ok(default_state_root()?.join(LOCAL_DIRECTORY_FILE_NAME))
}
