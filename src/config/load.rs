use super::{default_global_config_path, ConfigError, Settings};

pub fn load_global_settings() -> Result<Settings, ConfigError> {
    let path = default_global_config_path()?;
    let mut settings = Settings::from_path(&path)?;
    settings.apply_env_overrides();
    settings.validate()?;
    Ok(settings)
}
