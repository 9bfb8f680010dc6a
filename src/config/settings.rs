use super::ConfigError;
use crate::shared::ProjectId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const API_BASE_ENV: &str = "INVITEFLOW_API_BASE";
pub const API_KEY_ENV: &str = "INVITEFLOW_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Http,
    Local,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Local => "local",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "local" => Ok(Self::Local),
            _ => Err("backend must be one of: http, local".to_string()),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub project: ProjectSettings,
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub local_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectSettings {
    pub id: ProjectId,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.display().to_string(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn starter(project_id: ProjectId, project_name: &str) -> Self {
        Self {
            project: ProjectSettings {
                id: project_id,
                name: project_name.to_string(),
            },
            backend: BackendKind::Local,
            api: ApiSettings::default(),
            search: SearchSettings::default(),
            local_directory: None,
        }
    }

    /// Applies `INVITEFLOW_API_BASE` / `INVITEFLOW_API_KEY` on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(base) = non_empty_env(API_BASE_ENV) {
            self.api.base_url = Some(base);
        }
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            self.api.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.name.trim().is_empty() {
            return Err(ConfigError::Settings(
                "project.name must be non-empty".to_string(),
            ));
        }
        if self.search.debounce_ms == 0 {
            return Err(ConfigError::Settings(
                "search.debounce_ms must be greater than zero".to_string(),
            ));
        }
        if !(1..=200).contains(&self.search.page_size) {
            return Err(ConfigError::Settings(
                "search.page_size must be between 1 and 200".to_string(),
            ));
        }
        if self.backend == BackendKind::Http {
            let Some(base) = self.api.base_url.as_deref() else {
                return Err(ConfigError::Settings(format!(
                    "api.base_url is required for the http backend (or set {API_BASE_ENV})"
                )));
            };
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(ConfigError::Settings(format!(
                    "api.base_url `{base}` must start with http:// or https://"
                )));
            }
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Settings {
        serde_yaml::from_str(raw).expect("parse settings")
    }

    #[test]
    fn settings_defaults_fill_search_and_backend() {
        let settings =
            parse("project:\n  id: demo\n  name: Demo\napi:\n  base_url: https://op.example\n");
        assert_eq!(settings.backend, BackendKind::Http);
        assert_eq!(settings.search.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(settings.search.page_size, DEFAULT_PAGE_SIZE);
        settings.validate().expect("valid");
    }

    #[test]
    fn http_backend_requires_base_url() {
        let settings = parse("project:\n  id: demo\n  name: Demo\n");
        let err = settings.validate().expect_err("missing base url");
        assert!(err.to_string().contains("api.base_url"));
    }

    #[test]
    fn local_backend_does_not_need_api_settings() {
        let settings = parse("project:\n  id: 3\n  name: Demo\nbackend: local\n");
        assert_eq!(settings.project.id.as_str(), "3");
        settings.validate().expect("valid local settings");
    }

    #[test]
    fn validate_rejects_zero_debounce_and_bad_page_size() {
        let mut settings = Settings::starter(ProjectId::parse("demo").expect("id"), "Demo");
        settings.search.debounce_ms = 0;
        assert!(settings.validate().is_err());
        settings.search.debounce_ms = 200;
        settings.search.page_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn backend_kind_parse_is_case_insensitive() {
        assert_eq!(BackendKind::parse(" HTTP "), Ok(BackendKind::Http));
        assert_eq!(BackendKind::parse("local"), Ok(BackendKind::Local));
        assert!(BackendKind::parse("ftp").is_err());
    }
}
