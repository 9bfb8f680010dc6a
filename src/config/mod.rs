pub mod error;
pub mod load;
pub mod paths;
pub mod save;
pub mod settings;

pub use error::ConfigError;
pub use load::load_global_settings;
pub use paths::{
    default_global_config_path, default_local_directory_path, default_state_root,
    GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR, LOCAL_DIRECTORY_FILE_NAME,
};
pub use save::save_settings;
pub use settings::{
    ApiSettings, BackendKind, ProjectSettings, SearchSettings, Settings, API_BASE_ENV,
    API_KEY_ENV, DEFAULT_DEBOUNCE_MS, DEFAULT_PAGE_SIZE,
};
