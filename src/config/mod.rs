pub mod error;
pub mod load;
pub mod paths;
pub mod save;
pub mod settings;

pub use error::ConfigError;
pub use load::load_global_settings;
pub use paths::{
    default_global_config_path, default_log_path, default_session_path, default_state_root_path,
    GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR,
};
pub use save::{init_settings, save_settings_to};
pub(crate) use settings::join_endpoint;
pub use settings::{
    Settings, SubmitFormat, ADMIN_API_BASE_ENV, API_BASE_ENV, DEFAULT_ADMIN_API_BASE_URL,
    DEFAULT_API_BASE_URL, DEFAULT_DNS_SEED,
};
