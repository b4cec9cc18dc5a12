//! Storage for configuration and per-session credit state.

pub mod config;
pub mod credit_state;
pub mod paths;

pub use config::{
    Config, ConfigSource, ConfigSources, DEFAULT_SESSION, ENV_CONFIG, ENV_DAILY_CREDITS,
    ENV_FORMAT, ENV_NO_COLOR, ENV_NO_COLOR_STD, ENV_PRETTY, ENV_RESET_HOUR, ENV_SESSION,
    ENV_VERBOSE, ResolvedConfig,
};
pub use credit_state::{CreditStateStore, MAX_SESSION_LEN, validate_session_id};
pub use paths::{AppPaths, ENV_DATA_DIR};
