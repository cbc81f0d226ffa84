//! Runtime configuration: typed accessors, validators, and the assembler.

mod builder;
pub mod env;
mod error;
mod file;
mod settings;
mod source;
pub mod validate;

pub use builder::{
    keys, Config, ValidationPolicy, CONFIG_FILE_VAR, DEFAULT_API_TIMEOUT_MS, DEFAULT_API_URL,
    DEFAULT_APP_NAME, DEFAULT_MAX_LOGIN_ATTEMPTS, DEFAULT_SERVER_ADDR,
};
pub use env::{get_boolean_env, get_env, get_number_env};
pub use error::ConfigError;
pub use file::FileSource;
pub use settings::{Configuration, Environment, FeatureFlags, PublicConfig, SecurityOptions};
pub use source::{EnvSource, Layered, MapSource, ValueSource};
