pub mod config;
pub mod context;
mod error;
pub mod logging;
pub mod preference;

pub use config::{Config, ConfigError, Configuration, Environment};
pub use context::AppContext;
pub use error::Error;
pub use preference::{PreferenceClient, PreferenceSyncError, Theme, ThemePreference};
