use crate::config::ConfigError;
use crate::preference::PreferenceSyncError;
use thiserror::Error;

/// Top-level error type for the onboard-fnd library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("application context requires a configuration loader")]
    MissingConfig,

    #[error("preference sync error: {0}")]
    Preference(#[from] PreferenceSyncError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
