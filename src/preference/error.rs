use std::time::Duration;

use thiserror::Error;

/// A failed read or write of the remote theme preference.
///
/// `Clone` so the client can keep the last failure around for observers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PreferenceSyncError {
    #[error("preference request timed out after {0:?}")]
    Timeout(Duration),

    #[error("preference request failed: {0}")]
    Network(String),

    #[error("preference endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("invalid preference response: {0}")]
    Decode(String),
}
