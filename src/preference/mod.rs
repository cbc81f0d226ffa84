//! Theme preference: data model, sync client, and HTTP service.

mod client;
mod error;
mod model;
pub mod service;
mod store;
mod transport;

pub use client::{PreferenceClient, PreferenceSnapshot, SyncState, DEFAULT_SYNC_TIMEOUT};
pub use error::PreferenceSyncError;
pub use model::{InvalidTheme, Theme, ThemePreference};
pub use service::{create_router, AppState};
pub use store::MemoryStore;
pub use transport::{HttpTransport, PreferenceTransport, PREFERENCE_PATH, USER_HEADER};
