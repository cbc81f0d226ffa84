//! Client-side theme preference state with optimistic updates.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::PreferenceSyncError;
use super::model::{Theme, ThemePreference};
use super::transport::PreferenceTransport;

pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the client is in its load/update lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    LoadFailed,
    Updating,
    UpdateFailed,
}

/// Everything an observer (typically the UI) needs to render the preference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceSnapshot {
    pub state: SyncState,
    /// The theme to display. Updated optimistically before writes complete.
    pub theme: Theme,
    /// Last value the server acknowledged.
    pub confirmed: Option<ThemePreference>,
    pub last_error: Option<PreferenceSyncError>,
    pub in_flight_writes: usize,
}

/// Keeps a locally displayed theme in sync with the remote preference.
///
/// Writes are optimistic: [`set_preference`](Self::set_preference) changes the
/// displayed theme before any I/O and keeps it even if the write fails.
/// Overlapping writes are not cancelled; the last response to arrive becomes
/// the confirmed value.
#[derive(Debug)]
pub struct PreferenceClient<T> {
    transport: T,
    timeout: Duration,
    snapshot: watch::Sender<PreferenceSnapshot>,
}

impl<T: PreferenceTransport> PreferenceClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_timeout(transport, DEFAULT_SYNC_TIMEOUT)
    }

    pub fn with_timeout(transport: T, timeout: Duration) -> Self {
        let (snapshot, _) = watch::channel(PreferenceSnapshot::default());
        Self {
            transport,
            timeout,
            snapshot,
        }
    }

    pub fn theme(&self) -> Theme {
        self.snapshot.borrow().theme
    }

    pub fn state(&self) -> SyncState {
        self.snapshot.borrow().state
    }

    pub fn last_error(&self) -> Option<PreferenceSyncError> {
        self.snapshot.borrow().last_error.clone()
    }

    pub fn snapshot(&self) -> PreferenceSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<PreferenceSnapshot> {
        self.snapshot.subscribe()
    }

    /// Fetches the stored preference.
    ///
    /// Never fails: on any error the client moves to `LoadFailed`, records the
    /// error, and falls back to the default (`auto`) theme. While writes are in
    /// flight the fetched value is returned but the displayed theme and state
    /// are left to those writes.
    pub async fn load_preference(&self) -> ThemePreference {
        self.snapshot.send_if_modified(|s| {
            if s.in_flight_writes > 0 {
                return false;
            }
            s.state = SyncState::Loading;
            true
        });

        match self.bounded(self.transport.fetch()).await {
            Ok(preference) => {
                self.snapshot.send_if_modified(|s| {
                    if s.in_flight_writes > 0 {
                        return false;
                    }
                    s.state = SyncState::Ready;
                    s.theme = preference.theme;
                    s.confirmed = Some(preference.clone());
                    s.last_error = None;
                    true
                });
                preference
            }
            Err(err) => {
                warn!(error = %err, "failed to load theme preference; using default");
                self.snapshot.send_modify(|s| {
                    if s.in_flight_writes == 0 {
                        s.state = SyncState::LoadFailed;
                        s.theme = Theme::default();
                    }
                    s.last_error = Some(err);
                });
                ThemePreference::default()
            }
        }
    }

    /// Displays `theme` immediately, then persists it.
    ///
    /// A failed write leaves the displayed theme in place; the error is
    /// returned and also kept in [`last_error`](Self::last_error). Once no
    /// writes remain in flight, the last response to arrive decides between
    /// `Ready` and `UpdateFailed`. Dropping the returned future abandons the
    /// write without leaving the client stuck in `Updating`.
    pub async fn set_preference(&self, theme: Theme) -> Result<ThemePreference, PreferenceSyncError> {
        let pending = PendingWrite::begin(&self.snapshot, theme);
        let result = self.bounded(self.transport.store(theme)).await;
        pending.settle(&result);

        match &result {
            Ok(preference) => info!(theme = %preference.theme, "theme preference saved"),
            Err(err) => warn!(error = %err, %theme, "failed to save theme preference; keeping local choice"),
        }
        result
    }

    /// Reverts the displayed theme to the last server-confirmed value, if any.
    pub fn discard_unconfirmed(&self) -> Theme {
        let mut shown = Theme::default();
        self.snapshot.send_modify(|s| {
            if let Some(confirmed) = &s.confirmed {
                s.theme = confirmed.theme;
            }
            shown = s.theme;
        });
        shown
    }

    async fn bounded<F>(&self, request: F) -> Result<ThemePreference, PreferenceSyncError>
    where
        F: Future<Output = Result<ThemePreference, PreferenceSyncError>>,
    {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| PreferenceSyncError::Timeout(self.timeout))?
    }
}

/// Counts one write as in flight until it is settled or dropped.
struct PendingWrite<'a> {
    snapshot: &'a watch::Sender<PreferenceSnapshot>,
    settled: bool,
}

impl<'a> PendingWrite<'a> {
    fn begin(snapshot: &'a watch::Sender<PreferenceSnapshot>, theme: Theme) -> Self {
        snapshot.send_modify(|s| {
            s.theme = theme;
            s.state = SyncState::Updating;
            s.in_flight_writes += 1;
        });
        Self {
            snapshot,
            settled: false,
        }
    }

    fn settle(mut self, result: &Result<ThemePreference, PreferenceSyncError>) {
        self.settled = true;
        self.snapshot.send_modify(|s| {
            s.in_flight_writes = s.in_flight_writes.saturating_sub(1);
            match result {
                Ok(preference) => {
                    s.confirmed = Some(preference.clone());
                    if s.in_flight_writes == 0 {
                        s.state = SyncState::Ready;
                        s.last_error = None;
                    }
                }
                Err(err) => {
                    s.state = SyncState::UpdateFailed;
                    s.last_error = Some(err.clone());
                }
            }
        });
    }
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        debug!("theme write abandoned before a response arrived");
        self.snapshot.send_modify(|s| {
            s.in_flight_writes = s.in_flight_writes.saturating_sub(1);
            if s.in_flight_writes == 0 && s.state == SyncState::Updating {
                s.state = SyncState::Ready;
            }
        });
    }
}
