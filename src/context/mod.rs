//! Process-wide application context holding the assembled configuration.

use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::config::{Config, ConfigError, Configuration};
use crate::Error;

/// Central application context holding the current configuration snapshot.
///
/// Readers get an `Arc<Configuration>` that never changes underneath them.
/// [`reload`](Self::reload) swaps in a new snapshot only when assembly succeeds.
///
/// ## Example
///
/// ```no_run
/// use onboard_fnd::{AppContext, Config};
///
/// let ctx = AppContext::builder()
///     .with_config(Config::backend())
///     .build()?;
///
/// let config = ctx.config();
/// println!("{} {}", config.app_name, config.app_version);
/// # Ok::<(), onboard_fnd::Error>(())
/// ```
#[derive(Debug)]
pub struct AppContext {
    loader: Config,
    current: RwLock<Arc<Configuration>>,
}

impl AppContext {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder { loader: None }
    }

    /// Returns the current configuration snapshot.
    pub fn config(&self) -> Arc<Configuration> {
        Arc::clone(&self.current.read())
    }

    /// Re-runs assembly with the original loader.
    ///
    /// On failure the error is returned and the previous snapshot stays in effect.
    pub fn reload(&self) -> Result<Arc<Configuration>, ConfigError> {
        match self.loader.build() {
            Ok(next) => {
                let next = Arc::new(next);
                *self.current.write() = Arc::clone(&next);
                info!("configuration reloaded");
                Ok(next)
            }
            Err(err) => {
                warn!(error = %err, "configuration reload rejected; keeping previous configuration");
                Err(err)
            }
        }
    }
}

/// Builder for constructing an [`AppContext`].
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder {
    loader: Option<Config>,
}

impl AppContextBuilder {
    /// Sets the loader used for the initial build and for every reload.
    pub fn with_config(self, loader: Config) -> Self {
        Self {
            loader: Some(loader),
        }
    }

    /// Assembles the configuration and builds the `AppContext`.
    ///
    /// Returns an error if no loader was provided or assembly fails.
    pub fn build(self) -> Result<AppContext, Error> {
        let loader = self.loader.ok_or(Error::MissingConfig)?;
        let config = loader.build()?;
        Ok(AppContext {
            loader,
            current: RwLock::new(Arc::new(config)),
        })
    }
}

/// A context constructed on first use.
///
/// Concurrent first callers serialize on an init lock, so exactly one
/// construction runs and everyone observes the same instance. A failed
/// construction leaves the cell empty.
#[derive(Debug)]
pub struct SharedContext {
    cell: OnceLock<AppContext>,
    init: Mutex<()>,
}

impl SharedContext {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            init: parking_lot::const_mutex(()),
        }
    }

    pub fn get(&self) -> Option<&AppContext> {
        self.cell.get()
    }

    pub fn get_or_try_init(
        &self,
        make: impl FnOnce() -> Result<AppContext, Error>,
    ) -> Result<&AppContext, Error> {
        if let Some(ctx) = self.cell.get() {
            return Ok(ctx);
        }
        let _guard = self.init.lock();
        if let Some(ctx) = self.cell.get() {
            return Ok(ctx);
        }
        let ctx = make()?;
        Ok(self.cell.get_or_init(|| ctx))
    }
}

impl Default for SharedContext {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: SharedContext = SharedContext::new();

/// The process-wide context, built from [`Config::backend`] on first access.
pub fn global() -> Result<&'static AppContext, Error> {
    GLOBAL.get_or_try_init(|| AppContext::builder().with_config(Config::backend()).build())
}

/// Shorthand for `global()?.config()`.
pub fn load_configuration() -> Result<Arc<Configuration>, Error> {
    Ok(global()?.config())
}
