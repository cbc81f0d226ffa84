//! Tracing subscriber setup.
//!
//! Logging has to be up before configuration is assembled so that assembly
//! errors reach the logs. The filter is installed behind a reload handle and
//! tightened or loosened once the configuration is known.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::config::Configuration;
use crate::Error;

/// Handle for adjusting the global log filter after startup.
#[derive(Debug, Clone)]
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogHandle {
    /// Raises the filter to `debug` when the configuration enables debug mode.
    ///
    /// An explicit `RUST_LOG` always wins.
    pub fn apply(&self, config: &Configuration) -> Result<(), Error> {
        if self.from_env {
            return Ok(());
        }
        let level = level_for(config);
        self.filter
            .reload(EnvFilter::default().add_directive(level.into()))
            .map_err(|e| Error::Logging(e.to_string()))
    }
}

/// Installs the global fmt subscriber. Honors `RUST_LOG`, defaulting to `info`.
pub fn init() -> Result<LogHandle, Error> {
    let from_env = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    Ok(LogHandle {
        filter: handle,
        from_env,
    })
}

fn level_for(config: &Configuration) -> LevelFilter {
    if config.debug_enabled {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MapSource};

    #[test]
    fn test_level_follows_debug_flag() {
        let dev = Config::builder().with_source(MapSource::new()).build().unwrap();
        assert_eq!(level_for(&dev), LevelFilter::DEBUG);

        let quiet = Config::builder()
            .with_source(MapSource::new().set("DEBUG", "false"))
            .build()
            .unwrap();
        assert_eq!(level_for(&quiet), LevelFilter::INFO);
    }
}
