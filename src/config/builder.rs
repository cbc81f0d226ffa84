use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::env;
use super::file::FileSource;
use super::settings::{Configuration, Environment, FeatureFlags, SecurityOptions};
use super::source::{EnvSource, Layered, ValueSource};
use super::validate::{
    validate_api_url, validate_enum, validate_non_empty, validate_positive_integer,
};
use super::ConfigError;

/// Logical configuration keys. Environment sources may add a namespace prefix.
pub mod keys {
    pub const APP_ENV: &str = "APP_ENV";
    pub const API_URL: &str = "API_URL";
    pub const API_TIMEOUT: &str = "API_TIMEOUT";
    pub const API_LOGGING: &str = "API_LOGGING";
    pub const APP_NAME: &str = "APP_NAME";
    pub const APP_VERSION: &str = "APP_VERSION";
    pub const APP_TITLE: &str = "APP_TITLE";
    pub const DEBUG: &str = "DEBUG";
    pub const ENABLE_ANALYTICS: &str = "ENABLE_ANALYTICS";
    pub const ENABLE_ERROR_REPORTING: &str = "ENABLE_ERROR_REPORTING";
    pub const ENABLE_SERVICE_WORKER: &str = "ENABLE_SERVICE_WORKER";
    pub const ENABLE_CSP: &str = "ENABLE_CSP";
    pub const MAX_LOGIN_ATTEMPTS: &str = "MAX_LOGIN_ATTEMPTS";
    pub const SERVER_ADDR: &str = "SERVER_ADDR";
}

/// Process environment variable naming an optional TOML overlay for [`Config::backend`].
pub const CONFIG_FILE_VAR: &str = "CONFIG_FILE";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_TIMEOUT_MS: i64 = 30_000;
pub const DEFAULT_APP_NAME: &str = "Fitness Onboarding";
pub const DEFAULT_MAX_LOGIN_ATTEMPTS: i64 = 5;
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:8000";

/// What to do when more than one field is invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Stop at the first invalid field, in declaration order.
    #[default]
    FailFast,
    /// Check every field and report all failures as [`ConfigError::Multiple`].
    Aggregate,
}

#[derive(Debug, Clone)]
enum Layer {
    File { path: PathBuf, required: bool },
    Env { prefix: String },
    Custom(Arc<dyn ValueSource>),
}

/// Assembles a [`Configuration`] from layered sources.
///
/// Sources are applied in registration order, later sources overriding
/// earlier ones. For each field the highest layer with a non-empty value
/// wins; otherwise the environment-specific default applies; a required
/// field with neither fails.
///
/// ## Example
///
/// ```no_run
/// use onboard_fnd::Config;
///
/// // defaults -> deploy file -> environment overrides
/// let config = Config::builder()
///     .with_file("config/deploy.toml", false)
///     .with_env("")
///     .build()?;
/// println!("talking to {}", config.api_base_url);
/// # Ok::<(), onboard_fnd::ConfigError>(())
/// ```
///
/// `build` borrows the builder, so the same loader can be re-run to reload.
#[derive(Debug, Clone, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    sources: Vec<Layer>,
    policy: ValidationPolicy,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Backend loader: the TOML file named by `CONFIG_FILE` (if set), then the
    /// unprefixed process environment.
    pub fn backend() -> Self {
        let builder = Self::builder();
        let builder = match std::env::var(CONFIG_FILE_VAR) {
            Ok(path) if !path.is_empty() => builder.with_file(path, true),
            _ => builder,
        };
        builder.with_env("")
    }

    /// Frontend loader: `VITE_`-prefixed process environment.
    pub fn frontend() -> Self {
        Self::builder().with_env("VITE_")
    }

    /// Adds a TOML file layer. See [`FileSource`] for the key mapping.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_file(mut self, path: impl AsRef<Path>, required: bool) -> Self {
        self.sources.push(Layer::File {
            path: path.as_ref().to_path_buf(),
            required,
        });
        self
    }

    /// Adds a process-environment layer; key `API_URL` is read from `{prefix}API_URL`.
    pub fn with_env(mut self, prefix: impl Into<String>) -> Self {
        self.sources.push(Layer::Env {
            prefix: prefix.into(),
        });
        self
    }

    /// Adds an arbitrary source layer.
    pub fn with_source(mut self, source: impl ValueSource + 'static) -> Self {
        self.sources.push(Layer::Custom(Arc::new(source)));
        self
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reads every layer, resolves each field, and validates it.
    ///
    /// Files are re-read on every call.
    pub fn build(&self) -> Result<Configuration, ConfigError> {
        let source = self.layers()?;
        let environment = resolve_environment(&source)?;
        let dev = environment.is_development();
        let prod = environment.is_production();
        let mut fields = Collector::new(self.policy);

        let api_base_url = fields.take(resolve_api_url(&source, environment))?;
        let api_timeout_ms = fields.take(
            env::number(&source, keys::API_TIMEOUT, DEFAULT_API_TIMEOUT_MS)
                .and_then(|v| validate_positive_integer(keys::API_TIMEOUT, v)),
        )?;
        let api_logging_enabled = fields.take(env::boolean(&source, keys::API_LOGGING, dev))?;
        let app_name = fields.take(
            env::string(&source, keys::APP_NAME, Some(DEFAULT_APP_NAME))
                .and_then(|v| validate_non_empty(keys::APP_NAME, v)),
        )?;
        let app_version = fields.take(
            env::string(&source, keys::APP_VERSION, Some(env!("CARGO_PKG_VERSION")))
                .and_then(|v| validate_non_empty(keys::APP_VERSION, v)),
        )?;
        let title_default = if app_name.is_empty() {
            DEFAULT_APP_NAME
        } else {
            app_name.as_str()
        };
        let app_title = fields.take(
            env::string(&source, keys::APP_TITLE, Some(title_default))
                .and_then(|v| validate_non_empty(keys::APP_TITLE, v)),
        )?;
        let debug_enabled = fields.take(env::boolean(&source, keys::DEBUG, dev))?;

        let features = FeatureFlags {
            analytics: fields.take(env::boolean(&source, keys::ENABLE_ANALYTICS, false))?,
            error_reporting: fields.take(env::boolean(
                &source,
                keys::ENABLE_ERROR_REPORTING,
                prod,
            ))?,
            service_worker: fields.take(env::boolean(
                &source,
                keys::ENABLE_SERVICE_WORKER,
                prod,
            ))?,
        };
        let security = SecurityOptions {
            csp_enabled: fields.take(env::boolean(&source, keys::ENABLE_CSP, prod))?,
            max_login_attempts: fields.take(resolve_login_attempts(&source))?,
        };
        let server_addr = fields.take_or(resolve_server_addr(&source), || {
            SocketAddr::from(([127, 0, 0, 1], 8000))
        })?;

        let config = fields.finish(Configuration {
            environment,
            api_base_url,
            api_timeout_ms,
            api_logging_enabled,
            app_name,
            app_version,
            app_title,
            debug_enabled,
            features,
            security,
            server_addr,
        })?;

        info!(
            environment = %config.environment,
            api_base_url = %config.api_base_url,
            "configuration assembled"
        );
        Ok(config)
    }

    fn layers(&self) -> Result<Layered, ConfigError> {
        let mut layered = Layered::new();
        for layer in &self.sources {
            match layer {
                Layer::File { path, required } => {
                    debug!(path = %path.display(), required, "loading config file");
                    layered.push(Box::new(FileSource::load(path, *required)?));
                }
                Layer::Env { prefix } => {
                    layered.push(Box::new(EnvSource::new(prefix.clone())));
                }
                Layer::Custom(source) => layered.push(Box::new(Arc::clone(source))),
            }
        }
        Ok(layered)
    }
}

/// Defaults to development; an unknown name is always fatal because every
/// other default depends on it.
fn resolve_environment(source: &dyn ValueSource) -> Result<Environment, ConfigError> {
    let Some(raw) = env::present(source, keys::APP_ENV)? else {
        return Ok(Environment::default());
    };
    let name = raw.trim().to_ascii_lowercase();
    validate_enum(keys::APP_ENV, &name, &Environment::NAMES)?
        .parse::<Environment>()
        .map_err(|()| ConfigError::invalid(keys::APP_ENV, raw.as_str(), "an environment name"))
}

/// A URL that is set but empty in every layer is handed to the validator
/// rather than defaulted.
fn resolve_api_url(
    source: &dyn ValueSource,
    environment: Environment,
) -> Result<String, ConfigError> {
    match source.get(keys::API_URL)? {
        Some(value) => validate_api_url(keys::API_URL, &value, environment),
        None if environment.is_production() => {
            Err(ConfigError::MissingValue(keys::API_URL.to_string()))
        }
        None => Ok(DEFAULT_API_URL.to_string()),
    }
}

fn resolve_login_attempts(source: &dyn ValueSource) -> Result<u32, ConfigError> {
    let raw = env::number(source, keys::MAX_LOGIN_ATTEMPTS, DEFAULT_MAX_LOGIN_ATTEMPTS)?;
    let attempts = validate_positive_integer(keys::MAX_LOGIN_ATTEMPTS, raw)?;
    u32::try_from(attempts).map_err(|_| {
        ConfigError::invalid(
            keys::MAX_LOGIN_ATTEMPTS,
            attempts.to_string(),
            "a 32-bit unsigned integer",
        )
    })
}

fn resolve_server_addr(source: &dyn ValueSource) -> Result<SocketAddr, ConfigError> {
    let raw = env::string(source, keys::SERVER_ADDR, Some(DEFAULT_SERVER_ADDR))?;
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(keys::SERVER_ADDR, raw.as_str(), "a socket address (host:port)"))
}

/// Applies the [`ValidationPolicy`] to per-field results.
struct Collector {
    policy: ValidationPolicy,
    errors: Vec<ConfigError>,
}

impl Collector {
    fn new(policy: ValidationPolicy) -> Self {
        Self {
            policy,
            errors: Vec::new(),
        }
    }

    fn take<T: Default>(&mut self, result: Result<T, ConfigError>) -> Result<T, ConfigError> {
        self.take_or(result, T::default)
    }

    /// Under `Aggregate`, records the error and substitutes `fallback` so the
    /// remaining fields still get checked.
    fn take_or<T>(
        &mut self,
        result: Result<T, ConfigError>,
        fallback: impl FnOnce() -> T,
    ) -> Result<T, ConfigError> {
        match (result, self.policy) {
            (Ok(value), _) => Ok(value),
            (Err(err), ValidationPolicy::FailFast) => Err(err),
            (Err(err), ValidationPolicy::Aggregate) => {
                self.errors.push(err);
                Ok(fallback())
            }
        }
    }

    fn finish<T>(mut self, value: T) -> Result<T, ConfigError> {
        match self.errors.len() {
            0 => Ok(value),
            1 => Err(self.errors.remove(0)),
            _ => Err(ConfigError::Multiple(self.errors)),
        }
    }
}
