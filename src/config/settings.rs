//! The assembled runtime configuration.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Deployment environment. Selects defaults and strictness rules; not a user setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
    Test,
}

impl Environment {
    pub const NAMES: [&'static str; 4] = ["development", "staging", "production", "test"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub analytics: bool,
    pub error_reporting: bool,
    pub service_worker: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SecurityOptions {
    pub csp_enabled: bool,
    pub max_login_attempts: u32,
}

/// Immutable runtime configuration, built once by [`Config::build`](super::Config::build).
///
/// Instances are only produced by the assembler, so every value here has
/// passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Configuration {
    pub environment: Environment,
    pub api_base_url: String,
    pub api_timeout_ms: u64,
    pub api_logging_enabled: bool,
    pub app_name: String,
    pub app_version: String,
    pub app_title: String,
    pub debug_enabled: bool,
    pub features: FeatureFlags,
    pub security: SecurityOptions,
    pub server_addr: SocketAddr,
}

impl Configuration {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }

    /// Subset of the configuration that may be handed to the browser.
    pub fn public_view(&self) -> PublicConfig {
        PublicConfig {
            environment: self.environment,
            api_url: self.api_base_url.clone(),
            api_timeout_ms: self.api_timeout_ms,
            api_logging_enabled: self.api_logging_enabled,
            app_name: self.app_name.clone(),
            app_version: self.app_version.clone(),
            app_title: self.app_title.clone(),
            debug: self.debug_enabled,
            features: self.features,
            csp_enabled: self.security.csp_enabled,
        }
    }
}

/// Frontend runtime configuration as served by `GET /api/config/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicConfig {
    pub environment: Environment,
    pub api_url: String,
    pub api_timeout_ms: u64,
    pub api_logging_enabled: bool,
    pub app_name: String,
    pub app_version: String,
    pub app_title: String,
    pub debug: bool,
    pub features: FeatureFlags,
    pub csp_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!("production".parse(), Ok(Environment::Production));
        assert_eq!("Staging".parse(), Ok(Environment::Staging));
        assert_eq!(" test ".parse(), Ok(Environment::Test));
        assert_eq!("prod".parse::<Environment>(), Err(()));
    }

    #[test]
    fn test_environment_names_round_trip() {
        for name in Environment::NAMES {
            let env: Environment = name.parse().unwrap();
            assert_eq!(env.as_str(), name);
        }
    }
}
