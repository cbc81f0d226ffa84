//! Field-local validators.
//!
//! Each validator returns the value unchanged on success so it can be chained
//! directly after an accessor.

use url::Url;

use super::settings::Environment;
use super::ConfigError;

pub fn validate_api_url(
    field: &str,
    value: &str,
    environment: Environment,
) -> Result<String, ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::validation(field, "API URL cannot be empty"));
    }

    let url = Url::parse(value).map_err(|e| {
        ConfigError::validation(
            field,
            format!("API URL is not a valid absolute URL: {value:?} ({e})"),
        )
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::validation(
            field,
            format!("API URL must use http or https, got {:?}", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::validation(
            field,
            format!("API URL is not a valid absolute URL: {value:?} (missing host)"),
        ));
    }
    if environment.is_production() && url.scheme() != "https" {
        return Err(ConfigError::validation(
            field,
            "API URL must use HTTPS in production",
        ));
    }

    Ok(value.to_string())
}

pub fn validate_enum<'a>(field: &str, value: &'a str, allowed: &[&str]) -> Result<&'a str, ConfigError> {
    if allowed.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::invalid(
            field,
            value,
            format!("one of: {}", allowed.join(", ")),
        ))
    }
}

pub fn validate_positive_integer(field: &str, value: i64) -> Result<u64, ConfigError> {
    u64::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            ConfigError::validation(field, format!("must be a positive integer, got {value}"))
        })
}

pub fn validate_non_empty(field: &str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::validation(field, format!("{field} cannot be empty")))
    } else {
        Ok(value)
    }
}
