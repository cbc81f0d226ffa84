//! Typed accessors over raw configuration values.
//!
//! A value that is set but empty is treated the same as an unset one.

use std::str::FromStr;

use super::source::{EnvSource, ValueSource};
use super::ConfigError;

/// Returns the value of `name` from the process environment, or `default`.
///
/// Fails with [`ConfigError::MissingValue`] when the variable is unset (or empty)
/// and no default is given.
pub fn get_env(name: &str, default: Option<&str>) -> Result<String, ConfigError> {
    string(&EnvSource::default(), name, default)
}

/// Reads a boolean from the process environment. See [`boolean`].
pub fn get_boolean_env(name: &str, default: bool) -> Result<bool, ConfigError> {
    boolean(&EnvSource::default(), name, default)
}

/// Reads a base-10 number from the process environment. See [`number`].
pub fn get_number_env<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    number(&EnvSource::default(), name, default)
}

/// Raw lookup that drops empty values.
pub fn present(source: &dyn ValueSource, name: &str) -> Result<Option<String>, ConfigError> {
    Ok(source.get(name)?.filter(|v| !v.is_empty()))
}

pub fn string(
    source: &dyn ValueSource,
    name: &str,
    default: Option<&str>,
) -> Result<String, ConfigError> {
    match present(source, name)? {
        Some(value) => Ok(value),
        None => default
            .map(str::to_string)
            .ok_or_else(|| ConfigError::MissingValue(name.to_string())),
    }
}

/// Accepts `true/1/yes` and `false/0/no`, case-insensitively.
pub fn boolean(source: &dyn ValueSource, name: &str, default: bool) -> Result<bool, ConfigError> {
    match present(source, name)? {
        Some(value) => parse_bool(name, &value),
        None => Ok(default),
    }
}

pub fn number<T: FromStr>(
    source: &dyn ValueSource,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match present(source, name)? {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(name, value, "a base-10 number")),
        None => Ok(default),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    let trimmed = value.trim();
    if ["true", "1", "yes"]
        .iter()
        .any(|t| trimmed.eq_ignore_ascii_case(t))
    {
        Ok(true)
    } else if ["false", "0", "no"]
        .iter()
        .any(|f| trimmed.eq_ignore_ascii_case(f))
    {
        Ok(false)
    } else {
        Err(ConfigError::invalid(
            name,
            value,
            "a boolean (true/false, 1/0, yes/no)",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::source::MapSource;

    fn source() -> MapSource {
        MapSource::new()
            .set("NAME", "onboarding")
            .set("EMPTY", "")
            .set("TIMEOUT", "2500")
            .set("NEGATIVE", "-3")
            .set("WORDS", "thirty")
    }

    #[test]
    fn test_string_present() {
        assert_eq!(string(&source(), "NAME", None).unwrap(), "onboarding");
    }

    #[test]
    fn test_string_default_when_unset_or_empty() {
        assert_eq!(string(&source(), "UNSET", Some("x")).unwrap(), "x");
        assert_eq!(string(&source(), "EMPTY", Some("y")).unwrap(), "y");
    }

    #[test]
    fn test_string_missing_without_default() {
        let err = string(&source(), "UNSET", None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue(ref n) if n == "UNSET"));

        let err = string(&source(), "EMPTY", None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue(_)));
    }

    #[test]
    fn test_boolean_accepted_spellings() {
        for (raw, expected) in [
            ("true", true),
            ("TRUE", true),
            ("1", true),
            ("Yes", true),
            (" yes ", true),
            ("false", false),
            ("False", false),
            ("0", false),
            ("NO", false),
        ] {
            let src = MapSource::new().set("FLAG", raw);
            assert_eq!(boolean(&src, "FLAG", !expected).unwrap(), expected, "{raw}");
        }
    }

    #[test]
    fn test_boolean_rejects_other_values() {
        for raw in ["on", "off", "2", "truthy", "y"] {
            let src = MapSource::new().set("FLAG", raw);
            let err = boolean(&src, "FLAG", false).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "FLAG"),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_boolean_absent_uses_default() {
        assert!(boolean(&source(), "UNSET", true).unwrap());
        assert!(!boolean(&source(), "EMPTY", false).unwrap());
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(number(&source(), "TIMEOUT", 0u64).unwrap(), 2500);
        assert_eq!(number(&source(), "NEGATIVE", 0i64).unwrap(), -3);
        assert_eq!(number(&source(), "UNSET", 30_000i64).unwrap(), 30_000);
    }

    #[test]
    fn test_number_rejects_non_numeric() {
        let err = number(&source(), "WORDS", 0i64).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref value, .. } if value == "thirty"));
    }
}
