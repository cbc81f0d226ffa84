use std::collections::BTreeMap;
use std::env::VarError;
use std::sync::Arc;

use super::ConfigError;

/// Something that yields raw configuration strings by logical key (e.g. `API_URL`).
///
/// `Ok(None)` means the key is not set here. An error means it is set but
/// cannot be read as text.
pub trait ValueSource: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError>;
}

impl<S: ValueSource + ?Sized> ValueSource for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        (**self).get(key)
    }
}

/// Reads keys from the process environment, with an optional namespace prefix.
///
/// The backend reads `API_URL` directly; the frontend build reads `VITE_API_URL`
/// by using `EnvSource::new("VITE_")`.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    prefix: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn variable(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl ValueSource for EnvSource {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let variable = self.variable(key);
        match std::env::var(&variable) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(raw)) => Err(ConfigError::invalid(
                variable,
                raw.to_string_lossy(),
                "valid UTF-8",
            )),
        }
    }
}

/// In-memory source, mostly useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: BTreeMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ValueSource for MapSource {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Ordered stack of sources. Later layers override earlier ones.
///
/// An empty value does not shadow a non-empty one further down; it is only
/// returned when no layer has anything better.
#[derive(Debug, Default)]
pub struct Layered {
    layers: Vec<Box<dyn ValueSource>>,
}

impl Layered {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: Box<dyn ValueSource>) {
        self.layers.push(source);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl ValueSource for Layered {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let mut empty = None;
        for layer in self.layers.iter().rev() {
            match layer.get(key)? {
                Some(value) if !value.is_empty() => return Ok(Some(value)),
                Some(value) => {
                    empty.get_or_insert(value);
                }
                None => {}
            }
        }
        Ok(empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_layers_override() {
        let mut layered = Layered::new();
        layered.push(Box::new(MapSource::new().set("A", "base").set("B", "base")));
        layered.push(Box::new(MapSource::new().set("A", "override")));

        assert_eq!(layered.get("A").unwrap().as_deref(), Some("override"));
        assert_eq!(layered.get("B").unwrap().as_deref(), Some("base"));
        assert_eq!(layered.get("C").unwrap(), None);
    }

    #[test]
    fn test_empty_layer_does_not_shadow_lower_value() {
        let mut layered = Layered::new();
        layered.push(Box::new(MapSource::new().set("A", "from file").set("B", "")));
        layered.push(Box::new(MapSource::new().set("A", "").set("B", "")));

        assert_eq!(layered.get("A").unwrap().as_deref(), Some("from file"));
        assert_eq!(layered.get("B").unwrap().as_deref(), Some(""));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_source_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var("ONBOARD_SOURCE_BYTES", OsStr::from_bytes(b"caf\xe9"));
        let err = EnvSource::new("ONBOARD_SOURCE_").get("BYTES").unwrap_err();
        std::env::remove_var("ONBOARD_SOURCE_BYTES");

        assert!(
            matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "ONBOARD_SOURCE_BYTES")
        );
    }

    #[test]
    fn test_env_source_prefix() {
        assert_eq!(EnvSource::new("VITE_").variable("API_URL"), "VITE_API_URL");
        assert_eq!(EnvSource::default().variable("API_URL"), "API_URL");
    }
}
