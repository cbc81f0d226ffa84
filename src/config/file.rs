//! File-based configuration source.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use super::source::ValueSource;
use super::ConfigError;

/// A configuration source backed by a TOML file.
///
/// Nested tables flatten into upper-case keys joined by `_`, so
///
/// ```toml
/// [api]
/// url = "https://api.example.com"
/// timeout = 10000
/// ```
///
/// provides `API_URL` and `API_TIMEOUT`. Scalars are stringified so they go
/// through the same coercion as environment variables.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSource {
    /// Loads the file.
    ///
    /// If `required` is true, a missing file is an error; a missing optional
    /// file produces an empty source.
    pub fn load(path: impl AsRef<Path>, required: bool) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let values = match load_config_file(&path, required)? {
            Some(table) => flatten(&table)?,
            None => BTreeMap::new(),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ValueSource for FileSource {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Loads and parses a TOML config file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn load_config_file(path: &Path, required: bool) -> Result<Option<Table>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let table = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(table))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn flatten(table: &Table) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut out = BTreeMap::new();
    flatten_into(&mut out, "", table)?;
    Ok(out)
}

fn flatten_into(
    out: &mut BTreeMap<String, String>,
    prefix: &str,
    table: &Table,
) -> Result<(), ConfigError> {
    for (key, value) in table {
        let key = if prefix.is_empty() {
            key.to_uppercase()
        } else {
            format!("{prefix}_{}", key.to_uppercase())
        };
        match value {
            Value::Table(nested) => flatten_into(out, &key, nested)?,
            scalar => {
                let rendered = scalar_to_string(scalar, &key)?;
                out.insert(key, rendered);
            }
        }
    }
    Ok(())
}

fn scalar_to_string(value: &Value, key: &str) -> Result<String, ConfigError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(dt) => Ok(dt.to_string()),
        Value::Array(_) | Value::Table(_) => Err(ConfigError::NonScalarValue(key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_source_flattens_sections() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            app_name = "Onboarding"
            debug = false

            [api]
            url = "https://api.example.com"
            timeout = 5000
            "#
        )
        .unwrap();

        let source = FileSource::load(file.path(), true).unwrap();

        assert_eq!(source.get("APP_NAME").unwrap().as_deref(), Some("Onboarding"));
        assert_eq!(source.get("DEBUG").unwrap().as_deref(), Some("false"));
        assert_eq!(
            source.get("API_URL").unwrap().as_deref(),
            Some("https://api.example.com")
        );
        assert_eq!(source.get("API_TIMEOUT").unwrap().as_deref(), Some("5000"));
    }

    #[test]
    fn test_file_source_rejects_arrays() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "hosts = [\"a\", \"b\"]").unwrap();

        let result = FileSource::load(file.path(), true);
        assert!(matches!(result, Err(ConfigError::NonScalarValue(ref k)) if k == "HOSTS"));
    }

    #[test]
    fn test_file_source_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is = = not toml").unwrap();

        let result = FileSource::load(file.path(), true);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_file_source_required_missing() {
        let result = FileSource::load("/nonexistent/path/config.toml", true);

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_file_source_optional_missing() {
        let source = FileSource::load("/nonexistent/path/config.toml", false).unwrap();

        assert_eq!(source.get("API_URL").unwrap(), None);
    }
}
