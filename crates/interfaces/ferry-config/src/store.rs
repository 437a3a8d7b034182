use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config shape error: {0}")]
    Shape(String),
}

/// Scalar lookup keyed by (section, element).
pub trait ConfigStore: Send + Sync {
    fn get(&self, section: &str, element: &str) -> Option<String>;
}

/// Reads `{ "section": { "element": value } }` documents. Scalar values of any
/// JSON type are stringified; `null` becomes an empty string.
#[derive(Debug, Clone, Default)]
pub struct JsonConfigStore {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl JsonConfigStore {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(data)?;
        let Value::Object(root) = root else {
            return Err(ConfigError::Shape("top level must be an object".into()));
        };

        let mut sections = BTreeMap::new();
        for (name, body) in root {
            let Value::Object(body) = body else {
                return Err(ConfigError::Shape(format!(
                    "section '{name}' must be an object"
                )));
            };
            let mut elements = BTreeMap::new();
            for (key, value) in body {
                let scalar = match value {
                    Value::Null => String::new(),
                    Value::String(s) => s,
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    Value::Array(_) | Value::Object(_) => {
                        return Err(ConfigError::Shape(format!(
                            "element '{name}.{key}' must be a scalar"
                        )));
                    }
                };
                elements.insert(key, scalar);
            }
            sections.insert(name, elements);
        }
        Ok(Self { sections })
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }
}

impl ConfigStore for JsonConfigStore {
    fn get(&self, section: &str, element: &str) -> Option<String> {
        self.sections.get(section)?.get(element).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_of_any_type_are_stringified() {
        let store = JsonConfigStore::parse(
            r#"{"nightly": {"SourcePath": "/in", "SourceRetry": 3, "DeleteAfterReceive": true, "DestUser": null}}"#,
        )
        .unwrap();
        assert_eq!(store.get("nightly", "SourcePath").as_deref(), Some("/in"));
        assert_eq!(store.get("nightly", "SourceRetry").as_deref(), Some("3"));
        assert_eq!(
            store.get("nightly", "DeleteAfterReceive").as_deref(),
            Some("true")
        );
        assert_eq!(store.get("nightly", "DestUser").as_deref(), Some(""));
        assert_eq!(store.get("nightly", "Missing"), None);
        assert_eq!(store.get("other", "SourcePath"), None);
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = JsonConfigStore::parse(r#"{"job": {"SourcePath": ["a"]}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Shape(_)));
        let err = JsonConfigStore::parse(r#"["job"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Shape(_)));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        std::fs::write(&path, r#"{"a": {"b": "c"}, "z": {}}"#).unwrap();
        let store = JsonConfigStore::load(&path).unwrap();
        assert_eq!(store.get("a", "b").as_deref(), Some("c"));
        assert_eq!(store.sections().collect::<Vec<_>>(), vec!["a", "z"]);

        let missing = JsonConfigStore::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
