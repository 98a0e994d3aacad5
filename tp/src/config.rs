//! Stamp configuration - the flat key→value mapping behind a template run

use std::path::Path;

use eyre::{Context, Result};
use serde_json::{Map, Value};
use tracing::debug;

use crate::rename::RenameRule;

/// Reserved key prefix marking a file renaming rule.
///
/// A key `$$FILE_<pattern>` maps a file base name (`pattern`, matched
/// exactly) to a replacement base name (the key's value). All other keys are
/// consumed as `{{ key }}` placeholders.
pub const FILE_RULE_PREFIX: &str = "$$FILE_";

/// Flat string-keyed configuration parsed from a JSON object.
///
/// Keys are unique (JSON object semantics). Insertion order is irrelevant
/// for substitution; rename rules are evaluated in the map's iteration
/// order, which is deterministic for a given document.
#[derive(Debug, Clone, Default)]
pub struct StampConfig {
    values: Map<String, Value>,
}

impl StampConfig {
    /// Parse a configuration from a JSON object string.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).context("Invalid stamp configuration JSON")?;
        match value {
            Value::Object(values) => {
                debug!(keys = values.len(), "StampConfig::from_json: parsed");
                Ok(Self { values })
            }
            other => Err(eyre::eyre!(
                "Stamp configuration must be a JSON object, got {}",
                json_type_name(&other)
            )),
        }
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read stamp configuration: {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Look up a key and coerce its value to text.
    ///
    /// Strings are taken verbatim; numbers and booleans use their JSON
    /// display form. Null and structured values are not substitutable, so
    /// tokens referencing them stay untouched.
    pub fn lookup(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Extract file renaming rules from `$$FILE_`-prefixed keys.
    ///
    /// Recomputed on every call so edits to the configuration between runs
    /// always take effect; rules are never cached or persisted.
    pub fn rename_rules(&self) -> Vec<RenameRule> {
        let rules: Vec<RenameRule> = self
            .values
            .iter()
            .filter_map(|(key, value)| {
                let pattern = key.strip_prefix(FILE_RULE_PREFIX)?;
                let replacement = match value {
                    Value::String(s) => s.clone(),
                    _ => return None,
                };
                Some(RenameRule {
                    pattern: pattern.to_string(),
                    replacement,
                })
            })
            .collect();
        debug!(count = rules.len(), "StampConfig::rename_rules: extracted");
        rules
    }

    /// Number of entries in the mapping (placeholders and rules combined).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the mapping has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object() {
        let config = StampConfig::from_json(r#"{"name": "World", "count": 3}"#).unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config.lookup("name"), Some("World".to_string()));
        assert_eq!(config.lookup("count"), Some("3".to_string()));
        assert_eq!(config.lookup("missing"), None);
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(StampConfig::from_json("[1, 2, 3]").is_err());
        assert!(StampConfig::from_json("\"flat\"").is_err());
        assert!(StampConfig::from_json("not json at all").is_err());
    }

    #[test]
    fn test_lookup_coercion() {
        let config = StampConfig::from_json(r#"{"flag": true, "pi": 3.5, "nothing": null, "nested": {"a": 1}}"#).unwrap();
        assert_eq!(config.lookup("flag"), Some("true".to_string()));
        assert_eq!(config.lookup("pi"), Some("3.5".to_string()));
        assert_eq!(config.lookup("nothing"), None);
        assert_eq!(config.lookup("nested"), None);
    }

    #[test]
    fn test_rename_rules_extraction() {
        let config = StampConfig::from_json(r#"{"name": "x", "$$FILE_old.txt": "new.txt", "$$FILE_a.rs": "b.rs"}"#).unwrap();
        let rules = config.rename_rules();
        assert_eq!(rules.len(), 2);
        assert!(rules.contains(&RenameRule {
            pattern: "old.txt".to_string(),
            replacement: "new.txt".to_string(),
        }));
        assert!(rules.contains(&RenameRule {
            pattern: "a.rs".to_string(),
            replacement: "b.rs".to_string(),
        }));
    }

    #[test]
    fn test_rename_rules_fresh_per_call() {
        let config = StampConfig::from_json(r#"{"$$FILE_a.txt": "b.txt"}"#).unwrap();
        assert_eq!(config.rename_rules(), config.rename_rules());
    }

    #[test]
    fn test_no_rules_in_plain_config() {
        let config = StampConfig::from_json(r#"{"name": "World"}"#).unwrap();
        assert!(config.rename_rules().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("stamp.json");
        std::fs::write(&path, r#"{"service": "billing"}"#).unwrap();

        let config = StampConfig::load(&path).unwrap();
        assert_eq!(config.lookup("service"), Some("billing".to_string()));

        assert!(StampConfig::load(temp.path().join("missing.json")).is_err());
    }
}
