//! Placeholder token substitution
//!
//! Tokens look like `{{ key }}`: double braces, optional whitespace, a key.
//! Matching is non-greedy per token and does not nest. Tokens whose trimmed
//! key is absent from the configuration are left byte-identical in the
//! output - an unknown key is not an error.

use regex::{Captures, Regex};
use tracing::debug;

use crate::config::StampConfig;

/// Matches one `{{ key }}` token. The key may not contain braces, which
/// keeps a token from swallowing its neighbor.
const TOKEN_PATTERN: &str = r"\{\{\s*([^{}]+?)\s*\}\}";

/// Applies `{{ key }}` substitution from a [`StampConfig`].
///
/// Holds the compiled token pattern so a directory pass compiles it once.
pub struct Substituter {
    token: Regex,
}

impl Substituter {
    pub fn new() -> Self {
        Self {
            token: Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"),
        }
    }

    /// Replace every token whose key exists in the configuration.
    ///
    /// The captured key is trimmed before lookup, so `{{name}}`, `{{ name }}`
    /// and `{{  name  }}` all resolve the same entry.
    pub fn apply(&self, text: &str, config: &StampConfig) -> String {
        self.token
            .replace_all(text, |caps: &Captures| {
                let key = caps[1].trim();
                match config.lookup(key) {
                    Some(value) => value,
                    None => {
                        debug!(key, "Substituter::apply: key not in configuration, leaving token");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

impl Default for Substituter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(json: &str) -> StampConfig {
        StampConfig::from_json(json).unwrap()
    }

    #[test]
    fn test_basic_substitution() {
        let sub = Substituter::new();
        let out = sub.apply("Hello {{ name }}!", &config(r#"{"name": "World"}"#));
        assert_eq!(out, "Hello World!");
    }

    #[test]
    fn test_whitespace_variants() {
        let sub = Substituter::new();
        let cfg = config(r#"{"name": "World"}"#);
        assert_eq!(sub.apply("{{name}}", &cfg), "World");
        assert_eq!(sub.apply("{{  name  }}", &cfg), "World");
        assert_eq!(sub.apply("{{\tname }}", &cfg), "World");
    }

    #[test]
    fn test_unknown_key_left_byte_identical() {
        let sub = Substituter::new();
        let cfg = config(r#"{"name": "World"}"#);
        assert_eq!(sub.apply("Hello {{ missing }}!", &cfg), "Hello {{ missing }}!");
        // Internal whitespace survives exactly as written
        assert_eq!(sub.apply("{{  missing\t}}", &cfg), "{{  missing\t}}");
    }

    #[test]
    fn test_multiple_tokens_per_line() {
        let sub = Substituter::new();
        let cfg = config(r#"{"a": "1", "b": "2"}"#);
        assert_eq!(sub.apply("{{ a }}+{{ b }}={{ c }}", &cfg), "1+2={{ c }}");
    }

    #[test]
    fn test_non_greedy_per_token() {
        let sub = Substituter::new();
        let cfg = config(r#"{"a": "1", "b": "2"}"#);
        // Two tokens, not one giant match across the middle
        assert_eq!(sub.apply("{{a}} and {{b}}", &cfg), "1 and 2");
    }

    #[test]
    fn test_number_and_bool_values() {
        let sub = Substituter::new();
        let cfg = config(r#"{"port": 8080, "debug": false}"#);
        assert_eq!(sub.apply("port={{ port }} debug={{ debug }}", &cfg), "port=8080 debug=false");
    }

    #[test]
    fn test_empty_text() {
        let sub = Substituter::new();
        assert_eq!(sub.apply("", &config(r#"{"a": "1"}"#)), "");
    }

    proptest! {
        // Substituting twice with the same config equals substituting once,
        // provided no configured value contains `{{ }}` syntax.
        #[test]
        fn substitution_is_idempotent(
            text in "[a-zA-Z0-9 {}\n]{0,200}",
            value in "[a-zA-Z0-9 ]{0,20}",
        ) {
            let cfg = config(&serde_json::json!({ "name": value }).to_string());
            let sub = Substituter::new();
            let once = sub.apply(&text, &cfg);
            let twice = sub.apply(&once, &cfg);
            prop_assert_eq!(once, twice);
        }
    }
}
