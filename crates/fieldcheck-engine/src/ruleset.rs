//! Rule sets and check reports.
//!
//! A `RuleSet` lists fields by dotted path, each with an ordered chain of
//! rule tokens. Rule sets are TOML:
//!
//! ```toml
//! [[fields]]
//! path = "booking.check_in"
//! required = true
//! rules = [
//!     { symbol = "date", args = [] },
//!     { symbol = "date>=", args = ["today"] },
//! ]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use fieldcheck_contracts::{
    error::{FieldcheckError, FieldcheckResult},
    token::RuleToken,
};

/// Rules for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRules {
    /// Dot-separated path; numeric segments index into arrays.
    pub path: String,
    /// A missing required field fails with `TAG:required`; a missing
    /// optional field is skipped.
    #[serde(default)]
    pub required: bool,
    /// Evaluated in order, stopping at the first failure.
    #[serde(default)]
    pub rules: Vec<RuleToken>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub fields: Vec<FieldRules>,
}

impl RuleSet {
    /// Returns `FieldcheckError::Config` if the TOML is malformed or does not
    /// match the rule-set schema.
    pub fn from_toml_str(s: &str) -> FieldcheckResult<Self> {
        toml::from_str(s).map_err(|e| FieldcheckError::Config {
            reason: format!("failed to parse rule set TOML: {e}"),
        })
    }

    pub fn from_file(path: &Path) -> FieldcheckResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| FieldcheckError::Config {
            reason: format!("failed to read rule set '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }
}

/// A value that did not satisfy a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFailure {
    pub path: String,
    pub symbol: String,
    /// Rendered `TAG:` string, when the failure carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Free-form message from an extension predicate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A rule that could not be evaluated at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub symbol: String,
    pub message: String,
}

/// Outcome of checking one document against one rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    /// True only when there are no failures and no errors.
    pub passed: bool,
    pub failures: Vec<FieldFailure>,
    pub errors: Vec<FieldError>,
}

/// Find `path` in `document`, returning the enclosing container alongside
/// the value. `null` counts as missing.
pub fn lookup<'v>(document: &'v Value, path: &str) -> Option<(Option<&'v Value>, &'v Value)> {
    let mut parent = None;
    let mut current = document;

    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) if !v.is_null() => {
                parent = Some(current);
                current = v;
            }
            _ => return None,
        }
    }
    Some((parent, current))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use fieldcheck_contracts::error::FieldcheckError;

    use super::{lookup, RuleSet};

    #[test]
    fn parses_inline_rule_tables() {
        let rules = RuleSet::from_toml_str(
            r#"
            [[fields]]
            path = "booking.check_in"
            required = true
            rules = [{ symbol = "date" }, { symbol = "date>=", args = ["today"] }]

            [[fields]]
            path = "tags"
            "#,
        )
        .unwrap();

        assert_eq!(rules.fields.len(), 2);
        assert!(rules.fields[0].required);
        assert_eq!(rules.fields[0].rules[1].symbol, "date>=");
        assert_eq!(rules.fields[0].rules[1].raw_args, vec!["today".to_string()]);
        assert!(rules.fields[0].rules[0].raw_args.is_empty());
        assert!(!rules.fields[1].required);
        assert!(rules.fields[1].rules.is_empty());
    }

    #[test]
    fn malformed_rule_set_is_a_config_error() {
        let err = RuleSet::from_toml_str("[[fields]]\nrequired = true").unwrap_err();
        assert!(matches!(err, FieldcheckError::Config { .. }));
    }

    #[test]
    fn lookup_walks_objects_and_arrays() {
        let doc = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        let (parent, value) = lookup(&doc, "a.b.1.c").unwrap();
        assert_eq!(value, &json!(2));
        assert_eq!(parent, Some(&json!({"c": 2})));

        let (parent, value) = lookup(&doc, "a.b.0").unwrap();
        assert_eq!(value, &json!({"c": 1}));
        assert_eq!(parent.and_then(|p| p.as_array()).map(Vec::len), Some(2));
    }

    #[test]
    fn lookup_treats_null_and_bad_indices_as_missing() {
        let doc = json!({"a": null, "b": [1]});
        assert!(lookup(&doc, "a").is_none());
        assert!(lookup(&doc, "b.1").is_none());
        assert!(lookup(&doc, "b.x").is_none());
        assert!(lookup(&doc, "c.d").is_none());
    }
}
