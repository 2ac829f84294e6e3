//! Engine configuration.
//!
//! `EngineConfig` is deserialized from TOML. Every key is optional:
//!
//! ```toml
//! [temporal]
//! utc_offset = "+00:00"          # zone for values that carry none
//! family = "typed"               # "typed" | "datetime"
//! bound_format_fallback = true   # retry a bound once without its format
//!
//! [registry]
//! warn_deprecated = true
//!
//! [deprecated]                   # extra legacy symbol -> predicate name
//! "before" = "date_less_than"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use fieldcheck_contracts::error::{FieldcheckError, FieldcheckResult};
use fieldcheck_temporal::TemporalSettings;

/// Which temporal source answers `date…`, `time…` and `datetime…` symbols
/// first.
///
/// ```toml
/// family = "typed"     # date symbols parse dates, time symbols parse times
/// family = "datetime"  # every temporal symbol parses a full date-time
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalFamily {
    #[default]
    Typed,
    Datetime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    /// `+HH:MM`, `-HH:MM`, `Z` or `UTC`.
    pub utc_offset: String,
    pub family: TemporalFamily,
    pub bound_format_fallback: bool,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            utc_offset: "+00:00".to_string(),
            family: TemporalFamily::Typed,
            bound_format_fallback: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Log a warning each time a rule resolves through a deprecated alias.
    pub warn_deprecated: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { warn_deprecated: true }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub temporal: TemporalConfig,
    pub registry: RegistryConfig,
    /// Legacy symbol → canonical predicate name, on top of the built-in table.
    pub deprecated: BTreeMap<String, String>,
}

impl EngineConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `FieldcheckError::Config` if the TOML is malformed, does not
    /// match the schema, or names an unreadable offset.
    pub fn from_toml_str(s: &str) -> FieldcheckResult<Self> {
        let config: EngineConfig = toml::from_str(s).map_err(|e| FieldcheckError::Config {
            reason: format!("failed to parse engine TOML: {e}"),
        })?;
        config.offset()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as engine configuration.
    pub fn from_file(path: &Path) -> FieldcheckResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| FieldcheckError::Config {
            reason: format!("failed to read engine config '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The configured offset.
    pub fn offset(&self) -> FieldcheckResult<FixedOffset> {
        let raw = self.temporal.utc_offset.trim();
        if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
            return Ok(Utc.fix());
        }
        raw.parse::<FixedOffset>().map_err(|e| FieldcheckError::Config {
            reason: format!("temporal.utc_offset '{raw}' is not a UTC offset: {e}"),
        })
    }

    pub fn temporal_settings(&self) -> FieldcheckResult<TemporalSettings> {
        Ok(TemporalSettings {
            offset: self.offset()?,
            bound_format_fallback: self.temporal.bound_format_fallback,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use fieldcheck_contracts::error::FieldcheckError;

    use super::{EngineConfig, TemporalFamily};

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.temporal.family, TemporalFamily::Typed);
        assert!(config.temporal.bound_format_fallback);
        assert!(config.registry.warn_deprecated);
        assert_eq!(config.offset().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn full_document_round_trips() {
        let config = EngineConfig::from_toml_str(
            r#"
            [temporal]
            utc_offset = "-05:30"
            family = "datetime"
            bound_format_fallback = false

            [registry]
            warn_deprecated = false

            [deprecated]
            "before" = "date_less_than"
            "#,
        )
        .unwrap();

        assert_eq!(config.temporal.family, TemporalFamily::Datetime);
        assert_eq!(config.offset().unwrap().local_minus_utc(), -(5 * 3600 + 1800));
        assert!(!config.temporal_settings().unwrap().bound_format_fallback);
        assert!(!config.registry.warn_deprecated);
        assert_eq!(config.deprecated.get("before").map(String::as_str), Some("date_less_than"));
    }

    #[test]
    fn utc_spellings_are_accepted() {
        for spelling in ["Z", "utc", "+00:00"] {
            let doc = format!("[temporal]\nutc_offset = \"{spelling}\"");
            assert!(EngineConfig::from_toml_str(&doc).is_ok(), "{spelling}");
        }
    }

    #[test]
    fn bad_offset_is_a_config_error() {
        let err = EngineConfig::from_toml_str("[temporal]\nutc_offset = \"noon\"").unwrap_err();
        assert!(matches!(err, FieldcheckError::Config { .. }));
    }

    #[test]
    fn unknown_family_is_a_config_error() {
        let err = EngineConfig::from_toml_str("[temporal]\nfamily = \"lunar\"").unwrap_err();
        assert!(matches!(err, FieldcheckError::Config { ref reason } if reason.contains("engine TOML")));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = EngineConfig::from_file(std::path::Path::new("/nonexistent/fieldcheck.toml")).unwrap_err();
        assert!(matches!(err, FieldcheckError::Config { .. }));
    }
}
