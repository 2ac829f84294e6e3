//! Error types for the fieldcheck rule engine.
//!
//! Per-value failures are never errors: they travel back as
//! `PredicateResult::Fail`. A `FieldcheckError` means the *rule* (or the
//! engine configuration around it) is unusable, and the caller must surface
//! it verbatim rather than treat it as a data problem.

use thiserror::Error;

/// The unified error type for fieldcheck.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldcheckError {
    /// A rule argument is malformed, e.g. an unparsable comparison bound.
    ///
    /// Fatal to the single rule evaluation only. Sibling fields keep going.
    #[error("invalid parameter '{argument}' for predicate '{predicate}': {reason}")]
    Parameter {
        predicate: String,
        argument: String,
        reason: String,
    },

    /// No symbol source and no deprecated alias knows this symbol.
    #[error("unknown rule symbol '{symbol}'")]
    UnknownSymbol { symbol: String },

    /// A symbol resolved to a predicate name that nothing implements.
    #[error("symbol resolved to predicate '{predicate}' which has no implementation")]
    UnknownPredicate { predicate: String },

    /// Engine configuration or a rule-set document is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The document under validation could not be read or decoded.
    #[error("data error: {reason}")]
    Data { reason: String },
}

impl FieldcheckError {
    /// Shorthand for the most common error in this crate family.
    pub fn parameter(
        predicate: impl Into<String>,
        argument: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Parameter {
            predicate: predicate.into(),
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Re-attribute a `Parameter` error to `predicate`. Other variants pass
    /// through untouched.
    pub fn for_predicate(self, predicate: &str) -> Self {
        match self {
            Self::Parameter { argument, reason, .. } => Self::Parameter {
                predicate: predicate.to_string(),
                argument,
                reason,
            },
            other => other,
        }
    }

    /// True for errors that describe a broken rule rather than broken input.
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            Self::Parameter { .. } | Self::UnknownSymbol { .. } | Self::UnknownPredicate { .. }
        )
    }
}

/// Convenience alias used throughout the fieldcheck crates.
pub type FieldcheckResult<T> = Result<T, FieldcheckError>;
