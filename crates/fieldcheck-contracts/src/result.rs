//! Predicate outcomes and the `TAG:` failure syntax.
//!
//! A tagged failure has the shape `TAG:<kind>[:<reason>][:<position>]`, e.g.
//! `TAG:time:format:@p1`. The message layer (outside this workspace) uses the
//! kind and reason to pick a template and substitutes the position marker
//! with the offending rule argument.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix every tagged failure string carries.
pub const TAG_PREFIX: &str = "TAG:";

/// Why a tagged value failed, when the kind alone is not specific enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// The value did not match the explicitly requested format.
    Format,
    /// The value parsed, but its shape belongs to another temporal kind.
    InvalidFormat,
    Mime,
    Size,
    /// Reason word used by an extension predicate.
    Other(String),
}

impl FailReason {
    pub fn as_str(&self) -> &str {
        match self {
            FailReason::Format => "format",
            FailReason::InvalidFormat => "invalid_format",
            FailReason::Mime => "mime",
            FailReason::Size => "size",
            FailReason::Other(s) => s,
        }
    }

    fn from_word(word: &str) -> Self {
        match word {
            "format" => FailReason::Format,
            "invalid_format" => FailReason::InvalidFormat,
            "mime" => FailReason::Mime,
            "size" => FailReason::Size,
            other => FailReason::Other(other.to_string()),
        }
    }
}

/// A parsed `TAG:<kind>[:<reason>][:<position>]` failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailTag {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailReason>,
    /// Unresolved position marker such as `@p2` or `@parent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl FailTag {
    /// A bare `TAG:<kind>` with no qualifier.
    pub fn bare(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            reason: None,
            position: None,
        }
    }

    pub fn with_reason(mut self, reason: FailReason) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn at(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }
}

impl fmt::Display for FailTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TAG_PREFIX}{}", self.kind)?;
        if let Some(reason) = &self.reason {
            write!(f, ":{}", reason.as_str())?;
        }
        if let Some(position) = &self.position {
            write!(f, ":{position}")?;
        }
        Ok(())
    }
}

/// Returned when a string claims to be a tag but does not follow the syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTag(pub String);

impl fmt::Display for MalformedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed failure tag '{}'", self.0)
    }
}

impl std::error::Error for MalformedTag {}

impl FromStr for FailTag {
    type Err = MalformedTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix(TAG_PREFIX)
            .ok_or_else(|| MalformedTag(s.to_string()))?;
        let mut segments = body.split(':');

        let kind = match segments.next() {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => return Err(MalformedTag(s.to_string())),
        };

        let mut tag = FailTag::bare(kind);
        for segment in segments {
            if segment.is_empty() || tag.position.is_some() {
                // Nothing may follow the position marker.
                return Err(MalformedTag(s.to_string()));
            }
            if segment.starts_with('@') {
                tag.position = Some(segment.to_string());
            } else if tag.reason.is_none() {
                tag.reason = Some(FailReason::from_word(segment));
            } else {
                return Err(MalformedTag(s.to_string()));
            }
        }
        Ok(tag)
    }
}

/// The normalized outcome of one predicate invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PredicateResult {
    Pass,
    Fail {
        /// `None` means "render the predicate's default message".
        #[serde(skip_serializing_if = "Option::is_none")]
        message_tag: Option<FailTag>,
        /// Free-form message from a predicate that did not use the tag syntax.
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl PredicateResult {
    /// `Fail` with the predicate's default message.
    pub fn fail() -> Self {
        PredicateResult::Fail {
            message_tag: None,
            detail: None,
        }
    }

    pub fn tagged(tag: FailTag) -> Self {
        PredicateResult::Fail {
            message_tag: Some(tag),
            detail: None,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, PredicateResult::Pass)
    }

    /// The failure tag, if this is a tagged failure.
    pub fn tag(&self) -> Option<&FailTag> {
        match self {
            PredicateResult::Fail { message_tag, .. } => message_tag.as_ref(),
            PredicateResult::Pass => None,
        }
    }
}
