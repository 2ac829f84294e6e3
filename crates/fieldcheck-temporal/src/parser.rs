//! The temporal parser.
//!
//! Values and bounds take different paths through here. A field value that
//! does not parse is the data's fault and comes back as a `FailTag`. A rule
//! bound that does not parse is the rule's fault and comes back as a
//! `Parameter` error.
//!
//! Tag contract for values:
//!
//! | Situation | Tag |
//! |---|---|
//! | empty or absent | `TAG:<kind>` |
//! | mismatch, format synthesized | `TAG:<kind>` |
//! | mismatch, format explicit | `TAG:<kind>:format:<pos>` |
//! | `date` with a non-midnight time | `TAG:date:invalid_format:<pos>` |
//! | `time` off the epoch date, format synthesized | `TAG:time` |
//! | `time` off the epoch date, format explicit | `TAG:time:invalid_format:<pos>` |

use std::borrow::Cow;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use tracing::debug;

use fieldcheck_contracts::{
    error::{FieldcheckError, FieldcheckResult},
    result::{FailReason, FailTag},
    temporal::{FormatSpec, TemporalKind, TemporalValue},
};

use crate::clock::{Clock, SystemClock};
use crate::format::{parse_generic, Pattern, GENERIC_DATETIME_PATTERN};
use crate::relative;

/// Knobs the engine configuration hands to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalSettings {
    /// Offset applied to values that carry no zone of their own, and the
    /// zone relative notation is resolved in.
    pub offset: FixedOffset,
    /// Retry a bound once without its format when it does not parse under it.
    pub bound_format_fallback: bool,
}

impl Default for TemporalSettings {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            bound_format_fallback: true,
        }
    }
}

/// Parses temporal values and rule bounds. Stateless apart from its
/// settings and clock; share one instance across all temporal predicates.
pub struct TemporalParser {
    settings: TemporalSettings,
    clock: Arc<dyn Clock>,
}

impl TemporalParser {
    pub fn new(settings: TemporalSettings, clock: Arc<dyn Clock>) -> Self {
        Self { settings, clock }
    }

    pub fn settings(&self) -> &TemporalSettings {
        &self.settings
    }

    /// "Now" in the configured offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.settings.offset)
    }

    /// Parse a field value.
    ///
    /// The outer `Err` is a broken rule (an unusable explicit format); the
    /// inner `Err` is a value failure carrying its tag.
    pub fn parse(
        &self,
        text: Option<&str>,
        kind: TemporalKind,
        format: Option<&FormatSpec>,
        position: &str,
    ) -> FieldcheckResult<Result<TemporalValue, FailTag>> {
        let text = match text {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Ok(Err(FailTag::bare(kind.as_str()))),
        };

        let synthesized = kind.default_pattern().map(FormatSpec::synthesized);
        let spec = format.or(synthesized.as_ref());
        let explicit = spec.is_some_and(|s| s.explicit);

        let instant = match spec {
            Some(spec) => compile(kind, spec)?.parse(text, self.settings.offset),
            None => parse_generic(text, self.settings.offset),
        };

        let Some(instant) = instant else {
            let tag = if explicit {
                FailTag::bare(kind.as_str())
                    .with_reason(FailReason::Format)
                    .at(position)
            } else {
                FailTag::bare(kind.as_str())
            };
            return Ok(Err(tag));
        };

        if let Some(tag) = shape_violation(kind, &instant, explicit, position) {
            return Ok(Err(tag));
        }

        Ok(Ok(TemporalValue::new(instant, kind)))
    }

    /// Parse a comparison bound for `predicate`.
    ///
    /// Relative notation is resolved against the clock and rendered through
    /// the target format first, so it meets the same shape check as a
    /// literal bound. When the bound does not parse under an explicit format
    /// and fallback is on, it is tried exactly once more without one.
    pub fn parse_bound(
        &self,
        predicate: &str,
        bound: Option<&str>,
        kind: TemporalKind,
        format: Option<&FormatSpec>,
    ) -> FieldcheckResult<TemporalValue> {
        let bound = bound
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| FieldcheckError::parameter(predicate, "", "comparison bound is missing"))?;

        let first = self
            .attempt_bound(bound, kind, format)
            .map_err(|e| e.for_predicate(predicate))?;
        if let Some(value) = first {
            return Ok(value);
        }

        if format.is_some() && self.settings.bound_format_fallback {
            debug!(predicate = %predicate, bound = %bound, "retrying bound without its format");
            let retry = self
                .attempt_bound(bound, kind, None)
                .map_err(|e| e.for_predicate(predicate))?;
            if let Some(value) = retry {
                return Ok(value);
            }
        }

        let expected = format
            .map(|f| f.text.as_str())
            .or(kind.default_pattern())
            .unwrap_or(GENERIC_DATETIME_PATTERN);
        Err(FieldcheckError::parameter(
            predicate,
            bound,
            format!("not a valid {kind}, expected format '{expected}'"),
        ))
    }

    fn attempt_bound(
        &self,
        bound: &str,
        kind: TemporalKind,
        format: Option<&FormatSpec>,
    ) -> FieldcheckResult<Option<TemporalValue>> {
        let text: Cow<'_, str> = if relative::is_relative(bound) {
            let instant = relative::resolve(bound, self.now())?;
            Cow::Owned(self.render(kind, format, &instant)?)
        } else {
            Cow::Borrowed(bound)
        };

        Ok(self.parse(Some(text.as_ref()), kind, format, "")?.ok())
    }

    /// Render `instant` through the format a bound of `kind` will be parsed with.
    fn render(
        &self,
        kind: TemporalKind,
        format: Option<&FormatSpec>,
        instant: &DateTime<FixedOffset>,
    ) -> FieldcheckResult<String> {
        let pattern = match format {
            Some(spec) => compile(kind, spec)?,
            None => {
                let text = kind.default_pattern().unwrap_or(GENERIC_DATETIME_PATTERN);
                compile(kind, &FormatSpec::synthesized(text))?
            }
        };
        Ok(pattern.render(instant))
    }
}

impl Default for TemporalParser {
    fn default() -> Self {
        Self::new(TemporalSettings::default(), Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for TemporalParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalParser")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn compile(kind: TemporalKind, spec: &FormatSpec) -> FieldcheckResult<Pattern> {
    Pattern::compile(&spec.text)
        .map_err(|reason| FieldcheckError::parameter(kind.as_str(), spec.text.as_str(), reason))
}

/// 1970-01-01, the date a bare time of day sits on.
fn epoch_date() -> NaiveDate {
    NaiveDate::default()
}

fn shape_violation(
    kind: TemporalKind,
    instant: &DateTime<FixedOffset>,
    explicit: bool,
    position: &str,
) -> Option<FailTag> {
    let violated = match kind {
        TemporalKind::Date => instant.time() != NaiveTime::MIN,
        TemporalKind::Time => instant.date_naive() != epoch_date(),
        TemporalKind::DateTime => false,
    };
    if !violated {
        return None;
    }

    let tag = FailTag::bare(kind.as_str());
    Some(if explicit {
        tag.with_reason(FailReason::InvalidFormat).at(position)
    } else {
        tag
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
