//! Temporal predicates and the two temporal symbol sources.
//!
//! Every kind `K` in `date`, `time`, `datetime` gets eleven symbols:
//!
//! | Symbol | Predicate | Arguments |
//! |---|---|---|
//! | `K` | `K` | `[format?]` |
//! | `K=` `K!=` | `K_equal` `K_not_equal` | `[bound, format?]` |
//! | `K>` `K>=` | `K_greater_than` `K_greater_equal` | `[bound, format?]` |
//! | `K<` `K<=` | `K_less_than` `K_less_equal` | `[bound, format?]` |
//! | `K><` `K><=` | `K_between_open` `K_between_open_closed` | `[start, end, format?]` |
//! | `K>=<` `K>=<=` | `K_between_closed_open` `K_between_closed` | `[start, end, format?]` |
//!
//! The slot after the optional format carries an injected `@p<n>` marker
//! naming the format argument, which a format failure tag points at.

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::Value;

use fieldcheck_contracts::{
    error::{FieldcheckError, FieldcheckResult},
    symbol::{Placeholder, SourceKind, SymbolTableEntry},
    temporal::{FormatSpec, TemporalKind, TemporalValue},
};
use fieldcheck_core::{arg, Argument, Predicate, PredicateSet, SymbolSource, Verdict};

use crate::compare::{in_range, Comparison, RangeBounds};
use crate::parser::TemporalParser;

/// What a temporal predicate does with its parsed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Parse only.
    Check,
    Compare(Comparison),
    Range(RangeBounds),
}

impl Shape {
    pub const ALL: [Shape; 11] = [
        Shape::Check,
        Shape::Compare(Comparison::Equal),
        Shape::Compare(Comparison::NotEqual),
        Shape::Compare(Comparison::Greater),
        Shape::Compare(Comparison::GreaterEqual),
        Shape::Compare(Comparison::Less),
        Shape::Compare(Comparison::LessEqual),
        Shape::Range(RangeBounds::Open),
        Shape::Range(RangeBounds::OpenClosed),
        Shape::Range(RangeBounds::ClosedOpen),
        Shape::Range(RangeBounds::Closed),
    ];

    pub fn bound_count(self) -> usize {
        match self {
            Shape::Check => 0,
            Shape::Compare(_) => 1,
            Shape::Range(_) => 2,
        }
    }

    /// Operator appended to the kind to form the symbol.
    pub fn operator(self) -> &'static str {
        match self {
            Shape::Check => "",
            Shape::Compare(Comparison::Equal) => "=",
            Shape::Compare(Comparison::NotEqual) => "!=",
            Shape::Compare(Comparison::Greater) => ">",
            Shape::Compare(Comparison::GreaterEqual) => ">=",
            Shape::Compare(Comparison::Less) => "<",
            Shape::Compare(Comparison::LessEqual) => "<=",
            Shape::Range(RangeBounds::Open) => "><",
            Shape::Range(RangeBounds::OpenClosed) => "><=",
            Shape::Range(RangeBounds::ClosedOpen) => ">=<",
            Shape::Range(RangeBounds::Closed) => ">=<=",
        }
    }

    fn name_suffix(self) -> &'static str {
        match self {
            Shape::Check => "",
            Shape::Compare(Comparison::Equal) => "_equal",
            Shape::Compare(Comparison::NotEqual) => "_not_equal",
            Shape::Compare(Comparison::Greater) => "_greater_than",
            Shape::Compare(Comparison::GreaterEqual) => "_greater_equal",
            Shape::Compare(Comparison::Less) => "_less_than",
            Shape::Compare(Comparison::LessEqual) => "_less_equal",
            Shape::Range(RangeBounds::Open) => "_between_open",
            Shape::Range(RangeBounds::OpenClosed) => "_between_open_closed",
            Shape::Range(RangeBounds::ClosedOpen) => "_between_closed_open",
            Shape::Range(RangeBounds::Closed) => "_between_closed",
        }
    }

    /// Slot of the injected position marker, right after the format.
    fn position_slot(self) -> usize {
        self.bound_count() + 1
    }
}

pub fn symbol(kind: TemporalKind, shape: Shape) -> String {
    format!("{}{}", kind.as_str(), shape.operator())
}

pub fn predicate_name(kind: TemporalKind, shape: Shape) -> String {
    format!("{}{}", kind.as_str(), shape.name_suffix())
}

/// One temporal predicate: a kind, a shape and the shared parser.
pub struct TemporalPredicate {
    name: String,
    kind: TemporalKind,
    shape: Shape,
    parser: Arc<TemporalParser>,
}

impl TemporalPredicate {
    pub fn new(kind: TemporalKind, shape: Shape, parser: Arc<TemporalParser>) -> Self {
        Self {
            name: predicate_name(kind, shape),
            kind,
            shape,
            parser,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Predicate for TemporalPredicate {
    fn evaluate(&self, value: &Value, args: &[Argument<'_>]) -> FieldcheckResult<Verdict> {
        let n = self.shape.bound_count();
        if args.len() > n + 2 {
            let extra = arg(args, n + 2).as_text().unwrap_or_default();
            return Err(FieldcheckError::parameter(
                &self.name,
                extra,
                format!("takes at most {} argument(s)", n + 1),
            ));
        }

        let format = arg(args, n).as_text().map(FormatSpec::explicit);
        let marker = Placeholder::arg_marker(self.shape.position_slot());
        let position = arg(args, n + 1).as_text().unwrap_or(marker.as_str());

        // Bounds first: a broken rule surfaces even when the value is bad too.
        let bounds = (0..n)
            .map(|i| {
                self.parser
                    .parse_bound(&self.name, arg(args, i).as_text(), self.kind, format.as_ref())
            })
            .collect::<FieldcheckResult<Vec<TemporalValue>>>()?;

        let text = value_text(value);
        let parsed = match self
            .parser
            .parse(text.as_deref(), self.kind, format.as_ref(), position)
            .map_err(|e| e.for_predicate(&self.name))?
        {
            Ok(parsed) => parsed,
            Err(tag) => return Ok(Verdict::tagged(&tag)),
        };

        let holds = match (self.shape, bounds.as_slice()) {
            (Shape::Check, _) => true,
            (Shape::Compare(cmp), [bound]) => cmp.holds(&parsed, bound),
            (Shape::Range(range), [start, end]) => in_range(&parsed, start, end, range),
            _ => false,
        };
        Ok(Verdict::Bool(holds))
    }
}

/// Strings parse as-is; numbers parse through their decimal rendering so
/// `U`-patterns accept integer timestamps. Anything else is absent.
fn value_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

fn entry(kind: TemporalKind, shape: Shape) -> SymbolTableEntry {
    let slot = shape.position_slot();
    SymbolTableEntry::new(predicate_name(kind, shape)).implicit(slot, Placeholder::ArgPosition(slot))
}

/// `date…`, `time…` and `datetime…` symbols, each bound to the kind its
/// prefix names.
pub fn typed_source() -> SymbolSource {
    let mut source = SymbolSource::new(SourceKind::Temporal);
    for kind in TemporalKind::ALL {
        for shape in Shape::ALL {
            source.insert(symbol(kind, shape), entry(kind, shape));
        }
    }
    source
}

/// The same symbols, every one bound to a `datetime_*` predicate.
pub fn datetime_compat_source() -> SymbolSource {
    let mut source = SymbolSource::new(SourceKind::TemporalCompat);
    for kind in TemporalKind::ALL {
        for shape in Shape::ALL {
            source.insert(symbol(kind, shape), entry(TemporalKind::DateTime, shape));
        }
    }
    source
}

/// Implementations for every predicate either temporal source names.
pub fn temporal_predicates(parser: Arc<TemporalParser>) -> PredicateSet {
    let mut set = PredicateSet::new();
    for kind in TemporalKind::ALL {
        for shape in Shape::ALL {
            let predicate = TemporalPredicate::new(kind, shape, Arc::clone(&parser));
            set.insert(predicate.name().to_string(), predicate);
        }
    }
    set
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Utc};
    use serde_json::{json, Value};

    use fieldcheck_contracts::{
        error::FieldcheckError,
        result::PredicateResult,
        symbol::Placeholder,
        temporal::TemporalKind,
        token::RuleToken,
    };
    use fieldcheck_core::{CallContext, Dispatcher, Registry};

    use super::{datetime_compat_source, predicate_name, symbol, temporal_predicates, typed_source, Shape};
    use crate::clock::FixedClock;
    use crate::parser::{TemporalParser, TemporalSettings};

    // ── Builder helpers ───────────────────────────────────────────────────────

    fn parser() -> Arc<TemporalParser> {
        let now = DateTime::parse_from_rfc3339("2024-04-23T15:30:00Z").unwrap().with_timezone(&Utc);
        Arc::new(TemporalParser::new(TemporalSettings::default(), Arc::new(FixedClock(now))))
    }

    fn dispatcher() -> Dispatcher {
        let registry = Registry::builder()
            .builtin(typed_source())
            .builtin(datetime_compat_source())
            .build();
        Dispatcher::new(registry, temporal_predicates(parser()))
    }

    fn run(symbol: &str, args: &[&str], value: Value) -> Result<PredicateResult, FieldcheckError> {
        let token = RuleToken::new(symbol).with_args(args.iter().copied());
        dispatcher().check(&token, &value, &CallContext::default())
    }

    fn tag_of(result: PredicateResult) -> String {
        result.tag().map(|t| t.to_string()).unwrap_or_default()
    }

    // ── Sources ───────────────────────────────────────────────────────────────

    #[test]
    fn each_source_defines_thirty_three_symbols() {
        assert_eq!(typed_source().len(), 33);
        assert_eq!(datetime_compat_source().len(), 33);
        assert_eq!(temporal_predicates(parser()).len(), 33);
    }

    #[test]
    fn symbol_and_name_tables_line_up() {
        assert_eq!(symbol(TemporalKind::Date, Shape::ALL[10]), "date>=<=");
        assert_eq!(predicate_name(TemporalKind::Date, Shape::ALL[10]), "date_between_closed");
        assert_eq!(symbol(TemporalKind::Time, Shape::ALL[2]), "time!=");
        assert_eq!(predicate_name(TemporalKind::Time, Shape::ALL[2]), "time_not_equal");
    }

    #[test]
    fn position_marker_sits_after_the_format_slot() {
        let source = typed_source();
        let range = source.get("date>=<=").unwrap();
        assert_eq!(range.implicit_args.get(&3), Some(&Placeholder::ArgPosition(3)));
        let check = source.get("time").unwrap();
        assert_eq!(check.implicit_args.get(&1), Some(&Placeholder::ArgPosition(1)));
    }

    #[test]
    fn compat_source_binds_every_prefix_to_datetime() {
        let source = datetime_compat_source();
        assert_eq!(source.get("date>=").unwrap().predicate_name, "datetime_greater_equal");
        assert_eq!(source.get("time").unwrap().predicate_name, "datetime");
    }

    // ── Reference scenarios ───────────────────────────────────────────────────

    #[test]
    fn scenario_a_value_below_lower_bound_fails_by_default() {
        let result = run("date>=<=", &["2024-04-23", " 2024-05-01"], json!("2024-04-22")).unwrap();
        assert_eq!(result, PredicateResult::fail());
    }

    #[test]
    fn scenario_b_wrapped_time_range_passes() {
        let result = run("time>=<=", &["22:00:00", "02:00:00"], json!("23:59:59")).unwrap();
        assert!(result.is_pass());
    }

    #[test]
    fn scenario_c_malformed_bound_is_a_parameter_error() {
        let err = run("date=", &["2024-04-50"], json!("2024-04-23")).unwrap_err();
        assert!(matches!(
            err,
            FieldcheckError::Parameter { ref predicate, ref argument, .. }
                if predicate == "date_equal" && argument == "2024-04-50"
        ));
    }

    #[test]
    fn scenario_d_missing_time_fails_with_format_tag() {
        let result = run("date", &["Y-m-d H:i:s"], json!("2024-04-23")).unwrap();
        assert_eq!(tag_of(result), "TAG:date:format:@p1");
    }

    // ── Evaluation ────────────────────────────────────────────────────────────

    #[test]
    fn format_tag_points_at_the_format_argument() {
        let result = run("date>=<=", &["2024-04-01", "2024-05-01", "d/m/Y"], json!("2024-04-10")).unwrap();
        assert_eq!(tag_of(result), "TAG:date:format:@p3");
    }

    #[test]
    fn bounds_share_the_explicit_format() {
        let result = run("date<", &["01/05/2024", "d/m/Y"], json!("30/04/2024")).unwrap();
        assert!(result.is_pass());
    }

    #[test]
    fn relative_bounds_resolve_against_the_clock() {
        assert!(run("date>=", &["today"], json!("2024-04-23")).unwrap().is_pass());
        assert!(!run("date>", &["today"], json!("2024-04-23")).unwrap().is_pass());
        assert!(run("date<", &["+1 week"], json!("2024-04-29")).unwrap().is_pass());
    }

    #[test]
    fn absent_value_yields_bare_tag_even_with_a_format() {
        let result = run("time<=", &["12:00", "H:i"], Value::Null).unwrap();
        assert_eq!(tag_of(result), "TAG:time");
    }

    #[test]
    fn broken_bound_wins_over_broken_value() {
        let err = run("date>", &["never-ish"], json!("garbage")).unwrap_err();
        assert!(err.is_parameter_error());
    }

    #[test]
    fn integer_values_parse_as_timestamps() {
        assert!(run("datetime>", &["2001-09-09 01:46:39", "U"], json!(1_000_000_000)).unwrap().is_pass());
    }

    #[test]
    fn surplus_arguments_are_rejected() {
        let err = run("date=", &["2024-04-23", "Y-m-d", "extra", "more"], json!("2024-04-23")).unwrap_err();
        assert!(matches!(err, FieldcheckError::Parameter { ref predicate, .. } if predicate == "date_equal"));
    }

    #[test]
    fn datetime_kind_compares_across_offsets() {
        let result = run("datetime=", &["2024-04-23T10:00:00+02:00"], json!("2024-04-23T08:00:00Z")).unwrap();
        assert!(result.is_pass());
    }
}
