//! General-purpose predicates: numeric and length comparisons, membership,
//! scalar type checks, well-known string formats, character classes,
//! regular expressions and base64-encoded files.
//!
//! Raw arguments reach these predicates as text; each predicate coerces
//! them itself and raises a `Parameter` error when it cannot.

use std::cmp::Ordering;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use serde_json::Value;

use fieldcheck_contracts::{
    error::{FieldcheckError, FieldcheckResult},
    result::{FailReason, FailTag},
    symbol::{SourceKind, SymbolTableEntry},
};
use fieldcheck_core::{arg, Argument, PredicateSet, SymbolSource, Verdict};

/// A ULID's first character encodes the top three bits of a 48-bit
/// millisecond timestamp, so anything above `7` overflows it.
pub const ULID_MAX_LEADING_CHAR: char = '7';

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email regex is valid")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^\s/?#@]+(?:@[^\s/?#]+)?(?::\d{1,5})?(?:[/?#]\S*)?$")
        .expect("url regex is valid")
});

static MAC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$|^(?:[0-9A-Fa-f]{4}\.){2}[0-9A-Fa-f]{4}$")
        .expect("mac regex is valid")
});

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}$")
        .expect("uuid regex is valid")
});

/// Crockford base32, 26 characters.
static ULID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)[0-9A-HJKMNP-TV-Z]{26}$").expect("ulid regex is valid"));

/// Extra characters `alpha_ext` and `alphanumeric_ext` accept by default.
const DEFAULT_EXT_CHARS: &str = "_-";

/// How a numeric or length predicate relates the value to its bound(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Between { start: bool, end: bool },
}

impl Operator {
    fn bound_count(self) -> usize {
        match self {
            Operator::Between { .. } => 2,
            _ => 1,
        }
    }

    fn holds(self, value: f64, bounds: &[f64]) -> bool {
        let cmp = |b: f64| value.partial_cmp(&b);
        match (self, bounds) {
            (Operator::Equal, [b]) => cmp(*b) == Some(Ordering::Equal),
            (Operator::NotEqual, [b]) => cmp(*b) != Some(Ordering::Equal),
            (Operator::Greater, [b]) => cmp(*b) == Some(Ordering::Greater),
            (Operator::GreaterEqual, [b]) => matches!(cmp(*b), Some(Ordering::Greater | Ordering::Equal)),
            (Operator::Less, [b]) => cmp(*b) == Some(Ordering::Less),
            (Operator::LessEqual, [b]) => matches!(cmp(*b), Some(Ordering::Less | Ordering::Equal)),
            (Operator::Between { start, end }, [lo, hi]) => {
                let after = if start { value >= *lo } else { value > *lo };
                let before = if end { value <= *hi } else { value < *hi };
                after && before
            }
            _ => false,
        }
    }
}

/// `(operator symbol, predicate name suffix, operator)`.
const OPERATORS: [(&str, &str, Operator); 10] = [
    ("=", "equal", Operator::Equal),
    ("!=", "not_equal", Operator::NotEqual),
    (">", "greater_than", Operator::Greater),
    (">=", "greater_equal", Operator::GreaterEqual),
    ("<", "less_than", Operator::Less),
    ("<=", "less_equal", Operator::LessEqual),
    ("><", "between_open", Operator::Between { start: false, end: false }),
    ("><=", "between_open_closed", Operator::Between { start: false, end: true }),
    (">=<", "between_closed_open", Operator::Between { start: true, end: false }),
    (">=<=", "between_closed", Operator::Between { start: true, end: true }),
];

/// Predicates with no arguments and no special entry flags.
const PLAIN: [&str; 14] = [
    "int", "float", "bool", "string", "email", "url", "ip", "ipv4", "ipv6", "mac", "uuid", "ulid", "alpha",
    "alpha_num",
];

/// Symbols of the general-purpose source.
pub fn general_source() -> SymbolSource {
    let mut source = SymbolSource::new(SourceKind::General);

    for (op, name, _) in OPERATORS {
        source.insert(op, SymbolTableEntry::new(name));
        source.insert(format!("length{op}"), SymbolTableEntry::new(format!("length_{name}")));
    }
    source.insert("in", SymbolTableEntry::new("in").variadic());
    source.insert("!in", SymbolTableEntry::new("not_in").variadic());
    for name in PLAIN {
        source.insert(name, SymbolTableEntry::new(name));
    }
    for name in ["alpha_ext", "alphanumeric_ext", "regex", "file_base64"] {
        source.insert(name, SymbolTableEntry::new(name));
    }
    source
}

/// Implementations for every predicate `general_source` names.
pub fn general_predicates() -> PredicateSet {
    let mut set = PredicateSet::new();

    for (_, name, op) in OPERATORS {
        set.insert_fn(name, move |value, args| numeric(name, op, value, args));
        let length_name = format!("length_{name}");
        let owned = length_name.clone();
        set.insert_fn(length_name, move |value, args| length(&owned, op, value, args));
    }
    set.insert_fn("in", |value, args| membership("in", value, args).map(Verdict::from));
    set.insert_fn("not_in", |value, args| {
        membership("not_in", value, args).map(|found| Verdict::from(!found))
    });

    set.insert_fn("int", |value, _| Ok(is_int(value).into()));
    set.insert_fn("float", |value, _| Ok(is_float(value).into()));
    set.insert_fn("bool", |value, _| Ok(is_bool(value).into()));
    set.insert_fn("string", |value, _| Ok(value.is_string().into()));

    set.insert_fn("email", |value, _| Ok(matches_text(value, &EMAIL).into()));
    set.insert_fn("url", |value, _| Ok(matches_text(value, &URL).into()));
    set.insert_fn("mac", |value, _| Ok(matches_text(value, &MAC).into()));
    set.insert_fn("uuid", |value, _| Ok(matches_text(value, &UUID).into()));
    set.insert_fn("ulid", |value, _| Ok(as_str(value).is_some_and(is_ulid).into()));
    set.insert_fn("ip", |value, _| Ok(parses_as::<IpAddr>(value).into()));
    set.insert_fn("ipv4", |value, _| Ok(parses_as::<Ipv4Addr>(value).into()));
    set.insert_fn("ipv6", |value, _| Ok(parses_as::<Ipv6Addr>(value).into()));

    set.insert_fn("alpha", |value, _| {
        Ok(as_str(value).is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphabetic)).into())
    });
    set.insert_fn("alpha_num", |value, _| {
        Ok(as_str(value).is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphanumeric)).into())
    });
    set.insert_fn("alpha_ext", |value, args| Ok(char_class("alpha_ext", char::is_alphabetic, value, args)));
    set.insert_fn("alphanumeric_ext", |value, args| {
        Ok(char_class("alphanumeric_ext", char::is_alphanumeric, value, args))
    });

    set.insert_fn("regex", regex_match);
    set.insert_fn("file_base64", file_base64);
    set
}

// ── Coercion helpers ──────────────────────────────────────────────────────────

fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Scalar rendering used for membership tests.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn bound<T: std::str::FromStr>(
    predicate: &str,
    args: &[Argument<'_>],
    index: usize,
    what: &str,
    expected: &str,
) -> FieldcheckResult<T> {
    let raw = arg(args, index)
        .as_text()
        .ok_or_else(|| FieldcheckError::parameter(predicate, "", format!("{what} is missing")))?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| FieldcheckError::parameter(predicate, raw, format!("{what} must be {expected}")))
}

// ── Comparisons ───────────────────────────────────────────────────────────────

fn numeric(name: &str, op: Operator, value: &Value, args: &[Argument<'_>]) -> FieldcheckResult<Verdict> {
    let bounds = (0..op.bound_count())
        .map(|i| bound::<f64>(name, args, i, "comparison bound", "a number"))
        .collect::<FieldcheckResult<Vec<f64>>>()?;
    Ok(as_number(value).is_some_and(|v| op.holds(v, &bounds)).into())
}

/// Characters of a string, elements of an array, keys of an object.
fn length(name: &str, op: Operator, value: &Value, args: &[Argument<'_>]) -> FieldcheckResult<Verdict> {
    let bounds = (0..op.bound_count())
        .map(|i| bound::<usize>(name, args, i, "length bound", "a non-negative integer").map(|n| n as f64))
        .collect::<FieldcheckResult<Vec<f64>>>()?;
    let len = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => return Ok(Verdict::Bool(false)),
    };
    Ok(op.holds(len as f64, &bounds).into())
}

/// Whether the value's scalar rendering appears in the variadic list.
fn membership(name: &str, value: &Value, args: &[Argument<'_>]) -> FieldcheckResult<bool> {
    let options = arg(args, 0).as_list().unwrap_or_default();
    if options.is_empty() {
        return Err(FieldcheckError::parameter(name, "", "needs at least one allowed value"));
    }
    Ok(scalar_text(value).is_some_and(|text| options.iter().any(|o| *o == text)))
}

// ── Scalar types ──────────────────────────────────────────────────────────────

fn is_int(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

fn is_float(value: &Value) -> bool {
    as_number(value).is_some()
}

fn is_bool(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::String(s) => matches!(s.as_str(), "true" | "false" | "1" | "0"),
        Value::Number(n) => matches!(n.as_u64(), Some(0 | 1)),
        _ => false,
    }
}

// ── String formats ────────────────────────────────────────────────────────────

fn matches_text(value: &Value, re: &Regex) -> bool {
    as_str(value).is_some_and(|s| re.is_match(s))
}

fn parses_as<T: std::str::FromStr>(value: &Value) -> bool {
    as_str(value).is_some_and(|s| s.parse::<T>().is_ok())
}

pub fn is_ulid(text: &str) -> bool {
    ULID.is_match(text) && text.chars().next().is_some_and(|c| c <= ULID_MAX_LEADING_CHAR)
}

// ── Character classes ─────────────────────────────────────────────────────────

/// Letters (or letters and digits) plus `_`, `-` or the caller's own extra
/// characters. Custom characters make the tag point at `@p1` so the message
/// can list them.
fn char_class(kind: &str, base: fn(char) -> bool, value: &Value, args: &[Argument<'_>]) -> Verdict {
    let custom = arg(args, 0).as_text();
    let extra = custom.unwrap_or(DEFAULT_EXT_CHARS);

    let ok = as_str(value).is_some_and(|s| !s.is_empty() && s.chars().all(|c| base(c) || extra.contains(c)));
    if ok {
        return Verdict::Bool(true);
    }
    let tag = FailTag::bare(kind);
    Verdict::tagged(&match custom {
        Some(_) => tag.at("@p1"),
        None => tag,
    })
}

// ── Regular expressions ───────────────────────────────────────────────────────

fn regex_match(value: &Value, args: &[Argument<'_>]) -> FieldcheckResult<Verdict> {
    let pattern = arg(args, 0)
        .as_text()
        .ok_or_else(|| FieldcheckError::parameter("regex", "", "pattern is missing"))?;
    let re = Regex::new(pattern).map_err(|e| FieldcheckError::parameter("regex", pattern, e.to_string()))?;
    Ok(matches_text(value, &re).into())
}

// ── Base64 files ──────────────────────────────────────────────────────────────

/// `file_base64[mime?, max_bytes?]`.
///
/// The value is either bare base64 or a `data:<mime>;base64,<payload>` URI.
/// `mime` is a `|`-separated list that may use `type/*` wildcards; without a
/// data URI the type is sniffed from the payload's leading bytes.
fn file_base64(value: &Value, args: &[Argument<'_>]) -> FieldcheckResult<Verdict> {
    let allowed = arg(args, 0).as_text();
    let max_bytes = match arg(args, 1).as_text() {
        Some(_) => Some(bound::<u64>("file_base64", args, 1, "size limit", "a byte count")?),
        None => None,
    };

    let tag = FailTag::bare("file_base64");
    let Some(text) = as_str(value) else {
        return Ok(Verdict::tagged(&tag));
    };
    let (declared, payload) = split_data_uri(text);
    let Ok(bytes) = STANDARD.decode(payload.trim()) else {
        return Ok(Verdict::tagged(&tag));
    };
    if bytes.is_empty() {
        return Ok(Verdict::tagged(&tag));
    }

    if let Some(allowed) = allowed {
        let mime = declared.unwrap_or_else(|| sniff_mime(&bytes));
        if !allowed.split('|').any(|want| mime_matches(want.trim(), mime)) {
            return Ok(Verdict::tagged(&tag.with_reason(FailReason::Mime).at("@p1")));
        }
    }
    if let Some(max) = max_bytes {
        if bytes.len() as u64 > max {
            return Ok(Verdict::tagged(&tag.with_reason(FailReason::Size).at("@p2")));
        }
    }
    Ok(Verdict::Bool(true))
}

fn split_data_uri(text: &str) -> (Option<&str>, &str) {
    text.strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map_or((None, text), |(mime, payload)| (Some(mime), payload))
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
    ];
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }
    SIGNATURES
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map_or_else(
            || {
                if std::str::from_utf8(bytes).is_ok() {
                    "text/plain"
                } else {
                    "application/octet-stream"
                }
            },
            |(_, mime)| *mime,
        )
}

fn mime_matches(want: &str, got: &str) -> bool {
    match want.strip_suffix("/*") {
        Some(family) => got.split('/').next() == Some(family),
        None => want.eq_ignore_ascii_case(got),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use fieldcheck_contracts::{error::FieldcheckError, result::PredicateResult, token::RuleToken};
    use fieldcheck_core::{CallContext, Dispatcher, Registry};

    use super::{general_predicates, general_source, is_ulid};

    // ── Builder helpers ───────────────────────────────────────────────────────

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Registry::builder().builtin(general_source()).build(), general_predicates())
    }

    fn run(symbol: &str, args: &[&str], value: Value) -> Result<PredicateResult, FieldcheckError> {
        let token = RuleToken::new(symbol).with_args(args.iter().copied());
        dispatcher().check(&token, &value, &CallContext::default())
    }

    fn passes(symbol: &str, args: &[&str], value: Value) -> bool {
        run(symbol, args, value).unwrap().is_pass()
    }

    fn tag(symbol: &str, args: &[&str], value: Value) -> String {
        run(symbol, args, value).unwrap().tag().map(|t| t.to_string()).unwrap_or_default()
    }

    // ── Source ────────────────────────────────────────────────────────────────

    #[test]
    fn every_symbol_has_an_implementation() {
        let predicates = general_predicates();
        for (symbol, entry) in general_source().entries() {
            assert!(predicates.contains(&entry.predicate_name), "{symbol} -> {}", entry.predicate_name);
        }
    }

    // ── Comparisons ───────────────────────────────────────────────────────────

    #[test]
    fn numeric_comparisons_coerce_numeric_strings() {
        assert!(passes(">=", &["1"], json!(1)));
        assert!(passes(">=", &["1"], json!("1.5")));
        assert!(!passes(">", &["1"], json!(1)));
        assert!(!passes("<", &["10"], json!("abc")));
        assert!(passes("!=", &["3"], json!(4)));
        assert!(passes("><=", &["0", "10"], json!(10)));
        assert!(!passes("><", &["0", "10"], json!(10)));
    }

    #[test]
    fn non_numeric_bound_is_a_parameter_error() {
        let err = run(">", &["ten"], json!(11)).unwrap_err();
        assert!(matches!(err, FieldcheckError::Parameter { ref predicate, ref argument, .. }
            if predicate == "greater_than" && argument == "ten"));
    }

    #[test]
    fn length_counts_chars_items_and_keys() {
        assert!(passes("length=", &["4"], json!("żółw")));
        assert!(passes("length>=<=", &["1", "3"], json!([1, 2, 3])));
        assert!(passes("length<", &["2"], json!({"a": 1})));
        assert!(!passes("length=", &["1"], json!(7)));
        assert!(run("length>", &["-1"], json!("x")).unwrap_err().is_parameter_error());
    }

    #[test]
    fn membership_is_variadic() {
        assert!(passes("in", &["red", "green", "blue"], json!("green")));
        assert!(!passes("in", &["red", "green"], json!("blue")));
        assert!(passes("in", &["1", "2"], json!(2)));
        assert!(passes("!in", &["admin", "root"], json!("guest")));
        assert!(run("in", &[], json!("x")).unwrap_err().is_parameter_error());
    }

    // ── Types and formats ─────────────────────────────────────────────────────

    #[test]
    fn scalar_types() {
        assert!(passes("int", &[], json!(42)));
        assert!(passes("int", &[], json!("-7")));
        assert!(!passes("int", &[], json!(4.2)));
        assert!(passes("float", &[], json!("4.2")));
        assert!(passes("bool", &[], json!(false)));
        assert!(passes("bool", &[], json!("1")));
        assert!(!passes("bool", &[], json!("yes")));
        assert!(passes("string", &[], json!("")));
        assert!(!passes("string", &[], json!(1)));
    }

    #[test]
    fn network_and_identifier_formats() {
        assert!(passes("email", &[], json!("a.b+tag@example.co.uk")));
        assert!(!passes("email", &[], json!("not-an-email")));
        assert!(passes("url", &[], json!("https://example.com:8080/path?q=1")));
        assert!(!passes("url", &[], json!("example.com")));
        assert!(passes("ip", &[], json!("::1")));
        assert!(passes("ipv4", &[], json!("192.168.0.1")));
        assert!(!passes("ipv4", &[], json!("::1")));
        assert!(passes("ipv6", &[], json!("fe80::1")));
        assert!(passes("mac", &[], json!("00:1A:2b:3C:4d:5E")));
        assert!(passes("mac", &[], json!("001a.2b3c.4d5e")));
        assert!(!passes("mac", &[], json!("00:1A:2b:3C:4d")));
        assert!(passes("uuid", &[], json!("123e4567-e89b-12d3-a456-426614174000")));
        assert!(!passes("uuid", &[], json!("123e4567e89b12d3a456426614174000")));
    }

    #[test]
    fn ulid_leading_character_is_bounded() {
        assert!(is_ulid("01ARZ3NDEKTSV4RRFFQ69G5FAV"));
        assert!(is_ulid("7ZZZZZZZZZZZZZZZZZZZZZZZZZ"));
        assert!(!is_ulid("8ZZZZZZZZZZZZZZZZZZZZZZZZZ"));
        assert!(!is_ulid("01ARZ3NDEKTSV4RRFFQ69G5FAU0"));
        assert!(!is_ulid("01ARZ3NDEKTSV4RRFFQ69G5FAI"));
    }

    // ── Character classes ─────────────────────────────────────────────────────

    #[test]
    fn alpha_ext_tags_point_at_custom_chars() {
        assert!(passes("alpha_ext", &[], json!("snake_case-ish")));
        assert_eq!(tag("alpha_ext", &[], json!("a b")), "TAG:alpha_ext");
        assert!(passes("alpha_ext", &[".+"], json!("a+b.c")));
        assert_eq!(tag("alpha_ext", &["."], json!("a_b")), "TAG:alpha_ext:@p1");
        assert_eq!(tag("alphanumeric_ext", &[], json!("x 1")), "TAG:alphanumeric_ext");
        assert!(passes("alphanumeric_ext", &[], json!("v2_final")));
    }

    #[test]
    fn regex_compiles_per_rule() {
        assert!(passes("regex", &["^[A-Z]{3}$"], json!("ABC")));
        assert!(!passes("regex", &["^[A-Z]{3}$"], json!("abcd")));
        assert!(run("regex", &["(unclosed"], json!("x")).unwrap_err().is_parameter_error());
    }

    // ── Base64 files ──────────────────────────────────────────────────────────

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn file_base64_checks_encoding_mime_and_size() {
        assert!(passes("file_base64", &[], json!(PNG_1X1)));
        assert_eq!(tag("file_base64", &[], json!("%%%")), "TAG:file_base64");
        assert!(passes("file_base64", &["image/png|image/jpeg"], json!(PNG_1X1)));
        assert!(passes("file_base64", &["image/*"], json!(PNG_1X1)));
        assert_eq!(tag("file_base64", &["application/pdf"], json!(PNG_1X1)), "TAG:file_base64:mime:@p1");
        assert_eq!(tag("file_base64", &["", "10"], json!(PNG_1X1)), "TAG:file_base64:size:@p2");
        assert!(run("file_base64", &["", "big"], json!(PNG_1X1)).unwrap_err().is_parameter_error());
    }

    #[test]
    fn data_uri_declares_its_own_mime() {
        let uri = "data:text/csv;base64,YSxiCjEsMgo=";
        assert!(passes("file_base64", &["text/csv"], json!(uri)));
        assert_eq!(tag("file_base64", &["text/plain"], json!(uri)), "TAG:file_base64:mime:@p1");
    }
}
