//! Format aliases and the pattern language.
//!
//! Rule authors write formats with single-letter placeholders (`Y-m-d H:i:s`)
//! or name a well-known alias (`RFC3339`). A `Pattern` is the compiled form:
//! a chrono strftime string plus a record of which calendar fields the
//! pattern mentions, so fields it does not mention can be reset to the
//! epoch (1970-01-01 00:00:00) instead of being borrowed from "now".
//!
//! | Letter | Meaning | chrono |
//! |---|---|---|
//! | `d` `j` | day of month, padded / unpadded | `%d` `%-d` |
//! | `D` `l` | weekday name, short / full | `%a` `%A` |
//! | `N` `w` | ISO weekday 1–7 / weekday 0–6 | `%u` `%w` |
//! | `m` `n` `M` `F` | month | `%m` `%-m` `%b` `%B` |
//! | `Y` `y` | year, 4 / 2 digits | `%Y` `%y` |
//! | `H` `G` `h` `g` | hour 24h / 12h | `%H` `%-H` `%I` `%-I` |
//! | `A` `a` | AM/PM | `%p` `%P` |
//! | `i` `s` | minutes, seconds | `%M` `%S` |
//! | `u` `v` | micro-, milliseconds | `%6f` `%3f` |
//! | `P` `p` `O` | UTC offset | `%:z` `%:z` `%z` |
//! | `T` | zone abbreviation or numeric offset | see below |
//! | `U` | Unix timestamp | `%s` |
//! | `c` `r` | ISO 8601 / RFC 2822 shorthands | expanded |
//!
//! A backslash makes the next character literal. `!` and `|` are accepted
//! and ignored because unmentioned fields are always reset.
//!
//! chrono reads `%Z` as "any word" without setting an offset, so `T` is
//! matched here instead: a name from [`ZONE_ABBREVIATIONS`] or a numeric
//! offset, anything else rejects the value.

use chrono::format::{parse_and_remainder, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

/// Named formats, resolved before literal-pattern interpretation.
pub const FORMAT_ALIASES: &[(&str, &str)] = &[
    ("ATOM", "Y-m-d\\TH:i:sP"),
    ("COOKIE", "l, d-M-Y H:i:s T"),
    ("ISO8601", "Y-m-d\\TH:i:sO"),
    ("RFC822", "D, d M y H:i:s O"),
    ("RFC850", "l, d-M-y H:i:s T"),
    ("RFC1036", "D, d M y H:i:s O"),
    ("RFC1123", "D, d M Y H:i:s O"),
    ("RFC7231", "D, d M Y H:i:s \\G\\M\\T"),
    ("RFC2822", "D, d M Y H:i:s O"),
    ("RFC3339", "Y-m-d\\TH:i:sP"),
    ("RFC3339_EXTENDED", "Y-m-d\\TH:i:s.vP"),
    ("RSS", "D, d M Y H:i:s O"),
    ("W3C", "Y-m-d\\TH:i:sP"),
];

/// Aliases whose zone is the literal `GMT`: values are read and rendered in UTC.
const UTC_ALIASES: &[&str] = &["RFC7231"];

/// Zone names `T` accepts, with their offset in hours. The RFC 2822 set.
pub const ZONE_ABBREVIATIONS: &[(&str, i32)] = &[
    ("UT", 0),
    ("UTC", 0),
    ("GMT", 0),
    ("Z", 0),
    ("EST", -5),
    ("EDT", -4),
    ("CST", -6),
    ("CDT", -5),
    ("MST", -7),
    ("MDT", -6),
    ("PST", -8),
    ("PDT", -7),
];

/// Pattern used to render a resolved instant when a `DateTime` rule gave
/// no format of its own.
pub const GENERIC_DATETIME_PATTERN: &str = "Y-m-d H:i:s";

/// Look up a format alias by name.
pub fn alias_pattern(name: &str) -> Option<&'static str> {
    FORMAT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, pattern)| *pattern)
}

/// Which calendar fields a pattern mentions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Fields {
    year: bool,
    month: bool,
    day: bool,
    hour24: bool,
    hour12: bool,
    meridiem: bool,
    minute: bool,
    second: bool,
    offset: bool,
    timestamp: bool,
}

/// A compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    strftime: String,
    fields: Fields,
    /// Byte offsets in `strftime` where a `T` zone sits.
    zones: Vec<usize>,
    /// Offset fixed by the alias itself.
    pinned: Option<FixedOffset>,
}

impl Pattern {
    /// Compile `text`, resolving it as an alias first.
    ///
    /// Returns a human-readable reason when the pattern uses a letter this
    /// engine does not understand.
    pub fn compile(text: &str) -> Result<Self, String> {
        let source = alias_pattern(text).unwrap_or(text);
        let mut pattern = Pattern {
            source: source.to_string(),
            strftime: String::with_capacity(source.len() * 2),
            fields: Fields::default(),
            zones: Vec::new(),
            pinned: UTC_ALIASES.contains(&text).then(|| Utc.fix()),
        };
        pattern.translate(source)?;
        if pattern.strftime.is_empty() {
            return Err("format is empty".to_string());
        }
        Ok(pattern)
    }

    /// The letter pattern after alias resolution.
    pub fn source(&self) -> &str {
        &self.source
    }

    fn translate(&mut self, source: &str) -> Result<(), String> {
        let mut chars = source.chars();
        while let Some(c) = chars.next() {
            let spec = match c {
                'd' => self.mark(|f| &mut f.day, "%d"),
                'j' => self.mark(|f| &mut f.day, "%-d"),
                'D' => "%a",
                'l' => "%A",
                'N' => "%u",
                'w' => "%w",
                'm' => self.mark(|f| &mut f.month, "%m"),
                'n' => self.mark(|f| &mut f.month, "%-m"),
                'M' => self.mark(|f| &mut f.month, "%b"),
                'F' => self.mark(|f| &mut f.month, "%B"),
                'Y' => self.mark(|f| &mut f.year, "%Y"),
                'y' => self.mark(|f| &mut f.year, "%y"),
                'H' => self.mark(|f| &mut f.hour24, "%H"),
                'G' => self.mark(|f| &mut f.hour24, "%-H"),
                'h' => self.mark(|f| &mut f.hour12, "%I"),
                'g' => self.mark(|f| &mut f.hour12, "%-I"),
                'A' => self.mark(|f| &mut f.meridiem, "%p"),
                'a' => self.mark(|f| &mut f.meridiem, "%P"),
                'i' => self.mark(|f| &mut f.minute, "%M"),
                's' => self.mark(|f| &mut f.second, "%S"),
                'u' => "%6f",
                'v' => "%3f",
                'P' | 'p' => self.mark(|f| &mut f.offset, "%:z"),
                'O' => self.mark(|f| &mut f.offset, "%z"),
                'T' => {
                    self.zones.push(self.strftime.len());
                    self.mark(|f| &mut f.offset, "%Z")
                }
                'U' => self.mark(|f| &mut f.timestamp, "%s"),
                'c' => {
                    self.translate("Y-m-d\\TH:i:sP")?;
                    continue;
                }
                'r' => {
                    self.translate("D, d M Y H:i:s O")?;
                    continue;
                }
                '!' | '|' => continue,
                '\\' => {
                    match chars.next() {
                        Some(literal) => self.push_literal(literal),
                        None => return Err("format ends with a dangling escape".to_string()),
                    }
                    continue;
                }
                other if other.is_ascii_alphabetic() || other == '+' => {
                    return Err(format!("unsupported format character '{other}'"));
                }
                other => {
                    self.push_literal(other);
                    continue;
                }
            };
            self.strftime.push_str(spec);
        }
        Ok(())
    }

    fn mark(&mut self, field: fn(&mut Fields) -> &mut bool, spec: &'static str) -> &'static str {
        *field(&mut self.fields) = true;
        spec
    }

    fn push_literal(&mut self, c: char) {
        if c == '%' {
            self.strftime.push_str("%%");
        } else {
            self.strftime.push(c);
        }
    }

    /// Parse `text` strictly against this pattern.
    ///
    /// The whole input must be consumed. Fields the pattern does not mention
    /// are reset to the epoch; a missing offset falls back to the alias's
    /// own zone, then to `default_offset`. Returns `None` on any mismatch.
    pub fn parse(&self, text: &str, default_offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        let mut parsed = Parsed::new();
        let mut rest = text;
        let mut start = 0;
        for &at in &self.zones {
            rest = parse_and_remainder(&mut parsed, rest, StrftimeItems::new(&self.strftime[start..at])).ok()?;
            let (offset, remainder) = read_zone(rest)?;
            parsed.set_offset(i64::from(offset.local_minus_utc())).ok()?;
            rest = remainder;
            start = at + "%Z".len();
        }
        rest = parse_and_remainder(&mut parsed, rest, StrftimeItems::new(&self.strftime[start..])).ok()?;
        if !rest.is_empty() {
            return None;
        }

        let f = self.fields;
        if !f.timestamp {
            if !f.year {
                parsed.set_year(1970).ok()?;
            }
            if !f.month {
                parsed.set_month(1).ok()?;
            }
            if !f.day {
                parsed.set_day(1).ok()?;
            }
            if !f.hour24 && !f.hour12 {
                parsed.set_hour(0).ok()?;
            } else if f.hour12 && !f.meridiem {
                parsed.set_ampm(false).ok()?;
            }
            if !f.minute {
                parsed.set_minute(0).ok()?;
            }
            if !f.second {
                parsed.set_second(0).ok()?;
            }
        }
        if !f.offset {
            let offset = self.pinned.unwrap_or(default_offset);
            parsed.set_offset(i64::from(offset.local_minus_utc())).ok()?;
        }

        parsed.to_datetime().ok()
    }

    /// Render `instant` with this pattern.
    pub fn render(&self, instant: &DateTime<FixedOffset>) -> String {
        match self.pinned {
            Some(offset) => instant.with_timezone(&offset).format(&self.strftime).to_string(),
            None => instant.format(&self.strftime).to_string(),
        }
    }
}

/// Read the zone at the front of `text`: a known abbreviation or a numeric
/// offset such as `+02:00`, up to the next whitespace.
fn read_zone(text: &str) -> Option<(FixedOffset, &str)> {
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    let (token, rest) = text.split_at(end);

    if let Some((_, hours)) = ZONE_ABBREVIATIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
    {
        return Some((FixedOffset::east_opt(hours * 3600)?, rest));
    }

    let digits = token.strip_prefix(['+', '-'])?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == ':') {
        return None;
    }
    Some((token.parse().ok()?, rest))
}

const NAIVE_DATETIME_SHAPES: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const ZONED_DATETIME_SHAPES: &[&str] = &["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_DATE_SHAPES: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a date-time with no fixed shape, trying the common renderings in
/// turn. Used for `DateTime` rules that name no format.
pub fn parse_generic(text: &str, default_offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();

    if let Some(secs) = text.strip_prefix('@') {
        let secs: i64 = secs.parse().ok()?;
        return default_offset.timestamp_opt(secs, 0).single();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt);
    }
    for shape in ZONED_DATETIME_SHAPES {
        if let Ok(dt) = DateTime::parse_from_str(text, shape) {
            return Some(dt);
        }
    }
    for shape in NAIVE_DATETIME_SHAPES {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, shape) {
            return naive.and_local_timezone(default_offset).single();
        }
    }
    for shape in NAIVE_DATE_SHAPES {
        if let Ok(date) = NaiveDate::parse_from_str(text, shape) {
            return date
                .and_hms_opt(0, 0, 0)?
                .and_local_timezone(default_offset)
                .single();
        }
    }
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
