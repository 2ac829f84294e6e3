//! Relative notation: `today`, `-3 days`, `next week`, `first day of next month`.
//!
//! Relative notation only ever appears in rule bounds, never in field data,
//! so a phrase this resolver cannot read is a `Parameter` error.
//!
//! An expression is a whitespace-separated list of terms applied to "now" in
//! the configured offset. Absolute setters (`today`, `noon`, `10:30`, `7pm`,
//! `2024-05-01`) fix the date or the time of day; relative amounts
//! (`+3 days`, `next month`, `2 weeks ago`) accumulate and are applied
//! afterwards: months and years first, then days, then weekday moves, then
//! hours, minutes and seconds. Month arithmetic overflows into the following
//! month, so Jan 31 + 1 month lands on Mar 2 or Mar 3.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Weekday};
use regex::Regex;

use fieldcheck_contracts::error::{FieldcheckError, FieldcheckResult};

/// Any text containing one of these words is treated as relative notation.
static RELATIVE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:today|tomorrow|yesterday|now|noon|midnight|next|last|ago|first|this|front|back|(?:second|minute|hour|day|week|fortnight|month|year)s?)\b",
    )
    .expect("relative vocabulary regex is valid")
});

/// `+3days` → `+3 days`, `7pm` → `7 pm`.
static GLUED_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-]?\d+)([a-z]+)").expect("glued amount regex is valid"));

static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+$").expect("amount regex is valid"));

static ABSOLUTE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("absolute date regex is valid"));

static ABSOLUTE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("absolute time regex is valid")
});

const SUBJECT: &str = "relative notation";

/// True when `text` uses relative notation rather than an absolute value.
pub fn is_relative(text: &str) -> bool {
    RELATIVE_WORDS.is_match(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Fortnight,
    Month,
    Year,
}

fn parse_unit(word: &str) -> Option<Unit> {
    let singular = word.strip_suffix('s').unwrap_or(word);
    Some(match singular {
        "sec" | "second" => Unit::Second,
        "min" | "minute" => Unit::Minute,
        "hour" => Unit::Hour,
        "day" => Unit::Day,
        "week" => Unit::Week,
        "fortnight" => Unit::Fortnight,
        "month" => Unit::Month,
        "year" => Unit::Year,
        _ => return None,
    })
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    Some(match word {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Next,
    Last,
    This,
}

impl Direction {
    fn amount(self) -> i64 {
        match self {
            Direction::Next => 1,
            Direction::Last => -1,
            Direction::This => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayOf {
    First,
    Last,
}

/// Everything an expression asks for, before it is applied to "now".
#[derive(Debug, Default)]
struct Plan {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    months: i64,
    days: i64,
    seconds: i64,
    weekday: Option<(Weekday, Direction)>,
    day_of: Option<DayOf>,
}

impl Plan {
    /// `None` when the running total overflows.
    fn add(&mut self, unit: Unit, n: i64) -> Option<()> {
        let (total, factor) = match unit {
            Unit::Second => (&mut self.seconds, 1),
            Unit::Minute => (&mut self.seconds, 60),
            Unit::Hour => (&mut self.seconds, 3600),
            Unit::Day => (&mut self.days, 1),
            Unit::Week => (&mut self.days, 7),
            Unit::Fortnight => (&mut self.days, 14),
            Unit::Month => (&mut self.months, 1),
            Unit::Year => (&mut self.months, 12),
        };
        *total = total.checked_add(n.checked_mul(factor)?)?;
        Some(())
    }

    /// `ago` flips every relative amount seen so far.
    fn negate(&mut self) -> Option<()> {
        self.months = self.months.checked_neg()?;
        self.days = self.days.checked_neg()?;
        self.seconds = self.seconds.checked_neg()?;
        Some(())
    }

    fn midnight_unless_set(&mut self) {
        if self.time.is_none() {
            self.time = Some(NaiveTime::MIN);
        }
    }
}

fn unreadable(text: &str, reason: impl Into<String>) -> FieldcheckError {
    FieldcheckError::parameter(SUBJECT, text, reason)
}

/// Resolve `text` against `now`, keeping `now`'s offset.
pub fn resolve(text: &str, now: DateTime<FixedOffset>) -> FieldcheckResult<DateTime<FixedOffset>> {
    let lowered = text.trim().to_lowercase();
    let normalized = GLUED_AMOUNT.replace_all(&lowered, "$1 $2");
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(unreadable(text, "expression is empty"));
    }

    let plan = read_plan(text, &tokens)?;
    apply(text, &plan, now)
}

fn read_plan(text: &str, tokens: &[&str]) -> FieldcheckResult<Plan> {
    let out_of_range = || unreadable(text, "amount is out of range");
    let mut plan = Plan::default();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        let next = tokens.get(i + 1).copied();

        match token {
            "now" => {}
            "today" | "midnight" => plan.time = Some(NaiveTime::MIN),
            "noon" => plan.time = NaiveTime::from_hms_opt(12, 0, 0),
            "tomorrow" | "yesterday" => {
                let n = if token == "tomorrow" { 1 } else { -1 };
                plan.add(Unit::Day, n).ok_or_else(out_of_range)?;
                plan.time = Some(NaiveTime::MIN);
            }
            "ago" => plan.negate().ok_or_else(out_of_range)?,
            "first" | "last" if next == Some("day") && tokens.get(i + 2) == Some(&"of") => {
                plan.day_of = Some(if token == "first" { DayOf::First } else { DayOf::Last });
                i += 3;
                continue;
            }
            "next" | "last" | "this" => {
                let direction = match token {
                    "next" => Direction::Next,
                    "last" => Direction::Last,
                    _ => Direction::This,
                };
                let target =
                    next.ok_or_else(|| unreadable(text, format!("'{token}' must be followed by a unit or weekday")))?;
                if let Some(unit) = parse_unit(target) {
                    plan.add(unit, direction.amount()).ok_or_else(out_of_range)?;
                } else if let Some(weekday) = parse_weekday(target) {
                    plan.weekday = Some((weekday, direction));
                    plan.midnight_unless_set();
                } else {
                    return Err(unreadable(text, format!("'{target}' is not a unit or weekday")));
                }
                i += 1;
            }
            "front" | "back" => {
                if next != Some("of") {
                    return Err(unreadable(text, format!("'{token}' must be followed by 'of <hour>'")));
                }
                let (hour, consumed) = read_hour(text, &tokens[i + 2..])?;
                plan.time = if token == "back" {
                    NaiveTime::from_hms_opt(hour, 15, 0)
                } else if hour == 0 {
                    return Err(unreadable(text, "'front of' needs an hour after midnight"));
                } else {
                    NaiveTime::from_hms_opt(hour - 1, 45, 0)
                };
                i += 1 + consumed;
            }
            hour if AMOUNT.is_match(hour) && matches!(next, Some("am" | "pm")) => {
                let (hour, consumed) = read_hour(text, &tokens[i..])?;
                plan.time = NaiveTime::from_hms_opt(hour, 0, 0);
                i += consumed;
                continue;
            }
            amount if AMOUNT.is_match(amount) => {
                let n: i64 = amount
                    .trim_start_matches('+')
                    .parse()
                    .map_err(|_| unreadable(text, format!("amount '{amount}' is out of range")))?;
                let unit = next
                    .and_then(parse_unit)
                    .ok_or_else(|| unreadable(text, format!("amount '{amount}' has no unit")))?;
                plan.add(unit, n).ok_or_else(out_of_range)?;
                i += 1;
            }
            date if ABSOLUTE_DATE.is_match(date) => {
                let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| unreadable(text, format!("'{date}' is not a calendar date")))?;
                plan.date = Some(parsed);
            }
            time if ABSOLUTE_TIME.is_match(time) => {
                plan.time = Some(read_clock_time(text, time)?);
            }
            other => return Err(unreadable(text, format!("unrecognized term '{other}'"))),
        }
        i += 1;
    }

    Ok(plan)
}

/// Read `<hour>[am|pm]` from the front of `tokens`, returning the 24-hour
/// value and how many tokens it used.
fn read_hour(text: &str, tokens: &[&str]) -> FieldcheckResult<(u32, usize)> {
    let raw = tokens
        .first()
        .ok_or_else(|| unreadable(text, "missing hour"))?;
    let hour: u32 = raw
        .parse()
        .map_err(|_| unreadable(text, format!("'{raw}' is not an hour")))?;

    match tokens.get(1).copied() {
        Some(meridiem @ ("am" | "pm")) => {
            if !(1..=12).contains(&hour) {
                return Err(unreadable(text, format!("'{hour}{meridiem}' is not a 12-hour time")));
            }
            let base = hour % 12;
            Ok((if meridiem == "pm" { base + 12 } else { base }, 2))
        }
        _ if hour < 24 => Ok((hour, 1)),
        _ => Err(unreadable(text, format!("'{hour}' is not an hour"))),
    }
}

fn read_clock_time(text: &str, token: &str) -> FieldcheckResult<NaiveTime> {
    let caps = ABSOLUTE_TIME
        .captures(token)
        .ok_or_else(|| unreadable(text, format!("'{token}' is not a time of day")))?;
    let part = |idx: usize| caps.get(idx).map_or(Ok(0), |m| m.as_str().parse::<u32>());
    match (part(1), part(2), part(3)) {
        (Ok(h), Ok(m), Ok(s)) => NaiveTime::from_hms_opt(h, m, s)
            .ok_or_else(|| unreadable(text, format!("'{token}' is not a time of day"))),
        _ => Err(unreadable(text, format!("'{token}' is not a time of day"))),
    }
}

fn apply(text: &str, plan: &Plan, now: DateTime<FixedOffset>) -> FieldcheckResult<DateTime<FixedOffset>> {
    let out_of_range = || unreadable(text, "result is out of the supported calendar range");

    let base_date = plan.date.unwrap_or_else(|| now.date_naive());
    let time = plan.time.unwrap_or_else(|| now.time());

    let mut date = match plan.day_of {
        Some(DayOf::First) => shift_months(first_of_month(base_date), plan.months),
        Some(DayOf::Last) => shift_months(first_of_month(base_date), plan.months).and_then(last_of_month),
        None => shift_months(base_date, plan.months),
    }
    .ok_or_else(out_of_range)?;

    date = date
        .checked_add_signed(TimeDelta::try_days(plan.days).ok_or_else(out_of_range)?)
        .ok_or_else(out_of_range)?;

    if let Some((weekday, direction)) = plan.weekday {
        date = move_to_weekday(date, weekday, direction).ok_or_else(out_of_range)?;
    }

    let naive = date
        .and_time(time)
        .checked_add_signed(TimeDelta::try_seconds(plan.seconds).ok_or_else(out_of_range)?)
        .ok_or_else(out_of_range)?;

    naive
        .and_local_timezone(*now.offset())
        .single()
        .ok_or_else(out_of_range)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(first: NaiveDate) -> Option<NaiveDate> {
    shift_months(first, 1)?.pred_opt()
}

/// Add `months`, letting an out-of-range day spill into the next month.
fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let total = (i64::from(date.year()) * 12 + i64::from(date.month0())).checked_add(months)?;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_signed(TimeDelta::try_days(i64::from(date.day()) - 1)?)
}

fn move_to_weekday(date: NaiveDate, target: Weekday, direction: Direction) -> Option<NaiveDate> {
    let current = i64::from(date.weekday().num_days_from_monday());
    let wanted = i64::from(target.num_days_from_monday());
    let forward = (wanted - current).rem_euclid(7);
    let delta = match direction {
        Direction::This => forward,
        Direction::Next if forward == 0 => 7,
        Direction::Next => forward,
        Direction::Last => {
            let backward = (current - wanted).rem_euclid(7);
            if backward == 0 { -7 } else { -backward }
        }
    };
    date.checked_add_signed(TimeDelta::try_days(delta)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
