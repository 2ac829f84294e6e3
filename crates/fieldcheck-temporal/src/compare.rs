//! Ordering and range checks over parsed temporal values.
//!
//! Values compare as absolute instants, so two values in different offsets
//! order by the moment they denote.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use fieldcheck_contracts::temporal::{TemporalKind, TemporalValue};

/// A single-bound comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl Comparison {
    pub const ALL: [Comparison; 6] = [
        Comparison::Equal,
        Comparison::NotEqual,
        Comparison::Greater,
        Comparison::GreaterEqual,
        Comparison::Less,
        Comparison::LessEqual,
    ];

    pub fn holds(self, value: &TemporalValue, bound: &TemporalValue) -> bool {
        let ord = value.instant.cmp(&bound.instant);
        match self {
            Comparison::Equal => ord == Ordering::Equal,
            Comparison::NotEqual => ord != Ordering::Equal,
            Comparison::Greater => ord == Ordering::Greater,
            Comparison::GreaterEqual => ord != Ordering::Less,
            Comparison::Less => ord == Ordering::Less,
            Comparison::LessEqual => ord != Ordering::Greater,
        }
    }
}

/// Which ends of a range are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeBounds {
    /// `(start, end)`
    Open,
    /// `(start, end]`
    OpenClosed,
    /// `[start, end)`
    ClosedOpen,
    /// `[start, end]`
    Closed,
}

impl RangeBounds {
    pub const ALL: [RangeBounds; 4] = [
        RangeBounds::Open,
        RangeBounds::OpenClosed,
        RangeBounds::ClosedOpen,
        RangeBounds::Closed,
    ];

    pub fn includes_start(self) -> bool {
        matches!(self, RangeBounds::ClosedOpen | RangeBounds::Closed)
    }

    pub fn includes_end(self) -> bool {
        matches!(self, RangeBounds::OpenClosed | RangeBounds::Closed)
    }
}

/// Whether `value` lies between `start` and `end`.
///
/// For `Time` values a start later than the end means the range spans
/// midnight: the value passes when it is after the start *or* before the
/// end. `Date` and `DateTime` ranges are never swapped, so a start after the
/// end matches nothing.
pub fn in_range(
    value: &TemporalValue,
    start: &TemporalValue,
    end: &TemporalValue,
    bounds: RangeBounds,
) -> bool {
    let after_start = if bounds.includes_start() {
        value.instant >= start.instant
    } else {
        value.instant > start.instant
    };
    let before_end = if bounds.includes_end() {
        value.instant <= end.instant
    } else {
        value.instant < end.instant
    };

    if value.kind == TemporalKind::Time && start.instant > end.instant {
        after_start || before_end
    } else {
        after_start && before_end
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

    use fieldcheck_contracts::temporal::{TemporalKind, TemporalValue};

    use super::{in_range, Comparison, RangeBounds};

    fn time(hms: &str) -> TemporalValue {
        let t = NaiveTime::parse_from_str(hms, "%H:%M:%S").unwrap();
        let instant = NaiveDate::default().and_time(t).and_utc().fixed_offset();
        TemporalValue::new(instant, TemporalKind::Time)
    }

    fn date(ymd: &str) -> TemporalValue {
        let d = NaiveDate::parse_from_str(ymd, "%Y-%m-%d").unwrap();
        let instant: DateTime<Utc> = d.and_time(NaiveTime::MIN).and_utc();
        TemporalValue::new(instant.fixed_offset(), TemporalKind::Date)
    }

    // ── Comparisons ───────────────────────────────────────────────────────────

    #[test]
    fn single_bound_comparisons() {
        let (a, b) = (date("2024-04-23"), date("2024-05-01"));
        assert!(Comparison::Less.holds(&a, &b));
        assert!(Comparison::LessEqual.holds(&a, &a));
        assert!(!Comparison::Greater.holds(&a, &a));
        assert!(Comparison::GreaterEqual.holds(&b, &a));
        assert!(Comparison::Equal.holds(&a, &date("2024-04-23")));
        assert!(Comparison::NotEqual.holds(&a, &b));
    }

    #[test]
    fn comparisons_never_wrap() {
        // 01:00 is not "after" 22:00 just because a range would wrap.
        assert!(!Comparison::Greater.holds(&time("01:00:00"), &time("22:00:00")));
    }

    // ── Ranges ────────────────────────────────────────────────────────────────

    #[test]
    fn ordinary_range_honours_each_boundary_policy() {
        let (start, end) = (time("08:00:00"), time("17:00:00"));
        let at_start = time("08:00:00");
        let at_end = time("17:00:00");

        assert!(!in_range(&at_start, &start, &end, RangeBounds::Open));
        assert!(!in_range(&at_end, &start, &end, RangeBounds::Open));
        assert!(in_range(&at_end, &start, &end, RangeBounds::OpenClosed));
        assert!(in_range(&at_start, &start, &end, RangeBounds::ClosedOpen));
        assert!(in_range(&at_start, &start, &end, RangeBounds::Closed));
        assert!(in_range(&at_end, &start, &end, RangeBounds::Closed));
        assert!(!in_range(&time("07:59:59"), &start, &end, RangeBounds::Closed));
    }

    #[test]
    fn time_range_wraps_midnight() {
        let (start, end) = (time("22:00:00"), time("02:00:00"));
        assert!(in_range(&time("23:00:01"), &start, &end, RangeBounds::Open));
        assert!(in_range(&time("01:59:59"), &start, &end, RangeBounds::Open));
        assert!(!in_range(&time("22:00:00"), &start, &end, RangeBounds::Open));
        assert!(!in_range(&time("02:00:00"), &start, &end, RangeBounds::Open));
        assert!(!in_range(&time("12:00:00"), &start, &end, RangeBounds::Open));
    }

    #[test]
    fn wrapped_range_keeps_boundary_policy() {
        let (start, end) = (time("22:00:00"), time("02:00:00"));
        let (at_start, at_end) = (time("22:00:00"), time("02:00:00"));

        assert!(in_range(&at_start, &start, &end, RangeBounds::ClosedOpen));
        assert!(!in_range(&at_end, &start, &end, RangeBounds::ClosedOpen));
        assert!(!in_range(&at_start, &start, &end, RangeBounds::OpenClosed));
        assert!(in_range(&at_end, &start, &end, RangeBounds::OpenClosed));
        assert!(in_range(&at_start, &start, &end, RangeBounds::Closed));
        assert!(in_range(&at_end, &start, &end, RangeBounds::Closed));
    }

    #[test]
    fn inverted_date_range_matches_nothing() {
        let (start, end) = (date("2024-05-01"), date("2024-04-23"));
        for value in ["2024-04-20", "2024-04-23", "2024-04-27", "2024-05-01", "2024-06-01"] {
            for bounds in RangeBounds::ALL {
                assert!(!in_range(&date(value), &start, &end, bounds), "{value} {bounds:?}");
            }
        }
    }
}
