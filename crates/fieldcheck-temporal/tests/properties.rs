use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use proptest::prelude::*;

use fieldcheck_contracts::temporal::{FormatSpec, TemporalKind, TemporalValue};
use fieldcheck_temporal::{in_range, relative, FixedClock, RangeBounds, TemporalParser, TemporalSettings};

/// A bare time of day, `secs` seconds after midnight.
fn time_of_day(secs: u32) -> TemporalValue {
    let t = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
    let instant = NaiveDate::default().and_time(t).and_utc().fixed_offset();
    TemporalValue::new(instant, TemporalKind::Time)
}

fn arb_bounds() -> impl Strategy<Value = RangeBounds> {
    prop_oneof![
        Just(RangeBounds::Open),
        Just(RangeBounds::OpenClosed),
        Just(RangeBounds::ClosedOpen),
        Just(RangeBounds::Closed),
    ]
}

/// Instants between 2000 and 2040.
fn arb_now() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800i64..2_208_988_800i64).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

fn arb_offset() -> impl Strategy<Value = FixedOffset> {
    (-12i32..=14).prop_map(|h| FixedOffset::east_opt(h * 3600).unwrap())
}

const DAY: u32 = 86_400;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // A wrapped range accepts exactly the union of "after start" and "before end".
    #[test]
    fn wrapped_time_range_is_a_union(
        start in 1u32..DAY,
        end in 0u32..DAY,
        value in 0u32..DAY,
        bounds in arb_bounds(),
    ) {
        prop_assume!(start > end);
        let after_start = if bounds.includes_start() { value >= start } else { value > start };
        let before_end = if bounds.includes_end() { value <= end } else { value < end };
        let got = in_range(&time_of_day(value), &time_of_day(start), &time_of_day(end), bounds);
        prop_assert_eq!(got, after_start || before_end);
    }

    // An ordinary range is the plain intersection.
    #[test]
    fn ordered_time_range_is_an_intersection(
        start in 0u32..DAY,
        end in 0u32..DAY,
        value in 0u32..DAY,
    ) {
        prop_assume!(start <= end);
        let got = in_range(&time_of_day(value), &time_of_day(start), &time_of_day(end), RangeBounds::Closed);
        prop_assert_eq!(got, start <= value && value <= end);
    }

    // "today" rendered and re-parsed through Y-m-d is the start of the day in the configured offset.
    #[test]
    fn today_round_trips_to_start_of_day(now in arb_now(), offset in arb_offset()) {
        let parser = TemporalParser::new(
            TemporalSettings { offset, bound_format_fallback: true },
            Arc::new(FixedClock(now)),
        );
        let bound = parser
            .parse_bound("date_equal", Some("today"), TemporalKind::Date, Some(&FormatSpec::explicit("Y-m-d")))
            .unwrap();

        let local = now.with_timezone(&offset);
        let expected = offset
            .from_local_datetime(&local.date_naive().and_time(NaiveTime::MIN))
            .single()
            .unwrap();
        prop_assert_eq!(bound.instant, expected);
        prop_assert_eq!(bound.instant.offset().local_minus_utc(), offset.local_minus_utc());
    }

    // Day and second offsets are exact inverses of each other.
    #[test]
    fn day_and_second_offsets_invert(now in arb_now(), days in 0i64..2000, secs in 0i64..100_000) {
        let now = now.fixed_offset();
        let forward = relative::resolve(&format!("+{days} days +{secs} seconds"), now).unwrap();
        let back = relative::resolve(&format!("{days} days {secs} seconds ago"), forward).unwrap();
        prop_assert_eq!(back, now);
    }
}
