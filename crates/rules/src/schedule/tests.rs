//! Tests for cron entry parsing and due-checks.

use chrono::{DateTime, TimeZone, Utc};

use super::{CronEntry, FieldSet, ScheduleParseError};

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

// ── Parsing: wildcards and sets ─────────────────────────────────────

#[test]
fn all_wildcards_parse_to_any_and_always_match() {
    let entry = CronEntry::parse("* * * * *").unwrap();
    assert!(entry.minutes().is_any());
    assert!(entry.hours().is_any());
    assert!(entry.days_of_month().is_any());
    assert!(entry.months().is_any());
    assert!(entry.days_of_week().is_any());

    assert!(entry.is_due(at(2026, 1, 1, 0, 0)));
    assert!(entry.is_due(at(2026, 8, 5, 14, 31)));
    assert!(entry.is_due(at(2027, 12, 31, 23, 59)));
}

#[test]
fn step_on_wildcard_starts_at_field_minimum() {
    let entry = CronEntry::parse("0 */5 * * *").unwrap();
    assert_eq!(
        entry.hours(),
        &FieldSet::Set(vec![0, 5, 10, 15, 20])
    );

    // Day-of-month minimum is 1, not 0.
    let entry = CronEntry::parse("0 0 */10 * *").unwrap();
    assert_eq!(entry.days_of_month(), &FieldSet::Set(vec![1, 11, 21, 31]));
}

#[test]
fn step_on_range_starts_at_range_low_bound() {
    let entry = CronEntry::parse("10-30/10 * * * *").unwrap();
    assert_eq!(entry.minutes(), &FieldSet::Set(vec![10, 20, 30]));
}

#[test]
fn atoms_union_into_sorted_unique_set() {
    let entry = CronEntry::parse("30,10,20,10 * * * *").unwrap();
    assert_eq!(entry.minutes(), &FieldSet::Set(vec![10, 20, 30]));

    let entry = CronEntry::parse("0-5,3-8 * * * *").unwrap();
    assert_eq!(
        entry.minutes(),
        &FieldSet::Set(vec![0, 1, 2, 3, 4, 5, 6, 7, 8])
    );
}

#[test]
fn wildcard_atom_swallows_the_field() {
    let entry = CronEntry::parse("5,* * * * *").unwrap();
    assert!(entry.minutes().is_any());
}

#[test]
fn explicit_full_range_collapses_to_any() {
    let entry = CronEntry::parse("0-59 * * * *").unwrap();
    assert!(entry.minutes().is_any());

    // 0-6 covers every weekday once 0 is canonicalized to 7.
    let entry = CronEntry::parse("* * * * 0-6").unwrap();
    assert!(entry.days_of_week().is_any());
}

// ── Parsing: names and Sunday canonicalization ──────────────────────

#[test]
fn month_and_weekday_names_are_case_insensitive() {
    let by_name = CronEntry::parse("0 6 * January Monday").unwrap();
    let by_number = CronEntry::parse("0 6 * 1 1").unwrap();
    assert_eq!(by_name, by_number);

    let mixed = CronEntry::parse("0 6 * jAnUaRy mOnDaY").unwrap();
    assert_eq!(mixed, by_number);
}

#[test]
fn three_letter_prefixes_accepted() {
    let entry = CronEntry::parse("0 6 * jan,feb,dec mon,wed,fri").unwrap();
    assert_eq!(entry.months(), &FieldSet::Set(vec![1, 2, 12]));
    assert_eq!(entry.days_of_week(), &FieldSet::Set(vec![1, 3, 5]));

    // Longer prefixes work too.
    let entry = CronEntry::parse("0 6 * septem thurs").unwrap();
    assert_eq!(entry.months(), &FieldSet::Set(vec![9]));
    assert_eq!(entry.days_of_week(), &FieldSet::Set(vec![4]));
}

#[test]
fn weekday_name_ranges() {
    let entry = CronEntry::parse("0 9 * * mon-fri").unwrap();
    assert_eq!(entry.days_of_week(), &FieldSet::Set(vec![1, 2, 3, 4, 5]));
}

#[test]
fn sunday_zero_and_seven_canonicalize_to_seven() {
    let zero = CronEntry::parse("0 0 * * 0").unwrap();
    let seven = CronEntry::parse("0 0 * * 7").unwrap();
    let name = CronEntry::parse("0 0 * * sun").unwrap();
    assert_eq!(zero.days_of_week(), &FieldSet::Set(vec![7]));
    assert_eq!(zero, seven);
    assert_eq!(zero, name);
}

// ── Parsing: errors ─────────────────────────────────────────────────

#[test]
fn empty_expression_is_rejected() {
    assert_eq!(CronEntry::parse(""), Err(ScheduleParseError::Empty));
    assert_eq!(CronEntry::parse("   "), Err(ScheduleParseError::Empty));
}

#[test]
fn wrong_field_count_is_rejected() {
    assert_eq!(
        CronEntry::parse("* * * *"),
        Err(ScheduleParseError::FieldCount(4))
    );
    assert_eq!(
        CronEntry::parse("* * * * * UTC extra"),
        Err(ScheduleParseError::FieldCount(7))
    );
}

#[test]
fn non_numeric_atom_is_rejected() {
    assert!(matches!(
        CronEntry::parse("x * * * *"),
        Err(ScheduleParseError::InvalidAtom { field: "minute", .. })
    ));
    // Names only exist for months and weekdays.
    assert!(matches!(
        CronEntry::parse("mon * * * *"),
        Err(ScheduleParseError::InvalidAtom { field: "minute", .. })
    ));
}

#[test]
fn out_of_range_values_are_rejected() {
    assert_eq!(
        CronEntry::parse("60 * * * *"),
        Err(ScheduleParseError::OutOfRange {
            field: "minute",
            value: 60,
            min: 0,
            max: 59
        })
    );
    assert!(matches!(
        CronEntry::parse("* 24 * * *"),
        Err(ScheduleParseError::OutOfRange { field: "hour", .. })
    ));
    assert!(matches!(
        CronEntry::parse("* * 0 * *"),
        Err(ScheduleParseError::OutOfRange { field: "day-of-month", .. })
    ));
    assert!(matches!(
        CronEntry::parse("* * * 13 *"),
        Err(ScheduleParseError::OutOfRange { field: "month", .. })
    ));
    assert!(matches!(
        CronEntry::parse("* * * * 8"),
        Err(ScheduleParseError::OutOfRange { field: "day-of-week", .. })
    ));
}

#[test]
fn bad_steps_are_rejected() {
    assert!(matches!(
        CronEntry::parse("*/0 * * * *"),
        Err(ScheduleParseError::InvalidStep { field: "minute", .. })
    ));
    assert!(matches!(
        CronEntry::parse("* */99 * * *"),
        Err(ScheduleParseError::InvalidStep { field: "hour", .. })
    ));
    assert!(matches!(
        CronEntry::parse("*/x * * * *"),
        Err(ScheduleParseError::InvalidStep { field: "minute", .. })
    ));
    // A step on a single value is not part of the grammar.
    assert!(matches!(
        CronEntry::parse("5/2 * * * *"),
        Err(ScheduleParseError::InvalidAtom { field: "minute", .. })
    ));
}

#[test]
fn reversed_range_is_rejected() {
    assert!(matches!(
        CronEntry::parse("30-10 * * * *"),
        Err(ScheduleParseError::InvalidAtom { field: "minute", .. })
    ));
}

#[test]
fn unknown_timezone_is_rejected() {
    assert_eq!(
        CronEntry::parse("* * * * * Mars/Olympus"),
        Err(ScheduleParseError::UnknownTimezone("Mars/Olympus".to_string()))
    );
}

// ── Due-checks ──────────────────────────────────────────────────────

#[test]
fn is_due_matches_exact_minute() {
    let entry = CronEntry::parse("30 14 5 8 *").unwrap();
    assert!(entry.is_due(at(2026, 8, 5, 14, 30)));
    assert!(!entry.is_due(at(2026, 8, 5, 14, 31)));
    assert!(!entry.is_due(at(2026, 8, 5, 15, 30)));
    assert!(!entry.is_due(at(2026, 8, 6, 14, 30)));
    assert!(!entry.is_due(at(2026, 9, 5, 14, 30)));
}

#[test]
fn is_due_checks_weekday() {
    // 2026-08-05 is a Wednesday.
    let entry = CronEntry::parse("* * * * wed").unwrap();
    assert!(entry.is_due(at(2026, 8, 5, 10, 0)));

    let entry = CronEntry::parse("* * * * thu").unwrap();
    assert!(!entry.is_due(at(2026, 8, 5, 10, 0)));
}

#[test]
fn timezone_defaults_to_utc() {
    let entry = CronEntry::parse("0 12 * * *").unwrap();
    assert_eq!(entry.timezone(), chrono_tz::UTC);
    assert!(entry.is_due(at(2026, 8, 5, 12, 0)));
}

#[test]
fn trailing_timezone_shifts_matching() {
    // Helsinki is UTC+3 in August: noon local is 09:00 UTC.
    let entry = CronEntry::parse("0 12 * * * Europe/Helsinki").unwrap();
    assert!(entry.is_due(at(2026, 8, 5, 9, 0)));
    assert!(!entry.is_due(at(2026, 8, 5, 12, 0)));
}

#[test]
fn timezone_shifts_weekday_boundaries() {
    // 2026-08-05 23:30 UTC is already Thursday 11:30 in Auckland (UTC+12).
    let entry = CronEntry::parse("* * * * thu Pacific/Auckland").unwrap();
    assert!(entry.is_due(at(2026, 8, 5, 23, 30)));

    let entry = CronEntry::parse("* * * * wed Pacific/Auckland").unwrap();
    assert!(!entry.is_due(at(2026, 8, 5, 23, 30)));
}

#[test]
fn weekday_step_over_business_days() {
    let entry = CronEntry::parse("0 9 * * 1-5/2").unwrap();
    assert_eq!(entry.days_of_week(), &FieldSet::Set(vec![1, 3, 5]));
}
