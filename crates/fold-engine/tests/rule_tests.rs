//! Tests for transition-rule resolution and daylight-period classification.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use fold_engine::rule::days_in_month;
use fold_engine::{AdjustmentRule, FoldError, LocalKind, TransitionRule, WeekOfMonth};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn civil(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap()
}

fn last_sunday(month: u32, hour: u32) -> TransitionRule {
    TransitionRule::floating(month, WeekOfMonth::Last, Weekday::Sun, at(hour)).unwrap()
}

fn european_rule() -> AdjustmentRule {
    AdjustmentRule::new(
        date(1, 1, 1),
        date(9999, 12, 31),
        TimeDelta::hours(1),
        last_sunday(3, 2),
        last_sunday(10, 3),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Floating rules
// ---------------------------------------------------------------------------

#[test]
fn last_sunday_of_march_with_five_sundays_is_the_fifth() {
    // March 2024: Sundays fall on 3, 10, 17, 24, 31.
    let rule = last_sunday(3, 2);
    assert_eq!(rule.to_datetime(2024), Some(civil(2024, 3, 31, 2, 0)));
}

#[test]
fn last_sunday_of_march_with_four_sundays_is_not_the_last_day() {
    // March 2023: Sundays fall on 5, 12, 19, 26; the 31st is a Friday.
    let rule = last_sunday(3, 2);
    assert_eq!(rule.to_datetime(2023), Some(civil(2023, 3, 26, 2, 0)));
}

#[test]
fn first_weekday_on_the_first_of_the_month() {
    // 2024-09-01 is a Sunday, so no walk is needed.
    let rule = TransitionRule::floating(9, WeekOfMonth::First, Weekday::Sun, at(2)).unwrap();
    assert_eq!(rule.to_datetime(2024), Some(civil(2024, 9, 1, 2, 0)));
}

#[test]
fn ordinal_weeks_add_seven_days_each() {
    // 2024-03-01 is a Friday; the first Sunday is the 3rd.
    let expected = [
        (WeekOfMonth::First, 3),
        (WeekOfMonth::Second, 10),
        (WeekOfMonth::Third, 17),
        (WeekOfMonth::Fourth, 24),
    ];
    for (week, day) in expected {
        let rule = TransitionRule::floating(3, week, Weekday::Sun, at(2)).unwrap();
        assert_eq!(rule.to_datetime(2024), Some(civil(2024, 3, day, 2, 0)), "{:?}", week);
    }
}

#[test]
fn us_rules_resolve_to_known_dates() {
    let start = TransitionRule::floating(3, WeekOfMonth::Second, Weekday::Sun, at(2)).unwrap();
    let end = TransitionRule::floating(11, WeekOfMonth::First, Weekday::Sun, at(2)).unwrap();
    assert_eq!(start.to_datetime(2024), Some(civil(2024, 3, 10, 2, 0)));
    assert_eq!(end.to_datetime(2024), Some(civil(2024, 11, 3, 2, 0)));
    assert_eq!(start.to_datetime(2025), Some(civil(2025, 3, 9, 2, 0)));
    assert_eq!(end.to_datetime(2025), Some(civil(2025, 11, 2, 2, 0)));
}

#[test]
fn last_weekday_other_than_sunday() {
    // October 2024 ends on Thursday the 31st; the last Friday is the 25th.
    let rule = TransitionRule::floating(10, WeekOfMonth::Last, Weekday::Fri, at(0)).unwrap();
    assert_eq!(rule.to_datetime(2024), Some(civil(2024, 10, 25, 0, 0)));
}

#[test]
fn week_numbers_map_like_registry_data() {
    assert_eq!(WeekOfMonth::from_number(1), Some(WeekOfMonth::First));
    assert_eq!(WeekOfMonth::from_number(4), Some(WeekOfMonth::Fourth));
    assert_eq!(WeekOfMonth::from_number(5), Some(WeekOfMonth::Last));
    assert_eq!(WeekOfMonth::from_number(0), None);
    assert_eq!(WeekOfMonth::from_number(6), None);
}

// ---------------------------------------------------------------------------
// Fixed-date rules
// ---------------------------------------------------------------------------

#[test]
fn fixed_date_clamps_to_end_of_month() {
    let rule = TransitionRule::fixed(2, 30, at(2)).unwrap();
    assert_eq!(rule.to_datetime(2024), Some(civil(2024, 2, 29, 2, 0)));
    assert_eq!(rule.to_datetime(2023), Some(civil(2023, 2, 28, 2, 0)));

    let april = TransitionRule::fixed(4, 31, at(0)).unwrap();
    assert_eq!(april.to_datetime(2024), Some(civil(2024, 4, 30, 0, 0)));
}

#[test]
fn fixed_date_within_month_is_unchanged() {
    let rule = TransitionRule::fixed(10, 15, at(3)).unwrap();
    assert!(rule.is_fixed_date_rule());
    assert_eq!(rule.to_datetime(2024), Some(civil(2024, 10, 15, 3, 0)));
}

#[test]
fn days_in_month_handles_leap_years_and_december() {
    assert_eq!(days_in_month(2024, 2), Some(29));
    assert_eq!(days_in_month(2023, 2), Some(28));
    assert_eq!(days_in_month(1900, 2), Some(28));
    assert_eq!(days_in_month(2000, 2), Some(29));
    assert_eq!(days_in_month(2024, 12), Some(31));
    assert_eq!(days_in_month(2024, 13), None);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn invalid_transition_rules_are_rejected() {
    assert!(matches!(
        TransitionRule::fixed(13, 1, at(2)),
        Err(FoldError::InvalidRule(_))
    ));
    assert!(matches!(
        TransitionRule::fixed(3, 0, at(2)),
        Err(FoldError::InvalidRule(_))
    ));
    assert!(matches!(
        TransitionRule::floating(0, WeekOfMonth::First, Weekday::Sun, at(2)),
        Err(FoldError::InvalidRule(_))
    ));
}

#[test]
fn adjustment_rule_requires_positive_delta_and_ordered_window() {
    let start = last_sunday(3, 2);
    let end = last_sunday(10, 3);
    let (from, to) = (date(2000, 1, 1), date(2010, 1, 1));
    assert!(AdjustmentRule::new(from, to, TimeDelta::zero(), start, end).is_err());
    assert!(AdjustmentRule::new(from, to, TimeDelta::hours(-1), start, end).is_err());
    assert!(AdjustmentRule::new(to, from, TimeDelta::hours(1), start, end).is_err());
}

#[test]
fn adjustment_rule_window_queries() {
    let rule = AdjustmentRule::new(
        date(2007, 1, 1),
        date(2010, 6, 30),
        TimeDelta::hours(1),
        last_sunday(3, 2),
        last_sunday(10, 3),
    )
    .unwrap();
    assert!(rule.contains_date(date(2007, 1, 1)));
    assert!(rule.contains_date(date(2010, 6, 30)));
    assert!(!rule.contains_date(date(2010, 7, 1)));
    assert!(rule.covers_year(2010));
    assert!(!rule.covers_year(2006));
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn european_daylight_time_for_2024() {
    let dt = european_rule().daylight_time(2024).unwrap();
    assert_eq!(dt.start, civil(2024, 3, 31, 2, 0));
    assert_eq!(dt.end, civil(2024, 10, 27, 3, 0));
    assert_eq!(dt.delta, TimeDelta::hours(1));
}

#[test]
fn classification_around_fall_back() {
    let dt = european_rule().daylight_time(2024).unwrap();
    assert_eq!(dt.classify(civil(2024, 10, 27, 1, 59)), LocalKind::Daylight);
    assert_eq!(dt.classify(civil(2024, 10, 27, 2, 0)), LocalKind::Ambiguous);
    assert_eq!(dt.classify(civil(2024, 10, 27, 2, 30)), LocalKind::Ambiguous);
    assert_eq!(dt.classify(civil(2024, 10, 27, 2, 59)), LocalKind::Ambiguous);
    assert_eq!(dt.classify(civil(2024, 10, 27, 3, 0)), LocalKind::Standard);
}

#[test]
fn classification_around_spring_forward() {
    let dt = european_rule().daylight_time(2024).unwrap();
    assert_eq!(dt.classify(civil(2024, 3, 31, 1, 59)), LocalKind::Standard);
    assert_eq!(dt.classify(civil(2024, 3, 31, 2, 0)), LocalKind::Skipped);
    assert_eq!(dt.classify(civil(2024, 3, 31, 2, 59)), LocalKind::Skipped);
    assert_eq!(dt.classify(civil(2024, 3, 31, 3, 0)), LocalKind::Daylight);
    assert!(dt.is_skipped(civil(2024, 3, 31, 2, 30)));
    assert!(!dt.is_ambiguous(civil(2024, 3, 31, 2, 30)));
}

#[test]
fn southern_hemisphere_period_wraps_the_year() {
    // Adelaide: first Sunday of October 02:00 to first Sunday of April 03:00.
    let rule = AdjustmentRule::new(
        date(2008, 1, 1),
        date(9999, 12, 31),
        TimeDelta::hours(1),
        TransitionRule::floating(10, WeekOfMonth::First, Weekday::Sun, at(2)).unwrap(),
        TransitionRule::floating(4, WeekOfMonth::First, Weekday::Sun, at(3)).unwrap(),
    )
    .unwrap();
    let dt = rule.daylight_time(2024).unwrap();
    assert_eq!(dt.end, civil(2024, 4, 7, 3, 0));
    assert_eq!(dt.start, civil(2024, 10, 6, 2, 0));

    assert_eq!(dt.classify(civil(2024, 1, 15, 12, 0)), LocalKind::Daylight);
    assert_eq!(dt.classify(civil(2024, 4, 7, 2, 30)), LocalKind::Ambiguous);
    assert_eq!(dt.classify(civil(2024, 6, 1, 12, 0)), LocalKind::Standard);
    assert_eq!(dt.classify(civil(2024, 10, 6, 2, 30)), LocalKind::Skipped);
    assert_eq!(dt.classify(civil(2024, 12, 25, 12, 0)), LocalKind::Daylight);
}

#[test]
fn transition_rules_deserialize_from_json() {
    let json = r#"{"kind":"floating","month":3,"week":"last","weekday":"Sun","time":"02:00:00"}"#;
    let rule: TransitionRule = serde_json::from_str(json).unwrap();
    assert_eq!(rule, last_sunday(3, 2));

    let json = r#"{"kind":"fixed","month":2,"day":30,"time":"02:00:00"}"#;
    let rule: TransitionRule = serde_json::from_str(json).unwrap();
    assert_eq!(rule, TransitionRule::fixed(2, 30, at(2)).unwrap());
}

#[test]
fn transition_rules_describe_themselves() {
    assert_eq!(
        last_sunday(10, 3).to_string(),
        "The last Sunday of October at 03:00"
    );
    let second = TransitionRule::floating(3, WeekOfMonth::Second, Weekday::Sun, at(2)).unwrap();
    assert_eq!(second.to_string(), "The second Sunday of March at 02:00");
    assert_eq!(
        TransitionRule::fixed(4, 1, at(2)).unwrap().to_string(),
        "On April 1 at 02:00"
    );
}
