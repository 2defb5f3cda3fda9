use chrono::{Datelike, NaiveDate, Weekday};
use dayoff_engine::calendar::{self, HolidayCalendar, WorkCalendar, WorkDayMask};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn holidays_for_2018_and_2019() {
    let expected = [
        d(2018, 1, 1),
        d(2018, 4, 2),
        d(2018, 5, 1),
        d(2018, 5, 8),
        d(2018, 5, 10),
        d(2018, 7, 14),
        d(2018, 8, 15),
        d(2018, 11, 1),
        d(2018, 11, 11),
        d(2018, 12, 25),
        d(2019, 1, 1),
        d(2019, 4, 22),
        d(2019, 5, 1),
        d(2019, 5, 8),
        d(2019, 5, 30),
        d(2019, 7, 14),
        d(2019, 8, 15),
        d(2019, 11, 1),
        d(2019, 11, 11),
        d(2019, 12, 25),
    ];
    let holidays: Vec<NaiveDate> = calendar::holidays([2018, 2019]).into_iter().collect();
    assert_eq!(holidays, expected);
}

#[test]
fn pentecost_monday_is_a_working_day() {
    let holidays = calendar::holidays([2018, 2019]);
    assert!(!holidays.contains(&d(2018, 5, 21)));
    assert!(!holidays.contains(&d(2019, 6, 10)));
}

#[test]
fn easter_monday_and_ascension_move_with_easter() {
    let holidays = calendar::holidays_for_year(2024);
    assert!(holidays.contains(&d(2024, 4, 1)));
    assert!(holidays.contains(&d(2024, 5, 9)));
    assert_eq!(d(2024, 5, 9).weekday(), Weekday::Thu);
}

#[test]
fn holiday_calendar_tracks_covered_years() {
    let mut holidays = HolidayCalendar::with_year_range(2020, 2019);
    assert!(holidays.covers(2019));
    assert!(holidays.covers(2020));
    assert!(!holidays.covers(2021));
    assert!(!holidays.is_holiday(d(2021, 1, 1)));

    holidays.ensure_year(2021);
    assert!(holidays.is_holiday(d(2021, 1, 1)));
    assert_eq!(holidays.years().collect::<Vec<_>>(), vec![2019, 2020, 2021]);
}

#[test]
fn default_mask_excludes_weekends_and_holidays() {
    let cal = WorkCalendar::with_year_range(WorkDayMask::default(), 2019, 2019);
    // 2019-11-30 is a Saturday, 2019-12-01 a Sunday
    assert!(!cal.is_available(d(2019, 11, 30)));
    assert!(!cal.is_available(d(2019, 12, 1)));
    assert!(!cal.is_available(d(2019, 11, 1)));
    assert!(cal.is_available(d(2019, 10, 31)));
}

#[test]
fn weekend_mask_counts_saturday_holidays_out() {
    let mask = WorkDayMask::from_weekdays([Weekday::Sat, Weekday::Sun]).unwrap();
    assert_eq!(mask.indices().collect::<Vec<_>>(), vec![0, 6]);
    let mut cal = WorkCalendar::with_year_range(mask, 2020, 2020);
    // 2020-11-01 is a Sunday holiday, 2020-10-31 a plain Saturday
    assert!(!cal.is_available(d(2020, 11, 1)));
    assert!(cal.is_available(d(2020, 10, 31)));
    // 2021-08-15 is a Sunday holiday outside the initial range
    assert!(cal.is_available(d(2021, 8, 15)));
    cal.cover(d(2021, 8, 15));
    assert!(!cal.is_available(d(2021, 8, 15)));
    assert!(cal.is_available(d(2021, 8, 14)));
}

#[test]
fn mask_serializes_as_index_list() {
    let mask: WorkDayMask = serde_json::from_str("[5, 1, 3]").unwrap();
    assert!(mask.contains(Weekday::Wed));
    assert_eq!(serde_json::to_string(&mask).unwrap(), "[1,3,5]");
    assert!(serde_json::from_str::<WorkDayMask>("[]").is_err());
    assert!(serde_json::from_str::<WorkDayMask>("[9]").is_err());
}
